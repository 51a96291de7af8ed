//! Este módulo contiene el canal de control persistente del nodo de
//! storage hacia el name node: registro, eco de heartbeats y envio de
//! eventos de archivo

use crate::log_msj::log_mensajes::{log_canal_caido, log_evento_enviado, log_registro_exitoso};
use crate::node::StorageNode;
use crate::node_error::StorageError;
use dfs_client::protocol::frame::{SEPARADOR, escribir_frame, leer_frame};
use dfs_client::protocol::respuesta::Respuesta;
use dfs_client::protocol::verbos::{CMD_HEARTBEAT, CMD_HEARTBEAT_ACK, CMD_REGISTER};
use logger::logger::{SIN_ORIGEN, SIN_USUARIO};
use std::io::{BufReader, ErrorKind};
use std::net::TcpStream;
use std::sync::Arc;
use std::thread::{sleep, spawn};
use std::time::Duration;

/// Timeout de recepcion del canal de control; coincide con la cadencia
/// de heartbeats del name node
const TIMEOUT_CONTROL: Duration = Duration::from_secs(5);
/// Espera entre reintentos de conexion al name node
const ESPERA_RECONEXION: Duration = Duration::from_secs(5);

impl StorageNode {
    /// Lanza el hilo que mantiene la conexion de control con el name
    /// node. Si la conexion se pierde, reintenta cada cinco segundos y
    /// vuelve a registrarse con la lista de archivos presente.
    ///
    /// # Parámetros
    /// * `puerto_cliente`: puerto real donde este nodo atiende clientes,
    ///   anunciado en el frame REGISTER
    pub(crate) fn iniciar_canal_name_node(self: Arc<Self>, puerto_cliente: u16) {
        spawn(move || {
            while self.esta_activo() {
                match self.conectar_y_atender(puerto_cliente) {
                    Ok(()) => break,
                    Err(e) => log_canal_caido(&self.logger, &e.description),
                }
                sleep(ESPERA_RECONEXION);
            }
        });
    }

    /// Conecta, registra el nodo y entra al loop de la sesion de
    /// control. Retorna Ok(()) solo ante una detencion ordenada.
    fn conectar_y_atender(&self, puerto_cliente: u16) -> Result<(), StorageError> {
        let stream = TcpStream::connect(self.config.get_nm_addr())
            .map_err(|e| StorageError::new_io_error("connect", &e, "CONTROL"))?;
        stream
            .set_read_timeout(Some(TIMEOUT_CONTROL))
            .map_err(|e| StorageError::new_io_error("set timeout", &e, "CONTROL"))?;
        let writer = stream
            .try_clone()
            .map_err(|e| StorageError::new_io_error("clone stream", &e, "CONTROL"))?;

        {
            let mut canal = self
                .canal_nm
                .lock()
                .map_err(|_| StorageError::new_lock_error("canal nm", "CONTROL"))?;
            *canal = Some(writer);
        }

        let mut reader = BufReader::new(stream);
        self.registrar(puerto_cliente, &mut reader)?;
        self.atender_sesion_control(&mut reader)
    }

    /// Envia `REGISTER|ip|nm_port|client_port|archivos` y espera el
    /// `SUCCESS|SS_ID=<n>` del name node
    fn registrar(
        &self,
        puerto_cliente: u16,
        reader: &mut BufReader<TcpStream>,
    ) -> Result<(), StorageError> {
        let archivos = self.archivos_locales().join(",");
        let frame = format!(
            "{CMD_REGISTER}|{}|{}|{}|{}",
            self.config.get_ip_publica(),
            self.config.get_nm_addr().port(),
            puerto_cliente,
            archivos,
        );
        self.enviar_por_canal(&frame)?;

        let respuesta = loop {
            match leer_frame(reader) {
                Ok(Some(frame)) => break frame,
                Ok(None) => {
                    return Err(StorageError::new_registro_error(
                        "conexion cerrada",
                        "CONTROL",
                    ));
                }
                Err(e) if es_timeout(&e) => continue,
                Err(e) => return Err(StorageError::new_io_error("recv", &e, "CONTROL")),
            }
        };

        let id = match Respuesta::parsear(&respuesta) {
            Some(Respuesta::Success(texto)) => parsear_ss_id(&texto)?,
            _ => {
                return Err(StorageError::new_registro_error(&respuesta, "CONTROL"));
            }
        };

        {
            let mut guardado = self
                .ss_id
                .lock()
                .map_err(|_| StorageError::new_lock_error("ss_id", "CONTROL"))?;
            *guardado = Some(id);
        }
        log_registro_exitoso(&self.logger, id);
        Ok(())
    }

    /// Loop de la sesion de control: responde HEARTBEAT con
    /// HEARTBEAT_ACK. El timeout de recepcion solo marca una vuelta mas
    /// del loop.
    fn atender_sesion_control(
        &self,
        reader: &mut BufReader<TcpStream>,
    ) -> Result<(), StorageError> {
        loop {
            if !self.esta_activo() {
                return Ok(());
            }
            match leer_frame(reader) {
                Ok(Some(frame)) if frame == CMD_HEARTBEAT => {
                    self.enviar_por_canal(CMD_HEARTBEAT_ACK)?;
                }
                Ok(Some(frame)) if frame.is_empty() => continue,
                Ok(Some(frame)) => {
                    let msg = format!("Unknown frame from name node: {frame}");
                    self.logger.warn(&msg, SIN_ORIGEN, SIN_USUARIO);
                }
                Ok(None) => {
                    return Err(StorageError::new_io_error(
                        "recv",
                        &std::io::Error::new(ErrorKind::ConnectionAborted, "peer closed"),
                        "CONTROL",
                    ));
                }
                Err(e) if es_timeout(&e) => continue,
                Err(e) => return Err(StorageError::new_io_error("recv", &e, "CONTROL")),
            }
        }
    }

    /// Empuja un evento `FILE_CREATED|…`, `FILE_UPDATED|…` o
    /// `FILE_DELETED|…` por el canal de control. Si el canal esta caido
    /// el evento se pierde y el name node se reconcilia en el proximo
    /// registro.
    pub(crate) fn notificar_evento(&self, evento: &str, nombre: &str) {
        if let Err(e) = self.enviar_por_canal(&format!("{evento}{SEPARADOR}{nombre}")) {
            log_canal_caido(&self.logger, &e.description);
            return;
        }
        log_evento_enviado(&self.logger, evento, nombre);
    }

    /// Escribe un frame por el extremo compartido del canal de control
    fn enviar_por_canal(&self, frame: &str) -> Result<(), StorageError> {
        let mut canal = self
            .canal_nm
            .lock()
            .map_err(|_| StorageError::new_lock_error("canal nm", "CONTROL"))?;
        match canal.as_mut() {
            Some(stream) => escribir_frame(stream, frame)
                .map_err(|e| StorageError::new_io_error("send", &e, "CONTROL")),
            None => Err(StorageError::new_registro_error(
                "canal no conectado",
                "CONTROL",
            )),
        }
    }
}

/// Determina si un error de recepcion es un timeout del socket
fn es_timeout(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

/// Extrae el identificador de un texto `SS_ID=<n>`
fn parsear_ss_id(texto: &str) -> Result<u64, StorageError> {
    let (clave, valor) = texto
        .split_once('=')
        .ok_or_else(|| StorageError::new_registro_error(texto, "CONTROL"))?;
    if clave != "SS_ID" {
        return Err(StorageError::new_registro_error(texto, "CONTROL"));
    }
    valor
        .parse::<u64>()
        .map_err(|_| StorageError::new_registro_error(texto, "CONTROL"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsea_ss_id_valido() {
        assert_eq!(parsear_ss_id("SS_ID=7").unwrap(), 7);
    }

    #[test]
    fn ss_id_malformado_es_error() {
        assert!(parsear_ss_id("SSID=7").is_err());
        assert!(parsear_ss_id("SS_ID=abc").is_err());
        assert!(parsear_ss_id("7").is_err());
    }
}
