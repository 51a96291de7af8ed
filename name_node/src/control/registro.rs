//! Este módulo contiene el canal de control del lado del name node:
//! acepta conexiones de nodos de storage, procesa el intercambio
//! REGISTER y atiende los acks de heartbeat y eventos de archivo

use crate::log_msj::log_mensajes::{
    log_error_aceptando, log_evento_archivo, log_storage_caido, log_storage_registrado,
};
use crate::node::NameNode;
use crate::sesiones::storage::SesionStorage;
use dfs_client::protocol::frame::{campos, escribir_frame, leer_frame};
use dfs_client::protocol::verbos::{
    CMD_HEARTBEAT_ACK, CMD_REGISTER, EVT_FILE_CREATED, EVT_FILE_DELETED, EVT_FILE_UPDATED,
};
use std::io::{BufReader, ErrorKind};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::spawn;
use std::time::{Duration, Instant};

/// Timeout de recepcion del socket de control de cada nodo; marca el
/// ritmo con el que el lector revisa si el nodo sigue registrado
const TIMEOUT_CONTROL: Duration = Duration::from_secs(5);

impl NameNode {
    /// Ciclo que acepta conexiones de control de nodos de storage y
    /// delega cada una a su propio hilo
    pub(crate) fn aceptar_storage(self: Arc<Self>, listener: TcpListener) {
        spawn(move || {
            for stream in listener.incoming() {
                if !self.esta_activo() {
                    break;
                }
                match stream {
                    Ok(stream) => {
                        let nodo = self.clone();
                        spawn(move || nodo.manejar_conexion_storage(stream));
                    }
                    Err(e) => log_error_aceptando(&self.logger, &e),
                }
            }
        });
    }

    /// Atiende la conexion de control de un nodo de storage: REGISTER,
    /// asignacion de identificador, alta de sus archivos en el ruteo y
    /// luego el loop de lectura de acks y eventos. La perdida de la
    /// conexion dispara el manejador de fallas.
    fn manejar_conexion_storage(self: Arc<Self>, stream: TcpStream) {
        let origen = match self.origen_de(&stream) {
            Some(origen) => origen,
            None => return,
        };
        if stream.set_read_timeout(Some(TIMEOUT_CONTROL)).is_err() {
            return;
        }
        let mut writer = match stream.try_clone() {
            Ok(writer) => writer,
            Err(_) => return,
        };
        let stream_sesion = match stream.try_clone() {
            Ok(stream_sesion) => stream_sesion,
            Err(_) => return,
        };
        let mut reader = BufReader::new(stream);

        // Primer frame: REGISTER|ip|nm_port|client_port|archivos
        let frame = match self.leer_con_timeout(&mut reader) {
            Some(frame) => frame,
            None => return,
        };
        let partes = campos(&frame);
        if partes[0] != CMD_REGISTER || partes.len() < 4 {
            let _ = escribir_frame(&mut writer, "ERROR|Invalid REGISTER");
            return;
        }
        let ip = partes[1].to_string();
        if partes[2].parse::<u16>().is_err() {
            let _ = escribir_frame(&mut writer, "ERROR|Invalid REGISTER");
            return;
        }
        let puerto_cliente = match partes[3].parse::<u16>() {
            Ok(puerto) => puerto,
            Err(_) => {
                let _ = escribir_frame(&mut writer, "ERROR|Invalid REGISTER");
                return;
            }
        };
        let archivos: Vec<String> = partes
            .get(4)
            .map(|lista| {
                lista
                    .split(',')
                    .filter(|nombre| !nombre.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let id = self.proximo_ss_id.fetch_add(1, Ordering::SeqCst);
        let sesion = SesionStorage {
            id,
            ip: ip.clone(),
            puerto_cliente,
            stream: stream_sesion,
            ultimo_heartbeat: Instant::now(),
        };
        if let Err(e) = self.sesiones_storage.agregar(sesion) {
            let _ = escribir_frame(&mut writer, &format!("ERROR|{}", e.description));
            return;
        }

        // Alta de los archivos que el nodo reporta tener
        for archivo in &archivos {
            self.ruteo.agregar(archivo, id);
        }

        if escribir_frame(&mut writer, &format!("SUCCESS|SS_ID={id}")).is_err() {
            self.manejar_falla(id);
            return;
        }
        log_storage_registrado(&self.logger, &origen, id, archivos.len());

        self.atender_sesion_storage(&mut reader, id, &origen);

        self.manejar_falla(id);
    }

    /// Loop de lectura del canal de control de un nodo registrado
    fn atender_sesion_storage(
        &self,
        reader: &mut BufReader<TcpStream>,
        id: u64,
        origen: &str,
    ) {
        loop {
            if !self.esta_activo() {
                return;
            }
            let frame = match leer_frame(reader) {
                Ok(Some(frame)) => frame,
                Ok(None) => return,
                Err(e) if es_timeout(&e) => {
                    // el monitor pudo haber dado de baja al nodo
                    if self.sesiones_storage.direccion_cliente(id).is_none() {
                        return;
                    }
                    continue;
                }
                Err(_) => return,
            };
            if frame.is_empty() {
                continue;
            }

            // cualquier trafico entrante cuenta como señal de vida
            self.sesiones_storage.actualizar_heartbeat(id);

            let partes = campos(&frame);
            match partes[0] {
                CMD_HEARTBEAT_ACK => {}
                EVT_FILE_CREATED if partes.len() >= 2 => {
                    self.ruteo.agregar(partes[1], id);
                    log_evento_archivo(&self.logger, origen, EVT_FILE_CREATED, partes[1]);
                }
                EVT_FILE_DELETED if partes.len() >= 2 => {
                    self.ruteo.eliminar(partes[1]);
                    log_evento_archivo(&self.logger, origen, EVT_FILE_DELETED, partes[1]);
                }
                EVT_FILE_UPDATED if partes.len() >= 2 => {
                    log_evento_archivo(&self.logger, origen, EVT_FILE_UPDATED, partes[1]);
                }
                otro => {
                    let msg = format!("Unknown control frame: {otro}");
                    self.logger.warn(&msg, origen, "-");
                }
            }
        }
    }

    /// Da de baja un nodo de storage caido y purga toda entrada de
    /// ruteo que lo referencie. La recuperacion es pasiva: el nodo
    /// puede reconectarse y volver a registrarse.
    pub(crate) fn manejar_falla(&self, id: u64) {
        if self.sesiones_storage.eliminar(id).is_some() {
            let perdidos = self.ruteo.eliminar_de_nodo(id);
            log_storage_caido(&self.logger, id, &perdidos);
        }
    }

    /// Lee el primer frame tolerando timeouts de recepcion
    fn leer_con_timeout(&self, reader: &mut BufReader<TcpStream>) -> Option<String> {
        loop {
            match leer_frame(reader) {
                Ok(Some(frame)) if frame.is_empty() => continue,
                Ok(Some(frame)) => return Some(frame),
                Ok(None) => return None,
                Err(e) if es_timeout(&e) => continue,
                Err(_) => return None,
            }
        }
    }
}

/// Determina si un error de recepcion es un timeout del socket
fn es_timeout(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}
