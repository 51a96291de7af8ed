//! Este módulo contiene el loop de sesion de clientes del name node:
//! handshake INIT, despacho de comandos, chequeos de ACL y redirecciones
//! hacia los nodos de storage primarios

use crate::acceso::acl::NivelAcceso;
use crate::comandos::reenvio;
use crate::log_msj::log_mensajes::{
    log_comando, log_redireccion, log_reenvio, log_sesion_iniciada, log_sesion_terminada,
};
use crate::node::NameNode;
use common::validacion::{validar_nombre_archivo, validar_nombre_usuario};
use dfs_client::protocol::frame::{campos, escribir_frame, leer_frame};
use dfs_client::protocol::respuesta::Respuesta;
use dfs_client::protocol::verbos::{
    CMD_ADDACCESS, CMD_CREATE, CMD_DELETE, CMD_EXEC, CMD_EXIT, CMD_INFO, CMD_INIT,
    CMD_LIST, CMD_QUIT, CMD_READ, CMD_REMACCESS, CMD_STREAM, CMD_UNDO, CMD_VIEW, CMD_WRITE,
    RESP_STOP,
};
use std::io::{BufReader, ErrorKind};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

/// Timeout de escritura hacia los clientes; la recepcion de la sesion
/// no expira para no cortar clientes interactivos ociosos
const TIMEOUT_ENVIO: Duration = Duration::from_secs(30);

impl NameNode {
    /// Atiende la sesion persistente de un cliente: valida el frame
    /// `INIT|usuario`, registra la sesion y entra al loop de comandos
    /// hasta QUIT/EXIT o desconexion.
    pub(crate) fn atender_cliente(self: Arc<Self>, stream: TcpStream) {
        let origen = match self.origen_de(&stream) {
            Some(origen) => origen,
            None => return,
        };
        if stream.set_write_timeout(Some(TIMEOUT_ENVIO)).is_err() {
            return;
        }
        let mut writer = match stream.try_clone() {
            Ok(writer) => writer,
            Err(_) => return,
        };
        let mut reader = BufReader::new(stream);

        let usuario = match self.registrar_sesion(&mut reader, &mut writer, &origen) {
            Some(usuario) => usuario,
            None => return,
        };
        log_sesion_iniciada(&self.logger, &origen, &usuario);

        loop {
            let frame = match leer_frame(&mut reader) {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) if es_timeout(&e) => continue,
                Err(_) => break,
            };
            if frame.is_empty() {
                continue;
            }
            log_comando(&self.logger, &origen, &usuario, &frame);

            let partes = campos(&frame);
            let resultado = match partes[0] {
                CMD_CREATE => self.manejar_create(&partes, &usuario, &mut writer),
                CMD_VIEW => self.manejar_view(&partes, &usuario, &mut writer),
                CMD_READ => self.redirigir(&partes, &usuario, Some(NivelAcceso::Lectura), &mut writer),
                CMD_WRITE => {
                    self.redirigir(&partes, &usuario, Some(NivelAcceso::Escritura), &mut writer)
                }
                CMD_STREAM => {
                    self.redirigir(&partes, &usuario, Some(NivelAcceso::Lectura), &mut writer)
                }
                CMD_UNDO => {
                    self.redirigir(&partes, &usuario, Some(NivelAcceso::Escritura), &mut writer)
                }
                CMD_DELETE => self.manejar_delete(&partes, &usuario, &mut writer),
                CMD_INFO => self.manejar_info(&partes, &mut writer),
                CMD_LIST => self.manejar_list(&mut writer),
                CMD_ADDACCESS => self.manejar_addaccess(&partes, &usuario, &mut writer),
                CMD_REMACCESS => self.manejar_remaccess(&partes, &usuario, &mut writer),
                CMD_EXEC => self.manejar_exec(&partes, &usuario, &mut writer),
                CMD_QUIT | CMD_EXIT => {
                    let _ = escribir_frame(&mut writer, "SUCCESS|Goodbye!");
                    break;
                }
                otro => {
                    escribir_frame(&mut writer, &format!("ERROR|Unknown command: {otro}"))
                }
            };

            if resultado.is_err() {
                break;
            }
        }

        if let Some(sesion) = self.sesiones_clientes.eliminar(&usuario) {
            log_sesion_terminada(
                &self.logger,
                &sesion.origen,
                &sesion.usuario,
                sesion.conectado.elapsed(),
            );
        }
    }

    /// Handshake de sesion: el primer frame debe ser `INIT|usuario` con
    /// un nombre valido y no conectado
    ///
    /// # Retorna
    /// - El usuario registrado, None si la sesion fue rechazada
    fn registrar_sesion(
        &self,
        reader: &mut BufReader<TcpStream>,
        writer: &mut TcpStream,
        origen: &str,
    ) -> Option<String> {
        let frame = match leer_frame(reader) {
            Ok(Some(frame)) => frame,
            _ => return None,
        };
        let partes = campos(&frame);
        if partes[0] != CMD_INIT || partes.len() < 2 {
            let _ = escribir_frame(writer, "ERROR|Expected INIT");
            return None;
        }
        let usuario = partes[1];
        if validar_nombre_usuario(usuario).is_err() {
            let _ = escribir_frame(writer, "ERROR|Invalid username");
            return None;
        }
        if let Err(e) = self.sesiones_clientes.agregar(usuario, origen) {
            let _ = escribir_frame(writer, &format!("ERROR|{}", e.description));
            return None;
        }
        let bienvenida = format!("SUCCESS|Welcome {usuario}! Connected to the name node.");
        if escribir_frame(writer, &bienvenida).is_err() {
            self.sesiones_clientes.eliminar(usuario);
            return None;
        }
        Some(usuario.to_string())
    }

    /// `CREATE|filename`: elige primario por round robin, reenvia la
    /// creacion, y en caso de éxito registra ruteo y ACL
    fn manejar_create(
        &self,
        partes: &[&str],
        usuario: &str,
        writer: &mut TcpStream,
    ) -> std::io::Result<()> {
        if partes.len() < 2 {
            return escribir_frame(writer, "ERROR|Missing filename");
        }
        let nombre = partes[1];
        if validar_nombre_archivo(nombre).is_err() {
            return escribir_frame(writer, "ERROR|Invalid filename");
        }
        if self.ruteo.contiene(nombre) {
            return escribir_frame(writer, "ERROR|File already exists");
        }

        let vivos = self.sesiones_storage.ids_activos();
        let elegido = match self.selector.elegir(&vivos) {
            Some(elegido) => elegido,
            None => return escribir_frame(writer, "ERROR|No storage server available"),
        };
        let (ip, puerto) = match self.sesiones_storage.direccion_cliente(elegido) {
            Some(direccion) => direccion,
            None => return escribir_frame(writer, "ERROR|SS not available"),
        };

        log_reenvio(&self.logger, usuario, CMD_CREATE, elegido);
        match reenvio::comando_simple(&ip, puerto, &format!("{CMD_CREATE}|{nombre}|{usuario}")) {
            Ok(Respuesta::Success(_)) => {
                self.ruteo.agregar(nombre, elegido);
                if let Err(e) = self.acl.agregar_archivo(nombre, usuario) {
                    self.logger.warn(&e.description, &ip, usuario);
                }
                self.persistir_acl();
                escribir_frame(writer, "SUCCESS|File created successfully!")
            }
            Ok(Respuesta::Error(texto)) => escribir_frame(writer, &format!("ERROR|{texto}")),
            Ok(_) => escribir_frame(writer, "ERROR|No response from SS"),
            Err(_) => escribir_frame(writer, "ERROR|Failed to connect to SS"),
        }
    }

    /// `VIEW[|flags]`: lista los archivos ruteados; sin el flag `-a`
    /// solo los que el usuario puede leer
    fn manejar_view(
        &self,
        partes: &[&str],
        usuario: &str,
        writer: &mut TcpStream,
    ) -> std::io::Result<()> {
        let todos = partes.get(1).map(|f| f.contains('a')).unwrap_or(false);

        escribir_frame(writer, "SUCCESS|")?;
        for archivo in self.ruteo.listar() {
            if !todos && !self.acl.verificar(&archivo, usuario, NivelAcceso::Lectura) {
                continue;
            }
            escribir_frame(writer, &format!("--> {archivo}"))?;
        }
        escribir_frame(writer, RESP_STOP)
    }

    /// Chequea ACL, resuelve el primario y entrega `REDIRECT|ip|puerto`.
    /// Cubre READ, WRITE, STREAM y UNDO.
    fn redirigir(
        &self,
        partes: &[&str],
        usuario: &str,
        requerido: Option<NivelAcceso>,
        writer: &mut TcpStream,
    ) -> std::io::Result<()> {
        if partes.len() < 2 {
            return escribir_frame(writer, "ERROR|Missing filename");
        }
        let nombre = partes[1];

        let primario = match self.ruteo.primario_de(nombre) {
            Some(primario) => primario,
            None => return escribir_frame(writer, "ERROR|File not found"),
        };
        if let Some(nivel) = requerido {
            if !self.acl.verificar(nombre, usuario, nivel) {
                return escribir_frame(writer, "ERROR|Access denied");
            }
        }
        let (ip, puerto) = match self.sesiones_storage.direccion_cliente(primario) {
            Some(direccion) => direccion,
            None => return escribir_frame(writer, "ERROR|SS not available"),
        };

        log_redireccion(&self.logger, usuario, nombre, primario);
        escribir_frame(writer, &format!("REDIRECT|{ip}|{puerto}"))
    }

    /// `DELETE|filename`: solo el propietario; reenvia al primario y en
    /// caso de éxito quita el ruteo y la ACL
    fn manejar_delete(
        &self,
        partes: &[&str],
        usuario: &str,
        writer: &mut TcpStream,
    ) -> std::io::Result<()> {
        if partes.len() < 2 {
            return escribir_frame(writer, "ERROR|Missing filename");
        }
        let nombre = partes[1];

        if !self.acl.es_propietario(nombre, usuario) {
            return escribir_frame(writer, "ERROR|Only owner can delete");
        }
        let primario = match self.ruteo.primario_de(nombre) {
            Some(primario) => primario,
            None => return escribir_frame(writer, "ERROR|File not found"),
        };
        let (ip, puerto) = match self.sesiones_storage.direccion_cliente(primario) {
            Some(direccion) => direccion,
            None => return escribir_frame(writer, "ERROR|SS not available"),
        };

        log_reenvio(&self.logger, usuario, CMD_DELETE, primario);
        match reenvio::comando_simple(&ip, puerto, &format!("{CMD_DELETE}|{nombre}")) {
            Ok(Respuesta::Success(_)) => {
                self.ruteo.eliminar(nombre);
                self.acl.eliminar_archivo(nombre);
                self.persistir_acl();
                escribir_frame(writer, "SUCCESS|File deleted successfully!")
            }
            Ok(Respuesta::Error(texto)) => escribir_frame(writer, &format!("ERROR|{texto}")),
            Ok(_) => escribir_frame(writer, "ERROR|No response from SS"),
            Err(_) => escribir_frame(writer, "ERROR|Failed to connect to SS"),
        }
    }

    /// `INFO|filename`: trae el bloque del primario y le agrega la
    /// seccion ACCESS derivada de la ACL
    fn manejar_info(&self, partes: &[&str], writer: &mut TcpStream) -> std::io::Result<()> {
        if partes.len() < 2 {
            return escribir_frame(writer, "ERROR|Missing filename");
        }
        let nombre = partes[1];

        let primario = match self.ruteo.primario_de(nombre) {
            Some(primario) => primario,
            None => return escribir_frame(writer, "ERROR|File not found"),
        };
        let (ip, puerto) = match self.sesiones_storage.direccion_cliente(primario) {
            Some(direccion) => direccion,
            None => return escribir_frame(writer, "ERROR|SS not available"),
        };

        let lineas = match reenvio::comando_multilinea(&ip, puerto, &format!("{CMD_INFO}|{nombre}"))
        {
            Ok(lineas) => lineas,
            Err(_) => return escribir_frame(writer, "ERROR|Failed to get info"),
        };

        escribir_frame(writer, "SUCCESS|File information:")?;
        for linea in &lineas {
            escribir_frame(writer, linea)?;
        }
        match self.acl.resumen_accesos(nombre) {
            Some((propietario, lectores, escritores)) => {
                escribir_frame(writer, "ACCESS|")?;
                escribir_frame(writer, &format!("  Owner(RW): {propietario}"))?;
                escribir_frame(writer, &format!("  Readers(R): {}", o_ninguno(&lectores)))?;
                escribir_frame(writer, &format!("  Writers(W): {}", o_ninguno(&escritores)))?;
            }
            None => {
                escribir_frame(writer, "ACCESS|No ACL entry for this file")?;
            }
        }
        escribir_frame(writer, RESP_STOP)
    }

    /// `LIST`: usuarios con sesion activa
    fn manejar_list(&self, writer: &mut TcpStream) -> std::io::Result<()> {
        escribir_frame(writer, "SUCCESS|Users:")?;
        let usuarios = self.sesiones_clientes.listar();
        if usuarios.is_empty() {
            escribir_frame(writer, "(No users connected)")?;
        }
        for usuario in usuarios {
            escribir_frame(writer, &format!("--> {usuario}"))?;
        }
        escribir_frame(writer, RESP_STOP)
    }

    /// `ADDACCESS|-R/-W|filename|user`: otorga lectura o escritura;
    /// solo el propietario puede hacerlo
    fn manejar_addaccess(
        &self,
        partes: &[&str],
        usuario: &str,
        writer: &mut TcpStream,
    ) -> std::io::Result<()> {
        if partes.len() < 4 {
            return escribir_frame(writer, "ERROR|Missing parameters");
        }
        let permiso = partes[1];
        let nombre = partes[2];
        let beneficiario = partes[3];

        if !self.acl.es_propietario(nombre, usuario) {
            return escribir_frame(writer, "ERROR|Only owner can grant access");
        }
        let nivel = match permiso {
            "-R" => NivelAcceso::Lectura,
            "-W" => NivelAcceso::Escritura,
            _ => {
                return escribir_frame(writer, "ERROR|Invalid access type (use -R or -W)");
            }
        };
        if validar_nombre_usuario(beneficiario).is_err() {
            return escribir_frame(writer, "ERROR|Invalid username");
        }

        match self.acl.otorgar(nombre, beneficiario, nivel) {
            Ok(()) => {
                self.persistir_acl();
                escribir_frame(writer, "SUCCESS|Access granted successfully!")
            }
            Err(e) => escribir_frame(writer, &format!("ERROR|{}", e.description)),
        }
    }

    /// `REMACCESS|filename|user`: revoca un permiso no propietario;
    /// solo el propietario puede hacerlo
    fn manejar_remaccess(
        &self,
        partes: &[&str],
        usuario: &str,
        writer: &mut TcpStream,
    ) -> std::io::Result<()> {
        if partes.len() < 3 {
            return escribir_frame(writer, "ERROR|Missing parameters");
        }
        let nombre = partes[1];
        let revocado = partes[2];

        if !self.acl.es_propietario(nombre, usuario) {
            return escribir_frame(writer, "ERROR|Only owner can revoke access");
        }

        match self.acl.revocar(nombre, revocado) {
            Ok(()) => {
                self.persistir_acl();
                escribir_frame(writer, "SUCCESS|Access removed successfully!")
            }
            Err(e) => escribir_frame(writer, &format!("ERROR|{}", e.description)),
        }
    }

    /// `EXEC|filename`: la ejecucion de contenido como comando de shell
    /// esta deshabilitada; se valida el acceso y se rechaza. El verbo
    /// CLEANREAD sigue disponible en los nodos de storage.
    fn manejar_exec(
        &self,
        partes: &[&str],
        usuario: &str,
        writer: &mut TcpStream,
    ) -> std::io::Result<()> {
        if partes.len() < 2 {
            return escribir_frame(writer, "ERROR|Missing filename");
        }
        let nombre = partes[1];
        if !self.acl.verificar(nombre, usuario, NivelAcceso::Lectura) {
            return escribir_frame(writer, "ERROR|Access denied");
        }
        escribir_frame(writer, "ERROR|EXEC is disabled")
    }
}

/// Lista separada por comas, o `(none)` si esta vacia
fn o_ninguno(usuarios: &[String]) -> String {
    if usuarios.is_empty() {
        "(none)".to_string()
    } else {
        usuarios.join(",")
    }
}

/// Determina si un error de recepcion es un timeout del socket
fn es_timeout(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}
