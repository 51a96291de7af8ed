//! Este modulo contiene la implementacion del envio de mensajes frecuentes
//! del name node al logger
use logger::logger::{Logger, SIN_ORIGEN, SIN_USUARIO};
use std::io::Error as IoError;
use std::net::SocketAddr;
use std::time::Duration;

/// Registra el arranque del name node con sus dos puertos
///
/// # Parámetros
/// * `logger`: estructura logger donde se envia el mensaje
/// * `ss_addr`: direccion del socket de nodos de storage
/// * `cli_addr`: direccion del socket de clientes
pub fn log_nodo_iniciado(logger: &Logger, ss_addr: &SocketAddr, cli_addr: &SocketAddr) {
    let msg = format!("Name node listening: storage on {ss_addr}, clients on {cli_addr}");
    logger.info(&msg, SIN_ORIGEN, SIN_USUARIO);
}

/// Registra la cantidad de entradas de ACL restauradas del cache
pub fn log_acl_restauradas(logger: &Logger, restauradas: usize) {
    let msg = format!("Restored {restauradas} ACL entries from cache");
    logger.info(&msg, SIN_ORIGEN, SIN_USUARIO);
}

/// Registra un error al aceptar una conexion entrante
pub fn log_error_aceptando(logger: &Logger, err: &IoError) {
    let msg = format!("Error accepting connection: {err}");
    logger.error(&msg, SIN_ORIGEN, SIN_USUARIO);
}

/// Registra un error al obtener la peer address de un stream
pub fn log_peer_addr_error(logger: &Logger, err: &IoError) {
    let msg = format!("Failed to get peer address: {err}");
    logger.error(&msg, SIN_ORIGEN, SIN_USUARIO);
}

/// Registra el alta de una sesion de cliente
pub fn log_sesion_iniciada(logger: &Logger, origen: &str, usuario: &str) {
    logger.info("Client session started", origen, usuario);
}

/// Registra la baja de una sesion de cliente con su duracion
pub fn log_sesion_terminada(logger: &Logger, origen: &str, usuario: &str, duracion: Duration) {
    let msg = format!("Client session ended after {} seconds", duracion.as_secs());
    logger.info(&msg, origen, usuario);
}

/// Registra un comando recibido de un cliente
pub fn log_comando(logger: &Logger, origen: &str, usuario: &str, frame: &str) {
    let msg = format!("Command received: {frame}");
    logger.debug(&msg, origen, usuario);
}

/// Registra el registro de un nodo de storage
///
/// # Parámetros
/// * `id`: identificador asignado
/// * `archivos`: cantidad de archivos que reporto el nodo
pub fn log_storage_registrado(logger: &Logger, origen: &str, id: u64, archivos: usize) {
    let msg = format!("Storage node registered as SS#{id} reporting {archivos} files");
    logger.info(&msg, origen, SIN_USUARIO);
}

/// Registra la caida de un nodo de storage y los archivos perdidos
pub fn log_storage_caido(logger: &Logger, id: u64, perdidos: &[String]) {
    let msg = format!(
        "SS#{id} declared failed, {} routing entries dropped",
        perdidos.len()
    );
    logger.warn(&msg, SIN_ORIGEN, SIN_USUARIO);
    for archivo in perdidos {
        let msg = format!("File '{archivo}' lost its primary");
        logger.warn(&msg, SIN_ORIGEN, SIN_USUARIO);
    }
}

/// Registra un evento de archivo recibido por el canal de control
pub fn log_evento_archivo(logger: &Logger, origen: &str, evento: &str, archivo: &str) {
    let msg = format!("Control event {evento} for '{archivo}'");
    logger.debug(&msg, origen, SIN_USUARIO);
}

/// Registra un reenvio hacia un nodo de storage
pub fn log_reenvio(logger: &Logger, usuario: &str, verbo: &str, id: u64) {
    let msg = format!("Forwarding {verbo} to SS#{id}");
    logger.debug(&msg, SIN_ORIGEN, usuario);
}

/// Registra una redireccion entregada a un cliente
pub fn log_redireccion(logger: &Logger, usuario: &str, archivo: &str, id: u64) {
    let msg = format!("Redirecting '{archivo}' to SS#{id}");
    logger.info(&msg, SIN_ORIGEN, usuario);
}
