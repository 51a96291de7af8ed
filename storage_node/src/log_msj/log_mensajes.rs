//! Este modulo contiene la implementacion del envio de mensajes frecuentes
//! del nodo de storage al logger
use logger::logger::{Logger, SIN_ORIGEN, SIN_USUARIO};
use std::io::Error as IoError;
use std::net::SocketAddr;

/// Registra el arranque del nodo de storage
///
/// # Parámetros
/// * `logger`: estructura logger donde se envia el mensaje
/// * `addr`: direccion donde quedo escuchando el nodo
pub fn log_nodo_iniciado(logger: &Logger, addr: &SocketAddr) {
    let msg = format!("Storage node listening on {addr}");
    logger.info(&msg, &addr.to_string(), SIN_USUARIO);
}

/// Registra un error al aceptar una conexion entrante
///
/// # Parámetros
/// * `logger`: estructura logger donde se envia el error
/// * `err`: error a enviar
pub fn log_error_aceptando(logger: &Logger, err: &IoError) {
    let msg = format!("Error accepting connection: {err}");
    logger.error(&msg, SIN_ORIGEN, SIN_USUARIO);
}

/// Registra un error al obtener la peer address de un stream
///
/// # Parámetros
/// * `logger`: estructura logger donde se envia el error
/// * `err`: error a enviar
pub fn log_peer_addr_error(logger: &Logger, err: &IoError) {
    let msg = format!("Failed to get peer address: {err}");
    logger.error(&msg, SIN_ORIGEN, SIN_USUARIO);
}

/// Registra una conexion de cliente aceptada
pub fn log_conexion_aceptada(logger: &Logger, origen: &str) {
    logger.info("Accepted client connection", origen, SIN_USUARIO);
}

/// Registra la desconexion de un cliente
pub fn log_desconexion(logger: &Logger, origen: &str) {
    logger.info("Client disconnected", origen, SIN_USUARIO);
}

/// Registra un comando recibido por el loop de comandos
pub fn log_comando(logger: &Logger, origen: &str, frame: &str) {
    let msg = format!("Command received: {frame}");
    logger.debug(&msg, origen, SIN_USUARIO);
}

/// Registra el registro exitoso contra el name node
pub fn log_registro_exitoso(logger: &Logger, id: u64) {
    let msg = format!("Registered with name node, SS_ID={id}");
    logger.info(&msg, SIN_ORIGEN, SIN_USUARIO);
}

/// Registra la caida del canal de control hacia el name node
pub fn log_canal_caido(logger: &Logger, detalle: &str) {
    let msg = format!("Control channel to name node lost: {detalle}");
    logger.warn(&msg, SIN_ORIGEN, SIN_USUARIO);
}

/// Registra un evento de archivo enviado por el canal de control
pub fn log_evento_enviado(logger: &Logger, evento: &str, nombre: &str) {
    let msg = format!("Pushed {evento} for '{nombre}'");
    logger.debug(&msg, SIN_ORIGEN, SIN_USUARIO);
}

/// Registra un error de entrada/salida en un contexto dado
pub fn log_error_io(logger: &Logger, contexto: &str, err: &IoError, origen: &str) {
    let msg = format!("I/O error in {contexto}: {err}");
    logger.error(&msg, origen, SIN_USUARIO);
}
