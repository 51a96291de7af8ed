//! Este módulo contiene el reenvio de comandos del name node hacia un
//! nodo de storage por una conexion nueva, con los timeouts estandar

use crate::node_error::NameNodeError;
use dfs_client::protocol::frame::{configurar_timeouts, escribir_frame, leer_frame};
use dfs_client::protocol::respuesta::Respuesta;
use dfs_client::protocol::verbos::RESP_STOP;
use std::io::BufReader;
use std::net::TcpStream;

/// Abre una conexion efimera contra un nodo de storage
fn conectar(ip: &str, puerto: u16) -> Result<(BufReader<TcpStream>, TcpStream), NameNodeError> {
    let stream = TcpStream::connect((ip, puerto))
        .map_err(|e| NameNodeError::new_io_error("connect", &e, "FORWARD"))?;
    configurar_timeouts(&stream)
        .map_err(|e| NameNodeError::new_io_error("set timeouts", &e, "FORWARD"))?;
    let writer = stream
        .try_clone()
        .map_err(|e| NameNodeError::new_io_error("clone stream", &e, "FORWARD"))?;
    Ok((BufReader::new(stream), writer))
}

/// Reenvia un comando de respuesta unica (CREATE, DELETE, CLEANREAD)
///
/// # Parámetros
/// * `ip`, `puerto`: direccion cliente del nodo primario
/// * `frame`: comando a reenviar
///
/// # Retorna
/// - La respuesta parseada del nodo; NameNodeError solo ante fallas de
///   conexion o frames imparseables
pub(crate) fn comando_simple(
    ip: &str,
    puerto: u16,
    frame: &str,
) -> Result<Respuesta, NameNodeError> {
    let (mut reader, mut writer) = conectar(ip, puerto)?;
    escribir_frame(&mut writer, frame)
        .map_err(|e| NameNodeError::new_io_error("send", &e, "FORWARD"))?;

    match leer_frame(&mut reader) {
        Ok(Some(linea)) => Respuesta::parsear(&linea)
            .ok_or_else(|| NameNodeError::new_reenvio_error("Unexpected response from SS")),
        Ok(None) => Err(NameNodeError::new_reenvio_error("No response from SS")),
        Err(e) => Err(NameNodeError::new_io_error("recv", &e, "FORWARD")),
    }
}

/// Reenvia un comando de respuesta multilinea (INFO): espera el
/// encabezado `SUCCESS|...` y junta las lineas hasta el STOP
///
/// # Retorna
/// - Las lineas del cuerpo; el texto del error del nodo viaja como
///   NameNodeError de reenvio
pub(crate) fn comando_multilinea(
    ip: &str,
    puerto: u16,
    frame: &str,
) -> Result<Vec<String>, NameNodeError> {
    let (mut reader, mut writer) = conectar(ip, puerto)?;
    escribir_frame(&mut writer, frame)
        .map_err(|e| NameNodeError::new_io_error("send", &e, "FORWARD"))?;

    match leer_frame(&mut reader) {
        Ok(Some(linea)) => match Respuesta::parsear(&linea) {
            Some(Respuesta::Success(_)) => {}
            Some(Respuesta::Error(texto)) => {
                return Err(NameNodeError::new_reenvio_error(&texto));
            }
            _ => return Err(NameNodeError::new_reenvio_error("Unexpected response from SS")),
        },
        Ok(None) => return Err(NameNodeError::new_reenvio_error("No response from SS")),
        Err(e) => return Err(NameNodeError::new_io_error("recv", &e, "FORWARD")),
    }

    let mut lineas = Vec::new();
    loop {
        match leer_frame(&mut reader) {
            Ok(Some(linea)) if linea == RESP_STOP => return Ok(lineas),
            Ok(Some(linea)) => lineas.push(linea),
            Ok(None) => return Err(NameNodeError::new_reenvio_error("No response from SS")),
            Err(e) => return Err(NameNodeError::new_io_error("recv", &e, "FORWARD")),
        }
    }
}
