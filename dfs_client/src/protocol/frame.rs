//! Framing of the wire protocol: UTF-8 frames terminated by a newline,
//! with fields separated by `|`.

use std::io::{BufRead, Write};
use std::net::TcpStream;
use std::time::Duration;

/// Field separator inside a frame.
pub const SEPARADOR: char = '|';

/// Send and receive timeout applied to every client facing socket.
pub const TIMEOUT_SOCKET: Duration = Duration::from_secs(30);

/// Writes a single frame, appending the terminating newline, and flushes.
///
/// # Arguments
/// * `stream`: destination of the frame
/// * `frame`: frame content, without the trailing newline
pub fn escribir_frame<W: Write>(stream: &mut W, frame: &str) -> std::io::Result<()> {
    stream.write_all(frame.as_bytes())?;
    stream.write_all(b"\n")?;
    stream.flush()
}

/// Reads one frame from the stream.
///
/// # Returns
/// * `Ok(Some(frame))` with the trailing `\r\n` stripped
/// * `Ok(None)` when the peer closed the connection
/// * `Err(e)` on I/O failure (a recv timeout surfaces here too)
pub fn leer_frame<R: BufRead>(reader: &mut R) -> std::io::Result<Option<String>> {
    let mut linea = String::new();
    let leidos = reader.read_line(&mut linea)?;
    if leidos == 0 {
        return Ok(None);
    }
    while linea.ends_with('\n') || linea.ends_with('\r') {
        linea.pop();
    }
    Ok(Some(linea))
}

/// Splits a frame into its `|` separated fields.
pub fn campos(frame: &str) -> Vec<&str> {
    frame.split(SEPARADOR).collect()
}

/// Applies the standard send/recv timeouts to a socket.
pub fn configurar_timeouts(stream: &TcpStream) -> std::io::Result<()> {
    stream.set_read_timeout(Some(TIMEOUT_SOCKET))?;
    stream.set_write_timeout(Some(TIMEOUT_SOCKET))
}
