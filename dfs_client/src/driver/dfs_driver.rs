use std::{
    io::BufReader,
    net::TcpStream,
};

use super::DfsDriverResult;
use crate::driver::dfs_driver_error::{DfsDriverError, DfsDriverErrorKind};
use crate::protocol::{
    frame::{configurar_timeouts, escribir_frame, leer_frame},
    respuesta::Respuesta,
    verbos::*,
};
use common::from_raw_string;

/// This struct will be used as an interface between the user and the
/// name node. One long lived connection is kept per session; every
/// command that the name node answers with `REDIRECT|ip|port` is
/// completed through a fresh [`StorageNodeDriver`] connection.
#[derive(Debug)]
pub struct NameNodeDriver {
    /// Reading half of the session connection
    reader: BufReader<TcpStream>,
    /// Writing half of the session connection
    writer: TcpStream,
    /// User registered with `INIT`
    usuario: String,
    /// Welcome text returned by the name node
    bienvenida: String,
}

impl NameNodeDriver {
    /// Connects to the name node and registers the session.
    ///
    /// # Arguments
    /// * `hostname`: hostname of the name node
    /// * `port`: client facing port of the name node
    /// * `usuario`: user name to register with `INIT`
    ///
    /// # Returns
    /// * `DfsDriverResult<Self>`: Ok if the name node accepted the session,
    ///   Err if the connection failed or the user was rejected
    pub fn connect(hostname: &str, port: u16, usuario: &str) -> DfsDriverResult<Self> {
        let (mut reader, mut writer) = conectar(&format!("{hostname}:{port}"))?;

        escribir_frame(&mut writer, &format!("{CMD_INIT}|{usuario}"))?;
        let bienvenida = exigir_exito(recibir(&mut reader)?)?;

        Ok(NameNodeDriver {
            reader,
            writer,
            usuario: usuario.to_string(),
            bienvenida,
        })
    }

    /// Returns the user this session registered as.
    pub fn usuario(&self) -> &str {
        &self.usuario
    }

    /// Returns the welcome text the name node answered `INIT` with.
    pub fn bienvenida(&self) -> &str {
        &self.bienvenida
    }

    /// Sends one frame and reads one response frame.
    pub fn comando(&mut self, frame: &str) -> DfsDriverResult<Respuesta> {
        escribir_frame(&mut self.writer, frame)?;
        recibir(&mut self.reader)
    }

    /// Sends one frame and reads a `SUCCESS` header followed by raw body
    /// lines up to the terminating `STOP` frame.
    ///
    /// # Returns
    /// * `(header, lines)` on success, the server error otherwise
    pub fn comando_multilinea(&mut self, frame: &str) -> DfsDriverResult<(String, Vec<String>)> {
        escribir_frame(&mut self.writer, frame)?;
        let encabezado = exigir_exito(recibir(&mut self.reader)?)?;
        let cuerpo = leer_cuerpo_hasta_stop(&mut self.reader)?;
        Ok((encabezado, cuerpo))
    }

    /// Creates a new file owned by this session's user.
    pub fn crear(&mut self, nombre: &str) -> DfsDriverResult<String> {
        exigir_exito(self.comando(&format!("{CMD_CREATE}|{nombre}"))?)
    }

    /// Lists files, one `--> name` line each.
    ///
    /// # Arguments
    /// * `todos`: pass `-a` so files the user has no access to are listed too
    pub fn view(&mut self, todos: bool) -> DfsDriverResult<Vec<String>> {
        let frame = if todos {
            format!("{CMD_VIEW}|-a")
        } else {
            CMD_VIEW.to_string()
        };
        let (_encabezado, lineas) = self.comando_multilinea(&frame)?;
        Ok(lineas)
    }

    /// Lists the users with an active session on the name node.
    pub fn listar_usuarios(&mut self) -> DfsDriverResult<Vec<String>> {
        let (_encabezado, lineas) = self.comando_multilinea(CMD_LIST)?;
        Ok(lineas)
    }

    /// Fetches the information block of a file, ACCESS section included.
    pub fn info(&mut self, nombre: &str) -> DfsDriverResult<Vec<String>> {
        let (_encabezado, lineas) = self.comando_multilinea(&format!("{CMD_INFO}|{nombre}"))?;
        Ok(lineas)
    }

    /// Deletes a file. Only the owner may do this.
    pub fn eliminar(&mut self, nombre: &str) -> DfsDriverResult<String> {
        exigir_exito(self.comando(&format!("{CMD_DELETE}|{nombre}"))?)
    }

    /// Reads a file: asks the name node for the primary and completes the
    /// read against the storage node it redirected to.
    pub fn leer(&mut self, nombre: &str) -> DfsDriverResult<Vec<String>> {
        let mut storage = self.redirigir(&format!("{CMD_READ}|{nombre}"))?;
        storage.leer(nombre)
    }

    /// Opens a write session on the sentence `oracion` of `nombre`.
    ///
    /// The returned [`StorageNodeDriver`] is already inside the write
    /// subprotocol: feed it `enviar_palabra` frames and finish with
    /// `confirmar`.
    pub fn escribir(&mut self, nombre: &str, oracion: usize) -> DfsDriverResult<StorageNodeDriver> {
        let mut storage = self.redirigir(&format!("{CMD_WRITE}|{nombre}|{oracion}"))?;
        let usuario = self.usuario.clone();
        storage.escribir_abrir(nombre, oracion, &usuario)?;
        Ok(storage)
    }

    /// Restores the previous content of a file from its undo snapshot.
    pub fn deshacer(&mut self, nombre: &str) -> DfsDriverResult<String> {
        let mut storage = self.redirigir(&format!("{CMD_UNDO}|{nombre}"))?;
        storage.deshacer(nombre)
    }

    /// Streams the file word by word, invoking `f` once per word.
    pub fn stream<F: FnMut(&str)>(&mut self, nombre: &str, f: F) -> DfsDriverResult<()> {
        let mut storage = self.redirigir(&format!("{CMD_STREAM}|{nombre}"))?;
        let usuario = self.usuario.clone();
        storage.stream(nombre, &usuario, f)
    }

    /// Grants read (`-R`) or write (`-W`) access on a file to another user.
    pub fn otorgar_acceso(
        &mut self,
        permiso: &str,
        nombre: &str,
        usuario: &str,
    ) -> DfsDriverResult<String> {
        exigir_exito(self.comando(&format!("{CMD_ADDACCESS}|{permiso}|{nombre}|{usuario}"))?)
    }

    /// Revokes a previously granted access.
    pub fn revocar_acceso(&mut self, nombre: &str, usuario: &str) -> DfsDriverResult<String> {
        exigir_exito(self.comando(&format!("{CMD_REMACCESS}|{nombre}|{usuario}"))?)
    }

    /// Ends the session.
    pub fn salir(mut self) -> DfsDriverResult<String> {
        exigir_exito(self.comando(CMD_QUIT)?)
    }

    /// Sends a frame the name node answers with `REDIRECT|ip|port` and
    /// opens a connection against that storage node.
    fn redirigir(&mut self, frame: &str) -> DfsDriverResult<StorageNodeDriver> {
        match self.comando(frame)? {
            Respuesta::Redirect(ip, puerto) => StorageNodeDriver::connect(&ip, puerto),
            Respuesta::Error(e) => Err(DfsDriverError::server(e)),
            otra => Err(DfsDriverError::new(
                format!("Expected a redirect, got {otra:?}"),
                DfsDriverErrorKind::ProtocolError,
            )),
        }
    }
}

/// Connection against a single storage node, reached through a name node
/// redirect. Conducts the per file operations of the storage protocol.
#[derive(Debug)]
pub struct StorageNodeDriver {
    /// Reading half of the connection
    reader: BufReader<TcpStream>,
    /// Writing half of the connection
    writer: TcpStream,
}

impl StorageNodeDriver {
    /// Connects to a storage node.
    ///
    /// # Arguments
    /// * `ip`: address announced by the redirect
    /// * `port`: client facing port announced by the redirect
    pub fn connect(ip: &str, port: u16) -> DfsDriverResult<Self> {
        let (reader, writer) = conectar(&format!("{ip}:{port}"))?;
        Ok(StorageNodeDriver { reader, writer })
    }

    /// Sends one frame and reads one response frame.
    pub fn comando(&mut self, frame: &str) -> DfsDriverResult<Respuesta> {
        escribir_frame(&mut self.writer, frame)?;
        recibir(&mut self.reader)
    }

    /// Creates an empty file with its metadata on this node.
    pub fn crear(&mut self, nombre: &str, propietario: &str) -> DfsDriverResult<String> {
        exigir_exito(self.comando(&format!("{CMD_CREATE}|{nombre}|{propietario}"))?)
    }

    /// Reads a file as `[index] sentence` lines.
    pub fn leer(&mut self, nombre: &str) -> DfsDriverResult<Vec<String>> {
        escribir_frame(&mut self.writer, &format!("{CMD_READ}|{nombre}"))?;
        exigir_exito(recibir(&mut self.reader)?)?;
        leer_cuerpo_hasta_stop(&mut self.reader)
    }

    /// Reads the raw content of a file in a single frame, without indices.
    pub fn cleanread(&mut self, nombre: &str) -> DfsDriverResult<String> {
        let crudo = exigir_exito(self.comando(&format!("{CMD_CLEANREAD}|{nombre}"))?)?;
        Ok(from_raw_string(&crudo))
    }

    /// Opens the write subprotocol on one sentence.
    ///
    /// # Returns
    /// * the `SUCCESS` prompt of the storage node, or the rejection
    ///   (lock contention, bad sentence index, missing file) as a server error
    pub fn escribir_abrir(
        &mut self,
        nombre: &str,
        oracion: usize,
        usuario: &str,
    ) -> DfsDriverResult<String> {
        exigir_exito(self.comando(&format!("{CMD_WRITE}|{nombre}|{oracion}|{usuario}"))?)
    }

    /// Sends one `word_index|content` frame of an open write session.
    pub fn enviar_palabra(&mut self, palabra: usize, contenido: &str) -> DfsDriverResult<String> {
        exigir_exito(self.comando(&format!("{palabra}|{contenido}"))?)
    }

    /// Commits an open write session with the `ETIRW` sentinel.
    pub fn confirmar(&mut self) -> DfsDriverResult<String> {
        exigir_exito(self.comando(CMD_ETIRW)?)
    }

    /// Replaces the file content with its undo snapshot.
    pub fn deshacer(&mut self, nombre: &str) -> DfsDriverResult<String> {
        exigir_exito(self.comando(&format!("{CMD_UNDO}|{nombre}"))?)
    }

    /// Removes the file, its metadata and any snapshot.
    pub fn eliminar(&mut self, nombre: &str) -> DfsDriverResult<String> {
        exigir_exito(self.comando(&format!("{CMD_DELETE}|{nombre}"))?)
    }

    /// Fetches the information block of a file as stored on this node.
    pub fn info(&mut self, nombre: &str) -> DfsDriverResult<Vec<String>> {
        escribir_frame(&mut self.writer, &format!("{CMD_INFO}|{nombre}"))?;
        exigir_exito(recibir(&mut self.reader)?)?;
        leer_cuerpo_hasta_stop(&mut self.reader)
    }

    /// Consumes a word stream, invoking `f` once per `WORD|...` frame
    /// until the terminating `STOP`.
    pub fn stream<F: FnMut(&str)>(
        &mut self,
        nombre: &str,
        usuario: &str,
        mut f: F,
    ) -> DfsDriverResult<()> {
        escribir_frame(&mut self.writer, &format!("{CMD_STREAM}|{nombre}|{usuario}"))?;
        exigir_exito(recibir(&mut self.reader)?)?;
        loop {
            match recibir(&mut self.reader)? {
                Respuesta::Word(palabra) => f(&palabra),
                Respuesta::Stop => return Ok(()),
                Respuesta::Error(e) => return Err(DfsDriverError::server(e)),
                otra => {
                    return Err(DfsDriverError::new(
                        format!("Unexpected frame in stream: {otra:?}"),
                        DfsDriverErrorKind::ProtocolError,
                    ));
                }
            }
        }
    }
}

/// Opens a connection with the standard timeouts and splits it into a
/// buffered reading half and a writing half.
fn conectar(addr: &str) -> DfsDriverResult<(BufReader<TcpStream>, TcpStream)> {
    let stream = TcpStream::connect(addr)?;
    configurar_timeouts(&stream)?;
    let writer = stream.try_clone()?;
    Ok((BufReader::new(stream), writer))
}

/// Reads the next non empty frame and parses it as a response.
fn recibir(reader: &mut BufReader<TcpStream>) -> DfsDriverResult<Respuesta> {
    loop {
        match leer_frame(reader)? {
            None => {
                return Err(DfsDriverError::new(
                    "Connection closed by peer".to_string(),
                    DfsDriverErrorKind::EmptyStreamError,
                ));
            }
            Some(linea) if linea.is_empty() => continue,
            Some(linea) => {
                return Respuesta::parsear(&linea).ok_or_else(|| {
                    DfsDriverError::new(
                        format!("Unexpected frame: {linea}"),
                        DfsDriverErrorKind::ProtocolError,
                    )
                });
            }
        }
    }
}

/// Unwraps a `SUCCESS` response or surfaces the error.
fn exigir_exito(respuesta: Respuesta) -> DfsDriverResult<String> {
    match respuesta {
        Respuesta::Success(texto) => Ok(texto),
        Respuesta::Error(texto) => Err(DfsDriverError::server(texto)),
        otra => Err(DfsDriverError::new(
            format!("Expected SUCCESS, got {otra:?}"),
            DfsDriverErrorKind::ProtocolError,
        )),
    }
}

/// Collects raw body lines until the `STOP` terminator.
fn leer_cuerpo_hasta_stop(reader: &mut BufReader<TcpStream>) -> DfsDriverResult<Vec<String>> {
    let mut lineas = Vec::new();
    loop {
        match leer_frame(reader)? {
            None => {
                return Err(DfsDriverError::new(
                    "Connection closed before STOP".to_string(),
                    DfsDriverErrorKind::EmptyStreamError,
                ));
            }
            Some(linea) if linea == RESP_STOP => return Ok(lineas),
            Some(linea) => lineas.push(linea),
        }
    }
}
