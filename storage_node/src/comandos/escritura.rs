//! Este módulo contiene el subprotocolo de escritura del nodo de
//! storage: una sesion `WRITE` toma el lock de la oracion, recibe frames
//! `word_index|contenido` y persiste recien al recibir el centinela ETIRW

use crate::documento::document::{DELIMITADORES, Documento};
use crate::documento::documento_error::DocumentoErrorKind;
use crate::documento::metadata::Metadata;
use crate::documento::{ruta_archivo, ruta_backup};
use crate::log_msj::log_mensajes::log_error_io;
use crate::node::StorageNode;
use common::limites::{MAX_LARGO_ORACION, MAX_LARGO_PALABRA, MAX_TAM_DOCUMENTO};
use dfs_client::protocol::frame::{escribir_frame, leer_frame};
use dfs_client::protocol::verbos::{CMD_ETIRW, EVT_FILE_UPDATED};
use std::fs;
use std::io::BufReader;
use std::net::TcpStream;

impl StorageNode {
    /// `WRITE|filename|sentence_index|user`: abre una sesion de
    /// escritura. La maquina de estados es
    /// `locked → writing → committed` o `locked → aborted`: cada frame
    /// de palabra aceptado mantiene `writing`, ETIRW confirma, y
    /// cualquier error de E/S o desconexion aborta descartando la
    /// mutacion en memoria. El lock se libera en todos los caminos.
    pub(crate) fn manejar_write(
        &self,
        partes: &[&str],
        reader: &mut BufReader<TcpStream>,
        writer: &mut TcpStream,
        origen: &str,
    ) -> std::io::Result<()> {
        if partes.len() < 4 {
            return escribir_frame(writer, "ERROR|Missing parameters");
        }
        let nombre = partes[1];
        let usuario = partes[3];
        let indice = match partes[2].parse::<usize>() {
            Ok(indice) => indice,
            Err(_) => return escribir_frame(writer, "ERROR|Invalid sentence index"),
        };

        if self.locks.intentar_lock(nombre, indice, usuario).is_err() {
            if let Some(sostenido) = self.locks.sostenido_hace(nombre, indice) {
                let msg = format!(
                    "Write on '{nombre}' sentence {indice} rejected, lock held for {} ms",
                    sostenido.as_millis()
                );
                self.logger.debug(&msg, origen, usuario);
            }
            return escribir_frame(writer, "ERROR|Sentence locked by another user");
        }

        let resultado = self.sesion_de_escritura(reader, writer, nombre, indice, origen);
        if let Err(e) = self.locks.liberar(nombre, indice, usuario) {
            self.logger.error(&e.description, origen, usuario);
        }
        resultado
    }

    /// Cuerpo de la sesion de escritura, con el lock ya tomado. El
    /// documento se muta en memoria y solo toca el disco al confirmar.
    fn sesion_de_escritura(
        &self,
        reader: &mut BufReader<TcpStream>,
        writer: &mut TcpStream,
        nombre: &str,
        indice: usize,
        origen: &str,
    ) -> std::io::Result<()> {
        let mut documento = {
            let _guard = match self.lock_disco() {
                Ok(guard) => guard,
                Err(_) => return escribir_frame(writer, "ERROR|Internal error"),
            };
            match Documento::cargar(self.config.get_storage_dir(), nombre) {
                Ok(documento) => documento,
                Err(e) if e.kind == DocumentoErrorKind::NoEncontrado => {
                    return escribir_frame(writer, "ERROR|File not found");
                }
                Err(_) => return escribir_frame(writer, "ERROR|Failed to read file"),
            }
        };

        if !documento.indice_valido_para_insercion(indice) {
            return escribir_frame(writer, "ERROR|Sentence index out of range");
        }

        escribir_frame(
            writer,
            "SUCCESS|Ready to write. Send word_index|content frames, finish with ETIRW",
        )?;

        let mut oracion_actual = indice;
        loop {
            let frame = match leer_frame(reader) {
                Ok(Some(frame)) => frame,
                // desconexion prematura: se descarta la mutacion en memoria
                Ok(None) => return Ok(()),
                Err(e) => {
                    log_error_io(&self.logger, "write session recv", &e, origen);
                    return Ok(());
                }
            };

            if frame == CMD_ETIRW {
                return self.confirmar_escritura(&documento, nombre, writer);
            }

            let (indice_palabra, contenido) = match frame.split_once('|') {
                Some((izq, der)) => (izq, der),
                None => {
                    escribir_frame(writer, "ERROR|Invalid write frame")?;
                    continue;
                }
            };
            let indice_palabra = match indice_palabra.parse::<usize>() {
                Ok(indice_palabra) => indice_palabra,
                Err(_) => {
                    escribir_frame(writer, "ERROR|Invalid word index")?;
                    continue;
                }
            };

            if let Some(rechazo) = validar_contenido(&documento, oracion_actual, contenido) {
                escribir_frame(writer, &format!("ERROR|{rechazo}"))?;
                continue;
            }

            match documento.insertar_palabras(oracion_actual, indice_palabra, contenido) {
                Ok(nueva) => {
                    oracion_actual = nueva;
                    escribir_frame(writer, "SUCCESS|Word updated")?;
                }
                Err(e) if e.kind == DocumentoErrorKind::PalabraFueraDeRango => {
                    escribir_frame(writer, "ERROR|Word index out of range")?;
                }
                Err(_) => {
                    escribir_frame(writer, "ERROR|Sentence index out of range")?;
                }
            }
        }
    }

    /// Persiste la sesion confirmada: snapshot del contenido previo,
    /// escritura del documento, metadata y notificacion FILE_UPDATED
    fn confirmar_escritura(
        &self,
        documento: &Documento,
        nombre: &str,
        writer: &mut TcpStream,
    ) -> std::io::Result<()> {
        {
            let _guard = match self.lock_disco() {
                Ok(guard) => guard,
                Err(_) => return escribir_frame(writer, "ERROR|Internal error"),
            };
            let dir = self.config.get_storage_dir();

            let ruta = ruta_archivo(dir, nombre);
            if ruta.exists() {
                let _ = fs::copy(&ruta, ruta_backup(dir, nombre));
            }

            if documento.guardar(dir, nombre).is_err() {
                return escribir_frame(writer, "ERROR|Failed to write file");
            }

            let serializado = documento.serializar();
            let mut metadata = match Metadata::cargar(dir, nombre) {
                Ok(metadata) => metadata,
                Err(_) => Metadata::nueva(nombre, ""),
            };
            metadata.actualizar_estadisticas(&serializado);
            metadata.marcar_modificado();
            let _ = metadata.guardar(dir);
        }

        self.notificar_evento(EVT_FILE_UPDATED, nombre);
        escribir_frame(writer, "SUCCESS|Write committed")
    }
}

/// Valida un frame de contenido antes de aplicarlo al documento en
/// memoria, para que un frame rechazado no deje mutaciones a medias
///
/// # Retorna
/// - None si el contenido es aceptable, Some(motivo) en otro caso
fn validar_contenido(documento: &Documento, oracion: usize, contenido: &str) -> Option<String> {
    let tokens: Vec<&str> = contenido.split_whitespace().collect();
    if tokens.is_empty() {
        return Some("Empty content".to_string());
    }
    if tokens.iter().any(|t| t.len() > MAX_LARGO_PALABRA) {
        return Some("Word too long".to_string());
    }
    let terminadores = contenido
        .chars()
        .filter(|c| DELIMITADORES.contains(c))
        .count();
    if terminadores > 1 {
        return Some("Content may contain at most one sentence terminator".to_string());
    }
    if documento.serializar().len() + contenido.len() + 1 > MAX_TAM_DOCUMENTO {
        return Some("Document too large".to_string());
    }
    if let Some(actual) = documento.oraciones.get(oracion) {
        if actual.a_string().len() + contenido.len() + 1 > MAX_LARGO_ORACION {
            return Some("Sentence too long".to_string());
        }
    }
    None
}
