//! Este módulo contiene el loop de comandos persistente del nodo de
//! storage y los manejadores de cada operacion sobre archivos

use crate::documento::document::Documento;
use crate::documento::documento_error::DocumentoErrorKind;
use crate::documento::metadata::Metadata;
use crate::documento::{ruta_archivo, ruta_backup, ruta_metadata};
use crate::log_msj::log_mensajes::{
    log_comando, log_conexion_aceptada, log_desconexion, log_error_io,
};
use crate::node::StorageNode;
use common::limites::MAX_ARCHIVOS_POR_NODO;
use common::to_raw_string;
use common::validacion::validar_nombre_archivo;
use dfs_client::protocol::frame::{campos, configurar_timeouts, escribir_frame, leer_frame};
use dfs_client::protocol::verbos::{
    CMD_CLEANREAD, CMD_CREATE, CMD_DELETE, CMD_EXIT, CMD_INFO, CMD_QUIT, CMD_READ, CMD_STREAM,
    CMD_UNDO, CMD_WRITE, EVT_FILE_CREATED, EVT_FILE_DELETED, EVT_FILE_UPDATED, RESP_STOP,
    RESP_WORD,
};
use std::fs;
use std::io::BufReader;
use std::net::TcpStream;
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

impl StorageNode {
    /// Atiende la conexion persistente de un cliente: lee frames hasta
    /// que el peer cierre o envie QUIT, y despacha cada comando a su
    /// manejador. Los comandos desconocidos responden un error generico
    /// sin cerrar la conexion.
    pub(crate) fn atender_cliente(self: Arc<Self>, stream: TcpStream) {
        let origen = match self.origen_de(&stream) {
            Some(origen) => origen,
            None => return,
        };
        if let Err(e) = configurar_timeouts(&stream) {
            log_error_io(&self.logger, "set timeouts", &e, &origen);
            return;
        }
        let mut writer = match stream.try_clone() {
            Ok(writer) => writer,
            Err(e) => {
                log_error_io(&self.logger, "clone stream", &e, &origen);
                return;
            }
        };
        let mut reader = BufReader::new(stream);

        log_conexion_aceptada(&self.logger, &origen);

        loop {
            let frame = match leer_frame(&mut reader) {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    log_error_io(&self.logger, "recv", &e, &origen);
                    break;
                }
            };
            if frame.is_empty() {
                continue;
            }
            log_comando(&self.logger, &origen, &frame);

            let partes = campos(&frame);
            let resultado = match partes[0] {
                CMD_CREATE => self.manejar_create(&partes, &mut writer),
                CMD_READ => self.manejar_read(&partes, &mut writer),
                CMD_CLEANREAD => self.manejar_cleanread(&partes, &mut writer),
                CMD_WRITE => self.manejar_write(&partes, &mut reader, &mut writer, &origen),
                CMD_UNDO => self.manejar_undo(&partes, &mut writer),
                CMD_DELETE => self.manejar_delete(&partes, &mut writer),
                CMD_INFO => self.manejar_info(&partes, &mut writer),
                CMD_STREAM => self.manejar_stream(&partes, &mut writer),
                CMD_QUIT | CMD_EXIT => {
                    let _ = escribir_frame(&mut writer, "SUCCESS|Goodbye!");
                    break;
                }
                otro => {
                    escribir_frame(&mut writer, &format!("ERROR|Unknown command: {otro}"))
                }
            };

            if let Err(e) = resultado {
                log_error_io(&self.logger, "send", &e, &origen);
                break;
            }
        }

        log_desconexion(&self.logger, &origen);
    }

    /// `CREATE|filename|owner`: materializa un documento vacio con su
    /// metadata y notifica FILE_CREATED al name node
    fn manejar_create(&self, partes: &[&str], writer: &mut TcpStream) -> std::io::Result<()> {
        if partes.len() < 3 {
            return escribir_frame(writer, "ERROR|Missing parameters");
        }
        let nombre = partes[1];
        let propietario = partes[2];

        if validar_nombre_archivo(nombre).is_err() {
            return escribir_frame(writer, "ERROR|Invalid filename");
        }

        {
            let _guard = match self.lock_disco() {
                Ok(guard) => guard,
                Err(_) => return escribir_frame(writer, "ERROR|Internal error"),
            };
            let dir = self.config.get_storage_dir();
            if ruta_archivo(dir, nombre).exists() {
                return escribir_frame(writer, "ERROR|File already exists");
            }
            if self.archivos_locales().len() >= MAX_ARCHIVOS_POR_NODO {
                return escribir_frame(writer, "ERROR|Maximum number of files reached");
            }
            if fs::write(ruta_archivo(dir, nombre), "").is_err() {
                return escribir_frame(writer, "ERROR|Failed to create file");
            }
            if Metadata::nueva(nombre, propietario).guardar(dir).is_err() {
                return escribir_frame(writer, "ERROR|Failed to create file");
            }
        }

        self.notificar_evento(EVT_FILE_CREATED, nombre);
        escribir_frame(writer, "SUCCESS|File created successfully!")
    }

    /// `READ|filename`: una linea `[indice] texto` por oracion, cerrada
    /// por un frame STOP. Actualiza el timestamp de acceso.
    fn manejar_read(&self, partes: &[&str], writer: &mut TcpStream) -> std::io::Result<()> {
        if partes.len() < 2 {
            return escribir_frame(writer, "ERROR|Missing filename");
        }
        let nombre = partes[1];

        let documento = {
            let _guard = match self.lock_disco() {
                Ok(guard) => guard,
                Err(_) => return escribir_frame(writer, "ERROR|Internal error"),
            };
            let dir = self.config.get_storage_dir();
            let documento = match Documento::cargar(dir, nombre) {
                Ok(documento) => documento,
                Err(e) if e.kind == DocumentoErrorKind::NoEncontrado => {
                    return escribir_frame(writer, "ERROR|File not found");
                }
                Err(_) => return escribir_frame(writer, "ERROR|Failed to read file"),
            };
            if let Ok(mut metadata) = Metadata::cargar(dir, nombre) {
                metadata.marcar_accedido();
                let _ = metadata.guardar(dir);
            }
            documento
        };

        escribir_frame(writer, "SUCCESS|")?;
        for (indice, oracion) in documento.oraciones.iter().enumerate() {
            escribir_frame(writer, &format!("[{indice}] {}", oracion.a_string()))?;
        }
        escribir_frame(writer, RESP_STOP)
    }

    /// `CLEANREAD|filename`: el contenido crudo en un unico frame, con
    /// los saltos de linea escapados; sin indices ni STOP
    fn manejar_cleanread(&self, partes: &[&str], writer: &mut TcpStream) -> std::io::Result<()> {
        if partes.len() < 2 {
            return escribir_frame(writer, "ERROR|Missing filename");
        }
        let nombre = partes[1];

        let contenido = {
            let _guard = match self.lock_disco() {
                Ok(guard) => guard,
                Err(_) => return escribir_frame(writer, "ERROR|Internal error"),
            };
            let ruta = ruta_archivo(self.config.get_storage_dir(), nombre);
            if !ruta.exists() {
                return escribir_frame(writer, "ERROR|File not found");
            }
            match fs::read_to_string(ruta) {
                Ok(contenido) => contenido,
                Err(_) => return escribir_frame(writer, "ERROR|Failed to read file"),
            }
        };

        escribir_frame(writer, &format!("SUCCESS|{}", to_raw_string(&contenido)))
    }

    /// `UNDO|filename`: restaura el snapshot `.backup` si existe. El
    /// snapshot se consume: un segundo UNDO sin escritura intermedia
    /// responde que no hay backup.
    fn manejar_undo(&self, partes: &[&str], writer: &mut TcpStream) -> std::io::Result<()> {
        if partes.len() < 2 {
            return escribir_frame(writer, "ERROR|Missing filename");
        }
        let nombre = partes[1];

        {
            let _guard = match self.lock_disco() {
                Ok(guard) => guard,
                Err(_) => return escribir_frame(writer, "ERROR|Internal error"),
            };
            let dir = self.config.get_storage_dir();
            if !ruta_archivo(dir, nombre).exists() {
                return escribir_frame(writer, "ERROR|File not found");
            }
            let backup = ruta_backup(dir, nombre);
            if !backup.exists() {
                return escribir_frame(writer, "ERROR|No backup available");
            }
            let contenido = match fs::read_to_string(&backup) {
                Ok(contenido) => contenido,
                Err(_) => return escribir_frame(writer, "ERROR|Failed to read backup"),
            };
            if fs::write(ruta_archivo(dir, nombre), &contenido).is_err() {
                return escribir_frame(writer, "ERROR|Failed to write file");
            }
            if let Ok(mut metadata) = Metadata::cargar(dir, nombre) {
                metadata.actualizar_estadisticas(&contenido);
                metadata.marcar_modificado();
                let _ = metadata.guardar(dir);
            }
            let _ = fs::remove_file(backup);
        }

        self.notificar_evento(EVT_FILE_UPDATED, nombre);
        escribir_frame(writer, "SUCCESS|File restored from backup")
    }

    /// `DELETE|filename`: elimina archivo, metadata y snapshot, libera
    /// los locks del archivo y notifica FILE_DELETED
    fn manejar_delete(&self, partes: &[&str], writer: &mut TcpStream) -> std::io::Result<()> {
        if partes.len() < 2 {
            return escribir_frame(writer, "ERROR|Missing filename");
        }
        let nombre = partes[1];

        {
            let _guard = match self.lock_disco() {
                Ok(guard) => guard,
                Err(_) => return escribir_frame(writer, "ERROR|Internal error"),
            };
            let dir = self.config.get_storage_dir();
            if !ruta_archivo(dir, nombre).exists() {
                return escribir_frame(writer, "ERROR|File not found");
            }
            if fs::remove_file(ruta_archivo(dir, nombre)).is_err() {
                return escribir_frame(writer, "ERROR|Failed to delete file");
            }
            let _ = fs::remove_file(ruta_metadata(dir, nombre));
            let _ = fs::remove_file(ruta_backup(dir, nombre));
        }

        self.locks.liberar_archivo(nombre);
        self.notificar_evento(EVT_FILE_DELETED, nombre);
        escribir_frame(writer, "SUCCESS|File deleted successfully!")
    }

    /// `INFO|filename`: bloque legible de metadata, cerrado por STOP
    fn manejar_info(&self, partes: &[&str], writer: &mut TcpStream) -> std::io::Result<()> {
        if partes.len() < 2 {
            return escribir_frame(writer, "ERROR|Missing filename");
        }
        let nombre = partes[1];

        let metadata = {
            let _guard = match self.lock_disco() {
                Ok(guard) => guard,
                Err(_) => return escribir_frame(writer, "ERROR|Internal error"),
            };
            match Metadata::cargar(self.config.get_storage_dir(), nombre) {
                Ok(metadata) => metadata,
                Err(e) if e.kind == DocumentoErrorKind::NoEncontrado => {
                    return escribir_frame(writer, "ERROR|File not found");
                }
                Err(_) => return escribir_frame(writer, "ERROR|Failed to read metadata"),
            }
        };

        escribir_frame(writer, "SUCCESS|File information:")?;
        for linea in metadata.bloque_info() {
            escribir_frame(writer, &linea)?;
        }
        escribir_frame(writer, RESP_STOP)
    }

    /// `STREAM|filename|user`: un frame `WORD|palabra` por palabra con
    /// el retardo configurado, cerrado por STOP
    fn manejar_stream(&self, partes: &[&str], writer: &mut TcpStream) -> std::io::Result<()> {
        if partes.len() < 2 {
            return escribir_frame(writer, "ERROR|Missing filename");
        }
        let nombre = partes[1];

        let documento = {
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

        escribir_frame(writer, "SUCCESS|Starting stream")?;
        let retardo = Duration::from_millis(self.config.get_retardo_stream_ms());
        // se emiten las corridas de no blancos de la forma serializada,
        // con el terminador adherido a su ultima palabra
        let serializado = documento.serializar();
        for palabra in serializado.split_whitespace() {
            escribir_frame(writer, &format!("{RESP_WORD}|{palabra}"))?;
            sleep(retardo);
        }
        escribir_frame(writer, RESP_STOP)
    }
}
