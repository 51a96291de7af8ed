use documento_error::DocumentoError;
use std::path::PathBuf;

pub mod document;
pub mod documento_error;
pub mod metadata;

pub type DocumentoResult<T> = Result<T, DocumentoError>;

/// Ruta del archivo de datos dentro del directorio de storage
pub fn ruta_archivo(storage_dir: &str, nombre: &str) -> PathBuf {
    PathBuf::from(storage_dir).join(nombre)
}

/// Ruta del archivo de metadata asociado a un archivo
pub fn ruta_metadata(storage_dir: &str, nombre: &str) -> PathBuf {
    PathBuf::from(storage_dir).join(format!("{nombre}.meta"))
}

/// Ruta del snapshot de undo asociado a un archivo
pub fn ruta_backup(storage_dir: &str, nombre: &str) -> PathBuf {
    PathBuf::from(storage_dir).join(format!("{nombre}.backup"))
}
