//! Este modulo contiene los errores del modelo de documento

#[derive(Debug, PartialEq)]
/// Enum representing the document error kinds.
pub enum DocumentoErrorKind {
    /// Indice de oracion fuera de rango o regla de append violada
    OracionFueraDeRango,
    /// Indice de palabra fuera de rango
    PalabraFueraDeRango,
    /// Archivo o metadata inexistente
    NoEncontrado,
    /// Falla de lectura o escritura en disco
    Io,
    /// Metadata con formato invalido
    Formato,
}

#[derive(Debug)]
/// Struct representing an error of the document model.
pub struct DocumentoError {
    pub message: String,
    pub kind: DocumentoErrorKind,
}

impl DocumentoError {
    /// Creates a new `DocumentoError` with the specified message and kind.
    pub fn new(message: String, kind: DocumentoErrorKind) -> Self {
        DocumentoError { message, kind }
    }

    pub fn oracion_fuera_de_rango(indice: usize) -> Self {
        DocumentoError::new(
            format!("sentence index {indice} out of range"),
            DocumentoErrorKind::OracionFueraDeRango,
        )
    }

    pub fn palabra_fuera_de_rango(indice: usize) -> Self {
        DocumentoError::new(
            format!("word index {indice} out of range"),
            DocumentoErrorKind::PalabraFueraDeRango,
        )
    }

    pub fn no_encontrado(nombre: &str) -> Self {
        DocumentoError::new(
            format!("file '{nombre}' not found"),
            DocumentoErrorKind::NoEncontrado,
        )
    }
}

impl std::fmt::Display for DocumentoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DocumentoError: {} - {:?}", self.message, self.kind)
    }
}

impl From<std::io::Error> for DocumentoError {
    fn from(err: std::io::Error) -> Self {
        DocumentoError::new(err.to_string(), DocumentoErrorKind::Io)
    }
}
