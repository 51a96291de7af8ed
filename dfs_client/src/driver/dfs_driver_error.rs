//! Este modulo contiene la implementacion de errores del driver
//! del sistema de archivos distribuido
use std::num::ParseIntError;

#[derive(Debug, PartialEq)]
pub enum DfsDriverErrorKind {
    /// Error caused by a connections issues, wrong ports, etc.
    ConnectionError,
    /// Generical errors
    OtherError,
    /// Empty stream
    EmptyStreamError,
    /// Errors caused by malformed frames
    ProtocolError,
    /// An `ERROR|...` frame returned by a peer
    ServerError,
}

/// Error del driver del sistema de archivos
#[derive(Debug, PartialEq)]
pub struct DfsDriverError {
    /// The error message
    pub message: String,
    /// The error kind
    pub kind: DfsDriverErrorKind,
}

impl DfsDriverError {
    /// Creates a new DfsDriverError
    pub fn new(message: String, kind: DfsDriverErrorKind) -> Self {
        DfsDriverError { message, kind }
    }

    pub fn other(message: String) -> Self {
        DfsDriverError::new(message, DfsDriverErrorKind::OtherError)
    }

    /// Wraps the text of an `ERROR|...` frame.
    pub fn server(message: String) -> Self {
        DfsDriverError::new(message, DfsDriverErrorKind::ServerError)
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the error kind
    pub fn kind(&self) -> &DfsDriverErrorKind {
        &self.kind
    }
}

impl std::fmt::Display for DfsDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DfsDriverError: {} - {:?}", self.message, self.kind)
    }
}

impl From<std::io::Error> for DfsDriverError {
    fn from(err: std::io::Error) -> Self {
        DfsDriverError::new(err.to_string(), DfsDriverErrorKind::ConnectionError)
    }
}

impl From<ParseIntError> for DfsDriverError {
    fn from(err: ParseIntError) -> Self {
        DfsDriverError::new(err.to_string(), DfsDriverErrorKind::ProtocolError)
    }
}
