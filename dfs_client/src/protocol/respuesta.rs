//! Parsing of the response frames emitted by both server roles.

use crate::protocol::frame::SEPARADOR;
use crate::protocol::verbos::{
    RESP_ACK, RESP_ERROR, RESP_REDIRECT, RESP_STOP, RESP_SUCCESS, RESP_WORD,
};

/// A parsed response frame.
///
/// `ACK` is accepted as a synonym of `SUCCESS` when parsing, for
/// compatibility with older peers, but is never emitted by this workspace.
#[derive(Debug, Clone, PartialEq)]
pub enum Respuesta {
    /// `SUCCESS|<text>`
    Success(String),
    /// `ERROR|<text>`
    Error(String),
    /// `REDIRECT|<ip>|<port>`
    Redirect(String, u16),
    /// `WORD|<word>`, one frame per streamed word
    Word(String),
    /// `STOP`, terminator of multi line responses and streams
    Stop,
}

impl Respuesta {
    /// Parses a single response frame.
    ///
    /// # Returns
    /// * `Some(Respuesta)` when the prefix is a known response verb
    /// * `None` for anything else
    pub fn parsear(frame: &str) -> Option<Respuesta> {
        let (prefijo, resto) = match frame.split_once(SEPARADOR) {
            Some((p, r)) => (p, r),
            None => (frame, ""),
        };

        match prefijo {
            RESP_SUCCESS | RESP_ACK => Some(Respuesta::Success(resto.to_string())),
            RESP_ERROR => Some(Respuesta::Error(resto.to_string())),
            RESP_WORD => Some(Respuesta::Word(resto.to_string())),
            RESP_STOP => Some(Respuesta::Stop),
            RESP_REDIRECT => {
                let mut partes = resto.splitn(2, SEPARADOR);
                let ip = partes.next()?.to_string();
                let puerto = partes.next()?.parse::<u16>().ok()?;
                Some(Respuesta::Redirect(ip, puerto))
            }
            _ => None,
        }
    }

    /// Whether the frame reports a positive outcome.
    pub fn es_exito(&self) -> bool {
        matches!(self, Respuesta::Success(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsea_success_con_texto() {
        assert_eq!(
            Respuesta::parsear("SUCCESS|File created successfully!"),
            Some(Respuesta::Success("File created successfully!".to_string()))
        );
    }

    #[test]
    fn parsea_success_vacio() {
        assert_eq!(
            Respuesta::parsear("SUCCESS|"),
            Some(Respuesta::Success(String::new()))
        );
    }

    #[test]
    fn ack_es_sinonimo_de_success() {
        assert_eq!(
            Respuesta::parsear("ACK"),
            Some(Respuesta::Success(String::new()))
        );
    }

    #[test]
    fn parsea_error() {
        assert_eq!(
            Respuesta::parsear("ERROR|File not found"),
            Some(Respuesta::Error("File not found".to_string()))
        );
    }

    #[test]
    fn parsea_redirect() {
        assert_eq!(
            Respuesta::parsear("REDIRECT|127.0.0.1|9100"),
            Some(Respuesta::Redirect("127.0.0.1".to_string(), 9100))
        );
    }

    #[test]
    fn redirect_con_puerto_invalido_no_parsea() {
        assert_eq!(Respuesta::parsear("REDIRECT|127.0.0.1|puerto"), None);
    }

    #[test]
    fn parsea_word_y_stop() {
        assert_eq!(
            Respuesta::parsear("WORD|hola"),
            Some(Respuesta::Word("hola".to_string()))
        );
        assert_eq!(Respuesta::parsear("STOP"), Some(Respuesta::Stop));
    }

    #[test]
    fn prefijo_desconocido_no_parsea() {
        assert_eq!(Respuesta::parsear("BANANA|x"), None);
    }
}
