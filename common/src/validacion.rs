//! Validaciones compartidas de nombres de archivo y de usuario

use crate::CommonResult;
use crate::common_error::CommonError;
use crate::limites::{MAX_NOMBRE_ARCHIVO, MAX_NOMBRE_USUARIO};

/// Caracteres que no pueden aparecer en un nombre de archivo
const CARACTERES_PROHIBIDOS: [char; 8] = ['/', '\\', ':', '*', '?', '"', '<', '>'];

/// Valida el nombre de un archivo
///
/// # Parametros
/// * `nombre`: nombre a validar
///
/// # Retorna
/// - () si el nombre es valido, CommonError de validacion en otro caso
pub fn validar_nombre_archivo(nombre: &str) -> CommonResult<()> {
    if nombre.is_empty() {
        return Err(CommonError::validation("Invalid filename".to_string()));
    }
    if nombre.len() > MAX_NOMBRE_ARCHIVO {
        return Err(CommonError::validation("Filename too long".to_string()));
    }
    if nombre
        .chars()
        .any(|c| CARACTERES_PROHIBIDOS.contains(&c) || c == '|')
    {
        return Err(CommonError::validation("Invalid filename".to_string()));
    }
    Ok(())
}

/// Valida el nombre de un usuario: alfanumerico mas guion bajo,
/// de hasta [`MAX_NOMBRE_USUARIO`] caracteres
///
/// # Parametros
/// * `nombre`: nombre a validar
///
/// # Retorna
/// - () si el nombre es valido, CommonError de validacion en otro caso
pub fn validar_nombre_usuario(nombre: &str) -> CommonResult<()> {
    if nombre.is_empty() || nombre.len() > MAX_NOMBRE_USUARIO {
        return Err(CommonError::validation("Invalid username".to_string()));
    }
    if !nombre.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(CommonError::validation("Invalid username".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nombre_de_archivo_valido() {
        assert!(validar_nombre_archivo("notes.txt").is_ok());
        assert!(validar_nombre_archivo("informe_final-2.txt").is_ok());
    }

    #[test]
    fn nombre_de_archivo_vacio_es_invalido() {
        assert!(validar_nombre_archivo("").is_err());
    }

    #[test]
    fn nombre_de_archivo_con_caracteres_prohibidos() {
        for nombre in ["a/b", "a\\b", "a:b", "a*b", "a?b", "a\"b", "a<b", "a>b", "a|b"] {
            assert!(validar_nombre_archivo(nombre).is_err(), "acepto {nombre}");
        }
    }

    #[test]
    fn nombre_de_archivo_demasiado_largo() {
        let nombre = "a".repeat(MAX_NOMBRE_ARCHIVO + 1);
        assert!(validar_nombre_archivo(&nombre).is_err());
    }

    #[test]
    fn nombre_de_usuario_valido() {
        assert!(validar_nombre_usuario("alice").is_ok());
        assert!(validar_nombre_usuario("user_42").is_ok());
    }

    #[test]
    fn nombre_de_usuario_invalido() {
        assert!(validar_nombre_usuario("").is_err());
        assert!(validar_nombre_usuario("ana maria").is_err());
        assert!(validar_nombre_usuario("ana-maria").is_err());
        assert!(validar_nombre_usuario(&"u".repeat(MAX_NOMBRE_USUARIO + 1)).is_err());
    }
}
