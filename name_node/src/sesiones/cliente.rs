//! Este modulo contiene el registro de sesiones de clientes del name
//! node, indexado por nombre de usuario

use crate::node_error::NameNodeError;
use common::limites::MAX_USUARIOS;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

/// Sesion activa de un cliente
#[derive(Debug, Clone)]
pub struct SesionCliente {
    pub usuario: String,
    pub origen: String,
    pub conectado: Instant,
}

/// Registro de sesiones vivas. El nombre de usuario es unico mientras
/// la sesion esta activa.
#[derive(Debug, Default)]
pub struct SesionesClientes {
    entradas: Mutex<HashMap<String, SesionCliente>>,
}

impl SesionesClientes {
    pub fn new() -> Self {
        SesionesClientes {
            entradas: Mutex::new(HashMap::new()),
        }
    }

    /// Registra una sesion nueva
    ///
    /// # Parámetros
    /// * `usuario`: nombre con el que se registro el cliente
    /// * `origen`: direccion ip:puerto de la conexion
    ///
    /// # Retorna
    /// - () en caso de éxito, NameNodeError si el usuario ya esta
    ///   conectado o se alcanzo la capacidad
    pub fn agregar(&self, usuario: &str, origen: &str) -> Result<(), NameNodeError> {
        let mut guard = self.lock()?;
        if guard.contains_key(usuario) {
            return Err(NameNodeError::new_sesion_error("User already connected"));
        }
        if guard.len() >= MAX_USUARIOS {
            return Err(NameNodeError::new_sesion_error(
                "Maximum number of users reached",
            ));
        }
        guard.insert(
            usuario.to_string(),
            SesionCliente {
                usuario: usuario.to_string(),
                origen: origen.to_string(),
                conectado: Instant::now(),
            },
        );
        Ok(())
    }

    /// Da de baja la sesion de un usuario
    ///
    /// # Retorna
    /// - La sesion eliminada, si existia
    pub fn eliminar(&self, usuario: &str) -> Option<SesionCliente> {
        let mut guard = self.lock().ok()?;
        guard.remove(usuario)
    }

    /// Usuarios activos, ordenados
    pub fn listar(&self) -> Vec<String> {
        let mut usuarios: Vec<String> = match self.lock() {
            Ok(guard) => guard.keys().cloned().collect(),
            Err(_) => Vec::new(),
        };
        usuarios.sort();
        usuarios
    }

    pub fn cantidad(&self) -> usize {
        self.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, SesionCliente>>, NameNodeError> {
        self.entradas
            .lock()
            .map_err(|_| NameNodeError::new_lock_error("sesiones de clientes", "SESSION"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agregar_y_listar() {
        let sesiones = SesionesClientes::new();
        sesiones.agregar("bob", "127.0.0.1:5000").unwrap();
        sesiones.agregar("alice", "127.0.0.1:5001").unwrap();
        assert_eq!(sesiones.listar(), vec!["alice", "bob"]);
    }

    #[test]
    fn usuario_duplicado_es_rechazado() {
        let sesiones = SesionesClientes::new();
        sesiones.agregar("alice", "127.0.0.1:5000").unwrap();
        assert!(sesiones.agregar("alice", "127.0.0.1:5002").is_err());
    }

    #[test]
    fn eliminar_libera_el_nombre() {
        let sesiones = SesionesClientes::new();
        sesiones.agregar("alice", "127.0.0.1:5000").unwrap();
        assert!(sesiones.eliminar("alice").is_some());
        assert!(sesiones.agregar("alice", "127.0.0.1:5001").is_ok());
    }

    #[test]
    fn eliminar_sesion_inexistente() {
        let sesiones = SesionesClientes::new();
        assert!(sesiones.eliminar("ghost").is_none());
    }
}
