//! Este modulo contiene la tabla de locks de oracion compartida por
//! todas las sesiones de un nodo de storage

use crate::node_error::StorageError;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Lock sobre una oracion: usuario que lo sostiene e instante de
/// adquisicion. Los locks viven solo en memoria.
#[derive(Debug, Clone)]
pub struct LockOracion {
    pub usuario: String,
    pub adquirido: Instant,
}

/// Tabla de locks por (archivo, indice de oracion). Todas las mutaciones
/// se serializan con el mutex de la tabla; una operacion sostiene a lo
/// sumo un lock, por lo que no hay riesgo de deadlock.
#[derive(Debug, Default)]
pub struct TablaLocks {
    entradas: Mutex<HashMap<(String, usize), LockOracion>>,
}

impl TablaLocks {
    pub fn new() -> Self {
        TablaLocks {
            entradas: Mutex::new(HashMap::new()),
        }
    }

    /// Intenta tomar el lock de (archivo, oracion) para un usuario.
    /// Es reentrante para el mismo usuario.
    ///
    /// # Retorna
    /// - () si el lock quedo tomado, StorageError de lock si otra
    ///   sesion lo sostiene
    pub fn intentar_lock(
        &self,
        archivo: &str,
        oracion: usize,
        usuario: &str,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .entradas
            .lock()
            .map_err(|_| StorageError::new_lock_error("tabla de locks", "LOCKS"))?;

        let clave = (archivo.to_string(), oracion);
        match guard.get(&clave) {
            Some(lock) if lock.usuario != usuario => {
                Err(StorageError::new_lock_error("oracion", "LOCKS"))
            }
            Some(_) => Ok(()),
            None => {
                guard.insert(
                    clave,
                    LockOracion {
                        usuario: usuario.to_string(),
                        adquirido: Instant::now(),
                    },
                );
                Ok(())
            }
        }
    }

    /// Libera el lock de (archivo, oracion). Solo el usuario que lo
    /// sostiene puede liberarlo.
    ///
    /// # Retorna
    /// - () si se libero, StorageError de lock si no estaba tomado o lo
    ///   sostiene otro usuario
    pub fn liberar(
        &self,
        archivo: &str,
        oracion: usize,
        usuario: &str,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .entradas
            .lock()
            .map_err(|_| StorageError::new_lock_error("tabla de locks", "LOCKS"))?;

        let clave = (archivo.to_string(), oracion);
        match guard.get(&clave) {
            Some(lock) if lock.usuario == usuario => {
                guard.remove(&clave);
                Ok(())
            }
            _ => Err(StorageError::new_lock_error("oracion", "LOCKS")),
        }
    }

    /// Libera todos los locks de un archivo, al eliminarlo
    pub fn liberar_archivo(&self, archivo: &str) {
        if let Ok(mut guard) = self.entradas.lock() {
            guard.retain(|(nombre, _), _| nombre != archivo);
        }
    }

    /// Usuario que sostiene el lock de (archivo, oracion), si lo hay
    pub fn duenio_de(&self, archivo: &str, oracion: usize) -> Option<String> {
        let guard = self.entradas.lock().ok()?;
        guard
            .get(&(archivo.to_string(), oracion))
            .map(|lock| lock.usuario.clone())
    }

    /// Tiempo que lleva sostenido el lock de (archivo, oracion)
    pub fn sostenido_hace(&self, archivo: &str, oracion: usize) -> Option<Duration> {
        let guard = self.entradas.lock().ok()?;
        guard
            .get(&(archivo.to_string(), oracion))
            .map(|lock| lock.adquirido.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_libre_se_toma() {
        let tabla = TablaLocks::new();
        assert!(tabla.intentar_lock("a.txt", 0, "alice").is_ok());
        assert_eq!(tabla.duenio_de("a.txt", 0), Some("alice".to_string()));
    }

    #[test]
    fn lock_es_reentrante_para_el_mismo_usuario() {
        let tabla = TablaLocks::new();
        tabla.intentar_lock("a.txt", 0, "alice").unwrap();
        assert!(tabla.intentar_lock("a.txt", 0, "alice").is_ok());
    }

    #[test]
    fn lock_tomado_rechaza_a_otro_usuario() {
        let tabla = TablaLocks::new();
        tabla.intentar_lock("a.txt", 0, "bob").unwrap();
        assert!(tabla.intentar_lock("a.txt", 0, "alice").is_err());
        // el duenio no cambia
        assert_eq!(tabla.duenio_de("a.txt", 0), Some("bob".to_string()));
    }

    #[test]
    fn oraciones_distintas_se_lockean_en_paralelo() {
        let tabla = TablaLocks::new();
        tabla.intentar_lock("a.txt", 0, "alice").unwrap();
        assert!(tabla.intentar_lock("a.txt", 1, "bob").is_ok());
        assert!(tabla.intentar_lock("b.txt", 0, "carol").is_ok());
    }

    #[test]
    fn liberar_solo_por_el_duenio() {
        let tabla = TablaLocks::new();
        tabla.intentar_lock("a.txt", 0, "bob").unwrap();
        assert!(tabla.liberar("a.txt", 0, "alice").is_err());
        assert!(tabla.liberar("a.txt", 0, "bob").is_ok());
        assert_eq!(tabla.duenio_de("a.txt", 0), None);
    }

    #[test]
    fn liberar_lock_inexistente_es_error() {
        let tabla = TablaLocks::new();
        assert!(tabla.liberar("a.txt", 0, "alice").is_err());
    }

    #[test]
    fn despues_de_liberar_otro_usuario_puede_tomarlo() {
        let tabla = TablaLocks::new();
        tabla.intentar_lock("a.txt", 0, "bob").unwrap();
        tabla.liberar("a.txt", 0, "bob").unwrap();
        assert!(tabla.intentar_lock("a.txt", 0, "alice").is_ok());
    }

    #[test]
    fn el_tiempo_sostenido_solo_existe_con_lock_tomado() {
        let tabla = TablaLocks::new();
        assert!(tabla.sostenido_hace("a.txt", 0).is_none());
        tabla.intentar_lock("a.txt", 0, "alice").unwrap();
        assert!(tabla.sostenido_hace("a.txt", 0).unwrap() < Duration::from_secs(1));
    }

    #[test]
    fn liberar_archivo_limpia_todas_sus_oraciones() {
        let tabla = TablaLocks::new();
        tabla.intentar_lock("a.txt", 0, "alice").unwrap();
        tabla.intentar_lock("a.txt", 3, "bob").unwrap();
        tabla.intentar_lock("b.txt", 0, "carol").unwrap();

        tabla.liberar_archivo("a.txt");
        assert_eq!(tabla.duenio_de("a.txt", 0), None);
        assert_eq!(tabla.duenio_de("a.txt", 3), None);
        assert_eq!(tabla.duenio_de("b.txt", 0), Some("carol".to_string()));
    }
}
