//! Este modulo contiene la politica de ubicacion de archivos nuevos:
//! round robin sobre la lista de nodos de storage vivos

use std::sync::Mutex;

/// Cursor rotativo sobre la membresia viva. El cursor avanza una
/// posicion por eleccion, modulo la cantidad de nodos vivos al momento.
#[derive(Debug)]
pub struct SelectorRoundRobin {
    ultimo: Mutex<usize>,
}

impl Default for SelectorRoundRobin {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectorRoundRobin {
    pub fn new() -> Self {
        SelectorRoundRobin {
            ultimo: Mutex::new(usize::MAX),
        }
    }

    /// Elige el proximo nodo del ciclo
    ///
    /// # Parámetros
    /// * `vivos`: identificadores de los nodos vivos, en orden estable
    ///
    /// # Retorna
    /// - Identificador elegido, None si no hay nodos vivos
    pub fn elegir(&self, vivos: &[u64]) -> Option<u64> {
        if vivos.is_empty() {
            return None;
        }
        let mut guard = self.ultimo.lock().ok()?;
        *guard = guard.wrapping_add(1) % vivos.len();
        Some(vivos[*guard])
    }
}
