//! Este modulo contiene la tabla de ruteo del name node: para cada
//! archivo, el identificador de su nodo de storage primario

use std::collections::HashMap;
use std::sync::Mutex;

/// Tabla archivo → primario. Un mapa asociativo bajo un unico mutex;
/// las entradas se crean al crear el archivo o al re-registrarse su
/// nodo, y se eliminan al borrarlo o al caerse su primario.
#[derive(Debug, Default)]
pub struct TablaRuteo {
    entradas: Mutex<HashMap<String, u64>>,
}

impl TablaRuteo {
    pub fn new() -> Self {
        TablaRuteo {
            entradas: Mutex::new(HashMap::new()),
        }
    }

    /// Registra o actualiza el primario de un archivo
    pub fn agregar(&self, archivo: &str, nodo: u64) {
        if let Ok(mut guard) = self.entradas.lock() {
            guard.insert(archivo.to_string(), nodo);
        }
    }

    /// Identificador del primario de un archivo, si esta ruteado
    pub fn primario_de(&self, archivo: &str) -> Option<u64> {
        let guard = self.entradas.lock().ok()?;
        guard.get(archivo).copied()
    }

    pub fn contiene(&self, archivo: &str) -> bool {
        self.primario_de(archivo).is_some()
    }

    /// Elimina la entrada de un archivo
    ///
    /// # Retorna
    /// - true si el archivo estaba ruteado
    pub fn eliminar(&self, archivo: &str) -> bool {
        match self.entradas.lock() {
            Ok(mut guard) => guard.remove(archivo).is_some(),
            Err(_) => false,
        }
    }

    /// Elimina toda entrada que referencie a un nodo caido
    ///
    /// # Parámetros
    /// * `nodo`: identificador del nodo caido
    ///
    /// # Retorna
    /// - Nombres de los archivos que quedaron sin primario
    pub fn eliminar_de_nodo(&self, nodo: u64) -> Vec<String> {
        let mut perdidos = Vec::new();
        if let Ok(mut guard) = self.entradas.lock() {
            guard.retain(|archivo, primario| {
                if *primario == nodo {
                    perdidos.push(archivo.clone());
                    false
                } else {
                    true
                }
            });
        }
        perdidos.sort();
        perdidos
    }

    /// Nombres de todos los archivos ruteados, ordenados
    pub fn listar(&self) -> Vec<String> {
        let mut archivos: Vec<String> = match self.entradas.lock() {
            Ok(guard) => guard.keys().cloned().collect(),
            Err(_) => Vec::new(),
        };
        archivos.sort();
        archivos
    }

    pub fn cantidad(&self) -> usize {
        self.entradas.lock().map(|guard| guard.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agregar_y_buscar() {
        let tabla = TablaRuteo::new();
        tabla.agregar("a.txt", 1);
        assert_eq!(tabla.primario_de("a.txt"), Some(1));
        assert_eq!(tabla.primario_de("b.txt"), None);
    }

    #[test]
    fn agregar_actualiza_el_primario() {
        let tabla = TablaRuteo::new();
        tabla.agregar("a.txt", 1);
        tabla.agregar("a.txt", 2);
        assert_eq!(tabla.primario_de("a.txt"), Some(2));
        assert_eq!(tabla.cantidad(), 1);
    }

    #[test]
    fn eliminar_una_entrada() {
        let tabla = TablaRuteo::new();
        tabla.agregar("a.txt", 1);
        assert!(tabla.eliminar("a.txt"));
        assert!(!tabla.eliminar("a.txt"));
        assert_eq!(tabla.primario_de("a.txt"), None);
    }

    #[test]
    fn eliminar_de_nodo_solo_purga_sus_archivos() {
        let tabla = TablaRuteo::new();
        tabla.agregar("a.txt", 1);
        tabla.agregar("b.txt", 2);
        tabla.agregar("c.txt", 1);

        let perdidos = tabla.eliminar_de_nodo(1);
        assert_eq!(perdidos, vec!["a.txt", "c.txt"]);
        assert_eq!(tabla.primario_de("b.txt"), Some(2));
        assert_eq!(tabla.cantidad(), 1);
    }

    #[test]
    fn listar_devuelve_orden_estable() {
        let tabla = TablaRuteo::new();
        tabla.agregar("b.txt", 1);
        tabla.agregar("a.txt", 2);
        assert_eq!(tabla.listar(), vec!["a.txt", "b.txt"]);
    }
}
