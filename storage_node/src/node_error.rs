//! Este modulo contiene los errores usados internamente por el
//! nodo de storage

use std::io::Error as IoError;

#[derive(Debug)]
pub struct StorageError {
    pub error_type: StorageErrorType,
    pub description: String,
    pub module: String,
}

#[derive(Debug)]
pub enum StorageErrorType {
    Io,
    Lock,
    Protocolo,
    Registro,
    Configuracion,
    Inicio,
}

impl StorageError {
    /// Crea un StorageError correspondiente a una falla de entrada/salida
    ///
    /// # Parámetros
    /// * `operacion`: operacion de disco o socket que fallo
    /// * `err`: error subyacente
    /// * `module`: módulo lógico del flujo donde se produjo el error
    ///
    /// # Retorna
    /// - StorageError
    pub fn new_io_error(operacion: &str, err: &IoError, module: &'static str) -> Self {
        let descripcion = format!("(error) ERR en '{operacion}': {err}");
        StorageError {
            error_type: StorageErrorType::Io,
            description: descripcion,
            module: module.to_string(),
        }
    }

    /// Crea un StorageError correspondiente al fallo al obtener un lock
    ///
    /// # Parámetros
    /// * `lock`: lock que no se pudo adquirir
    /// * `module`: módulo lógico del flujo donde se produjo el error
    ///
    /// # Retorna
    /// - StorageError
    pub fn new_lock_error(lock: &'static str, module: &'static str) -> Self {
        let descripcion = format!("(error) ERR error en lock '{lock}'");
        StorageError {
            error_type: StorageErrorType::Lock,
            description: descripcion,
            module: module.to_string(),
        }
    }

    /// Crea un StorageError correspondiente a un frame malformado
    ///
    /// # Parámetros
    /// * `detalle`: campo o valor que no se pudo interpretar
    /// * `module`: módulo lógico del flujo donde se produjo el error
    ///
    /// # Retorna
    /// - StorageError
    pub fn new_protocolo_error(detalle: &str, module: &'static str) -> Self {
        let descripcion = format!("(error) ERR frame invalido: {detalle}");
        StorageError {
            error_type: StorageErrorType::Protocolo,
            description: descripcion,
            module: module.to_string(),
        }
    }

    /// Crea un StorageError correspondiente a una falla durante el
    /// registro contra el name node
    ///
    /// # Parámetros
    /// * `detalle`: causa de la falla
    /// * `module`: módulo lógico del flujo donde se produjo el error
    ///
    /// # Retorna
    /// - StorageError
    pub fn new_registro_error(detalle: &str, module: &'static str) -> Self {
        let descripcion = format!("(error) ERR registro fallido: {detalle}");
        StorageError {
            error_type: StorageErrorType::Registro,
            description: descripcion,
            module: module.to_string(),
        }
    }

    /// Crea un StorageError correspondiente a argumentos invalidos
    ///
    /// # Parámetros
    /// * `detalle`: argumento faltante o malformado
    ///
    /// # Retorna
    /// - StorageError
    pub fn new_config_error(detalle: &str) -> Self {
        let descripcion = format!("(error) ERR configuracion invalida: {detalle}");
        StorageError {
            error_type: StorageErrorType::Configuracion,
            description: descripcion,
            module: "CONFIG".to_string(),
        }
    }

    /// Crea un StorageError correspondiente a una falla de arranque
    ///
    /// # Parámetros
    /// * `module`: módulo lógico del flujo donde se produjo el error
    ///
    /// # Retorna
    /// - StorageError
    pub fn new_inicio_error(module: &'static str) -> Self {
        StorageError {
            error_type: StorageErrorType::Inicio,
            description: "(error) ERR no se pudo iniciar el nodo".to_string(),
            module: module.to_string(),
        }
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.module, self.description)
    }
}
