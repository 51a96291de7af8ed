//! Este modulo contiene los errores usados internamente por el name node

use std::io::Error as IoError;

#[derive(Debug)]
pub struct NameNodeError {
    pub error_type: NameNodeErrorType,
    /// Texto apto para viajar en un frame `ERROR|...`
    pub description: String,
    pub module: String,
}

#[derive(Debug, PartialEq)]
pub enum NameNodeErrorType {
    Lock,
    Io,
    Acl,
    Sesion,
    Reenvio,
    Configuracion,
    Inicio,
}

impl NameNodeError {
    /// Crea un NameNodeError correspondiente al fallo al obtener un lock
    ///
    /// # Parámetros
    /// * `lock`: lock que no se pudo adquirir
    /// * `module`: módulo lógico del flujo donde se produjo el error
    ///
    /// # Retorna
    /// - NameNodeError
    pub fn new_lock_error(lock: &'static str, module: &'static str) -> Self {
        NameNodeError {
            error_type: NameNodeErrorType::Lock,
            description: format!("Internal error on lock '{lock}'"),
            module: module.to_string(),
        }
    }

    /// Crea un NameNodeError correspondiente a una falla de entrada/salida
    ///
    /// # Parámetros
    /// * `operacion`: operacion que fallo
    /// * `err`: error subyacente
    /// * `module`: módulo lógico del flujo donde se produjo el error
    ///
    /// # Retorna
    /// - NameNodeError
    pub fn new_io_error(operacion: &str, err: &IoError, module: &'static str) -> Self {
        NameNodeError {
            error_type: NameNodeErrorType::Io,
            description: format!("I/O failure in '{operacion}': {err}"),
            module: module.to_string(),
        }
    }

    /// Crea un NameNodeError de la capa de control de acceso, cuyo texto
    /// viaja tal cual al cliente
    ///
    /// # Parámetros
    /// * `descripcion`: mensaje visible para el cliente
    ///
    /// # Retorna
    /// - NameNodeError
    pub fn new_acl_error(descripcion: &str) -> Self {
        NameNodeError {
            error_type: NameNodeErrorType::Acl,
            description: descripcion.to_string(),
            module: "ACL".to_string(),
        }
    }

    /// Crea un NameNodeError de la capa de sesiones, cuyo texto viaja
    /// tal cual al cliente
    ///
    /// # Parámetros
    /// * `descripcion`: mensaje visible para el cliente
    ///
    /// # Retorna
    /// - NameNodeError
    pub fn new_sesion_error(descripcion: &str) -> Self {
        NameNodeError {
            error_type: NameNodeErrorType::Sesion,
            description: descripcion.to_string(),
            module: "SESSION".to_string(),
        }
    }

    /// Crea un NameNodeError correspondiente a una falla al reenviar un
    /// comando a un nodo de storage
    ///
    /// # Parámetros
    /// * `detalle`: causa de la falla
    ///
    /// # Retorna
    /// - NameNodeError
    pub fn new_reenvio_error(detalle: &str) -> Self {
        NameNodeError {
            error_type: NameNodeErrorType::Reenvio,
            description: detalle.to_string(),
            module: "FORWARD".to_string(),
        }
    }

    /// Crea un NameNodeError correspondiente a argumentos invalidos
    ///
    /// # Parámetros
    /// * `detalle`: argumento faltante o malformado
    ///
    /// # Retorna
    /// - NameNodeError
    pub fn new_config_error(detalle: &str) -> Self {
        NameNodeError {
            error_type: NameNodeErrorType::Configuracion,
            description: format!("Invalid configuration: {detalle}"),
            module: "CONFIG".to_string(),
        }
    }

    /// Crea un NameNodeError correspondiente a una falla de arranque
    ///
    /// # Parámetros
    /// * `module`: módulo lógico del flujo donde se produjo el error
    ///
    /// # Retorna
    /// - NameNodeError
    pub fn new_inicio_error(module: &'static str) -> Self {
        NameNodeError {
            error_type: NameNodeErrorType::Inicio,
            description: "Failed to start the name node".to_string(),
            module: module.to_string(),
        }
    }
}

impl std::fmt::Display for NameNodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.module, self.description)
    }
}
