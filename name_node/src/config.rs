//! Este modulo contiene la estructura que parsea la configuracion del
//! name node a partir de los argumentos de linea de comandos

use crate::node_error::NameNodeError;

/// Archivo de log por defecto del name node
const LOG_FILE: &str = ".nmlogs";
/// Cache de ACL por defecto
const ACL_CACHE: &str = ".nm_acl_cache";

/// Estructura para almacenar la configuración del name node
#[derive(Debug, Clone)]
pub struct Config {
    puerto_storage: u16,
    puerto_cliente: u16,
    log_file: String,
    acl_cache: String,
}

impl Config {
    /// Crea una configuracion con los dos puertos y rutas explicitas
    ///
    /// # Parámetros
    /// * `puerto_storage`: puerto donde escuchan los nodos de storage
    /// * `puerto_cliente`: puerto donde escuchan los clientes
    /// * `log_file`: archivo de log del proceso
    /// * `acl_cache`: archivo de cache de la tabla de ACL
    pub fn new(puerto_storage: u16, puerto_cliente: u16, log_file: &str, acl_cache: &str) -> Self {
        Config {
            puerto_storage,
            puerto_cliente,
            log_file: log_file.to_string(),
            acl_cache: acl_cache.to_string(),
        }
    }

    /// Crea una configuracion a partir de los argumentos de linea de
    /// comandos, con formato `clave=valor`:
    /// `ss_port=9000 client_port=9001 [log_file=.nmlogs] [acl_cache=.nm_acl_cache]`
    ///
    /// # Retorna
    /// - Ok(Config) si los puertos estan presentes, son validos y
    ///   distintos entre si, NameNodeError de configuracion en otro caso
    pub fn from_args(args: &[String]) -> Result<Self, NameNodeError> {
        let mut puerto_storage = None;
        let mut puerto_cliente = None;
        let mut log_file = LOG_FILE.to_string();
        let mut acl_cache = ACL_CACHE.to_string();

        for arg in args.iter().skip(1) {
            let (clave, valor) = arg
                .split_once('=')
                .ok_or_else(|| NameNodeError::new_config_error(arg))?;
            match clave {
                "ss_port" => {
                    puerto_storage = Some(
                        valor
                            .parse::<u16>()
                            .map_err(|_| NameNodeError::new_config_error("ss_port"))?,
                    )
                }
                "client_port" => {
                    puerto_cliente = Some(
                        valor
                            .parse::<u16>()
                            .map_err(|_| NameNodeError::new_config_error("client_port"))?,
                    )
                }
                "log_file" => log_file = valor.to_string(),
                "acl_cache" => acl_cache = valor.to_string(),
                otro => return Err(NameNodeError::new_config_error(otro)),
            }
        }

        let puerto_storage =
            puerto_storage.ok_or_else(|| NameNodeError::new_config_error("falta ss_port"))?;
        let puerto_cliente =
            puerto_cliente.ok_or_else(|| NameNodeError::new_config_error("falta client_port"))?;
        if puerto_storage == puerto_cliente && puerto_storage != 0 {
            return Err(NameNodeError::new_config_error(
                "ss_port y client_port deben ser distintos",
            ));
        }

        Ok(Config {
            puerto_storage,
            puerto_cliente,
            log_file,
            acl_cache,
        })
    }

    // funciones publicas :: getters

    pub fn get_puerto_storage(&self) -> u16 {
        self.puerto_storage
    }

    pub fn get_puerto_cliente(&self) -> u16 {
        self.puerto_cliente
    }

    pub fn get_log_file(&self) -> &str {
        &self.log_file
    }

    pub fn get_acl_cache(&self) -> &str {
        &self.acl_cache
    }
}
