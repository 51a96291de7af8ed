//! Este modulo contiene la estructura que parsea la configuracion del
//! nodo de storage a partir de los argumentos de linea de comandos

use crate::node_error::StorageError;
use std::net::SocketAddr;

/// Retardo por defecto entre palabras de un STREAM, en milisegundos
const RETARDO_STREAM_MS: u64 = 100;
/// Archivo de log por defecto del nodo de storage
const LOG_FILE: &str = ".sslogs";

/// Estructura para almacenar la configuración del nodo de storage
#[derive(Debug, Clone)]
pub struct Config {
    storage_dir: String,
    puerto_cliente: u16,
    nm_addr: SocketAddr,
    ip_publica: String,
    log_file: String,
    retardo_stream_ms: u64,
}

impl Config {
    /// Crea una configuracion con los valores dados y el resto por defecto
    ///
    /// # Parámetros
    /// * `storage_dir`: directorio donde persistir archivos y metadata
    /// * `puerto_cliente`: puerto donde escuchar clientes (0 elige uno libre)
    /// * `nm_addr`: direccion del name node
    pub fn new(storage_dir: &str, puerto_cliente: u16, nm_addr: SocketAddr) -> Self {
        Config {
            storage_dir: storage_dir.to_string(),
            puerto_cliente,
            nm_addr,
            ip_publica: "127.0.0.1".to_string(),
            log_file: LOG_FILE.to_string(),
            retardo_stream_ms: RETARDO_STREAM_MS,
        }
    }

    /// Crea una configuracion a partir de los argumentos de linea de
    /// comandos, con formato `clave=valor`:
    /// `storage_dir=./storage client_port=9100 [nm_addr=127.0.0.1:9000]
    /// [public_ip=127.0.0.1] [log_file=.sslogs] [stream_delay_ms=100]`
    ///
    /// # Retorna
    /// - Ok(Config) si los argumentos obligatorios estan presentes y son
    ///   validos, StorageError de configuracion en otro caso
    pub fn from_args(args: &[String]) -> Result<Self, StorageError> {
        let mut storage_dir = None;
        let mut puerto_cliente = None;
        let mut nm_addr: SocketAddr = "127.0.0.1:9000"
            .parse()
            .map_err(|_| StorageError::new_config_error("direccion por defecto"))?;
        let mut ip_publica = "127.0.0.1".to_string();
        let mut log_file = LOG_FILE.to_string();
        let mut retardo_stream_ms = RETARDO_STREAM_MS;

        for arg in args.iter().skip(1) {
            let (clave, valor) = arg
                .split_once('=')
                .ok_or_else(|| StorageError::new_config_error(arg))?;
            match clave {
                "storage_dir" => storage_dir = Some(valor.to_string()),
                "client_port" => {
                    puerto_cliente = Some(
                        valor
                            .parse::<u16>()
                            .map_err(|_| StorageError::new_config_error("client_port"))?,
                    )
                }
                "nm_addr" => {
                    nm_addr = valor
                        .parse()
                        .map_err(|_| StorageError::new_config_error("nm_addr"))?
                }
                "public_ip" => ip_publica = valor.to_string(),
                "log_file" => log_file = valor.to_string(),
                "stream_delay_ms" => {
                    retardo_stream_ms = valor
                        .parse::<u64>()
                        .map_err(|_| StorageError::new_config_error("stream_delay_ms"))?
                }
                otro => return Err(StorageError::new_config_error(otro)),
            }
        }

        let storage_dir =
            storage_dir.ok_or_else(|| StorageError::new_config_error("falta storage_dir"))?;
        let puerto_cliente =
            puerto_cliente.ok_or_else(|| StorageError::new_config_error("falta client_port"))?;

        Ok(Config {
            storage_dir,
            puerto_cliente,
            nm_addr,
            ip_publica,
            log_file,
            retardo_stream_ms,
        })
    }

    /// Reemplaza el archivo de log configurado
    pub fn con_log_file(mut self, ruta: &str) -> Self {
        self.log_file = ruta.to_string();
        self
    }

    // funciones publicas :: getters

    pub fn get_storage_dir(&self) -> &str {
        &self.storage_dir
    }

    pub fn get_puerto_cliente(&self) -> u16 {
        self.puerto_cliente
    }

    pub fn get_nm_addr(&self) -> SocketAddr {
        self.nm_addr
    }

    pub fn get_ip_publica(&self) -> &str {
        &self.ip_publica
    }

    pub fn get_log_file(&self) -> &str {
        &self.log_file
    }

    pub fn get_retardo_stream_ms(&self) -> u64 {
        self.retardo_stream_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        let mut todos = vec!["storage_node".to_string()];
        todos.extend(v.iter().map(|s| s.to_string()));
        todos
    }

    #[test]
    fn config_completa() {
        let config = Config::from_args(&args(&[
            "storage_dir=./datos",
            "client_port=9100",
            "nm_addr=127.0.0.1:9000",
        ]))
        .unwrap();
        assert_eq!(config.get_storage_dir(), "./datos");
        assert_eq!(config.get_puerto_cliente(), 9100);
        assert_eq!(config.get_nm_addr(), "127.0.0.1:9000".parse().unwrap());
    }

    #[test]
    fn falta_storage_dir() {
        assert!(Config::from_args(&args(&["client_port=9100"])).is_err());
    }

    #[test]
    fn falta_client_port() {
        assert!(Config::from_args(&args(&["storage_dir=./datos"])).is_err());
    }

    #[test]
    fn argumento_desconocido() {
        assert!(
            Config::from_args(&args(&["storage_dir=./d", "client_port=1", "banana=1"])).is_err()
        );
    }

    #[test]
    fn puerto_invalido() {
        assert!(
            Config::from_args(&args(&["storage_dir=./d", "client_port=no"])).is_err()
        );
    }
}
