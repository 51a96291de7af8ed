//! Este modulo contiene la implementacion principal del nodo de storage

use crate::config::Config;
use crate::locks::TablaLocks;
use crate::log_msj::log_mensajes::{
    log_error_aceptando, log_nodo_iniciado, log_peer_addr_error,
};
use crate::node_error::StorageError;
use logger::logger::Logger;
use std::fs;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::spawn;

/// Nodo de storage: dueño primario de un subconjunto de archivos.
/// Atiende clientes por un puerto propio y mantiene una conexion de
/// control persistente con el name node.
#[derive(Debug)]
pub struct StorageNode {
    pub(crate) config: Config,
    pub(crate) locks: TablaLocks,
    pub(crate) logger: Logger,
    /// Serializa toda mutacion en disco de este nodo
    pub(crate) disco: Mutex<()>,
    /// Extremo de escritura del canal de control hacia el name node
    pub(crate) canal_nm: Mutex<Option<TcpStream>>,
    /// Identificador asignado por el name node en el registro
    pub(crate) ss_id: Mutex<Option<u64>>,
    pub(crate) activo: AtomicBool,
}

impl StorageNode {
    /// Crea un nuevo nodo de storage a partir de su configuracion.
    /// El logger escribe al archivo de log configurado.
    pub fn new(config: Config) -> Self {
        let logger = Logger::new(config.get_log_file());
        StorageNode {
            config,
            locks: TablaLocks::new(),
            logger,
            disco: Mutex::new(()),
            canal_nm: Mutex::new(None),
            ss_id: Mutex::new(None),
            activo: AtomicBool::new(true),
        }
    }

    /// Inicia el nodo: crea el directorio de storage, abre el socket de
    /// clientes, lanza el canal de control hacia el name node y el ciclo
    /// de aceptacion de clientes.
    ///
    /// # Retorna
    /// - La direccion real donde quedo escuchando (util cuando el puerto
    ///   configurado es 0), StorageError si fallo alguna etapa critica
    pub fn iniciar(self: Arc<Self>) -> Result<SocketAddr, StorageError> {
        fs::create_dir_all(self.config.get_storage_dir())
            .map_err(|e| StorageError::new_io_error("crear directorio", &e, "INIT"))?;

        let listener = TcpListener::bind(("0.0.0.0", self.config.get_puerto_cliente()))
            .map_err(|e| StorageError::new_io_error("bind", &e, "INIT"))?;
        let addr = listener
            .local_addr()
            .map_err(|e| StorageError::new_io_error("local_addr", &e, "INIT"))?;

        self.clone().iniciar_canal_name_node(addr.port());

        log_nodo_iniciado(&self.logger, &addr);
        self.iniciar_recepcion_clientes(listener);
        Ok(addr)
    }

    /// Ciclo que acepta conexiones de clientes y delega cada una a su
    /// propio hilo manejador
    fn iniciar_recepcion_clientes(self: Arc<Self>, listener: TcpListener) {
        spawn(move || {
            for stream in listener.incoming() {
                if !self.esta_activo() {
                    break;
                }
                match stream {
                    Ok(stream) => {
                        let nodo = self.clone();
                        spawn(move || nodo.atender_cliente(stream));
                    }
                    Err(e) => log_error_aceptando(&self.logger, &e),
                }
            }
        });
    }

    /// Marca el nodo como detenido; los ciclos en curso terminan en su
    /// proxima iteracion
    pub fn detener(&self) {
        self.activo.store(false, Ordering::SeqCst);
    }

    pub(crate) fn esta_activo(&self) -> bool {
        self.activo.load(Ordering::SeqCst)
    }

    /// Toma el mutex de storage del nodo
    pub(crate) fn lock_disco(&self) -> Result<MutexGuard<'_, ()>, StorageError> {
        self.disco
            .lock()
            .map_err(|_| StorageError::new_lock_error("disco", "STORAGE"))
    }

    /// Direccion del peer de un stream, para los logs
    pub(crate) fn origen_de(&self, stream: &TcpStream) -> Option<String> {
        match stream.peer_addr() {
            Ok(addr) => Some(addr.to_string()),
            Err(e) => {
                log_peer_addr_error(&self.logger, &e);
                None
            }
        }
    }

    /// Identificador asignado por el name node, una vez registrado
    pub fn id_asignado(&self) -> Option<u64> {
        self.ss_id.lock().ok().and_then(|guard| *guard)
    }

    /// Archivos presentes en el directorio de storage, sin los `.meta`
    /// ni los `.backup`
    pub fn archivos_locales(&self) -> Vec<String> {
        let mut archivos = Vec::new();
        let entradas = match fs::read_dir(self.config.get_storage_dir()) {
            Ok(entradas) => entradas,
            Err(_) => return archivos,
        };
        for entrada in entradas.flatten() {
            let nombre = entrada.file_name().to_string_lossy().to_string();
            if nombre.ends_with(".meta") || nombre.ends_with(".backup") || nombre.starts_with('.')
            {
                continue;
            }
            archivos.push(nombre);
        }
        archivos.sort();
        archivos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodo_de_prueba(sufijo: &str) -> (Arc<StorageNode>, String) {
        let dir = std::env::temp_dir().join(format!("ss_node_{}_{}", sufijo, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let dir = dir.to_str().unwrap().to_string();
        let log = std::env::temp_dir().join(format!("ss_node_{}_{}.log", sufijo, std::process::id()));
        let config = Config::new(&dir, 0, "127.0.0.1:1".parse().unwrap())
            .con_log_file(log.to_str().unwrap());
        (Arc::new(StorageNode::new(config)), dir)
    }

    #[test]
    fn archivos_locales_ignora_metadata_y_backups() {
        let (nodo, dir) = nodo_de_prueba("listado");
        std::fs::write(format!("{dir}/a.txt"), "").unwrap();
        std::fs::write(format!("{dir}/a.txt.meta"), "").unwrap();
        std::fs::write(format!("{dir}/a.txt.backup"), "").unwrap();
        std::fs::write(format!("{dir}/b.txt"), "").unwrap();

        assert_eq!(nodo.archivos_locales(), vec!["a.txt", "b.txt"]);
        std::fs::remove_dir_all(&dir).unwrap_or_default();
    }
}
