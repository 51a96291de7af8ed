//! Este modulo contiene la implementacion principal del name node

use crate::acceso::acl::AclManager;
use crate::acceso::persistencia_acl::{cargar_cache, guardar_cache};
use crate::config::Config;
use crate::directorio::placement::SelectorRoundRobin;
use crate::directorio::routing::TablaRuteo;
use crate::log_msj::log_mensajes::{
    log_acl_restauradas, log_error_aceptando, log_nodo_iniciado, log_peer_addr_error,
};
use crate::node_error::NameNodeError;
use crate::sesiones::cliente::SesionesClientes;
use crate::sesiones::storage::SesionesStorage;
use logger::logger::{Logger, SIN_ORIGEN, SIN_USUARIO};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::spawn;

/// Name node: proceso directorio del sistema. Es dueño de la tabla de
/// ruteo y de la tabla de ACL, acepta sesiones de clientes por un puerto
/// y conexiones de control de nodos de storage por el otro.
#[derive(Debug)]
pub struct NameNode {
    pub(crate) config: Config,
    pub(crate) ruteo: TablaRuteo,
    pub(crate) acl: AclManager,
    pub(crate) sesiones_clientes: SesionesClientes,
    pub(crate) sesiones_storage: SesionesStorage,
    pub(crate) selector: SelectorRoundRobin,
    pub(crate) proximo_ss_id: AtomicU64,
    pub(crate) logger: Logger,
    pub(crate) activo: AtomicBool,
}

impl NameNode {
    /// Crea un nuevo name node a partir de su configuracion. El logger
    /// escribe al archivo de log configurado.
    pub fn new(config: Config) -> Self {
        let logger = Logger::new(config.get_log_file());
        NameNode {
            config,
            ruteo: TablaRuteo::new(),
            acl: AclManager::new(),
            sesiones_clientes: SesionesClientes::new(),
            sesiones_storage: SesionesStorage::new(),
            selector: SelectorRoundRobin::new(),
            proximo_ss_id: AtomicU64::new(1),
            logger,
            activo: AtomicBool::new(true),
        }
    }

    /// Inicia el name node: recarga el cache de ACL, abre los dos
    /// sockets de escucha, y lanza los aceptadores y el monitor de
    /// heartbeats.
    ///
    /// # Retorna
    /// - Tupla (direccion de storage, direccion de clientes) con los
    ///   puertos reales, NameNodeError si fallo alguna etapa critica
    pub fn iniciar(self: Arc<Self>) -> Result<(SocketAddr, SocketAddr), NameNodeError> {
        match cargar_cache(&self.acl, self.config.get_acl_cache()) {
            Ok(restauradas) => log_acl_restauradas(&self.logger, restauradas),
            Err(e) => self.logger.warn(&e.description, SIN_ORIGEN, SIN_USUARIO),
        }

        let ss_listener = TcpListener::bind(("0.0.0.0", self.config.get_puerto_storage()))
            .map_err(|e| NameNodeError::new_io_error("bind storage", &e, "INIT"))?;
        let cli_listener = TcpListener::bind(("0.0.0.0", self.config.get_puerto_cliente()))
            .map_err(|e| NameNodeError::new_io_error("bind clientes", &e, "INIT"))?;

        let ss_addr = ss_listener
            .local_addr()
            .map_err(|e| NameNodeError::new_io_error("local_addr", &e, "INIT"))?;
        let cli_addr = cli_listener
            .local_addr()
            .map_err(|e| NameNodeError::new_io_error("local_addr", &e, "INIT"))?;

        self.clone().aceptar_storage(ss_listener);
        self.clone().aceptar_clientes(cli_listener);
        self.clone().iniciar_monitor();

        log_nodo_iniciado(&self.logger, &ss_addr, &cli_addr);
        Ok((ss_addr, cli_addr))
    }

    /// Ciclo que acepta sesiones de clientes y delega cada una a su
    /// propio hilo manejador
    fn aceptar_clientes(self: Arc<Self>, listener: TcpListener) {
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

    /// Reescribe el cache de ACL; se invoca tras cada mutacion exitosa
    /// para que el estado persistido sobreviva a una caida abrupta
    pub(crate) fn persistir_acl(&self) {
        if let Err(e) = guardar_cache(&self.acl, self.config.get_acl_cache()) {
            self.logger.error(&e.description, SIN_ORIGEN, SIN_USUARIO);
        }
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

    // Consultas de estado expuestas para las pruebas de integracion

    pub fn cantidad_storage_activos(&self) -> usize {
        self.sesiones_storage.cantidad()
    }

    pub fn cantidad_archivos(&self) -> usize {
        self.ruteo.cantidad()
    }

    pub fn cantidad_clientes(&self) -> usize {
        self.sesiones_clientes.cantidad()
    }
}
