//! Este modulo contiene el registro de nodos de storage vivos del name
//! node, con su socket de control y su ultimo heartbeat

use crate::node_error::NameNodeError;
use common::limites::MAX_NODOS_STORAGE;
use dfs_client::protocol::frame::escribir_frame;
use dfs_client::protocol::verbos::CMD_HEARTBEAT;
use logger::logger::{Logger, SIN_USUARIO};
use std::collections::HashMap;
use std::net::TcpStream;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Registro de membresia de un nodo de storage
#[derive(Debug)]
pub struct SesionStorage {
    pub id: u64,
    pub ip: String,
    pub puerto_cliente: u16,
    /// Socket de control, usado para enviar las sondas HEARTBEAT
    pub stream: TcpStream,
    pub ultimo_heartbeat: Instant,
}

/// Lista de membresia de los nodos de storage, indexada por el
/// identificador monotonico que asigna el name node
#[derive(Debug, Default)]
pub struct SesionesStorage {
    entradas: Mutex<HashMap<u64, SesionStorage>>,
}

impl SesionesStorage {
    pub fn new() -> Self {
        SesionesStorage {
            entradas: Mutex::new(HashMap::new()),
        }
    }

    /// Registra un nodo recien presentado
    ///
    /// # Retorna
    /// - () en caso de éxito, NameNodeError si se alcanzo la capacidad
    pub fn agregar(&self, sesion: SesionStorage) -> Result<(), NameNodeError> {
        let mut guard = self.lock()?;
        if guard.len() >= MAX_NODOS_STORAGE {
            return Err(NameNodeError::new_sesion_error(
                "Maximum number of storage servers reached",
            ));
        }
        guard.insert(sesion.id, sesion);
        Ok(())
    }

    /// Da de baja un nodo
    ///
    /// # Retorna
    /// - La sesion eliminada, si existia
    pub fn eliminar(&self, id: u64) -> Option<SesionStorage> {
        let mut guard = self.lock().ok()?;
        guard.remove(&id)
    }

    /// Refresca el ultimo heartbeat de un nodo ante trafico entrante
    pub fn actualizar_heartbeat(&self, id: u64) {
        if let Ok(mut guard) = self.lock() {
            if let Some(sesion) = guard.get_mut(&id) {
                sesion.ultimo_heartbeat = Instant::now();
            }
        }
    }

    /// Direccion cliente (ip, puerto) de un nodo vivo, para redirigir
    pub fn direccion_cliente(&self, id: u64) -> Option<(String, u16)> {
        let guard = self.lock().ok()?;
        guard
            .get(&id)
            .map(|sesion| (sesion.ip.clone(), sesion.puerto_cliente))
    }

    /// Identificadores vivos en orden estable, para el round robin
    pub fn ids_activos(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = match self.lock() {
            Ok(guard) => guard.keys().copied().collect(),
            Err(_) => Vec::new(),
        };
        ids.sort();
        ids
    }

    pub fn cantidad(&self) -> usize {
        self.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Envia una sonda HEARTBEAT a cada nodo registrado
    pub fn enviar_heartbeats(&self, logger: &Logger) {
        if let Ok(guard) = self.lock() {
            for sesion in guard.values() {
                let mut stream = &sesion.stream;
                if let Err(e) = escribir_frame(&mut stream, CMD_HEARTBEAT) {
                    let msg = format!("Failed to probe SS#{}: {e}", sesion.id);
                    logger.warn(&msg, &sesion.ip, SIN_USUARIO);
                }
            }
        }
    }

    /// Nodos cuyo ultimo heartbeat es mas viejo que `limite`
    pub fn vencidos(&self, limite: Duration) -> Vec<u64> {
        match self.lock() {
            Ok(guard) => guard
                .values()
                .filter(|sesion| sesion.ultimo_heartbeat.elapsed() > limite)
                .map(|sesion| sesion.id)
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<u64, SesionStorage>>, NameNodeError> {
        self.entradas
            .lock()
            .map_err(|_| NameNodeError::new_lock_error("sesiones de storage", "SS_SESSION"))
    }
}
