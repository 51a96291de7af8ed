//! Este módulo contiene el monitor de vida de los nodos de storage:
//! manda sondas HEARTBEAT periodicas y declara caido a todo nodo que
//! lleve demasiado tiempo sin responder

use crate::node::NameNode;
use std::sync::Arc;
use std::thread::{sleep, spawn};
use std::time::Duration;

/// Cadencia del barrido del monitor
pub const INTERVALO_MONITOR: Duration = Duration::from_secs(5);
/// Silencio maximo tolerado antes de declarar caido un nodo
pub const TIMEOUT_HEARTBEAT: Duration = Duration::from_secs(15);

impl NameNode {
    /// Lanza el hilo del monitor. En cada vuelta envia una sonda
    /// HEARTBEAT a todos los nodos registrados y da de baja a los que
    /// superaron [`TIMEOUT_HEARTBEAT`] sin trafico.
    pub(crate) fn iniciar_monitor(self: Arc<Self>) {
        spawn(move || {
            loop {
                sleep(INTERVALO_MONITOR);
                if !self.esta_activo() {
                    break;
                }

                self.sesiones_storage.enviar_heartbeats(&self.logger);

                for id in self.sesiones_storage.vencidos(TIMEOUT_HEARTBEAT) {
                    self.manejar_falla(id);
                }
            }
        });
    }
}
