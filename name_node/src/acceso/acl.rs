//! Este modulo contiene la tabla de control de acceso por archivo del
//! name node: un propietario fijo por archivo mas permisos de lectura
//! y escritura otorgables

use crate::node_error::NameNodeError;
use common::limites::{MAX_ARCHIVOS_POR_NODO, MAX_NODOS_STORAGE, MAX_USUARIOS};
use std::sync::Mutex;

/// Nivel de acceso de un usuario sobre un archivo. El orden del enum da
/// la jerarquia: propietario ≥ escritura ≥ lectura.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NivelAcceso {
    Lectura = 1,
    Escritura = 2,
    Propietario = 3,
}

impl NivelAcceso {
    /// Codificacion numerica usada en el cache persistido
    pub fn numero(&self) -> u8 {
        *self as u8
    }

    pub fn desde_numero(numero: u8) -> Option<NivelAcceso> {
        match numero {
            1 => Some(NivelAcceso::Lectura),
            2 => Some(NivelAcceso::Escritura),
            3 => Some(NivelAcceso::Propietario),
            _ => None,
        }
    }
}

/// ACL de un archivo: propietario mas lista de (usuario, nivel). El
/// propietario figura exactamente una vez en la lista, con nivel
/// Propietario.
#[derive(Debug, Clone)]
pub struct AclArchivo {
    pub archivo: String,
    pub propietario: String,
    pub entradas: Vec<(String, NivelAcceso)>,
}

/// Tabla de ACL del name node. La busqueda lineal alcanza a esta escala;
/// todas las mutaciones se serializan con el mutex de la tabla.
#[derive(Debug, Default)]
pub struct AclManager {
    entradas: Mutex<Vec<AclArchivo>>,
}

impl AclManager {
    pub fn new() -> Self {
        AclManager {
            entradas: Mutex::new(Vec::new()),
        }
    }

    /// Crea la ACL de un archivo nuevo con su propietario. Es
    /// idempotente si la ACL ya existe con el mismo propietario y
    /// rechaza un propietario distinto.
    ///
    /// # Parámetros
    /// * `archivo`: nombre del archivo
    /// * `propietario`: usuario creador
    ///
    /// # Retorna
    /// - () en caso de éxito, NameNodeError en otro caso
    pub fn agregar_archivo(&self, archivo: &str, propietario: &str) -> Result<(), NameNodeError> {
        let mut guard = self.lock()?;

        if let Some(acl) = guard.iter().find(|acl| acl.archivo == archivo) {
            if acl.propietario == propietario {
                return Ok(());
            }
            return Err(NameNodeError::new_acl_error("File already exists"));
        }

        if guard.len() >= MAX_ARCHIVOS_POR_NODO * MAX_NODOS_STORAGE {
            return Err(NameNodeError::new_acl_error("Maximum number of files reached"));
        }

        guard.push(AclArchivo {
            archivo: archivo.to_string(),
            propietario: propietario.to_string(),
            entradas: vec![(propietario.to_string(), NivelAcceso::Propietario)],
        });
        Ok(())
    }

    /// Otorga o actualiza el nivel de un usuario sobre un archivo. La
    /// entrada del propietario nunca se modifica.
    ///
    /// # Parámetros
    /// * `archivo`: nombre del archivo
    /// * `usuario`: usuario beneficiario
    /// * `nivel`: nivel a otorgar
    ///
    /// # Retorna
    /// - () en caso de éxito, NameNodeError en otro caso
    pub fn otorgar(
        &self,
        archivo: &str,
        usuario: &str,
        nivel: NivelAcceso,
    ) -> Result<(), NameNodeError> {
        let mut guard = self.lock()?;
        let acl = guard
            .iter_mut()
            .find(|acl| acl.archivo == archivo)
            .ok_or_else(|| NameNodeError::new_acl_error("File not found"))?;

        if let Some(entrada) = acl.entradas.iter_mut().find(|(u, _)| u == usuario) {
            if entrada.1 == NivelAcceso::Propietario {
                return Err(NameNodeError::new_acl_error("Cannot change owner access"));
            }
            entrada.1 = nivel;
            return Ok(());
        }

        if acl.entradas.len() >= MAX_USUARIOS {
            return Err(NameNodeError::new_acl_error("Maximum number of users reached"));
        }
        acl.entradas.push((usuario.to_string(), nivel));
        Ok(())
    }

    /// Revoca el acceso de un usuario. Revocar al propietario es un
    /// error; revocar a un usuario sin entrada no tiene efecto.
    ///
    /// # Parámetros
    /// * `archivo`: nombre del archivo
    /// * `usuario`: usuario a revocar
    ///
    /// # Retorna
    /// - () en caso de éxito, NameNodeError en otro caso
    pub fn revocar(&self, archivo: &str, usuario: &str) -> Result<(), NameNodeError> {
        let mut guard = self.lock()?;
        let acl = guard
            .iter_mut()
            .find(|acl| acl.archivo == archivo)
            .ok_or_else(|| NameNodeError::new_acl_error("File not found"))?;

        match acl.entradas.iter().position(|(u, _)| u == usuario) {
            Some(posicion) => {
                if acl.entradas[posicion].1 == NivelAcceso::Propietario {
                    return Err(NameNodeError::new_acl_error("Cannot revoke owner access"));
                }
                acl.entradas.remove(posicion);
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Determina si un usuario alcanza el nivel requerido sobre un
    /// archivo. Un archivo sin ACL no otorga acceso a nadie.
    pub fn verificar(&self, archivo: &str, usuario: &str, requerido: NivelAcceso) -> bool {
        let guard = match self.lock() {
            Ok(guard) => guard,
            Err(_) => return false,
        };
        guard
            .iter()
            .find(|acl| acl.archivo == archivo)
            .and_then(|acl| acl.entradas.iter().find(|(u, _)| u == usuario))
            .map(|(_, nivel)| *nivel >= requerido)
            .unwrap_or(false)
    }

    /// Propietario de un archivo, si tiene ACL
    pub fn propietario_de(&self, archivo: &str) -> Option<String> {
        let guard = self.lock().ok()?;
        guard
            .iter()
            .find(|acl| acl.archivo == archivo)
            .map(|acl| acl.propietario.clone())
    }

    pub fn es_propietario(&self, archivo: &str, usuario: &str) -> bool {
        self.propietario_de(archivo)
            .map(|propietario| propietario == usuario)
            .unwrap_or(false)
    }

    /// Elimina la ACL de un archivo borrado
    pub fn eliminar_archivo(&self, archivo: &str) {
        if let Ok(mut guard) = self.lock() {
            guard.retain(|acl| acl.archivo != archivo);
        }
    }

    /// Propietario, lectores y escritores de un archivo, para la seccion
    /// ACCESS de INFO. Los lectores incluyen a quienes tienen escritura.
    pub fn resumen_accesos(&self, archivo: &str) -> Option<(String, Vec<String>, Vec<String>)> {
        let guard = self.lock().ok()?;
        let acl = guard.iter().find(|acl| acl.archivo == archivo)?;

        let mut lectores = Vec::new();
        let mut escritores = Vec::new();
        for (usuario, nivel) in &acl.entradas {
            match nivel {
                NivelAcceso::Lectura => lectores.push(usuario.clone()),
                NivelAcceso::Escritura => {
                    lectores.push(usuario.clone());
                    escritores.push(usuario.clone());
                }
                NivelAcceso::Propietario => {}
            }
        }
        Some((acl.propietario.clone(), lectores, escritores))
    }

    /// Copia de toda la tabla, para persistirla
    pub fn snapshot(&self) -> Vec<AclArchivo> {
        self.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    pub fn cantidad(&self) -> usize {
        self.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<AclArchivo>>, NameNodeError> {
        self.entradas
            .lock()
            .map_err(|_| NameNodeError::new_lock_error("tabla de acl", "ACL"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orden_de_niveles() {
        assert!(NivelAcceso::Propietario > NivelAcceso::Escritura);
        assert!(NivelAcceso::Escritura > NivelAcceso::Lectura);
    }

    #[test]
    fn crear_acl_deja_al_propietario_como_unico_usuario() {
        let acl = AclManager::new();
        acl.agregar_archivo("a.txt", "alice").unwrap();
        assert!(acl.verificar("a.txt", "alice", NivelAcceso::Propietario));
        assert!(!acl.verificar("a.txt", "bob", NivelAcceso::Lectura));
    }

    #[test]
    fn crear_acl_es_idempotente_con_el_mismo_propietario() {
        let acl = AclManager::new();
        acl.agregar_archivo("a.txt", "alice").unwrap();
        assert!(acl.agregar_archivo("a.txt", "alice").is_ok());
        assert_eq!(acl.cantidad(), 1);
    }

    #[test]
    fn crear_acl_rechaza_otro_propietario() {
        let acl = AclManager::new();
        acl.agregar_archivo("a.txt", "alice").unwrap();
        assert!(acl.agregar_archivo("a.txt", "bob").is_err());
    }

    #[test]
    fn otorgar_y_verificar_jerarquia() {
        let acl = AclManager::new();
        acl.agregar_archivo("a.txt", "alice").unwrap();
        acl.otorgar("a.txt", "bob", NivelAcceso::Lectura).unwrap();
        acl.otorgar("a.txt", "carol", NivelAcceso::Escritura).unwrap();

        assert!(acl.verificar("a.txt", "bob", NivelAcceso::Lectura));
        assert!(!acl.verificar("a.txt", "bob", NivelAcceso::Escritura));
        assert!(acl.verificar("a.txt", "carol", NivelAcceso::Lectura));
        assert!(acl.verificar("a.txt", "carol", NivelAcceso::Escritura));
        assert!(!acl.verificar("a.txt", "carol", NivelAcceso::Propietario));
    }

    #[test]
    fn otorgar_dos_veces_es_idempotente() {
        let acl = AclManager::new();
        acl.agregar_archivo("a.txt", "alice").unwrap();
        acl.otorgar("a.txt", "bob", NivelAcceso::Lectura).unwrap();
        acl.otorgar("a.txt", "bob", NivelAcceso::Lectura).unwrap();

        let snapshot = acl.snapshot();
        let entradas = &snapshot[0].entradas;
        assert_eq!(entradas.iter().filter(|(u, _)| u == "bob").count(), 1);
    }

    #[test]
    fn otorgar_actualiza_el_nivel() {
        let acl = AclManager::new();
        acl.agregar_archivo("a.txt", "alice").unwrap();
        acl.otorgar("a.txt", "bob", NivelAcceso::Lectura).unwrap();
        acl.otorgar("a.txt", "bob", NivelAcceso::Escritura).unwrap();
        assert!(acl.verificar("a.txt", "bob", NivelAcceso::Escritura));
    }

    #[test]
    fn otorgar_no_degrada_al_propietario() {
        let acl = AclManager::new();
        acl.agregar_archivo("a.txt", "alice").unwrap();
        assert!(acl.otorgar("a.txt", "alice", NivelAcceso::Lectura).is_err());
        assert!(acl.verificar("a.txt", "alice", NivelAcceso::Propietario));
    }

    #[test]
    fn revocar_quita_el_acceso() {
        let acl = AclManager::new();
        acl.agregar_archivo("a.txt", "alice").unwrap();
        acl.otorgar("a.txt", "bob", NivelAcceso::Lectura).unwrap();
        acl.revocar("a.txt", "bob").unwrap();
        assert!(!acl.verificar("a.txt", "bob", NivelAcceso::Lectura));
    }

    #[test]
    fn revocar_al_propietario_es_error() {
        let acl = AclManager::new();
        acl.agregar_archivo("a.txt", "alice").unwrap();
        assert!(acl.revocar("a.txt", "alice").is_err());
        assert!(acl.verificar("a.txt", "alice", NivelAcceso::Propietario));
    }

    #[test]
    fn revocar_usuario_ausente_no_tiene_efecto() {
        let acl = AclManager::new();
        acl.agregar_archivo("a.txt", "alice").unwrap();
        assert!(acl.revocar("a.txt", "bob").is_ok());
        assert_eq!(acl.snapshot()[0].entradas.len(), 1);
    }

    #[test]
    fn exactamente_un_propietario_por_archivo() {
        let acl = AclManager::new();
        acl.agregar_archivo("a.txt", "alice").unwrap();
        acl.otorgar("a.txt", "bob", NivelAcceso::Escritura).unwrap();

        let snapshot = acl.snapshot();
        let propietarios = snapshot[0]
            .entradas
            .iter()
            .filter(|(_, nivel)| *nivel == NivelAcceso::Propietario)
            .count();
        assert_eq!(propietarios, 1);
    }

    #[test]
    fn resumen_de_accesos_para_info() {
        let acl = AclManager::new();
        acl.agregar_archivo("a.txt", "alice").unwrap();
        acl.otorgar("a.txt", "bob", NivelAcceso::Lectura).unwrap();
        acl.otorgar("a.txt", "carol", NivelAcceso::Escritura).unwrap();

        let (propietario, lectores, escritores) = acl.resumen_accesos("a.txt").unwrap();
        assert_eq!(propietario, "alice");
        assert_eq!(lectores, vec!["bob", "carol"]);
        assert_eq!(escritores, vec!["carol"]);
    }

    #[test]
    fn archivo_sin_acl_no_da_acceso() {
        let acl = AclManager::new();
        assert!(!acl.verificar("nope.txt", "alice", NivelAcceso::Lectura));
        assert!(acl.resumen_accesos("nope.txt").is_none());
    }
}
