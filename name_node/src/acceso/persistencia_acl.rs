//! Este modulo contiene la persistencia de la tabla de ACL como cache
//! de texto: una linea `archivo|propietario|usuario:nivel,usuario:nivel`
//! por archivo

use crate::acceso::acl::{AclManager, NivelAcceso};
use crate::node_error::NameNodeError;
use std::fs;
use std::path::Path;

/// Escribe la tabla completa al archivo de cache
///
/// # Parámetros
/// * `manager`: tabla de ACL a persistir
/// * `ruta`: archivo de cache
///
/// # Retorna
/// - Cantidad de entradas escritas, NameNodeError si fallo la escritura
pub fn guardar_cache(manager: &AclManager, ruta: &str) -> Result<usize, NameNodeError> {
    let snapshot = manager.snapshot();
    let mut contenido = String::new();

    for acl in &snapshot {
        let pares: Vec<String> = acl
            .entradas
            .iter()
            .map(|(usuario, nivel)| format!("{usuario}:{}", nivel.numero()))
            .collect();
        contenido.push_str(&format!(
            "{}|{}|{}\n",
            acl.archivo,
            acl.propietario,
            pares.join(",")
        ));
    }

    fs::write(ruta, contenido)
        .map_err(|e| NameNodeError::new_io_error("guardar cache de acl", &e, "ACL"))?;
    Ok(snapshot.len())
}

/// Reconstruye la tabla desde el archivo de cache. Un cache inexistente
/// no es un error; las lineas malformadas se saltean.
///
/// # Parámetros
/// * `manager`: tabla de ACL a poblar
/// * `ruta`: archivo de cache
///
/// # Retorna
/// - Cantidad de entradas restauradas
pub fn cargar_cache(manager: &AclManager, ruta: &str) -> Result<usize, NameNodeError> {
    if !Path::new(ruta).exists() {
        return Ok(0);
    }
    let contenido = fs::read_to_string(ruta)
        .map_err(|e| NameNodeError::new_io_error("cargar cache de acl", &e, "ACL"))?;

    let mut restauradas = 0;
    for linea in contenido.lines() {
        if linea.trim().is_empty() {
            continue;
        }
        let mut partes = linea.splitn(3, '|');
        let (archivo, propietario) = match (partes.next(), partes.next()) {
            (Some(archivo), Some(propietario)) if !archivo.is_empty() => (archivo, propietario),
            _ => continue,
        };

        if manager.agregar_archivo(archivo, propietario).is_err() {
            continue;
        }

        if let Some(pares) = partes.next() {
            for par in pares.split(',').filter(|p| !p.is_empty()) {
                let (usuario, numero) = match par.split_once(':') {
                    Some((usuario, numero)) => (usuario, numero),
                    None => continue,
                };
                if usuario == propietario {
                    continue;
                }
                let nivel = numero
                    .parse::<u8>()
                    .ok()
                    .and_then(NivelAcceso::desde_numero);
                if let Some(nivel) = nivel {
                    if nivel != NivelAcceso::Propietario {
                        let _ = manager.otorgar(archivo, usuario, nivel);
                    }
                }
            }
        }
        restauradas += 1;
    }
    Ok(restauradas)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ruta_temporal(nombre: &str) -> String {
        std::env::temp_dir()
            .join(format!("acl_cache_{}_{}", nombre, std::process::id()))
            .to_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn guardar_y_recargar_la_tabla() {
        let ruta = ruta_temporal("roundtrip");
        let acl = AclManager::new();
        acl.agregar_archivo("a.txt", "alice").unwrap();
        acl.otorgar("a.txt", "bob", NivelAcceso::Lectura).unwrap();
        acl.agregar_archivo("b.txt", "carol").unwrap();
        acl.otorgar("b.txt", "alice", NivelAcceso::Escritura).unwrap();

        assert_eq!(guardar_cache(&acl, &ruta).unwrap(), 2);

        let recargada = AclManager::new();
        assert_eq!(cargar_cache(&recargada, &ruta).unwrap(), 2);
        assert!(recargada.verificar("a.txt", "alice", NivelAcceso::Propietario));
        assert!(recargada.verificar("a.txt", "bob", NivelAcceso::Lectura));
        assert!(!recargada.verificar("a.txt", "bob", NivelAcceso::Escritura));
        assert!(recargada.verificar("b.txt", "alice", NivelAcceso::Escritura));

        std::fs::remove_file(&ruta).unwrap_or_default();
    }

    #[test]
    fn cache_inexistente_no_es_error() {
        let acl = AclManager::new();
        assert_eq!(cargar_cache(&acl, "/tmp/no_existe_acl_cache_x").unwrap(), 0);
    }

    #[test]
    fn lineas_malformadas_se_saltean() {
        let ruta = ruta_temporal("malformado");
        std::fs::write(&ruta, "sin_pipes\na.txt|alice|alice:3\n\n").unwrap();

        let acl = AclManager::new();
        assert_eq!(cargar_cache(&acl, &ruta).unwrap(), 1);
        assert!(acl.es_propietario("a.txt", "alice"));

        std::fs::remove_file(&ruta).unwrap_or_default();
    }
}
