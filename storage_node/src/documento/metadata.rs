//! Este modulo contiene la metadata persistida junto a cada archivo
//! del nodo de storage

use super::document::DELIMITADORES;
use super::documento_error::{DocumentoError, DocumentoErrorKind};
use super::{DocumentoResult, ruta_metadata};
use std::fs;

/// Formato con el que se persisten y muestran los timestamps
const FORMATO_TIEMPO: &str = "%Y-%m-%d %H:%M:%S";

/// Metadata de un archivo: propietario, tamanio, conteos y timestamps.
/// Se persiste como texto `clave=valor` en `<nombre>.meta`.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub nombre: String,
    pub propietario: String,
    pub tam: u64,
    pub palabras: usize,
    pub caracteres: usize,
    pub oraciones: usize,
    pub creado: String,
    pub modificado: String,
    pub accedido: String,
}

impl Metadata {
    /// Crea la metadata de un archivo recien creado, con los tres
    /// timestamps en el instante actual
    pub fn nueva(nombre: &str, propietario: &str) -> Self {
        let momento = ahora();
        Metadata {
            nombre: nombre.to_string(),
            propietario: propietario.to_string(),
            tam: 0,
            palabras: 0,
            caracteres: 0,
            oraciones: 0,
            creado: momento.clone(),
            modificado: momento.clone(),
            accedido: momento,
        }
    }

    /// Lee la metadata desde `<nombre>.meta`
    ///
    /// # Retorna
    /// - Metadata parseada, DocumentoError si no existe o esta malformada
    pub fn cargar(storage_dir: &str, nombre: &str) -> DocumentoResult<Metadata> {
        let ruta = ruta_metadata(storage_dir, nombre);
        if !ruta.exists() {
            return Err(DocumentoError::no_encontrado(nombre));
        }
        let texto = fs::read_to_string(ruta)?;

        let mut metadata = Metadata::nueva(nombre, "");
        for linea in texto.lines() {
            if linea.trim().is_empty() {
                continue;
            }
            let (clave, valor) = linea.split_once('=').ok_or_else(|| {
                DocumentoError::new(
                    format!("malformed metadata line: {linea}"),
                    DocumentoErrorKind::Formato,
                )
            })?;
            match clave {
                "nombre" => metadata.nombre = valor.to_string(),
                "propietario" => metadata.propietario = valor.to_string(),
                "tam" => metadata.tam = parsear_numero(valor)?,
                "palabras" => metadata.palabras = parsear_numero(valor)? as usize,
                "caracteres" => metadata.caracteres = parsear_numero(valor)? as usize,
                "oraciones" => metadata.oraciones = parsear_numero(valor)? as usize,
                "creado" => metadata.creado = valor.to_string(),
                "modificado" => metadata.modificado = valor.to_string(),
                "accedido" => metadata.accedido = valor.to_string(),
                _ => {}
            }
        }
        Ok(metadata)
    }

    /// Persiste la metadata en `<nombre>.meta`
    pub fn guardar(&self, storage_dir: &str) -> DocumentoResult<()> {
        let ruta = ruta_metadata(storage_dir, &self.nombre);
        let texto = format!(
            "nombre={}\npropietario={}\ntam={}\npalabras={}\ncaracteres={}\noraciones={}\ncreado={}\nmodificado={}\naccedido={}\n",
            self.nombre,
            self.propietario,
            self.tam,
            self.palabras,
            self.caracteres,
            self.oraciones,
            self.creado,
            self.modificado,
            self.accedido,
        );
        fs::write(ruta, texto)?;
        Ok(())
    }

    /// Recalcula tamanio y conteos a partir del contenido serializado.
    /// Un contenido con palabras pero sin delimitadores cuenta como una
    /// unica oracion.
    pub fn actualizar_estadisticas(&mut self, contenido: &str) {
        self.tam = contenido.len() as u64;
        self.caracteres = contenido.len();
        self.palabras = contenido.split_whitespace().count();
        self.oraciones = contenido
            .chars()
            .filter(|c| DELIMITADORES.contains(c))
            .count();
        if self.oraciones == 0 && self.palabras > 0 {
            self.oraciones = 1;
        }
    }

    /// Actualiza el timestamp de ultimo acceso
    pub fn marcar_accedido(&mut self) {
        self.accedido = ahora();
    }

    /// Actualiza el timestamp de ultima modificacion
    pub fn marcar_modificado(&mut self) {
        self.modificado = ahora();
    }

    /// Bloque legible por humanos devuelto por INFO. Las etiquetas
    /// `Filename:`, `Owner:`, `Words:`, `Characters:` y `Accessed:` son
    /// parte del contrato con los clientes existentes.
    pub fn bloque_info(&self) -> Vec<String> {
        vec![
            format!("Filename: {}", self.nombre),
            format!("Owner: {}", self.propietario),
            format!("Size: {} bytes", self.tam),
            format!("Words: {}", self.palabras),
            format!("Characters: {}", self.caracteres),
            format!("Sentences: {}", self.oraciones),
            format!("Created: {}", self.creado),
            format!("Modified: {}", self.modificado),
            format!("Accessed: {}", self.accedido),
        ]
    }
}

/// Instante actual con el formato de los timestamps de metadata
fn ahora() -> String {
    chrono::Local::now().format(FORMATO_TIEMPO).to_string()
}

fn parsear_numero(valor: &str) -> DocumentoResult<u64> {
    valor.parse::<u64>().map_err(|_| {
        DocumentoError::new(
            format!("malformed metadata number: {valor}"),
            DocumentoErrorKind::Formato,
        )
    })
}
