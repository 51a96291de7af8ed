//! Este modulo contiene el modelo de documento estructurado en oraciones
//! y palabras, con la insercion multi palabra que parte oraciones al
//! encontrar un delimitador

use super::documento_error::DocumentoError;
use super::{DocumentoResult, ruta_archivo};
use std::collections::VecDeque;
use std::fs;

/// Caracteres que terminan una oracion
pub const DELIMITADORES: [char; 3] = ['.', '!', '?'];

/// Una oracion: una secuencia ordenada de palabras mas un terminador
/// opcional. Solo la ultima oracion de un documento puede carecer de
/// terminador.
#[derive(Debug, Clone, PartialEq)]
pub struct Oracion {
    pub palabras: Vec<String>,
    pub terminador: Option<char>,
}

impl Oracion {
    pub fn vacia() -> Self {
        Oracion {
            palabras: Vec::new(),
            terminador: None,
        }
    }

    /// Renderiza la oracion: palabras unidas por un espacio, seguidas del
    /// terminador si lo hay
    pub fn a_string(&self) -> String {
        let mut texto = self.palabras.join(" ");
        if let Some(t) = self.terminador {
            texto.push(t);
        }
        texto
    }

    pub fn cantidad_palabras(&self) -> usize {
        self.palabras.len()
    }
}

/// Un documento: una secuencia ordenada de oraciones
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Documento {
    pub oraciones: Vec<Oracion>,
}

impl Documento {
    pub fn nuevo() -> Self {
        Documento {
            oraciones: Vec::new(),
        }
    }

    /// Parsea un texto serializado recorriendo el flujo de caracteres:
    /// cada delimitador cierra la oracion actual y el contenido final sin
    /// delimitador forma una ultima oracion sin terminar
    pub fn parsear(texto: &str) -> Documento {
        let mut oraciones = Vec::new();
        let mut actual = Oracion::vacia();
        let mut palabra = String::new();

        for c in texto.chars() {
            if DELIMITADORES.contains(&c) {
                if !palabra.is_empty() {
                    actual.palabras.push(std::mem::take(&mut palabra));
                }
                actual.terminador = Some(c);
                oraciones.push(actual);
                actual = Oracion::vacia();
            } else if c.is_whitespace() {
                if !palabra.is_empty() {
                    actual.palabras.push(std::mem::take(&mut palabra));
                }
            } else {
                palabra.push(c);
            }
        }

        if !palabra.is_empty() {
            actual.palabras.push(palabra);
        }
        if !actual.palabras.is_empty() {
            oraciones.push(actual);
        }

        Documento { oraciones }
    }

    /// Forma canonica: oraciones unidas por un salto de linea
    pub fn serializar(&self) -> String {
        self.oraciones
            .iter()
            .map(Oracion::a_string)
            .collect::<Vec<String>>()
            .join("\n")
    }

    /// Lee y parsea el archivo serializado del directorio de storage
    ///
    /// # Parámetros
    /// * `storage_dir`: directorio de storage del nodo
    /// * `nombre`: nombre del archivo
    ///
    /// # Retorna
    /// - Documento parseado, DocumentoError si el archivo no existe o
    ///   fallo la lectura
    pub fn cargar(storage_dir: &str, nombre: &str) -> DocumentoResult<Documento> {
        let ruta = ruta_archivo(storage_dir, nombre);
        if !ruta.exists() {
            return Err(DocumentoError::no_encontrado(nombre));
        }
        let texto = fs::read_to_string(ruta)?;
        Ok(Documento::parsear(&texto))
    }

    /// Escribe la forma serializada al directorio de storage. El llamador
    /// serializa las escrituras de un mismo archivo mediante el mutex de
    /// storage del nodo.
    pub fn guardar(&self, storage_dir: &str, nombre: &str) -> DocumentoResult<()> {
        let ruta = ruta_archivo(storage_dir, nombre);
        fs::write(ruta, self.serializar())?;
        Ok(())
    }

    pub fn cantidad_oraciones(&self) -> usize {
        self.oraciones.len()
    }

    pub fn cantidad_palabras(&self) -> usize {
        self.oraciones.iter().map(Oracion::cantidad_palabras).sum()
    }

    /// Todas las palabras del documento en orden de lectura
    pub fn todas_las_palabras(&self) -> Vec<String> {
        self.oraciones
            .iter()
            .flat_map(|o| o.palabras.iter().cloned())
            .collect()
    }

    /// Determina si `oracion` es un destino de insercion valido: una
    /// oracion existente, o la posicion `len` cuando el documento esta
    /// vacio o su ultima oracion ya esta terminada
    pub fn indice_valido_para_insercion(&self, oracion: usize) -> bool {
        if oracion < self.oraciones.len() {
            return true;
        }
        if oracion == self.oraciones.len() {
            return self
                .oraciones
                .last()
                .map(|o| o.terminador.is_some())
                .unwrap_or(true);
        }
        false
    }

    /// Inserta `texto` (tokenizado por espacios) en la oracion `oracion`,
    /// inmediatamente antes de la palabra `palabra` (o al final cuando
    /// `palabra` es la cantidad de palabras de la oracion).
    ///
    /// Cuando un token contiene un delimitador, la insercion parte la
    /// oracion: el delimitador termina la oracion actual, las palabras que
    /// estaban despues del punto de insercion pasan a encabezar una nueva
    /// oracion que hereda el terminador original, y si esa cola heredo un
    /// terminador y quedan tokens por insertar se interpone una oracion
    /// vacia que recibe la continuacion. El texto que sigue al delimitador
    /// dentro del mismo token se trata como un token nuevo.
    ///
    /// # Retorna
    /// - Indice de la oracion donde quedo el ultimo token insertado,
    ///   DocumentoError si algun indice es invalido
    pub fn insertar_palabras(
        &mut self,
        oracion: usize,
        palabra: usize,
        texto: &str,
    ) -> DocumentoResult<usize> {
        if !self.indice_valido_para_insercion(oracion) {
            return Err(DocumentoError::oracion_fuera_de_rango(oracion));
        }
        if oracion == self.oraciones.len() {
            self.oraciones.push(Oracion::vacia());
        }
        if palabra > self.oraciones[oracion].palabras.len() {
            return Err(DocumentoError::palabra_fuera_de_rango(palabra));
        }

        let mut idx = oracion;
        let mut pos = palabra;
        let mut ultima = oracion;

        let mut pendientes: VecDeque<String> =
            texto.split_whitespace().map(String::from).collect();

        while let Some(token) = pendientes.pop_front() {
            let delim_pos = token.find(DELIMITADORES);
            match delim_pos {
                None => {
                    self.oraciones[idx].palabras.insert(pos, token);
                    ultima = idx;
                    pos += 1;
                }
                Some(dpos) => {
                    let delim = token.as_bytes()[dpos] as char;
                    let parte = &token[..dpos];
                    let resto = &token[dpos + 1..];

                    if !parte.is_empty() {
                        self.oraciones[idx].palabras.insert(pos, parte.to_string());
                        ultima = idx;
                        pos += 1;
                    }
                    if !resto.is_empty() {
                        pendientes.push_front(resto.to_string());
                    }
                    let hay_continuacion = !pendientes.is_empty();

                    let terminador_viejo = self.oraciones[idx].terminador;
                    self.oraciones[idx].terminador = Some(delim);
                    let desplazadas = self.oraciones[idx].palabras.split_off(pos);

                    if desplazadas.is_empty() && !hay_continuacion {
                        // nada que desplazar ni continuar: la oracion quedo
                        // cerrada con el nuevo delimitador
                        break;
                    }

                    if terminador_viejo.is_some() && hay_continuacion {
                        // la cola desplazada conserva su terminador: se
                        // interpone una oracion vacia para la continuacion
                        self.oraciones.insert(idx + 1, Oracion::vacia());
                        self.oraciones.insert(
                            idx + 2,
                            Oracion {
                                palabras: desplazadas,
                                terminador: terminador_viejo,
                            },
                        );
                    } else {
                        self.oraciones.insert(
                            idx + 1,
                            Oracion {
                                palabras: desplazadas,
                                terminador: terminador_viejo,
                            },
                        );
                    }
                    idx += 1;
                    pos = 0;
                }
            }
        }

        Ok(ultima)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documento::documento_error::DocumentoErrorKind;

    fn doc(texto: &str) -> Documento {
        Documento::parsear(texto)
    }

    #[test]
    fn parsear_documento_vacio() {
        assert_eq!(doc("").cantidad_oraciones(), 0);
    }

    #[test]
    fn parsear_oracion_sin_terminador() {
        let d = doc("one two three");
        assert_eq!(d.cantidad_oraciones(), 1);
        assert_eq!(d.oraciones[0].palabras, vec!["one", "two", "three"]);
        assert_eq!(d.oraciones[0].terminador, None);
    }

    #[test]
    fn parsear_varias_oraciones() {
        let d = doc("Hello world.\nHow are you?\nfinal line");
        assert_eq!(d.cantidad_oraciones(), 3);
        assert_eq!(d.oraciones[0].terminador, Some('.'));
        assert_eq!(d.oraciones[1].terminador, Some('?'));
        assert_eq!(d.oraciones[2].terminador, None);
    }

    #[test]
    fn parsear_delimitador_dentro_de_un_token() {
        let d = doc("one big.shiny two");
        assert_eq!(d.cantidad_oraciones(), 2);
        assert_eq!(d.oraciones[0].a_string(), "one big.");
        assert_eq!(d.oraciones[1].a_string(), "shiny two");
    }

    #[test]
    fn serializar_es_inverso_de_parsear() {
        let texto = "Hello world.\nHow are you?\nbye";
        assert_eq!(doc(texto).serializar(), texto);
    }

    #[test]
    fn serializar_normaliza_espacios() {
        assert_eq!(doc("a   b.  c").serializar(), "a b.\nc");
    }

    #[test]
    fn insertar_en_documento_vacio_materializa_oracion() {
        let mut d = Documento::nuevo();
        let idx = d.insertar_palabras(0, 0, "Hello world.").unwrap();
        assert_eq!(idx, 0);
        assert_eq!(d.serializar(), "Hello world.");
    }

    #[test]
    fn insertar_al_final_de_una_oracion() {
        let mut d = doc("one two");
        d.insertar_palabras(0, 2, "three").unwrap();
        assert_eq!(d.serializar(), "one two three");
    }

    #[test]
    fn insertar_al_principio() {
        let mut d = doc("two three");
        d.insertar_palabras(0, 0, "one").unwrap();
        assert_eq!(d.serializar(), "one two three");
    }

    #[test]
    fn insertar_nueva_oracion_al_final_del_documento() {
        let mut d = doc("first one.");
        let idx = d.insertar_palabras(1, 0, "second one").unwrap();
        assert_eq!(idx, 1);
        assert_eq!(d.serializar(), "first one.\nsecond one");
    }

    #[test]
    fn append_rechazado_si_la_ultima_oracion_no_termino() {
        let mut d = doc("open sentence");
        let err = d.insertar_palabras(1, 0, "more").unwrap_err();
        assert_eq!(err.kind, DocumentoErrorKind::OracionFueraDeRango);
    }

    #[test]
    fn indice_de_oracion_fuera_de_rango() {
        let mut d = doc("one two.");
        let err = d.insertar_palabras(5, 0, "x").unwrap_err();
        assert_eq!(err.kind, DocumentoErrorKind::OracionFueraDeRango);
    }

    #[test]
    fn indice_de_palabra_fuera_de_rango() {
        let mut d = doc("one two.");
        let err = d.insertar_palabras(0, 3, "x").unwrap_err();
        assert_eq!(err.kind, DocumentoErrorKind::PalabraFueraDeRango);
    }

    #[test]
    fn split_por_delimitador_desplaza_la_cola() {
        // escenario de escritura basico con delimitador en el medio:
        // "one two three" + "big. shiny" en la posicion 1
        let mut d = doc("one two three");
        let idx = d.insertar_palabras(0, 1, "big. shiny").unwrap();
        assert_eq!(idx, 1);
        assert_eq!(d.cantidad_oraciones(), 2);
        assert_eq!(d.oraciones[0].a_string(), "one big.");
        assert_eq!(d.oraciones[1].a_string(), "shiny two three");
    }

    #[test]
    fn split_sin_continuacion_no_crea_oracion_vacia() {
        let mut d = doc("one two three");
        let idx = d.insertar_palabras(0, 3, "four.").unwrap();
        assert_eq!(idx, 0);
        assert_eq!(d.serializar(), "one two three four.");
    }

    #[test]
    fn el_terminador_migra_con_la_cola_desplazada() {
        let mut d = doc("one two three.");
        d.insertar_palabras(0, 1, "big!").unwrap();
        assert_eq!(d.oraciones[0].a_string(), "one big!");
        assert_eq!(d.oraciones[1].a_string(), "two three.");
    }

    #[test]
    fn cola_terminada_con_continuacion_interpone_oracion() {
        // la cola desplazada conserva '.'; la continuacion "shiny" debe
        // quedar en una oracion propia entre ambas
        let mut d = doc("one two three.");
        let idx = d.insertar_palabras(0, 1, "big! shiny").unwrap();
        assert_eq!(idx, 1);
        assert_eq!(d.oraciones[0].a_string(), "one big!");
        assert_eq!(d.oraciones[1].a_string(), "shiny");
        assert_eq!(d.oraciones[2].a_string(), "two three.");
    }

    #[test]
    fn resto_despues_del_delimitador_encabeza_la_continuacion() {
        let mut d = doc("one two three");
        let idx = d.insertar_palabras(0, 1, "big.shiny").unwrap();
        assert_eq!(idx, 1);
        assert_eq!(d.oraciones[0].a_string(), "one big.");
        assert_eq!(d.oraciones[1].a_string(), "shiny two three");
    }

    #[test]
    fn la_secuencia_de_palabras_se_preserva() {
        // propiedad: insertar tokens en (s, w) preserva el orden global
        let mut d = doc("one two three.\nfour five");
        let antes = d.todas_las_palabras();
        d.insertar_palabras(1, 1, "alpha beta. gamma").unwrap();
        let despues = d.todas_las_palabras();

        let mut esperado = antes.clone();
        let base = 3 + 1; // palabras de la primera oracion + offset en la segunda
        for (i, palabra) in ["alpha", "beta", "gamma"].iter().enumerate() {
            esperado.insert(base + i, palabra.to_string());
        }
        assert_eq!(despues, esperado);
    }

    #[test]
    fn solo_la_ultima_oracion_puede_quedar_sin_terminador() {
        let d = doc("one two.\nthree four!\nfive");
        for (i, oracion) in d.oraciones.iter().enumerate() {
            if i + 1 < d.cantidad_oraciones() {
                assert!(oracion.terminador.is_some());
            }
        }
    }

    #[test]
    fn cargar_y_guardar_en_disco() {
        let dir = std::env::temp_dir().join(format!("doc_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let dir = dir.to_str().unwrap().to_string();

        let d = doc("Hello world.\nbye");
        d.guardar(&dir, "x.txt").unwrap();
        let releido = Documento::cargar(&dir, "x.txt").unwrap();
        assert_eq!(releido, d);

        let err = Documento::cargar(&dir, "missing.txt").unwrap_err();
        assert_eq!(err.kind, DocumentoErrorKind::NoEncontrado);
        std::fs::remove_dir_all(&dir).unwrap_or_default();
    }
}
