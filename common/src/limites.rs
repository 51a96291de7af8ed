//! Limites globales del sistema de archivos distribuido

/// Largo maximo de un nombre de archivo
pub const MAX_NOMBRE_ARCHIVO: usize = 255;
/// Largo maximo de un nombre de usuario
pub const MAX_NOMBRE_USUARIO: usize = 63;
/// Largo maximo de una oracion serializada, en bytes
pub const MAX_LARGO_ORACION: usize = 2048;
/// Largo maximo de una palabra, en bytes
pub const MAX_LARGO_PALABRA: usize = 256;
/// Tamanio maximo de un documento serializado, en bytes
pub const MAX_TAM_DOCUMENTO: usize = 16 * 1024;
/// Cantidad maxima de archivos por nodo de storage
pub const MAX_ARCHIVOS_POR_NODO: usize = 1000;
/// Cantidad maxima de nodos de storage registrados
pub const MAX_NODOS_STORAGE: usize = 50;
/// Cantidad maxima de usuarios conectados
pub const MAX_USUARIOS: usize = 500;
