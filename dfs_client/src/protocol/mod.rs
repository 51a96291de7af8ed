pub mod frame;
pub mod respuesta;
pub mod verbos;
