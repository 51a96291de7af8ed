pub mod escritura;
pub mod procesar_comandos;
