pub mod procesar_comandos;
pub mod reenvio;
