pub mod log_mensajes;
