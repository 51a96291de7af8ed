//! Este modulo contiene la implementacion de la estructura logger,
//! encargada de registrar mensajes al archivo de log de cada nodo
//! del sistema de archivos distribuido
use chrono;
use std::{
    fs::OpenOptions,
    io::Write,
    sync::mpsc::{Receiver, Sender, channel},
    thread::spawn,
};

/// Origen por defecto cuando el mensaje no proviene de una conexion
pub const SIN_ORIGEN: &str = "-";
/// Usuario por defecto cuando el mensaje no esta asociado a un usuario
pub const SIN_USUARIO: &str = "-";

/// Struct to hold the logger sender
#[derive(Debug, Clone)]
pub struct Logger {
    /// Sender to send log messages
    pub logger: Sender<String>,
}

impl Logger {
    /// Constructor de la estructura.
    /// Mueve la escritura de mensaje a un hilo, permitiendo
    /// recibir mensajes y escribir simultaneamente
    /// # Parametros
    /// * `filename`: nombre del archivo donde escribir los mensajes
    pub fn new(filename: &str) -> Logger {
        let (logger, receiver) = channel();
        let filename = filename.to_string();

        spawn(move || {
            write_to_file(&filename, receiver);
        });

        Logger { logger }
    }

    pub fn null() -> Self {
        let (sender, receiver) = channel::<String>();
        spawn(move || for _ in receiver {});
        Self { logger: sender }
    }

    /// Registra un mensaje de tipo info
    /// # Parametros
    /// * `message`: mensaje a registrar
    /// * `origen`: direccion ip:puerto de la conexion asociada al mensaje
    /// * `usuario`: usuario asociado al mensaje
    pub fn info(&self, message: &str, origen: &str, usuario: &str) {
        self.registrar("INFO", message, origen, usuario);
    }

    /// Registra un mensaje de tipo error
    /// # Parametros
    /// * `message`: mensaje a registrar
    /// * `origen`: direccion ip:puerto de la conexion donde se produjo el error
    /// * `usuario`: usuario asociado al mensaje
    pub fn error(&self, message: &str, origen: &str, usuario: &str) {
        self.registrar("ERROR", message, origen, usuario);
    }

    /// Registra un mensaje de tipo warning
    /// # Parametros
    /// * `message`: mensaje a registrar
    /// * `origen`: direccion ip:puerto de la conexion asociada al mensaje
    /// * `usuario`: usuario asociado al mensaje
    pub fn warn(&self, message: &str, origen: &str, usuario: &str) {
        self.registrar("WARNING", message, origen, usuario);
    }

    /// Registra un mensaje de tipo DEBUG
    /// # Parametros
    /// * `message`: mensaje a registrar
    /// * `origen`: direccion ip:puerto de la conexion asociada al mensaje
    /// * `usuario`: usuario asociado al mensaje
    pub fn debug(&self, message: &str, origen: &str, usuario: &str) {
        self.registrar("DEBUG", message, origen, usuario);
    }

    /// Arma la linea de log con formato
    /// `[timestamp] [nivel] [ip:puerto] [usuario] mensaje`
    /// y la envia por el canal del logger
    fn registrar(&self, nivel: &str, message: &str, origen: &str, usuario: &str) {
        let now = chrono::Local::now();
        let timestamp = now.format("%Y-%m-%d %H:%M:%S").to_string();
        let log_message = format!("[{timestamp}] [{nivel}] [{origen}] [{usuario}] {message}");
        self.log(log_message.as_str());
    }

    /// Envia un mensaje por el canal del logger
    /// # Parametros
    /// * `message`: mensaje a registrar
    fn log(&self, log_message: &str) {
        match self.logger.send(log_message.to_string()) {
            Ok(_) => {}
            Err(_) => {
                eprintln!("Error sending log message");
            }
        }
    }
}

/// Recibe mensajes y los escribe en un archivo con el nombre recibido por
/// parametro
///
/// # Parametros
/// * `filename`: nombre del archivo a crear para registrar los mensajes
/// * `reciever`: extremo de recepcion del canal que comparte con la
///   estructura principal por donde recibe los mensajes
fn write_to_file(filename: &str, receiver: Receiver<String>) {
    let file = OpenOptions::new().create(true).append(true).open(filename);

    let mut file = match file {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Error opening log file: {e}");
            return;
        }
    };

    for message in receiver {
        if let Err(e) = writeln!(file, "{message}") {
            eprintln!("Error writing to log file: {e}");
        }
    }
}
