use std::process::exit;
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;
use storage_node::config::Config;
use storage_node::node::StorageNode;

/// Punto de entrada del nodo de storage.
///
/// Argumentos con formato `clave=valor`:
/// - `storage_dir`: directorio donde persistir archivos y metadata (obligatorio)
/// - `client_port`: puerto donde atender clientes (obligatorio)
/// - `nm_addr`: direccion del name node (por defecto 127.0.0.1:9000)
/// - `public_ip`: ip anunciada en el registro (por defecto 127.0.0.1)
/// - `log_file`: archivo de log del nodo
/// - `stream_delay_ms`: retardo entre palabras de un STREAM
///
/// # Uso
/// ```bash
/// ./storage_node storage_dir=./storage1 client_port=9100 nm_addr=127.0.0.1:9000
/// ```
fn main() {
    let args = std::env::args().collect::<Vec<String>>();
    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error al cargar la configuración: {e}");
            eprintln!(
                "Uso: {} storage_dir=<dir> client_port=<puerto> [nm_addr=ip:puerto]",
                args[0]
            );
            exit(1);
        }
    };

    let nodo = Arc::new(StorageNode::new(config));
    let addr = match nodo.clone().iniciar() {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("Error al iniciar el nodo de storage: {e}");
            exit(1);
        }
    };

    println!("Storage node listening on {addr:?}");
    println!("-----------------------------------");
    loop {
        sleep(Duration::from_secs(60));
    }
}
