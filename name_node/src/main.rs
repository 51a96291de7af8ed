use name_node::config::Config;
use name_node::node::NameNode;
use std::process::exit;
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

/// Punto de entrada del name node.
///
/// Argumentos con formato `clave=valor`:
/// - `ss_port`: puerto donde se registran los nodos de storage (obligatorio)
/// - `client_port`: puerto donde se conectan los clientes (obligatorio)
/// - `log_file`: archivo de log del proceso
/// - `acl_cache`: archivo de cache de la tabla de ACL
///
/// # Uso
/// ```bash
/// ./name_node ss_port=9000 client_port=9001
/// ```
fn main() {
    let args = std::env::args().collect::<Vec<String>>();
    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error al cargar la configuración: {e}");
            eprintln!("Uso: {} ss_port=<puerto> client_port=<puerto>", args[0]);
            exit(1);
        }
    };

    let nodo = Arc::new(NameNode::new(config));
    let (ss_addr, cli_addr) = match nodo.clone().iniciar() {
        Ok(direcciones) => direcciones,
        Err(e) => {
            eprintln!("Error al iniciar el name node: {e}");
            exit(1);
        }
    };

    println!("Name node listening: storage on {ss_addr:?}, clients on {cli_addr:?}");
    println!("-----------------------------------");
    loop {
        sleep(Duration::from_secs(60));
    }
}
