use dfs_client::driver::dfs_driver::NameNodeDriver;
use name_node::config::Config as ConfigNameNode;
use name_node::node::NameNode;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use storage_node::config::Config as ConfigStorage;
use storage_node::node::StorageNode;

/// Distingue los recursos temporales de cada test dentro del proceso
static CONTADOR: AtomicUsize = AtomicUsize::new(0);

/// Cluster en proceso: un name node mas sus nodos de storage, todos
/// escuchando en puertos efimeros de loopback
pub struct Cluster {
    pub name_node: Arc<NameNode>,
    pub ss_addr: SocketAddr,
    pub cli_addr: SocketAddr,
    pub storage_nodes: Vec<Arc<StorageNode>>,
    pub storage_addrs: Vec<SocketAddr>,
    pub storage_dirs: Vec<String>,
}

/// Crea un directorio temporal unico para un test
pub fn dir_temporal(prefijo: &str) -> String {
    let numero = CONTADOR.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!(
        "dfs_{}_{}_{}",
        prefijo,
        std::process::id(),
        numero
    ));
    std::fs::create_dir_all(&dir).expect("no se pudo crear el directorio temporal");
    dir.to_str().expect("ruta temporal invalida").to_string()
}

/// Crea una ruta de archivo temporal unica para un test
pub fn archivo_temporal(prefijo: &str) -> String {
    let numero = CONTADOR.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir()
        .join(format!(
            "dfs_{}_{}_{}",
            prefijo,
            std::process::id(),
            numero
        ))
        .to_str()
        .expect("ruta temporal invalida")
        .to_string()
}

/// Levanta un name node en puertos efimeros
pub fn lanzar_name_node() -> (Arc<NameNode>, SocketAddr, SocketAddr) {
    let config = ConfigNameNode::new(
        0,
        0,
        &archivo_temporal("nm_log"),
        &archivo_temporal("nm_acl"),
    );
    let nodo = Arc::new(NameNode::new(config));
    let (ss_addr, cli_addr) = nodo.clone().iniciar().expect("el name node no inicio");
    (nodo, ss_addr, cli_addr)
}

/// Levanta un nodo de storage sobre un directorio dado, apuntado al
/// name node en `ss_addr`
pub fn lanzar_storage_node(ss_addr: SocketAddr, dir: &str) -> (Arc<StorageNode>, SocketAddr) {
    let nm_addr: SocketAddr = format!("127.0.0.1:{}", ss_addr.port())
        .parse()
        .expect("direccion invalida");
    let config = ConfigStorage::new(dir, 0, nm_addr).con_log_file(&archivo_temporal("ss_log"));
    let nodo = Arc::new(StorageNode::new(config));
    let addr = nodo.clone().iniciar().expect("el nodo de storage no inicio");
    (nodo, addr)
}

/// Levanta un cluster completo y espera a que todos los nodos de
/// storage terminen su registro
pub fn lanzar_cluster(cantidad_storage: usize) -> Cluster {
    let (name_node, ss_addr, cli_addr) = lanzar_name_node();

    let mut storage_nodes = Vec::new();
    let mut storage_addrs = Vec::new();
    let mut storage_dirs = Vec::new();
    for _ in 0..cantidad_storage {
        let dir = dir_temporal("storage");
        let (nodo, addr) = lanzar_storage_node(ss_addr, &dir);
        storage_nodes.push(nodo);
        storage_addrs.push(addr);
        storage_dirs.push(dir);
    }

    esperar_registros(&name_node, cantidad_storage);
    Cluster {
        name_node,
        ss_addr,
        cli_addr,
        storage_nodes,
        storage_addrs,
        storage_dirs,
    }
}

/// Espera hasta que la membresia del name node alcance la cantidad
/// esperada de nodos de storage
pub fn esperar_registros(name_node: &Arc<NameNode>, esperados: usize) {
    let limite = Instant::now() + Duration::from_secs(5);
    while name_node.cantidad_storage_activos() < esperados {
        if Instant::now() > limite {
            panic!("los nodos de storage no se registraron a tiempo");
        }
        thread::sleep(Duration::from_millis(50));
    }
}

/// Abre una sesion de cliente contra el cluster
pub fn conectar(cluster: &Cluster, usuario: &str) -> NameNodeDriver {
    NameNodeDriver::connect("127.0.0.1", cluster.cli_addr.port(), usuario)
        .expect("el cliente no pudo registrarse")
}

/// Limpia los directorios de storage del cluster
pub fn limpiar(cluster: &Cluster) {
    for dir in &cluster.storage_dirs {
        std::fs::remove_dir_all(dir).unwrap_or_default();
    }
}
