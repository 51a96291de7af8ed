#[cfg(test)]
mod tests {

    use crate::utils::*;
    use dfs_client::driver::dfs_driver_error::DfsDriverErrorKind;
    use dfs_client::protocol::frame::{escribir_frame, leer_frame};
    use dfs_client::protocol::respuesta::Respuesta;
    use std::io::BufReader;
    use std::net::TcpStream;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    pub fn test_01_crear_y_leer_archivo_vacio() {
        let cluster = lanzar_cluster(1);
        let mut alice = conectar(&cluster, "alice");

        let respuesta = alice.crear("notes.txt").unwrap();
        assert_eq!(respuesta, "File created successfully!");

        let lineas = alice.leer("notes.txt").unwrap();
        assert!(lineas.is_empty());
        limpiar(&cluster);
    }

    #[test]
    pub fn test_02_escritura_basica() {
        let cluster = lanzar_cluster(1);
        let mut alice = conectar(&cluster, "alice");
        alice.crear("notes.txt").unwrap();

        let mut sesion = alice.escribir("notes.txt", 0).unwrap();
        assert_eq!(sesion.enviar_palabra(0, "Hello world.").unwrap(), "Word updated");
        sesion.confirmar().unwrap();

        let lineas = alice.leer("notes.txt").unwrap();
        assert_eq!(lineas, vec!["[0] Hello world."]);
        limpiar(&cluster);
    }

    #[test]
    pub fn test_03_split_por_delimitador() {
        let cluster = lanzar_cluster(1);
        let mut alice = conectar(&cluster, "alice");
        alice.crear("notes.txt").unwrap();

        let mut sesion = alice.escribir("notes.txt", 0).unwrap();
        sesion.enviar_palabra(0, "one two three").unwrap();
        sesion.confirmar().unwrap();

        // "big. shiny" en la posicion 1: la cola "two three" migra a una
        // oracion nueva encabezada por "shiny"
        let mut sesion = alice.escribir("notes.txt", 0).unwrap();
        sesion.enviar_palabra(1, "big. shiny").unwrap();
        sesion.confirmar().unwrap();

        let lineas = alice.leer("notes.txt").unwrap();
        assert_eq!(lineas, vec!["[0] one big.", "[1] shiny two three"]);
        limpiar(&cluster);
    }

    #[test]
    pub fn test_04_contencion_de_locks_entre_usuarios() {
        let cluster = lanzar_cluster(1);
        let mut alice = conectar(&cluster, "alice");
        alice.crear("notes.txt").unwrap();
        alice.otorgar_acceso("-W", "notes.txt", "bob").unwrap();

        let mut bob = conectar(&cluster, "bob");
        let mut sesion_bob = bob.escribir("notes.txt", 0).unwrap();

        // con el lock de bob tomado, alice es rechazada
        let error = alice.escribir("notes.txt", 0).unwrap_err();
        assert_eq!(error.kind(), &DfsDriverErrorKind::ServerError);
        assert_eq!(error.message(), "Sentence locked by another user");

        sesion_bob.enviar_palabra(0, "bob was here.").unwrap();
        sesion_bob.confirmar().unwrap();

        // liberado el lock, el proximo intento de alice entra
        let mut sesion_alice = alice.escribir("notes.txt", 0).unwrap();
        sesion_alice.enviar_palabra(0, "hello.").unwrap();
        sesion_alice.confirmar().unwrap();
        limpiar(&cluster);
    }

    #[test]
    pub fn test_05_solo_el_propietario_puede_borrar() {
        let cluster = lanzar_cluster(1);
        let mut alice = conectar(&cluster, "alice");
        alice.crear("notes.txt").unwrap();

        let mut carol = conectar(&cluster, "carol");
        let error = carol.eliminar("notes.txt").unwrap_err();
        assert_eq!(error.message(), "Only owner can delete");

        assert_eq!(
            alice.eliminar("notes.txt").unwrap(),
            "File deleted successfully!"
        );

        let error = alice.leer("notes.txt").unwrap_err();
        assert_eq!(error.message(), "File not found");
        let error = carol.leer("notes.txt").unwrap_err();
        assert_eq!(error.message(), "File not found");
        limpiar(&cluster);
    }

    #[test]
    pub fn test_06_permisos_de_lectura() {
        let cluster = lanzar_cluster(1);
        let mut alice = conectar(&cluster, "alice");
        alice.crear("secret.txt").unwrap();

        let mut bob = conectar(&cluster, "bob");
        let error = bob.leer("secret.txt").unwrap_err();
        assert_eq!(error.message(), "Access denied");

        alice.otorgar_acceso("-R", "secret.txt", "bob").unwrap();
        assert!(bob.leer("secret.txt").is_ok());

        alice.revocar_acceso("secret.txt", "bob").unwrap();
        let error = bob.leer("secret.txt").unwrap_err();
        assert_eq!(error.message(), "Access denied");
        limpiar(&cluster);
    }

    #[test]
    pub fn test_07_view_filtra_por_acceso() {
        let cluster = lanzar_cluster(1);
        let mut alice = conectar(&cluster, "alice");
        alice.crear("mine.txt").unwrap();

        let mut bob = conectar(&cluster, "bob");
        assert!(bob.view(false).unwrap().is_empty());
        assert_eq!(bob.view(true).unwrap(), vec!["--> mine.txt"]);
        assert_eq!(alice.view(false).unwrap(), vec!["--> mine.txt"]);

        let usuarios = alice.listar_usuarios().unwrap();
        assert!(usuarios.contains(&"--> alice".to_string()));
        assert!(usuarios.contains(&"--> bob".to_string()));
        limpiar(&cluster);
    }

    #[test]
    pub fn test_08_info_con_seccion_de_accesos() {
        let cluster = lanzar_cluster(1);
        let mut alice = conectar(&cluster, "alice");
        alice.crear("notes.txt").unwrap();

        let mut sesion = alice.escribir("notes.txt", 0).unwrap();
        sesion.enviar_palabra(0, "Hello world.").unwrap();
        sesion.confirmar().unwrap();
        alice.otorgar_acceso("-W", "notes.txt", "bob").unwrap();

        let info = alice.info("notes.txt").unwrap().join("\n");
        assert!(info.contains("Filename: notes.txt"));
        assert!(info.contains("Owner: alice"));
        assert!(info.contains("Words: 2"));
        assert!(info.contains("Characters: 12"));
        assert!(info.contains("Accessed:"));
        assert!(info.contains("ACCESS|"));
        assert!(info.contains("Owner(RW): alice"));
        assert!(info.contains("Writers(W): bob"));
        limpiar(&cluster);
    }

    #[test]
    pub fn test_09_undo_restaura_el_contenido_previo() {
        let cluster = lanzar_cluster(1);
        let mut alice = conectar(&cluster, "alice");
        alice.crear("notes.txt").unwrap();

        let mut sesion = alice.escribir("notes.txt", 0).unwrap();
        sesion.enviar_palabra(0, "Hello world.").unwrap();
        sesion.confirmar().unwrap();

        let mut sesion = alice.escribir("notes.txt", 0).unwrap();
        sesion.enviar_palabra(1, "beautiful").unwrap();
        sesion.confirmar().unwrap();
        assert_eq!(
            alice.leer("notes.txt").unwrap(),
            vec!["[0] Hello beautiful world."]
        );

        assert_eq!(
            alice.deshacer("notes.txt").unwrap(),
            "File restored from backup"
        );
        assert_eq!(alice.leer("notes.txt").unwrap(), vec!["[0] Hello world."]);

        // sin escritura intermedia no queda snapshot
        let error = alice.deshacer("notes.txt").unwrap_err();
        assert_eq!(error.message(), "No backup available");
        limpiar(&cluster);
    }

    #[test]
    pub fn test_10_stream_emite_las_palabras_en_orden() {
        let cluster = lanzar_cluster(1);
        let mut alice = conectar(&cluster, "alice");
        alice.crear("notes.txt").unwrap();

        let mut sesion = alice.escribir("notes.txt", 0).unwrap();
        sesion.enviar_palabra(0, "Hello world.").unwrap();
        sesion.confirmar().unwrap();

        let mut palabras = Vec::new();
        alice
            .stream("notes.txt", |palabra| palabras.push(palabra.to_string()))
            .unwrap();
        assert_eq!(palabras, vec!["Hello", "world."]);
        limpiar(&cluster);
    }

    #[test]
    pub fn test_11_exec_esta_deshabilitado() {
        let cluster = lanzar_cluster(1);
        let mut alice = conectar(&cluster, "alice");
        alice.crear("script.txt").unwrap();

        let respuesta = alice.comando("EXEC|script.txt").unwrap();
        assert_eq!(
            respuesta,
            Respuesta::Error("EXEC is disabled".to_string())
        );
        limpiar(&cluster);
    }

    #[test]
    pub fn test_12_usuarios_duplicados_o_invalidos() {
        let cluster = lanzar_cluster(1);
        let _alice = conectar(&cluster, "alice");

        let error = dfs_client::driver::dfs_driver::NameNodeDriver::connect(
            "127.0.0.1",
            cluster.cli_addr.port(),
            "alice",
        )
        .unwrap_err();
        assert_eq!(error.message(), "User already connected");

        let error = dfs_client::driver::dfs_driver::NameNodeDriver::connect(
            "127.0.0.1",
            cluster.cli_addr.port(),
            "ana-maria",
        )
        .unwrap_err();
        assert_eq!(error.message(), "Invalid username");
        limpiar(&cluster);
    }

    #[test]
    pub fn test_13_reregistro_reporta_archivos_preexistentes() {
        let (name_node, ss_addr, cli_addr) = lanzar_name_node();
        let dir = dir_temporal("preexistente");
        std::fs::write(format!("{dir}/old.txt"), "already here.").unwrap();

        let (storage, _addr) = lanzar_storage_node(ss_addr, &dir);
        esperar_registros(&name_node, 1);

        let mut alice = dfs_client::driver::dfs_driver::NameNodeDriver::connect(
            "127.0.0.1",
            cli_addr.port(),
            "alice",
        )
        .unwrap();
        assert_eq!(alice.view(true).unwrap(), vec!["--> old.txt"]);
        assert!(storage.id_asignado().is_some());
        std::fs::remove_dir_all(&dir).unwrap_or_default();
    }

    #[test]
    pub fn test_14_cleanread_devuelve_el_contenido_crudo() {
        let cluster = lanzar_cluster(1);
        let mut alice = conectar(&cluster, "alice");
        alice.crear("notes.txt").unwrap();

        let mut sesion = alice.escribir("notes.txt", 0).unwrap();
        sesion.enviar_palabra(0, "first one.").unwrap();
        sesion.confirmar().unwrap();
        let mut sesion = alice.escribir("notes.txt", 1).unwrap();
        sesion.enviar_palabra(0, "second one.").unwrap();
        sesion.confirmar().unwrap();

        let mut storage = dfs_client::driver::dfs_driver::StorageNodeDriver::connect(
            "127.0.0.1",
            cluster.storage_addrs[0].port(),
        )
        .unwrap();
        assert_eq!(
            storage.cleanread("notes.txt").unwrap(),
            "first one.\nsecond one."
        );
        limpiar(&cluster);
    }

    #[test]
    pub fn test_15_escrituras_concurrentes_en_oraciones_distintas() {
        let cluster = lanzar_cluster(1);
        let mut alice = conectar(&cluster, "alice");
        alice.crear("notes.txt").unwrap();
        alice.otorgar_acceso("-W", "notes.txt", "bob").unwrap();

        let mut sesion = alice.escribir("notes.txt", 0).unwrap();
        sesion.enviar_palabra(0, "first one.").unwrap();
        sesion.confirmar().unwrap();

        // bob escribe la oracion 1 mientras alice sostiene el lock de la 0
        let mut sesion_alice = alice.escribir("notes.txt", 0).unwrap();
        let mut bob = conectar(&cluster, "bob");
        let mut sesion_bob = bob.escribir("notes.txt", 1).unwrap();
        sesion_bob.enviar_palabra(0, "second one.").unwrap();
        sesion_bob.confirmar().unwrap();
        sesion_alice.enviar_palabra(0, "hey").unwrap();
        sesion_alice.confirmar().unwrap();

        limpiar(&cluster);
    }

    #[test]
    #[ignore]
    pub fn test_16_caida_de_un_nodo_de_storage() {
        let cluster = lanzar_cluster(1);

        // un storage falso se registra reportando fake.txt y nunca
        // responde los heartbeats
        let stream = TcpStream::connect(("127.0.0.1", cluster.ss_addr.port())).unwrap();
        let mut writer = stream.try_clone().unwrap();
        let mut reader = BufReader::new(stream);
        escribir_frame(&mut writer, "REGISTER|127.0.0.1|0|59999|fake.txt").unwrap();
        let respuesta = leer_frame(&mut reader).unwrap().unwrap();
        assert!(respuesta.starts_with("SUCCESS|SS_ID="));
        esperar_registros(&cluster.name_node, 2);

        let mut alice = conectar(&cluster, "alice");
        assert!(alice.view(true).unwrap().contains(&"--> fake.txt".to_string()));

        // dentro de los 15 segundos de silencio el monitor lo declara caido
        sleep(Duration::from_secs(25));
        assert_eq!(cluster.name_node.cantidad_storage_activos(), 1);
        assert!(!alice.view(true).unwrap().contains(&"--> fake.txt".to_string()));

        let error = alice.leer("fake.txt").unwrap_err();
        assert_eq!(error.message(), "File not found");

        // el nodo vivo sigue aceptando creaciones
        assert_eq!(
            alice.crear("new.txt").unwrap(),
            "File created successfully!"
        );
        limpiar(&cluster);
    }
}
