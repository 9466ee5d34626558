use super::*;
use std::path::Path;

fn env_in(root: &Path, central: Option<PathBuf>) -> EnvironmentContext {
    let ccnet = root.join("ccnet");
    std::fs::create_dir_all(&ccnet).unwrap();
    EnvironmentContext::new(root.join("server/upgrade"), ccnet, root.join("data"), central)
}

#[test]
fn test_default_endpoint_without_config() {
    let dir = tempfile::tempdir().unwrap();
    let env = env_in(dir.path(), None);
    assert_eq!(
        ControlEndpoint::resolve(&env).unwrap(),
        ControlEndpoint::UnixSocket(env.ccnet_dir.join("ccnet.sock"))
    );
}

#[test]
fn test_endpoint_from_unix_socket_setting() {
    let dir = tempfile::tempdir().unwrap();
    let env = env_in(dir.path(), None);
    std::fs::write(
        env.ccnet_dir.join("ccnet.conf"),
        "[Client]\nUNIX_SOCKET = /run/syncwerk/ccnet.sock\nPORT = 13419\n",
    )
    .unwrap();

    assert_eq!(
        ControlEndpoint::resolve(&env).unwrap(),
        ControlEndpoint::UnixSocket(PathBuf::from("/run/syncwerk/ccnet.sock"))
    );
}

#[test]
fn test_endpoint_from_port_setting() {
    let dir = tempfile::tempdir().unwrap();
    let env = env_in(dir.path(), None);
    std::fs::write(env.ccnet_dir.join("ccnet.conf"), "[Client]\nPORT = 13419\n").unwrap();

    assert_eq!(
        ControlEndpoint::resolve(&env).unwrap(),
        ControlEndpoint::Tcp("127.0.0.1:13419".parse().unwrap())
    );
}

#[test]
fn test_endpoint_prefers_central_ccnet_conf() {
    let dir = tempfile::tempdir().unwrap();
    let central = dir.path().join("conf");
    std::fs::create_dir_all(&central).unwrap();
    let env = env_in(dir.path(), Some(central.clone()));
    std::fs::write(env.ccnet_dir.join("ccnet.conf"), "[Client]\nPORT = 1000\n").unwrap();
    std::fs::write(central.join("ccnet.conf"), "[Client]\nPORT = 2000\n").unwrap();

    assert_eq!(
        ControlEndpoint::resolve(&env).unwrap(),
        ControlEndpoint::Tcp("127.0.0.1:2000".parse().unwrap())
    );
}

#[tokio::test]
async fn test_not_running_when_nothing_listens() {
    let dir = tempfile::tempdir().unwrap();
    let env = env_in(dir.path(), None);
    LivenessGuard::new(&env).ensure_not_running().await.unwrap();
}

#[tokio::test]
async fn test_running_when_tcp_port_accepts() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let dir = tempfile::tempdir().unwrap();
    let env = env_in(dir.path(), None);
    std::fs::write(
        env.ccnet_dir.join("ccnet.conf"),
        format!("[Client]\nPORT = {port}\n"),
    )
    .unwrap();

    let err = LivenessGuard::new(&env)
        .ensure_not_running()
        .await
        .unwrap_err();
    assert!(matches!(err, UpgradeError::ServerRunning { .. }));
}

#[cfg(unix)]
#[tokio::test]
async fn test_running_when_unix_socket_accepts() {
    let dir = tempfile::tempdir().unwrap();
    let env = env_in(dir.path(), None);
    let _listener = tokio::net::UnixListener::bind(env.ccnet_dir.join("ccnet.sock")).unwrap();

    let err = LivenessGuard::new(&env)
        .ensure_not_running()
        .await
        .unwrap_err();
    assert!(err.to_string().contains("ccnet.sock"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_stale_socket_file_is_not_running() {
    let dir = tempfile::tempdir().unwrap();
    let env = env_in(dir.path(), None);
    let socket = env.ccnet_dir.join("ccnet.sock");
    drop(tokio::net::UnixListener::bind(&socket).unwrap());
    assert!(socket.exists(), "socket file outlives its listener");

    LivenessGuard::new(&env).ensure_not_running().await.unwrap();
}
