use std::{net::SocketAddr, path::Path, time::Duration};

use shared::{
    codec,
    exchange::{ExitPolicy, Server, ServerConfig},
    interpreter::{run_session, ClientEnd, Interpreter},
    BoxError,
};
use tempfile::TempDir;
use tokio::{net::TcpStream, task::JoinHandle, time::timeout};

const LIMIT: Duration = Duration::from_secs(10);

// ------------------------------------------------------------
// Helpers
// ------------------------------------------------------------

async fn start_server(
    dir: &Path,
    exit_policy: ExitPolicy,
) -> (SocketAddr, JoinHandle<Result<(), BoxError>>) {
    let config = ServerConfig {
        dir: dir.to_path_buf(),
        exit_policy,
        ..ServerConfig::default()
    };
    let server = Server::bind("127.0.0.1:0".parse().unwrap(), config)
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    let handle = tokio::spawn(server.run_until(std::future::pending()));

    (addr, handle)
}

/// Connects, feeds `script` as the typed input, and returns the printed
/// output together with how the session ended.
async fn client(addr: SocketAddr, script: &str) -> (String, ClientEnd) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let mut out = Vec::new();

    let end = timeout(
        LIMIT,
        run_session(
            &mut stream,
            script.as_bytes(),
            &mut out,
            Interpreter::new(codec::DEFAULT_MAX_FRAME),
        ),
    )
    .await
    .expect("client session timed out")
    .unwrap();

    (String::from_utf8(out).unwrap(), end)
}

fn write_source(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path.display().to_string()
}

// ------------------------------------------------------------
// Scenarios
// ------------------------------------------------------------

#[tokio::test]
async fn send_twice_then_exit_stops_server() {
    let outbox = TempDir::new().unwrap();
    let inbox = TempDir::new().unwrap();
    let path = write_source(&outbox, "report.cpp", "hello");
    let (addr, server) = start_server(inbox.path(), ExitPolicy::StopServer).await;

    let script = format!("select file {}\nsend file\nsend file\nexit\n", path);
    let (out, end) = client(addr, &script).await;

    assert_eq!(
        out,
        format!(
            "{} selected\nfile report.cpp received\nfile report.cpp overwritten\nconnection closed\n",
            path
        )
    );
    assert_eq!(end, ClientEnd::ConnectionClosed);
    assert_eq!(std::fs::read(inbox.path().join("report.cpp")).unwrap(), b"hello");

    let stopped = timeout(LIMIT, server).await.expect("server kept running");
    assert!(stopped.unwrap().is_ok());
}

#[tokio::test]
async fn incorrect_command_only_drops_that_client() {
    let outbox = TempDir::new().unwrap();
    let inbox = TempDir::new().unwrap();
    let path = write_source(&outbox, "notes.txt", "remember the milk\n");
    let (addr, server) = start_server(inbox.path(), ExitPolicy::StopServer).await;

    let (out, end) = client(addr, "foobar\n").await;
    assert_eq!(out, "disconnected due to incorrect command\n");
    assert_eq!(end, ClientEnd::Disconnected);

    // the listener is still there for the next client
    let script = format!("select file {}\nsend file\n", path);
    let (out, end) = client(addr, &script).await;
    assert_eq!(out, format!("{} selected\nfile notes.txt received\n", path));
    assert_eq!(end, ClientEnd::InputClosed);
    assert_eq!(
        std::fs::read_to_string(inbox.path().join("notes.txt")).unwrap(),
        "remember the milk\n"
    );

    assert!(!server.is_finished());
    server.abort();
}

#[tokio::test]
async fn local_errors_never_reach_the_server() {
    let inbox = TempDir::new().unwrap();
    let (addr, server) = start_server(inbox.path(), ExitPolicy::StopServer).await;

    let (out, end) = client(addr, "select file missing.txt\nsend file\nselect file\n").await;
    assert_eq!(
        out,
        "missing.txt does not exist\nno file selected!\nno file selected!\n"
    );
    assert_eq!(end, ClientEnd::InputClosed);
    assert_eq!(std::fs::read_dir(inbox.path()).unwrap().count(), 0);

    server.abort();
}

#[tokio::test]
async fn keep_alive_survives_client_exit() {
    let outbox = TempDir::new().unwrap();
    let inbox = TempDir::new().unwrap();
    let path = write_source(&outbox, "plot.py", "print('hi')\n");
    let (addr, server) = start_server(inbox.path(), ExitPolicy::CloseConnection).await;

    let (out, end) = client(addr, "exit\n").await;
    assert_eq!(out, "connection closed\n");
    assert_eq!(end, ClientEnd::ConnectionClosed);

    let script = format!("select file {}\nsend file\nexit\n", path);
    let (out, _) = client(addr, &script).await;
    assert_eq!(
        out,
        format!("{} selected\nfile plot.py received\nconnection closed\n", path)
    );

    assert!(!server.is_finished());
    server.abort();
}

#[tokio::test]
async fn shutdown_signal_stops_idle_server() {
    let inbox = TempDir::new().unwrap();
    let config = ServerConfig {
        dir: inbox.path().to_path_buf(),
        ..ServerConfig::default()
    };
    let server = Server::bind("127.0.0.1:0".parse().unwrap(), config)
        .await
        .unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(server.run_until(async move {
        rx.await.ok();
    }));

    tx.send(()).unwrap();
    let stopped = timeout(LIMIT, handle).await.expect("server ignored shutdown");
    assert!(stopped.unwrap().is_ok());
}
