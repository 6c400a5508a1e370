//! Tests for the server lifecycle: accepting, reaping, graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use hashline::config::Config;
use hashline::logging::TracingLogger;
use hashline::server::Server;
use hashline::session::RESPONSE_SIZE;
use sha2::{Digest, Sha256};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

fn test_config() -> Config {
    Config {
        // Port 0 asks the OS for an ephemeral port.
        port: 0,
        connection_timeout: Some(Duration::from_secs(5)),
        reap_interval: Duration::from_millis(200),
    }
}

async fn start_server(config: Config) -> (Arc<Server>, JoinHandle<anyhow::Result<()>>) {
    let server = Arc::new(
        Server::bind(config, TracingLogger::shared())
            .await
            .unwrap(),
    );
    let runner = tokio::spawn({
        let server = Arc::clone(&server);
        async move { server.run().await }
    });
    (server, runner)
}

async fn connect(server: &Server) -> TcpStream {
    TcpStream::connect(server.local_addr().unwrap())
        .await
        .unwrap()
}

fn expected_response(payload: &[u8]) -> Vec<u8> {
    let mut response = hex::encode(Sha256::digest(payload)).into_bytes();
    response.push(b'\n');
    response
}

async fn read_response(client: &mut TcpStream) -> Vec<u8> {
    let mut buf = [0u8; RESPONSE_SIZE];
    client.read_exact(&mut buf).await.unwrap();
    buf.to_vec()
}

async fn wait_for_count(server: &Server, expected: usize) {
    for _ in 0..200 {
        if server.session_count().await == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "session count never reached {expected}, still {}",
        server.session_count().await
    );
}

#[tokio::test]
async fn test_round_trip() {
    let (server, runner) = start_server(test_config()).await;
    let mut client = connect(&server).await;

    client.write_all(b"oceanic 815\n").await.unwrap();
    assert_eq!(
        read_response(&mut client).await,
        b"ae6a9df8bdf4545392e6b1354252af8546282b49033a9118b12e9511892197c6\n".to_vec()
    );

    server.stop().await;
    runner.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_concurrent_connections_are_isolated() {
    let (server, runner) = start_server(test_config()).await;
    let mut first = connect(&server).await;
    let mut second = connect(&server).await;

    // Interleave: a partial line on one connection must not leak into the
    // digest computed on the other.
    first.write_all(b"oceanic").await.unwrap();
    second.write_all(b"b\n").await.unwrap();
    assert_eq!(read_response(&mut second).await, expected_response(b"b"));

    first.write_all(b" 815\n").await.unwrap();
    assert_eq!(
        read_response(&mut first).await,
        expected_response(b"oceanic 815")
    );

    server.stop().await;
    runner.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_many_concurrent_connections() {
    let (server, runner) = start_server(test_config()).await;

    let mut workers = Vec::new();
    for i in 0..20usize {
        let addr = server.local_addr().unwrap();
        workers.push(tokio::spawn(async move {
            let mut client = TcpStream::connect(addr).await.unwrap();
            let payload = format!("connection {i} payload");

            client.write_all(payload.as_bytes()).await.unwrap();
            client.write_all(b"\n").await.unwrap();

            let mut buf = [0u8; RESPONSE_SIZE];
            client.read_exact(&mut buf).await.unwrap();
            assert_eq!(buf.to_vec(), expected_response(payload.as_bytes()));
        }));
    }
    for worker in workers {
        worker.await.unwrap();
    }

    server.stop().await;
    runner.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_stop_terminates_live_sessions() {
    let (server, runner) = start_server(test_config()).await;
    let mut client = connect(&server).await;

    client.write_all(b"a\n").await.unwrap();
    read_response(&mut client).await;

    server.stop().await;
    runner.await.unwrap().unwrap();

    // The terminated session closes the connection without a response.
    let mut buf = [0u8; RESPONSE_SIZE];
    assert_eq!(client.read(&mut buf).await.unwrap(), 0);
}

#[tokio::test]
async fn test_stop_refuses_new_connections() {
    let (server, runner) = start_server(test_config()).await;
    let addr = server.local_addr().unwrap();

    server.stop().await;
    runner.await.unwrap().unwrap();

    // Dropping the server closes the listening socket.
    drop(server);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    let (server, runner) = start_server(test_config()).await;

    server.stop().await;
    server.stop().await;
    runner.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_reaper_removes_dead_handles() {
    let (server, runner) = start_server(test_config()).await;

    let mut client = connect(&server).await;
    client.write_all(b"a\n").await.unwrap();
    read_response(&mut client).await;
    wait_for_count(&server, 1).await;

    drop(client);
    // Within one reap interval the dead handle is swept.
    wait_for_count(&server, 0).await;

    server.stop().await;
    runner.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_registry_stays_bounded_across_churn() {
    let (server, runner) = start_server(test_config()).await;

    for round in 0..3 {
        let mut clients = Vec::new();
        for _ in 0..5 {
            let mut client = connect(&server).await;
            client
                .write_all(format!("round {round}\n").as_bytes())
                .await
                .unwrap();
            read_response(&mut client).await;
            clients.push(client);
        }
        drop(clients);
        wait_for_count(&server, 0).await;
    }

    server.stop().await;
    runner.await.unwrap().unwrap();
}
