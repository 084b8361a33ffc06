//! Client facade tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use catline::{CatClient, CatConfig, CatError, NetworkError, ReadyState, SocketError, WsSettings};
use futures_util::StreamExt;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

/// What the server saw during one handshake.
#[derive(Debug)]
struct Handshake {
    path: String,
    access_token: Option<String>,
    user_id: Option<String>,
}

/// Start a socket server that reports every handshake and keeps connections open.
async fn serve() -> (u16, mpsc::UnboundedReceiver<Handshake>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move {
                let callback = move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                    let header = |name: &str| {
                        req.headers()
                            .get(name)
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string)
                    };
                    let _ = tx.send(Handshake {
                        path: req.uri().path().to_string(),
                        access_token: header("access_token"),
                        user_id: header("user_id"),
                    });
                    Ok(resp)
                };
                if let Ok(mut ws) = tokio_tungstenite::accept_hdr_async(stream, callback).await {
                    while let Some(Ok(_)) = ws.next().await {}
                }
            });
        }
    });

    (port, rx)
}

async fn next_handshake(rx: &mut mpsc::UnboundedReceiver<Handshake>) -> Handshake {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no handshake in time")
        .expect("server stopped")
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not met in time");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

fn unreachable_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[test]
fn test_deferred_client_is_uninitialized() {
    let client = CatClient::new(CatConfig::new("localhost").instant(false)).unwrap();

    assert!(client.api().is_none());
    assert!(!client.socket().has_socket());
    assert_eq!(client.ready_state(), ReadyState::Closed);
    assert_eq!(client.user(), "user");
    assert_eq!(client.url(), "ws://localhost:1865/ws/user");
}

#[test]
fn test_send_before_init_reports_socket_closed() {
    let client = CatClient::new(CatConfig::new("localhost").instant(false)).unwrap();
    let closed = Arc::new(AtomicU32::new(0));
    let counter = closed.clone();
    client.on_error(move |error| {
        if error == SocketError::SocketClosed {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    assert!(client.send("hello", None, None).is_ok());
    assert_eq!(closed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_reserved_keys_are_rejected() {
    let client = CatClient::new(CatConfig::new("localhost").instant(false)).unwrap();

    let extra = json!({"text": "override"}).as_object().cloned();
    let err = client.send("hello", extra, None).unwrap_err();

    assert!(matches!(err, CatError::Network(NetworkError::ReservedKey(ref key)) if key == "text"));
    assert!(err.to_string().contains("\"text\" or \"user_id\""));
}

#[test]
fn test_invalid_auth_key_fails_init() {
    let config = CatConfig::new("localhost")
        .instant(false)
        .auth_key("bad\nkey");
    let mut client = CatClient::new(config).unwrap();

    assert!(matches!(
        client.init(),
        Err(CatError::Network(NetworkError::InvalidHeader(_)))
    ));
    assert!(client.api().is_none());
    assert!(!client.socket().has_socket());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_init_is_idempotent() {
    let config = CatConfig::new("127.0.0.1")
        .port(unreachable_port())
        .ws(WsSettings::new().retries(0))
        .instant(false);
    let mut client = CatClient::new(config).unwrap();

    client.init().unwrap();
    let base_url = client.api().unwrap().base_url().to_string();
    client.init().unwrap();

    assert_eq!(client.socket().generation(), 1);
    assert_eq!(client.api().unwrap().base_url(), base_url);

    client.reset();
    assert!(client.api().is_none());
    assert!(!client.socket().has_socket());
    assert_eq!(client.ready_state(), ReadyState::Closed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_instant_client_connects_with_identity() {
    let (port, mut handshakes) = serve().await;
    let config = CatConfig::new("127.0.0.1")
        .port(port)
        .user("alice")
        .auth_key("meow");

    let client = CatClient::new(config).unwrap();
    let handshake = next_handshake(&mut handshakes).await;

    assert_eq!(handshake.path, "/ws/alice");
    assert_eq!(handshake.access_token.as_deref(), Some("meow"));
    assert_eq!(handshake.user_id.as_deref(), Some("alice"));

    wait_until(|| client.ready_state() == ReadyState::Open).await;
    assert!(client.api().is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_changing_identity_rebuilds_the_session() {
    let (port, mut handshakes) = serve().await;
    let mut client = CatClient::new(CatConfig::new("127.0.0.1").port(port)).unwrap();

    let connected = Arc::new(AtomicU32::new(0));
    let counter = connected.clone();
    client.on_connected(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(next_handshake(&mut handshakes).await.path, "/ws/user");

    client.set_user("bob").unwrap();
    let handshake = next_handshake(&mut handshakes).await;
    assert_eq!(handshake.path, "/ws/bob");
    assert_eq!(handshake.user_id.as_deref(), Some("bob"));
    assert_eq!(client.user(), "bob");

    client.set_auth_key("meow").unwrap();
    let handshake = next_handshake(&mut handshakes).await;
    assert_eq!(handshake.access_token.as_deref(), Some("meow"));
    assert_eq!(client.auth_key(), Some("meow"));

    // handlers survive the rebuilds
    wait_until(|| connected.load(Ordering::SeqCst) >= 1 && client.ready_state() == ReadyState::Open)
        .await;
    assert_eq!(client.socket().generation(), 3);
    assert_eq!(client.socket().retries(), 0);
    assert!(client.api().is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_close_keeps_the_adapter() {
    let (port, mut handshakes) = serve().await;
    let client = CatClient::new(CatConfig::new("127.0.0.1").port(port)).unwrap();
    next_handshake(&mut handshakes).await;
    wait_until(|| client.ready_state() == ReadyState::Open).await;

    client.close();
    wait_until(|| client.ready_state() == ReadyState::Closed).await;

    assert!(client.api().is_some());
    assert!(
        tokio::time::timeout(Duration::from_millis(200), handshakes.recv())
            .await
            .is_err()
    );
}
