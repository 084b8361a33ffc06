//! Interactive chat with a server.
//!
//! Run with:
//! ```sh
//! RUST_LOG=catline=debug,catline_net=debug cargo run --example chat -- localhost 1865
//! ```
//! then type messages; an empty line quits.

use std::io::BufRead;
use std::time::Duration;

use catline::{CatClient, CatConfig, MessageKind, WsSettings};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "localhost".to_string());
    let port = args.next().map(|p| p.parse()).transpose()?.unwrap_or(1865);

    let config = CatConfig::new(host).port(port).ws(
        WsSettings::new()
            .delay(Duration::from_secs(2))
            .on_failed(|error| eprintln!("{error}")),
    );
    let client = CatClient::new(config)?;

    client
        .on_connected(|| println!("[connected]"))
        .on_disconnected(|| println!("[disconnected]"))
        .on_error(|error| eprintln!("[error] {error}"))
        .on_message(|message| match message.kind {
            MessageKind::ChatToken => {}
            _ => println!("cat> {}", message.content),
        });

    if let Some(api) = client.api() {
        match api.status().await {
            Ok(status) => println!("[server] {}", status.status),
            Err(e) => eprintln!("[server] unreachable: {e}"),
        }
    }

    // stdin is blocking; read it off the runtime and send through a session handle
    let socket = client.socket().clone();
    let input = tokio::task::spawn_blocking(move || {
        for line in std::io::stdin().lock().lines().map_while(Result::ok) {
            if line.is_empty() {
                break;
            }
            if let Err(e) = socket.send(line, None, None) {
                eprintln!("[send] {e}");
            }
        }
    });
    input.await?;

    client.close();
    Ok(())
}
