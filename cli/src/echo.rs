// WebSocket echo server
//
// Development aid for the app's socket page: every text frame is answered
// with `Echo: <text>`. Accepts upgrades on any path.

use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use warp::filters::BoxedFilter;
use warp::Filter;

pub fn echo_reply(message: &str) -> String {
    format!("Echo: {}", message)
}

pub fn routes() -> BoxedFilter<(impl warp::Reply,)> {
    warp::ws()
        .map(|ws: warp::ws::Ws| ws.on_upgrade(handle_connection))
        .boxed()
}

pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind echo server to {}", addr))
}

pub async fn serve(listener: TcpListener) -> Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!("WebSocket echo server listening on ws://{}", addr);

    warp::serve(routes()).incoming(listener).run().await;
    Ok(())
}

pub async fn run(addr: SocketAddr) -> Result<()> {
    let listener = bind(addr).await?;
    serve(listener).await
}

async fn handle_connection(ws: warp::ws::WebSocket) {
    tracing::info!("Client connected");
    let (mut tx, mut rx) = ws.split();

    while let Some(result) = rx.next().await {
        let msg = match result {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!("WebSocket error: {}", e);
                break;
            }
        };

        if msg.is_close() {
            break;
        }

        if let Ok(text) = msg.to_str() {
            tracing::info!("Received: {}", text);
            if tx
                .send(warp::ws::Message::text(echo_reply(text)))
                .await
                .is_err()
            {
                break;
            }
        }
    }

    tracing::info!("Client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_tungstenite::tungstenite::Message;

    #[test]
    fn test_echo_reply() {
        assert_eq!(echo_reply("hello"), "Echo: hello");
        assert_eq!(echo_reply(""), "Echo: ");
    }

    #[tokio::test]
    async fn test_echoes_text_frames() {
        let listener = bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(serve(listener));

        let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{}/", addr))
            .await
            .unwrap();

        for text in ["ping", "scan please"] {
            socket.send(Message::text(text)).await.unwrap();
            let reply = socket.next().await.unwrap().unwrap();
            assert_eq!(reply.into_text().unwrap(), format!("Echo: {}", text));
        }

        socket.close(None).await.unwrap();
    }

    #[tokio::test]
    async fn test_port_in_use_is_fatal() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let err = run(addr).await.unwrap_err();
        assert!(err.to_string().contains("Failed to bind echo server"));
    }
}
