// Mock scan service
//
// Stands in for the ESP scanning peripheral during app development. One
// route, one fixed payload, no state shared between requests beyond the
// immutable fixture.

use anyhow::{Context, Result};
use peekblock_core::ScanFixture;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use warp::filters::BoxedFilter;
use warp::Filter;

/// `GET /scan` returning the fixture as a JSON array.
pub fn routes(fixture: ScanFixture) -> BoxedFilter<(warp::reply::Json,)> {
    warp::path!("scan")
        .and(warp::get())
        .map(move || warp::reply::json(&fixture.entries()))
        .boxed()
}

/// Bind the scan server's listening socket.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind scan server to {}", addr))
}

/// Serve `fixture` from an already bound listener until the process exits.
pub async fn serve(listener: TcpListener, fixture: ScanFixture) -> Result<()> {
    let port = listener.local_addr()?.port();
    tracing::debug!("Serving {} scan results", fixture.len());
    tracing::info!("{}", boot_message(port));

    warp::serve(routes(fixture)).incoming(listener).run().await;
    Ok(())
}

pub fn boot_message(port: u16) -> String {
    format!("ESP simulation server running on http://localhost:{}", port)
}

/// Bind `addr` and serve `fixture` on it. Failing to bind is fatal.
pub async fn run(addr: SocketAddr, fixture: ScanFixture) -> Result<()> {
    let listener = bind(addr).await?;
    serve(listener, fixture).await
}
