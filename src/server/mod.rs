//! Development server for the build output

use anyhow::Result;
use axum::Router;
use std::net::SocketAddr;
use std::path::Path;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::Flux;

/// Router serving `root` read-only, with `index.html` for directories
pub fn router(root: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(root).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
}

/// Serve the build output on `127.0.0.1:port` until interrupted
pub async fn start(flux: &Flux, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let app = router(&flux.build_dir);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Serving at http://localhost:{}, CTRL+C to stop.", port);
    tracing::debug!("Serving {:?}", flux.build_dir);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn get(addr: SocketAddr, path: &str) -> String {
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let request = format!(
            "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
            path
        );
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_serves_build_output() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("posts")).unwrap();
        fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
        fs::write(dir.path().join("posts/a.html"), "<p>a</p>").unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(dir.path());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let home = get(addr, "/").await;
        assert!(home.starts_with("HTTP/1.1 200"));
        assert!(home.contains("<h1>home</h1>"));

        let post = get(addr, "/posts/a.html").await;
        assert!(post.contains("<p>a</p>"));

        let missing = get(addr, "/nope.html").await;
        assert!(missing.starts_with("HTTP/1.1 404"));
    }
}
