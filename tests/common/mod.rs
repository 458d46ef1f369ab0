//! Shared utilities for integration tests.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixListener;
use tokio::task::JoinHandle;

/// Socket path inside a fresh temporary directory.
///
/// The directory is removed when the returned `TempDir` is dropped.
pub fn socket_path() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nginx-config-version.sock");
    (dir, path)
}

/// Start a programmable config version probe on a unix socket.
///
/// `f` receives the request line and returns the status code and body.
pub fn start_probe<F, Fut>(path: &Path, f: F) -> JoinHandle<()>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = UnixListener::bind(path).unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let request = read_request_head(&mut socket).await;
                        let request_line = request.lines().next().unwrap_or_default().to_string();
                        let (status, body) = f(request_line).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    })
}

/// Start a probe that behaves like the generated NGINX server block:
/// `GET /configVersion` answers `version()`, anything else is a 404.
pub fn start_version_probe<V>(path: &Path, version: V) -> JoinHandle<()>
where
    V: Fn() -> u64 + Send + Sync + 'static,
{
    let version = Arc::new(version);
    start_probe(path, move |request_line| {
        let version = version.clone();
        async move {
            if request_line.starts_with("GET /configVersion ") {
                (200, version().to_string())
            } else {
                (404, "not found".to_string())
            }
        }
    })
}

async fn read_request_head(socket: &mut tokio::net::UnixStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}
