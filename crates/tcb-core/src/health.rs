//! Minimal HTTP liveness endpoint for hosting platforms that probe a port.
//!
//! One request per connection: `GET /health` answers JSON, `GET /` a tiny HTML page,
//! anything else 404.

use std::{net::SocketAddr, time::Duration};

use serde::Serialize;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};
use tokio_util::sync::CancellationToken;

use crate::Result;

const MAX_REQUEST_HEAD: usize = 8 * 1024;
const READ_TIMEOUT: Duration = Duration::from_secs(5);

const ROOT_HTML: &str =
    "<h1>⏰ Time Calculator Bot</h1><p>Bot is running successfully!</p>";

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
    bot: &'static str,
    message: &'static str,
}

pub struct HealthServer {
    listener: TcpListener,
}

impl HealthServer {
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until `shutdown` is cancelled.
    pub async fn serve(self, shutdown: CancellationToken) -> Result<()> {
        let addr = self.local_addr()?;
        tracing::info!(%addr, "health endpoint listening");

        loop {
            let (stream, peer) = tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok(v) => v,
                    Err(e) => {
                        tracing::warn!(error = %e, "health accept failed");
                        continue;
                    }
                },
            };

            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream).await {
                    tracing::debug!(%peer, error = %e, "health connection failed");
                }
            });
        }

        tracing::info!("health endpoint stopped");
        Ok(())
    }
}

async fn handle_connection(mut stream: TcpStream) -> Result<()> {
    let head = match tokio::time::timeout(READ_TIMEOUT, read_request_head(&mut stream)).await {
        Ok(head) => head?,
        Err(_) => return Ok(()),
    };

    let (status, content_type, body) = route(&head)?;
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

async fn read_request_head(stream: &mut TcpStream) -> Result<String> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") || buf.len() >= MAX_REQUEST_HEAD {
            break;
        }
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn route(head: &str) -> Result<(&'static str, &'static str, String)> {
    let mut parts = head.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts
        .next()
        .unwrap_or("")
        .split('?')
        .next()
        .unwrap_or("");

    let out = match (method, path) {
        ("GET", "/health") => {
            let body = serde_json::to_string(&HealthBody {
                status: "ok",
                bot: "running",
                message: "Time Calculator Bot is alive!",
            })?;
            ("200 OK", "application/json", body)
        }
        ("GET", "/") => ("200 OK", "text/html; charset=utf-8", ROOT_HTML.to_string()),
        _ => (
            "404 Not Found",
            "text/plain; charset=utf-8",
            "not found".to_string(),
        ),
    };
    Ok(out)
}
