//! Test doubles: a scripted transport and a tiny loopback HTTP server.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use super::checker::{CheckError, Checker};
use super::types::Target;

/// Checker that answers from a script and counts what it was asked to do
#[derive(Default)]
pub struct ScriptedChecker {
    delay: Duration,
    delays: HashMap<String, Duration>,
    statuses: HashMap<String, u16>,
    failures: HashMap<String, String>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Delay answers for one URL, overriding the global delay
    pub fn with_delay_for(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.statuses.insert(url.to_string(), status);
        self
    }

    pub fn with_failure(mut self, url: &str, error: &str) -> Self {
        self.failures.insert(url.to_string(), error.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Checker for ScriptedChecker {
    async fn check(&self, target: &Target) -> Result<u16, CheckError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays.get(&target.url).copied().unwrap_or(self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(error) = self.failures.get(&target.url) {
            return Err(CheckError::Transport(error.clone()));
        }
        Ok(self.statuses.get(&target.url).copied().unwrap_or(200))
    }
}

/// Serve `status` for every request; returns the base URL
pub async fn serve_status(status: u16) -> String {
    serve_routes(&[], status).await
}

/// Serve fixed statuses by request path, `fallback` for anything else
pub async fn serve_routes(routes: &[(&str, u16)], fallback: u16) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes: Arc<HashMap<String, u16>> =
        Arc::new(routes.iter().map(|(path, status)| (path.to_string(), *status)).collect());

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let routes = Arc::clone(&routes);
            tokio::spawn(respond(stream, routes, fallback));
        }
    });

    format!("http://{addr}")
}

async fn respond(mut stream: TcpStream, routes: Arc<HashMap<String, u16>>, fallback: u16) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }

    let head = String::from_utf8_lossy(&request);
    let path = head.split_whitespace().nth(1).unwrap_or("/");
    let status = routes.get(path).copied().unwrap_or(fallback);

    let response =
        format!("HTTP/1.1 {status} Mock\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// URL of a loopback port nothing listens on
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/down")
}
