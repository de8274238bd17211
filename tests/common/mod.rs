//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rewrite_proxy::config::ProxyConfig;
use rewrite_proxy::{HttpServer, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A canned upstream response.
#[derive(Clone)]
pub struct MockResponse {
    pub status: &'static str,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
    /// Pause between the response head and the body.
    pub stall: Option<Duration>,
}

impl MockResponse {
    pub fn new(status: &'static str, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: vec![("Content-Type", content_type.to_string())],
            body: body.into(),
            stall: None,
        }
    }

    pub fn stall_body(mut self, pause: Duration) -> Self {
        self.stall = Some(pause);
        self
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

/// A running mock upstream.
pub struct MockUpstream {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    last_request: Arc<std::sync::Mutex<String>>,
}

impl MockUpstream {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Raw head of the most recent request (request line and headers).
    pub fn last_request(&self) -> String {
        self.last_request.lock().unwrap().clone()
    }
}

/// Start a raw-TCP upstream that answers each request with `route(path)`.
pub async fn start_mock_upstream<F>(route: F) -> MockUpstream
where
    F: Fn(&str) -> MockResponse + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let last_request = Arc::new(std::sync::Mutex::new(String::new()));
    let route = Arc::new(route);

    let (h, lr) = (hits.clone(), last_request.clone());
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else { break };
            let (route, hits, last_request) = (route.clone(), h.clone(), lr.clone());
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                hits.fetch_add(1, Ordering::SeqCst);

                let head = String::from_utf8_lossy(&buf).to_string();
                let path = head
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("/")
                    .to_string();
                *last_request.lock().unwrap() = head;

                let response = route(&path);
                let mut out = format!("HTTP/1.1 {}\r\n", response.status);
                for (name, value) in &response.headers {
                    out.push_str(&format!("{}: {}\r\n", name, value));
                }
                out.push_str(&format!(
                    "Content-Length: {}\r\nConnection: close\r\n\r\n",
                    response.body.len()
                ));

                let _ = socket.write_all(out.as_bytes()).await;
                if let Some(pause) = response.stall {
                    tokio::time::sleep(pause).await;
                }
                let _ = socket.write_all(&response.body).await;
                let _ = socket.shutdown().await;
                tokio::time::sleep(Duration::from_millis(10)).await;
            });
        }
    });

    MockUpstream {
        addr,
        hits,
        last_request,
    }
}

/// A proxy running on an ephemeral port.
pub struct TestProxy {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestProxy {
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }

    /// `<proxy>/proxy?url=<encoded target>`
    pub fn proxied(&self, target: &str) -> String {
        self.url(&format!("/proxy?url={}", urlencoding::encode(target)))
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_proxy(mut config: ProxyConfig) -> TestProxy {
    config.static_files.enabled = false;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).expect("server should build");
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    TestProxy { addr, shutdown }
}

/// Client that never follows redirects, so `/go` can be observed.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
