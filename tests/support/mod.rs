//! Shared fixtures: a scripted in-memory transport and a canned HTTP server.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use bytes::BytesMut;
use fakestore::cache::{CacheKey, CachedResponse, MemoryCache, ResponseCache};
use fakestore::http::{RawResponse, Request};
use fakestore::transport::{SendFuture, Transport, TransportError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Installs a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ── In-memory transport ───────────────────────────────────────────────────────

/// Answers requests from a queue of scripted results and records what it saw.
///
/// When the queue runs dry it keeps replaying the fallback.
pub struct StubTransport {
    script: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    fallback: Result<RawResponse, TransportError>,
    seen: Mutex<Vec<Request>>,
}

impl StubTransport {
    pub fn replying(result: Result<RawResponse, TransportError>) -> Arc<Self> {
        Self::scripted(Vec::new(), result)
    }

    pub fn scripted(
        script: Vec<Result<RawResponse, TransportError>>,
        fallback: Result<RawResponse, TransportError>,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<Request> {
        self.seen.lock().unwrap().clone()
    }
}

impl Transport for StubTransport {
    fn send<'a>(&'a self, request: &'a Request) -> SendFuture<'a> {
        self.seen.lock().unwrap().push(request.clone());
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        Box::pin(async move { next })
    }
}

/// A transport whose exchanges never complete.
pub struct HangingTransport;

impl Transport for HangingTransport {
    fn send<'a>(&'a self, _request: &'a Request) -> SendFuture<'a> {
        Box::pin(std::future::pending())
    }
}

// ── Recording cache ───────────────────────────────────────────────────────────

/// Memory cache that also remembers every key it was asked to save.
#[derive(Default)]
pub struct RecordingCache {
    pub inner: MemoryCache,
    saves: Mutex<Vec<CacheKey>>,
}

impl RecordingCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn saves(&self) -> Vec<CacheKey> {
        self.saves.lock().unwrap().clone()
    }
}

impl ResponseCache for RecordingCache {
    fn save(&self, key: CacheKey, response: CachedResponse) {
        self.saves.lock().unwrap().push(key.clone());
        self.inner.save(key, response);
    }

    fn lookup(&self, key: &CacheKey) -> Option<CachedResponse> {
        self.inner.lookup(key)
    }
}

// ── Canned HTTP server ────────────────────────────────────────────────────────

/// A request as received by [`CannedServer`].
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Captured {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

type Route = dyn Fn(&Captured) -> (u16, String) + Send + Sync;

/// One-shot-per-connection HTTP/1.1 server answering from a routing closure.
pub struct CannedServer {
    pub addr: SocketAddr,
    received: Arc<Mutex<Vec<Captured>>>,
}

impl CannedServer {
    pub async fn start<F>(route: F) -> Self
    where
        F: Fn(&Captured) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));
        let route: Arc<Route> = Arc::new(route);

        let log = Arc::clone(&received);
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    continue;
                };
                let route = Arc::clone(&route);
                let log = Arc::clone(&log);
                tokio::spawn(async move {
                    let _ = serve(stream, route, log).await;
                });
            }
        });

        Self { addr, received }
    }

    /// Base URL to configure a store with.
    pub fn base_url(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    pub fn received(&self) -> Vec<Captured> {
        self.received.lock().unwrap().clone()
    }

    pub fn hits(&self, method: &str, path: &str) -> usize {
        self.received()
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }
}

async fn serve(
    mut stream: TcpStream,
    route: Arc<Route>,
    log: Arc<Mutex<Vec<Captured>>>,
) -> std::io::Result<()> {
    let mut buf = BytesMut::with_capacity(4096);

    let captured = loop {
        if stream.read_buf(&mut buf).await? == 0 {
            return Ok(());
        }

        let mut headers = [httparse::EMPTY_HEADER; 64];
        let mut req = httparse::Request::new(&mut headers);
        let offset = match req.parse(&buf) {
            Ok(httparse::Status::Complete(offset)) => offset,
            Ok(httparse::Status::Partial) => continue,
            Err(_) => return Ok(()),
        };

        let headers: Vec<(String, String)> = req
            .headers
            .iter()
            .map(|h| {
                (
                    h.name.to_owned(),
                    String::from_utf8_lossy(h.value).into_owned(),
                )
            })
            .collect();
        let content_length = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() < offset + content_length {
            continue;
        }

        break Captured {
            method: req.method.unwrap_or_default().to_owned(),
            path: req.path.unwrap_or_default().to_owned(),
            headers,
            body: buf[offset..offset + content_length].to_vec(),
        };
    };

    let (status, body) = route(&captured);
    log.lock().unwrap().push(captured);

    let head = format!(
        "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    stream.write_all(head.as_bytes()).await?;
    stream.write_all(body.as_bytes()).await?;
    stream.flush().await?;
    stream.shutdown().await
}
