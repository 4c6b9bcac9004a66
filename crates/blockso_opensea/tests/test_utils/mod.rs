//! Test utilities for Opensea client tests.
//!
//! A throwaway HTTP/1.1 server on localhost that answers each connection with
//! the next scripted reply and records the raw requests it saw.

#![allow(dead_code)]

use blockso_opensea::OpenseaClient;
use blockso_rate_limit::{RetryingDispatcher, ThrottledDispatcher, TokenBucket};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// What the server does with the next connection.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Write this raw HTTP response and close.
    Respond(String),
    /// Read the request, then never answer.
    Hang,
}

impl MockReply {
    pub fn json(status: u16, body: &str) -> Self {
        Self::Respond(http_response(status, &[("Content-Type", "application/json")], body))
    }

    pub fn throttled(retry_after: &str) -> Self {
        Self::Respond(http_response(429, &[("Retry-After", retry_after)], ""))
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self::Respond(http_response(status, &[], body))
    }
}

/// Build a raw `Connection: close` response.
pub fn http_response(status: u16, headers: &[(&str, &str)], body: &str) -> String {
    let mut response = format!(
        "HTTP/1.1 {} Scripted\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        body.len()
    );
    for (name, value) in headers {
        response.push_str(&format!("{}: {}\r\n", name, value));
    }
    response.push_str("\r\n");
    response.push_str(body);
    response
}

/// Scripted upstream. Once the script runs out it answers 200 with `{}`.
#[derive(Debug, Clone)]
pub struct MockServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockServer {
    pub async fn start(replies: impl IntoIterator<Item = MockReply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let replies = Arc::new(Mutex::new(replies.into_iter().collect::<VecDeque<_>>()));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let replies = replies.clone();
                let recorded = recorded.clone();

                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => buf.extend_from_slice(&chunk[..n]),
                        }
                    }
                    recorded
                        .lock()
                        .unwrap()
                        .push(String::from_utf8_lossy(&buf).into_owned());

                    let reply = replies
                        .lock()
                        .unwrap()
                        .pop_front()
                        .unwrap_or_else(|| MockReply::json(200, "{}"));
                    match reply {
                        MockReply::Respond(raw) => {
                            let _ = stream.write_all(raw.as_bytes()).await;
                            let _ = stream.shutdown().await;
                        }
                        MockReply::Hang => {
                            std::future::pending::<()>().await;
                        }
                    }
                });
            }
        });

        Self { addr, requests }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

/// Client pointed at `server`, bypassing any system proxy.
pub fn client_for(server: &MockServer, api_key: Option<&str>, bucket: TokenBucket) -> OpenseaClient {
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    let dispatcher = ThrottledDispatcher::new(
        Arc::new(bucket),
        RetryingDispatcher::new().with_fallback_delay(Duration::from_millis(10)),
    );
    OpenseaClient::with_dispatcher(http, &server.base_url(), api_key.map(String::from), dispatcher)
}

/// A bucket loose enough not to interfere with a test.
pub fn roomy_bucket() -> TokenBucket {
    TokenBucket::new(100, Duration::from_secs(1)).unwrap()
}
