// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted HTTP server for adapter tests.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Received {
    pub method: String,
    pub path: String,
    pub body: String,
}

pub(crate) struct TestServer {
    pub addr: String,
    pub received: Arc<Mutex<Vec<Received>>>,
}

impl TestServer {
    pub fn requests(&self) -> Vec<Received> {
        self.received.lock().clone()
    }
}

/// Serve one scripted `(status, body)` reply per connection, in order.
pub(crate) async fn serve(replies: Vec<(u16, &'static str)>) -> TestServer {
    serve_raw(
        replies
            .into_iter()
            .map(|(status, body)| {
                format!(
                    "HTTP/1.1 {} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                )
            })
            .collect(),
    )
    .await
}

/// Serve one raw response per connection, in order.
pub(crate) async fn serve_raw(replies: Vec<String>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let received = Arc::new(Mutex::new(Vec::new()));
    let log = received.clone();
    tokio::spawn(async move {
        for reply in replies {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let mut reader = BufReader::new(&mut stream);
            let mut request_line = String::new();
            reader.read_line(&mut request_line).await.unwrap();
            let mut parts = request_line.split_whitespace();
            let method = parts.next().unwrap_or_default().to_string();
            let path = parts.next().unwrap_or_default().to_string();

            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).await.unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some(v) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = v.trim().parse().unwrap();
                }
            }
            let mut body = vec![0u8; content_length];
            reader.read_exact(&mut body).await.unwrap();
            log.lock().push(Received {
                method,
                path,
                body: String::from_utf8(body).unwrap(),
            });

            stream.write_all(reply.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        }
    });
    TestServer { addr, received }
}
