// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal HTTP/1.1 client over TCP.
//!
//! One request per connection (`Connection: close`). Responses are framed by
//! Content-Length, chunked transfer encoding, or connection close.

use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// Transport-level failures shared by every HTTP-speaking adapter.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("{addr} is unreachable: {source}")]
    Unreachable {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("request to {addr} timed out after {}ms", .after.as_millis())]
    Timeout { addr: String, after: Duration },
    #[error("request failed: {0}")]
    Request(String),
    #[error("unexpected HTTP status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    /// Turn a status of 400 or above into [`HttpError::UnexpectedStatus`].
    pub fn error_for_status(self) -> Result<Self, HttpError> {
        if self.status >= 400 {
            return Err(HttpError::UnexpectedStatus {
                status: self.status,
                body: self.body.trim().to_string(),
            });
        }
        Ok(self)
    }
}

/// Send one request, bounding connect + write + read by `timeout`.
///
/// Any status code is returned as a [`Response`]; callers decide which are
/// errors.
pub async fn request(
    addr: &str,
    method: &str,
    path: &str,
    body: Option<&str>,
    timeout: Duration,
) -> Result<Response, HttpError> {
    let mut request = format!(
        "{} {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\nAccept: application/json\r\n",
        method, path, addr
    );
    match body {
        Some(body) => request.push_str(&format!(
            "Content-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        )),
        None => request.push_str("Content-Length: 0\r\n\r\n"),
    }

    tracing::debug!(%addr, %method, %path, "http request");
    tokio::time::timeout(timeout, send_request(addr, &request))
        .await
        .map_err(|_| HttpError::Timeout { addr: addr.to_string(), after: timeout })?
}

async fn send_request(addr: &str, request: &str) -> Result<Response, HttpError> {
    let mut stream = TcpStream::connect(addr)
        .await
        .map_err(|source| HttpError::Unreachable { addr: addr.to_string(), source })?;
    stream
        .write_all(request.as_bytes())
        .await
        .map_err(|e| HttpError::Request(format!("write failed: {}", e)))?;

    let mut reader = BufReader::new(&mut stream);
    read_response(&mut reader).await
}

/// Read and parse an HTTP/1.1 response from a buffered stream.
pub(crate) async fn read_response<R: AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
) -> Result<Response, HttpError> {
    let mut status_line = String::new();
    reader
        .read_line(&mut status_line)
        .await
        .map_err(|e| HttpError::Request(format!("read status failed: {}", e)))?;

    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse::<u16>().ok())
        .ok_or_else(|| HttpError::Request(format!("malformed status line {:?}", status_line)))?;

    // Headers; names are case-insensitive
    let mut content_length: Option<usize> = None;
    let mut chunked = false;
    loop {
        let mut line = String::new();
        reader
            .read_line(&mut line)
            .await
            .map_err(|e| HttpError::Request(format!("read header failed: {}", e)))?;
        if line == "\r\n" || line.is_empty() {
            break;
        }
        let line_lower = line.to_ascii_lowercase();
        if let Some(val) = line_lower.strip_prefix("content-length:") {
            content_length = val.trim().parse().ok();
        } else if let Some(val) = line_lower.strip_prefix("transfer-encoding:") {
            chunked = val.trim() == "chunked";
        }
    }

    let body = if chunked {
        read_chunked(reader).await?
    } else if let Some(len) = content_length {
        let mut buf = vec![0u8; len];
        reader
            .read_exact(&mut buf)
            .await
            .map_err(|e| HttpError::Request(format!("read body failed: {}", e)))?;
        buf
    } else {
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .await
            .map_err(|e| HttpError::Request(format!("read body failed: {}", e)))?;
        buf
    };

    Ok(Response { status, body: String::from_utf8_lossy(&body).into_owned() })
}

async fn read_chunked<R: AsyncRead + Unpin>(reader: &mut BufReader<R>) -> Result<Vec<u8>, HttpError> {
    let mut body = Vec::new();
    loop {
        let mut size_line = String::new();
        reader
            .read_line(&mut size_line)
            .await
            .map_err(|e| HttpError::Request(format!("read chunk size failed: {}", e)))?;
        let size_hex = size_line.trim().split(';').next().unwrap_or_default();
        let size = usize::from_str_radix(size_hex, 16)
            .map_err(|_| HttpError::Request(format!("malformed chunk size {:?}", size_line)))?;
        if size == 0 {
            break;
        }
        let start = body.len();
        body.resize(start + size, 0);
        reader
            .read_exact(&mut body[start..])
            .await
            .map_err(|e| HttpError::Request(format!("read chunk failed: {}", e)))?;
        let mut crlf = String::new();
        reader
            .read_line(&mut crlf)
            .await
            .map_err(|e| HttpError::Request(format!("read chunk failed: {}", e)))?;
    }
    Ok(body)
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
