// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_server::{serve, serve_raw};

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn sends_body_and_reads_content_length_response() {
    let server = serve(vec![(200, r#"{"ok":true}"#)]).await;

    let response =
        request(&server.addr, "POST", "/things", Some(r#"{"a":1}"#), TIMEOUT).await.unwrap();

    assert_eq!(response, Response { status: 200, body: r#"{"ok":true}"#.to_string() });
    let received = server.requests();
    assert_eq!(received[0].method, "POST");
    assert_eq!(received[0].path, "/things");
    assert_eq!(received[0].body, r#"{"a":1}"#);
}

#[tokio::test]
async fn decodes_chunked_body() {
    let raw = "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\n{\"a\"\r\n3\r\n:1}\r\n0\r\n\r\n";
    let server = serve_raw(vec![raw.to_string()]).await;

    let response = request(&server.addr, "GET", "/x", None, TIMEOUT).await.unwrap();
    assert_eq!(response.body, r#"{"a":1}"#);
}

#[tokio::test]
async fn reads_until_close_without_length() {
    let server = serve_raw(vec!["HTTP/1.1 200 OK\r\n\r\nhello".to_string()]).await;

    let response = request(&server.addr, "GET", "/", None, TIMEOUT).await.unwrap();
    assert_eq!(response.body, "hello");
}

#[tokio::test]
async fn error_status_keeps_body() {
    let server = serve(vec![(500, "boom\n")]).await;

    let err = request(&server.addr, "GET", "/", None, TIMEOUT)
        .await
        .unwrap()
        .error_for_status()
        .unwrap_err();
    assert!(matches!(err, HttpError::UnexpectedStatus { status: 500, ref body } if body == "boom"));
}

#[tokio::test]
async fn refused_connection_is_unreachable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let err = request(&addr, "GET", "/", None, TIMEOUT).await.unwrap_err();
    assert!(matches!(err, HttpError::Unreachable { .. }), "got {:?}", err);
}

#[tokio::test]
async fn silent_server_times_out() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let _hold = tokio::spawn(async move {
        let (_stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let err = request(&addr, "GET", "/", None, Duration::from_millis(200)).await.unwrap_err();
    assert!(matches!(err, HttpError::Timeout { .. }), "got {:?}", err);
}
