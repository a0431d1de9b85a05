//! End-to-end fetcher tests against a local stub HTTP server.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use tablecast_core::{Deadline, Value};
use tablecast_source::{FetchError, UpstreamClient, UpstreamConfig};

fn deadline() -> Deadline {
    Deadline::after(Duration::from_secs(30))
}

/// Serve a fixed sequence of responses, one connection per request.
/// Each response closes the connection so the client reconnects for
/// the next page. Returns the server's base URL and a channel of the
/// request lines seen, in order.
fn serve(responses: Vec<(u16, String)>) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        for (status, body) in responses {
            let (mut stream, _) = match listener.accept() {
                Ok(conn) => conn,
                Err(_) => return,
            };
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut chunk) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => buf.extend_from_slice(&chunk[..n]),
                }
            }
            let head = String::from_utf8_lossy(&buf);
            let request_line = head.lines().next().unwrap_or_default().to_string();
            let _ = tx.send(request_line);

            let response = format!(
                "HTTP/1.1 {status} STATUS\r\n\
                 Content-Type: application/json\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    (base_url, rx)
}

fn client_for(base_url: String) -> UpstreamClient {
    let config = UpstreamConfig {
        base_url,
        base: "baseTest".to_string(),
    };
    UpstreamClient::new(config, "test-key".to_string())
}

#[test]
fn single_page_download() {
    let (base_url, requests) = serve(vec![(
        200,
        r#"{"records":[{"id":"rec1","fields":{"Name":"A","id":"upstream junk"}}]}"#.to_string(),
    )]);

    let table = client_for(base_url).download(deadline(), "Locations").unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table[0]["Name"], Value::from("A"));
    // The row identifier wins over the upstream field named "id".
    assert_eq!(table[0]["id"], Value::from("rec1"));

    let line = requests.recv().unwrap();
    assert!(line.starts_with("GET /baseTest/Locations"), "{line}");
}

#[test]
fn pagination_follows_cursor() {
    let (base_url, requests) = serve(vec![
        (
            200,
            r#"{"records":[{"id":"rec1","fields":{"Name":"A"}}],"offset":"cur2"}"#.to_string(),
        ),
        (
            200,
            r#"{"records":[{"id":"rec2","fields":{"Name":"B"}}]}"#.to_string(),
        ),
    ]);

    let table = client_for(base_url).download(deadline(), "Locations").unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table[0]["id"], Value::from("rec1"));
    assert_eq!(table[1]["id"], Value::from("rec2"));

    let first = requests.recv().unwrap();
    assert!(!first.contains("offset="), "{first}");
    let second = requests.recv().unwrap();
    assert!(second.contains("offset=cur2"), "{second}");
}

#[test]
fn rate_limit_retries_same_page() {
    let (base_url, requests) = serve(vec![
        (429, String::new()),
        (
            200,
            r#"{"records":[{"id":"rec1","fields":{"Name":"A"}}]}"#.to_string(),
        ),
    ]);

    let started = Instant::now();
    let table = client_for(base_url).download(deadline(), "Locations").unwrap();
    assert_eq!(table.len(), 1);
    assert!(
        started.elapsed() >= Duration::from_millis(200),
        "retry must pause before re-requesting"
    );

    let first = requests.recv().unwrap();
    let second = requests.recv().unwrap();
    assert_eq!(first, second, "retry must re-request the same page");
}

#[test]
fn server_error_aborts_fetch() {
    let (base_url, _requests) = serve(vec![(500, String::new())]);

    let err = client_for(base_url).download(deadline(), "Locations").unwrap_err();
    assert_eq!(
        err,
        FetchError::Status {
            table: "Locations".to_string(),
            status: 500,
        }
    );
}

#[test]
fn malformed_body_is_a_decode_error() {
    let (base_url, _requests) = serve(vec![(200, "not json at all".to_string())]);

    let err = client_for(base_url).download(deadline(), "Locations").unwrap_err();
    assert!(matches!(err, FetchError::Decode { .. }), "{err}");
}

#[test]
fn expired_deadline_fails_without_a_request() {
    let (base_url, requests) = serve(vec![]);

    let expired = Deadline::after(Duration::ZERO);
    std::thread::sleep(Duration::from_millis(5));
    let err = client_for(base_url)
        .download(expired, "Locations")
        .unwrap_err();
    assert_eq!(
        err,
        FetchError::DeadlineExceeded {
            table: "Locations".to_string(),
        }
    );
    assert!(requests.try_recv().is_err(), "no request should be sent");
}
