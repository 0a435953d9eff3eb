mod common;

use std::{
    io::{ErrorKind, Read, Write},
    net::TcpListener,
    thread::JoinHandle,
    time::{Duration, Instant},
};

use pico_s3::{Client, Credentials, Error, Result};

/// Accepts one connection per canned response and returns the raw requests.
fn serve(responses: Vec<String>) -> Result<(String, JoinHandle<Vec<String>>)> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|e| Error::transport("failed to bind test server", Some(Box::new(e))))?;
    listener
        .set_nonblocking(true)
        .map_err(|e| Error::transport("failed to configure test server", Some(Box::new(e))))?;
    let addr = listener
        .local_addr()
        .map_err(|e| Error::transport("failed to read test server address", Some(Box::new(e))))?;

    let handle = std::thread::spawn(move || {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut requests = Vec::new();
        let mut pending = responses.into_iter();
        let mut next = pending.next();

        while let Some(response) = next.take() {
            match listener.accept() {
                Ok((mut stream, _)) => {
                    let _ = stream.set_nonblocking(false);
                    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
                    requests.push(read_request(&mut stream));
                    let _ = stream.write_all(response.as_bytes());
                    let _ = stream.flush();
                    next = pending.next();
                }
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    if Instant::now() >= deadline {
                        break;
                    }
                    next = Some(response);
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(_) => break,
            }
        }
        requests
    });

    Ok((format!("http://{addr}"), handle))
}

fn read_request(stream: &mut impl Read) -> String {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&request[..end]).to_ascii_lowercase();
            let body_len = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if request.len() >= end + 4 + body_len {
                break;
            }
        }
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&request).into_owned()
}

fn response(status: &str, headers: &[&str], body: &str) -> String {
    let mut out = format!("HTTP/1.1 {status}\r\n");
    for h in headers {
        out.push_str(h);
        out.push_str("\r\n");
    }
    out.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    ));
    out
}

fn client(endpoint: &str) -> Client {
    Client::builder(endpoint)
        .unwrap()
        .credentials(
            Credentials::new("AKIDEXAMPLE", "secret")
                .unwrap()
                .with_region("us-east-1")
                .unwrap(),
        )
        .clock(common::fixed_clock())
        .connect_timeout(Duration::from_secs(5))
        .read_timeout(Duration::from_secs(5))
        .user_agent("pico-s3-tests")
        .build()
        .unwrap()
}

#[test]
fn put_then_get_over_http() {
    let (endpoint, handle) = serve(vec![
        response("200 OK", &["ETag: \"v1\""], ""),
        response(
            "200 OK",
            &["ETag: \"v1\"", "Content-Type: text/plain"],
            "hello",
        ),
    ])
    .unwrap();
    let client = client(&endpoint);

    let put = client
        .objects()
        .put("bucket", "notes/hello.txt")
        .content_type("text/plain")
        .body_bytes("hello")
        .send()
        .unwrap();
    assert_eq!(put.etag.as_deref(), Some("\"v1\""));

    let got = client
        .objects()
        .get("bucket", "notes/hello.txt")
        .send()
        .unwrap()
        .unwrap();
    assert_eq!(got.body.as_ref(), b"hello");
    assert_eq!(got.content_type.as_deref(), Some("text/plain"));

    let requests = handle.join().unwrap();
    assert_eq!(requests.len(), 2);

    let put_request = requests[0].to_ascii_lowercase();
    assert!(put_request.starts_with("put /bucket/notes/hello.txt http/1.1"));
    assert!(put_request.contains("authorization: aws4-hmac-sha256 credential=akidexample/20130524/us-east-1/s3/aws4_request"));
    assert!(put_request.contains("x-amz-date: 20130524t000000z"));
    assert!(put_request.contains("user-agent: pico-s3-tests"));
    assert!(requests[0].ends_with("hello"));

    assert!(requests[1].to_ascii_lowercase().starts_with("get /bucket/notes/hello.txt"));
}

#[test]
fn missing_object_and_server_error_over_http() {
    let (endpoint, handle) = serve(vec![
        response("404 Not Found", &[], ""),
        response(
            "500 Internal Server Error",
            &["Content-Type: application/xml"],
            "<Error><Code>InternalError</Code><RequestId>r-1</RequestId></Error>",
        ),
    ])
    .unwrap();
    let client = client(&endpoint);

    assert!(client.objects().head("bucket", "nope").send().unwrap().is_none());

    let err = client.buckets().delete("bucket").send().unwrap_err();
    match &err {
        Error::Server { code, .. } => assert_eq!(code.as_deref(), Some("InternalError")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.request_id(), Some("r-1"));
    assert!(err.is_transient());

    let requests = handle.join().unwrap();
    assert!(requests[0].starts_with("HEAD /bucket/nope"));
    assert!(requests[1].starts_with("DELETE /bucket"));
}

#[test]
fn listing_over_http() {
    let page = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult>
  <Contents><Key>a.txt</Key><Size>1</Size></Contents>
  <Contents><Key>b.txt</Key><Size>2</Size></Contents>
  <IsTruncated>false</IsTruncated>
</ListBucketResult>"#;
    let (endpoint, handle) = serve(vec![response("200 OK", &[], page)]).unwrap();
    let client = client(&endpoint);

    let objects = client.objects().list("bucket").prefix("a b").send().unwrap();
    let sizes: Vec<i64> = objects.iter().map(|o| o.size).collect();
    assert_eq!(sizes, vec![1, 2]);

    let requests = handle.join().unwrap();
    assert!(requests[0].starts_with("GET /bucket?list-type=2&prefix=a%20b HTTP/1.1"));
}

#[test]
fn unreachable_endpoint_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client(&format!("http://{addr}"));
    let err = client.objects().get("bucket", "key").send().unwrap_err();
    assert!(matches!(err, Error::Transport { .. }));
}
