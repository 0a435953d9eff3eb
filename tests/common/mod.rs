#![allow(dead_code)]

use std::{
    collections::VecDeque,
    env,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};

use http::{HeaderMap, HeaderValue, StatusCode};
use pico_s3::{
    Client, Credentials, Error, FixedClock, HttpRequest, HttpResponse, Result, Transport,
};
use time::OffsetDateTime;

static BUCKET_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Fri, 24 May 2013 00:00:00 GMT.
pub(crate) const FIXED_TIMESTAMP: i64 = 1_369_353_600;

pub(crate) struct TestConfig {
    pub(crate) endpoint: String,
    pub(crate) credentials: Credentials,
}

pub(crate) fn load_config() -> Result<Option<TestConfig>> {
    let Ok(endpoint) = env::var("S3_TEST_ENDPOINT") else {
        return Ok(None);
    };

    let Ok(credentials) = Credentials::from_env() else {
        return Ok(None);
    };
    let credentials = match credentials.region {
        Some(_) => credentials,
        None => {
            let region = env::var("S3_TEST_REGION").unwrap_or_else(|_| "us-east-1".to_string());
            credentials.with_region(region)?
        }
    };

    Ok(Some(TestConfig {
        endpoint,
        credentials,
    }))
}

pub(crate) fn unique_bucket(prefix: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let n = BUCKET_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}{now}-{n}")
}

/// Creates a fresh bucket, runs `f`, then removes the bucket and its objects.
pub(crate) fn with_bucket<F>(client: &Client, prefix: &str, f: F) -> Result<()>
where
    F: FnOnce(String) -> Result<()>,
{
    let bucket = unique_bucket(prefix);
    client.buckets().create(&bucket).send()?;

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| f(bucket.clone())));
    let cleanup = cleanup_bucket(client, &bucket);

    match result {
        Ok(inner) => match inner {
            Ok(()) => cleanup,
            Err(err) => {
                let _ = cleanup;
                Err(err)
            }
        },
        Err(panic) => {
            let _ = cleanup;
            std::panic::resume_unwind(panic);
        }
    }
}

fn cleanup_bucket(client: &Client, bucket: &str) -> Result<()> {
    for object in client.objects().list(bucket).send()? {
        client.objects().delete(bucket, object.key).send()?;
    }
    client.buckets().delete(bucket).send()?;
    Ok(())
}

/// In-memory transport that records requests and replays canned responses.
#[derive(Clone, Default)]
pub(crate) struct RecordingTransport {
    inner: Arc<Mutex<Recorded>>,
}

#[derive(Default)]
struct Recorded {
    requests: Vec<HttpRequest>,
    responses: VecDeque<HttpResponse>,
}

impl RecordingTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, status: u16, body: &str) -> &Self {
        self.respond_with(status, HeaderMap::new(), body)
    }

    pub(crate) fn respond_with(&self, status: u16, headers: HeaderMap, body: &str) -> &Self {
        let status = StatusCode::from_u16(status).unwrap();
        self.inner
            .lock()
            .unwrap()
            .responses
            .push_back(HttpResponse::new(status, headers, body.to_string()));
        self
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub(crate) fn last_request(&self) -> HttpRequest {
        self.requests().pop().unwrap()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut inner = self.inner.lock().unwrap();
        inner.requests.push(request);
        inner
            .responses
            .pop_front()
            .ok_or_else(|| Error::transport("no canned response left", None))
    }
}

pub(crate) fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(
        OffsetDateTime::from_unix_timestamp(FIXED_TIMESTAMP).unwrap(),
    ))
}

pub(crate) fn mock_client(transport: &RecordingTransport, region: Option<&str>) -> Client {
    let credentials = Credentials::new("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY")
        .unwrap();
    let credentials = match region {
        Some(region) => credentials.with_region(region).unwrap(),
        None => credentials,
    };

    Client::builder("http://localhost:9000")
        .unwrap()
        .credentials(credentials)
        .clock(fixed_clock())
        .transport(transport.clone())
        .build()
        .unwrap()
}

pub(crate) fn header(request: &HttpRequest, name: &str) -> Option<String> {
    request
        .headers
        .get(name)
        .and_then(|v: &HeaderValue| v.to_str().ok())
        .map(str::to_string)
}
