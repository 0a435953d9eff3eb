//! HTTP transport seam.
//!
//! The client only ever talks to a [`Transport`]. [`UreqTransport`] is the
//! default; tests and callers with their own HTTP stack can plug in another
//! implementation through `ClientBuilder::transport`.

use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use url::Url;

use crate::{
    error::{Error, Result},
    xml::decode::decode_error,
};

mod ureq_transport;

pub use ureq_transport::UreqTransport;

const ERROR_SNIPPET_LIMIT: usize = 4096;

/// A fully signed request ready to go on the wire.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// A response with its body read to the end.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }
}

/// Sends one request and returns the response, whatever its status.
///
/// Implementations report only failures to exchange the request itself
/// (connect, TLS, timeouts, I/O) as [`Error::Transport`]. They must not
/// retry.
pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        (**self).send(request)
    }
}

/// Builds the error for a non-2xx, non-404 response.
///
/// 4xx statuses become [`Error::Client`]; 5xx and anything unexpected become
/// [`Error::Server`].
pub(crate) fn response_error(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> Error {
    let header_request_id = crate::util::headers::header_string(headers, "x-amz-request-id");
    let snippet =
        crate::util::text::truncate_snippet(&String::from_utf8_lossy(body), ERROR_SNIPPET_LIMIT);
    let body_snippet = Some(snippet).filter(|s| !s.is_empty());

    let doc = decode_error(body).unwrap_or_default();
    let code = doc.code;
    let message = doc.message;
    let request_id = doc.request_id.or(header_request_id);

    #[cfg(feature = "tracing")]
    tracing::debug!(
        status = %status,
        code = code.as_deref().unwrap_or(""),
        request_id = request_id.as_deref().unwrap_or(""),
        "request rejected"
    );

    if status.is_client_error() {
        Error::Client {
            status,
            code,
            message,
            request_id,
            body_snippet,
        }
    } else {
        Error::Server {
            status,
            code,
            message,
            request_id,
            body_snippet,
        }
    }
}
