use std::{io::Read as _, time::Duration};

#[cfg(feature = "metrics")]
use std::time::Instant;

#[cfg(feature = "metrics")]
use http::StatusCode;
use http::{HeaderMap, Method};
use url::Url;

use super::{HttpRequest, HttpResponse, Transport};
use crate::error::{Error, Result};

/// Blocking transport backed by a shared `ureq` agent.
///
/// Non-2xx statuses are returned as responses, never as errors.
pub struct UreqTransport {
    agent: ureq::Agent,
    user_agent: String,
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport")
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new(
        connect_timeout: Duration,
        read_timeout: Duration,
        user_agent: Option<String>,
    ) -> Result<Self> {
        if connect_timeout.is_zero() || read_timeout.is_zero() {
            return Err(Error::invalid_config("timeouts must be greater than zero"));
        }

        let builder = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(Some(connect_timeout))
            .timeout_recv_response(Some(read_timeout))
            .timeout_recv_body(Some(read_timeout));

        #[cfg(all(feature = "native-tls", not(feature = "rustls")))]
        let builder = builder.tls_config(
            ureq::tls::TlsConfig::builder()
                .provider(ureq::tls::TlsProvider::NativeTls)
                .build(),
        );

        Ok(Self {
            agent: ureq::Agent::new_with_config(builder.build()),
            user_agent: user_agent.unwrap_or_else(default_user_agent),
        })
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        #[cfg(feature = "metrics")]
        metrics::counter!("s3_http_requests_total", "method" => method_label(&method))
            .increment(1);
        #[cfg(feature = "tracing")]
        let _guard = tracing::debug_span!(
            "s3.http",
            method = %method,
            host = url.host_str().unwrap_or(""),
            path = url.path(),
            body_len = body.len(),
        )
        .entered();
        #[cfg(feature = "metrics")]
        let start = Instant::now();

        let result = match method.as_str() {
            "GET" => {
                ensure_empty_body(&method, &body)?;
                apply_headers(self.agent.get(url.as_str()), &headers, &self.user_agent).call()
            }
            "HEAD" => {
                ensure_empty_body(&method, &body)?;
                apply_headers(self.agent.head(url.as_str()), &headers, &self.user_agent).call()
            }
            "DELETE" => {
                ensure_empty_body(&method, &body)?;
                apply_headers(self.agent.delete(url.as_str()), &headers, &self.user_agent).call()
            }
            "PUT" => {
                let req = apply_headers(self.agent.put(url.as_str()), &headers, &self.user_agent);
                if body.is_empty() {
                    req.send_empty()
                } else {
                    req.send(body.as_ref())
                }
            }
            "POST" => {
                let req = apply_headers(self.agent.post(url.as_str()), &headers, &self.user_agent);
                if body.is_empty() {
                    req.send_empty()
                } else {
                    req.send(body.as_ref())
                }
            }
            _ => return Err(Error::invalid_config("unsupported HTTP method")),
        };

        let resp = match result {
            Ok(resp) => resp,
            Err(err) => {
                #[cfg(feature = "metrics")]
                metrics::counter!(
                    "s3_http_errors_total",
                    "method" => method_label(&method),
                    "kind" => "transport"
                )
                .increment(1);
                #[cfg(feature = "tracing")]
                tracing::debug!(error = %err, "transport failure");

                return Err(Error::transport(
                    format!("request failed: {}", request_context(&method, &url)),
                    Some(Box::new(err)),
                ));
            }
        };

        let (parts, body) = resp.into_parts();
        let mut buf = Vec::new();
        body.into_reader().read_to_end(&mut buf).map_err(|e| {
            #[cfg(feature = "metrics")]
            metrics::counter!(
                "s3_http_errors_total",
                "method" => method_label(&method),
                "kind" => "body"
            )
            .increment(1);
            Error::transport(
                format!(
                    "failed to read response body: {}",
                    request_context(&method, &url)
                ),
                Some(Box::new(e)),
            )
        })?;

        #[cfg(feature = "metrics")]
        {
            metrics::counter!(
                "s3_http_responses_total",
                "method" => method_label(&method),
                "class" => status_class(parts.status),
            )
            .increment(1);
            metrics::histogram!(
                "s3_http_request_duration_seconds",
                "method" => method_label(&method),
            )
            .record(start.elapsed().as_secs_f64());
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(status = %parts.status, body_len = buf.len(), "response received");

        Ok(HttpResponse::new(parts.status, parts.headers, buf))
    }
}

fn request_context(method: &Method, url: &Url) -> String {
    let authority = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    };

    if authority.is_empty() {
        format!("{method} {}", url.path())
    } else {
        format!("{method} {authority}{}", url.path())
    }
}

fn ensure_empty_body(method: &Method, body: &[u8]) -> Result<()> {
    if body.is_empty() {
        Ok(())
    } else {
        Err(Error::invalid_config(format!(
            "{method} requests cannot carry a body"
        )))
    }
}

#[cfg(feature = "metrics")]
fn status_class(status: StatusCode) -> &'static str {
    if status.is_informational() {
        "1xx"
    } else if status.is_success() {
        "2xx"
    } else if status.is_redirection() {
        "3xx"
    } else if status.is_client_error() {
        "4xx"
    } else if status.is_server_error() {
        "5xx"
    } else {
        "other"
    }
}

#[cfg(feature = "metrics")]
fn method_label(method: &Method) -> &'static str {
    match method.as_str() {
        "GET" => "GET",
        "PUT" => "PUT",
        "HEAD" => "HEAD",
        "DELETE" => "DELETE",
        "POST" => "POST",
        _ => "OTHER",
    }
}

fn apply_headers<B>(
    mut req: ureq::RequestBuilder<B>,
    headers: &HeaderMap,
    user_agent: &str,
) -> ureq::RequestBuilder<B> {
    req = req.header(http::header::USER_AGENT, user_agent);
    for (name, value) in headers.iter() {
        req = req.header(name.clone(), value.clone());
    }
    req
}

fn default_user_agent() -> String {
    format!("pico-s3/{}", env!("CARGO_PKG_VERSION"))
}
