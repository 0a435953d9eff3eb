//! Request authentication.
//!
//! A [`SigningContext`] gathers everything that participates in a signature.
//! [`Signer::sign`] consumes it and returns a [`SignedRequest`] whose headers
//! can no longer be changed, so nothing can be added after the signature was
//! computed.

mod v2;
mod v4;

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use time::{OffsetDateTime, UtcOffset};

use crate::{
    auth::{Credentials, SignatureVersion},
    error::{Error, Result},
};

/// Inputs of a single request signature.
#[derive(Clone, Debug)]
pub struct SigningContext {
    method: Method,
    host: String,
    path: String,
    query: String,
    headers: HeaderMap,
    body: Bytes,
    timestamp: OffsetDateTime,
}

impl SigningContext {
    /// `path` must already be in its on-the-wire (percent-encoded) form.
    pub fn new(
        method: Method,
        host: impl Into<String>,
        path: impl Into<String>,
        timestamp: OffsetDateTime,
    ) -> Self {
        Self {
            method,
            host: host.into(),
            path: path.into(),
            query: String::new(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            timestamp: timestamp.to_offset(UtcOffset::UTC),
        }
    }

    /// Sets the canonical query string (without the leading `?`).
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Appends a header value, keeping earlier values for the same name.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Appends every header of `headers`.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        let mut last = None;
        for (name, value) in headers {
            if let Some(name) = name {
                last = Some(name);
            }
            if let Some(name) = &last {
                self.headers.append(name.clone(), value);
            }
        }
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

/// A request whose header set is sealed by its signature.
#[derive(Clone, Debug)]
pub struct SignedRequest {
    method: Method,
    path: String,
    query: String,
    headers: HeaderMap,
    body: Bytes,
}

impl SignedRequest {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The computed `Authorization` header value.
    pub fn authorization(&self) -> Option<&str> {
        self.headers
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
    }

    pub(crate) fn into_parts(self) -> (Method, String, String, HeaderMap, Bytes) {
        (self.method, self.path, self.query, self.headers, self.body)
    }
}

/// Signs requests with one fixed set of credentials.
#[derive(Clone, Debug)]
pub struct Signer {
    credentials: Credentials,
    version: SignatureVersion,
}

impl Signer {
    /// Uses the scheme implied by the credentials' region.
    pub fn new(credentials: Credentials) -> Self {
        let version = credentials.signature_version();
        Self {
            credentials,
            version,
        }
    }

    /// Forces a scheme. SigV4 needs a region on the credentials.
    pub fn with_version(credentials: Credentials, version: SignatureVersion) -> Result<Self> {
        if version == SignatureVersion::V4 && credentials.region.is_none() {
            return Err(Error::invalid_config("SigV4 signing requires a region"));
        }
        Ok(Self {
            credentials,
            version,
        })
    }

    pub fn version(&self) -> SignatureVersion {
        self.version
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn sign(&self, mut ctx: SigningContext) -> Result<SignedRequest> {
        ctx.headers.remove(http::header::AUTHORIZATION);

        match self.version {
            SignatureVersion::V2 => v2::sign(&mut ctx, &self.credentials)?,
            SignatureVersion::V4 => {
                let region = self
                    .credentials
                    .region
                    .as_ref()
                    .ok_or_else(|| Error::invalid_config("SigV4 signing requires a region"))?;
                v4::sign(&mut ctx, &self.credentials, region)?;
            }
        }

        Ok(SignedRequest {
            method: ctx.method,
            path: ctx.path,
            query: ctx.query,
            headers: ctx.headers,
            body: ctx.body,
        })
    }
}

fn header_value(value: &str, what: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| Error::signing(format!("invalid {what} header value")))
}

fn header_str<'a>(name: &HeaderName, value: &'a HeaderValue) -> Result<&'a str> {
    value
        .to_str()
        .map_err(|_| Error::signing(format!("header {name} is not visible ASCII")))
}
