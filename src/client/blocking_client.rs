use std::{fmt, sync::Arc, time::Duration};

use bytes::Bytes;
use http::{HeaderMap, Method};
use url::Url;

use crate::{
    api,
    auth::{Credentials, SignatureVersion},
    clock::{Clock, SystemClock},
    error::{Error, Result},
    signing::{Signer, SigningContext},
    transport::{HttpRequest, HttpResponse, Transport, UreqTransport},
    util,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Blocking S3 client.
///
/// Cheap to clone; clones share the signer, transport and clock.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

pub struct ClientBuilder {
    endpoint: Url,
    credentials: Option<Credentials>,
    signature_version: Option<SignatureVersion>,
    connect_timeout: Duration,
    read_timeout: Duration,
    user_agent: Option<String>,
    clock: Option<Arc<dyn Clock>>,
    transport: Option<Arc<dyn Transport>>,
}

struct Inner {
    endpoint: Url,
    signer: Signer,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("signature_version", &self.inner.signer.version())
            .field("credentials", self.inner.signer.credentials())
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn builder(endpoint: impl AsRef<str>) -> Result<ClientBuilder> {
        ClientBuilder::new(endpoint.as_ref())
    }

    pub fn objects(&self) -> api::ObjectsService {
        api::ObjectsService::new(self.clone())
    }

    pub fn buckets(&self) -> api::BucketsService {
        api::BucketsService::new(self.clone())
    }

    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    pub fn signature_version(&self) -> SignatureVersion {
        self.inner.signer.version()
    }

    /// Signs and sends one request. The response is returned whatever its status.
    pub(crate) fn execute(
        &self,
        method: Method,
        bucket: Option<&str>,
        key: Option<&str>,
        query_params: Vec<(String, String)>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<HttpResponse> {
        #[cfg(feature = "tracing")]
        let _guard = tracing::info_span!(
            "s3.request",
            method = %method,
            bucket = bucket.unwrap_or(""),
            key = key.unwrap_or(""),
            host = self.inner.endpoint.host_str().unwrap_or(""),
            scheme = self.inner.endpoint.scheme(),
        )
        .entered();

        let resolved = util::url::resolve_url(&self.inner.endpoint, bucket, key, &query_params)?;
        let host = util::url::host_header_value(&resolved.url)?;

        let ctx = SigningContext::new(method, host, resolved.path, self.inner.clock.now())
            .query(resolved.query)
            .headers(headers)
            .body(body);
        let (method, _, _, headers, body) = self.inner.signer.sign(ctx)?.into_parts();

        self.inner.transport.send(HttpRequest {
            method,
            url: resolved.url,
            headers,
            body,
        })
    }
}

impl ClientBuilder {
    fn new(endpoint: &str) -> Result<Self> {
        let endpoint = util::url::validate_endpoint(endpoint)?;

        Ok(Self {
            endpoint,
            credentials: None,
            signature_version: None,
            connect_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            clock: None,
            transport: None,
        })
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Overrides the scheme implied by the credentials' region.
    pub fn signature_version(mut self, version: SignatureVersion) -> Self {
        self.signature_version = Some(version);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Ignored when a custom transport is supplied.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn build(self) -> Result<Client> {
        let credentials = self
            .credentials
            .ok_or_else(|| Error::invalid_config("credentials are required"))?;
        let signer = match self.signature_version {
            Some(version) => Signer::with_version(credentials, version)?,
            None => Signer::new(credentials),
        };

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(UreqTransport::new(
                self.connect_timeout,
                self.read_timeout,
                self.user_agent,
            )?),
        };

        Ok(Client {
            inner: Arc::new(Inner {
                endpoint: self.endpoint,
                signer,
                transport,
                clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials::new("AKIDEXAMPLE", "secret").unwrap()
    }

    #[test]
    fn build_requires_credentials() {
        let err = Client::builder("http://localhost:9000")
            .unwrap()
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("credentials are required"));
    }

    #[test]
    fn forcing_v4_without_region_fails() {
        let result = Client::builder("http://localhost:9000")
            .unwrap()
            .credentials(creds())
            .signature_version(SignatureVersion::V4)
            .build();
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn version_follows_credentials() {
        let client = Client::builder("http://localhost:9000")
            .unwrap()
            .credentials(creds())
            .build()
            .unwrap();
        assert_eq!(client.signature_version(), SignatureVersion::V2);

        let client = Client::builder("http://localhost:9000")
            .unwrap()
            .credentials(creds().with_region("eu-west-1").unwrap())
            .build()
            .unwrap();
        assert_eq!(client.signature_version(), SignatureVersion::V4);
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let client = Client::builder("https://s3.example.com")
            .unwrap()
            .credentials(Credentials::new("AKIDEXAMPLE123", "super-secret-value").unwrap())
            .build()
            .unwrap();
        let rendered = format!("{client:?}");
        assert!(rendered.contains("s3.example.com"));
        assert!(!rendered.contains("super-secret-value"));
    }

    #[test]
    fn rejects_endpoint_with_path() {
        assert!(Client::builder("https://s3.example.com/prefix").is_err());
    }
}
