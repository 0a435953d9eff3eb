//! Object operations.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, Method};

use super::common::{check_status, ensure_success, header_value};
use crate::{
    client::Client,
    error::{Error, Result},
    pagination::{Page, Pager},
    types::{CannedAcl, CopyObjectOutput, GetObjectOutput, ObjectMetadata, PutObjectOutput},
    util::headers::{
        copy_source_header_value, header_string, header_u64, metadata_header_name,
        required_content_length,
    },
    xml::decode,
};

const ACL_HEADER: HeaderName = HeaderName::from_static("x-amz-acl");
const SSE_HEADER: HeaderName = HeaderName::from_static("x-amz-server-side-encryption");
const SSE_KMS_KEY_HEADER: HeaderName =
    HeaderName::from_static("x-amz-server-side-encryption-aws-kms-key-id");
const COPY_SOURCE_HEADER: HeaderName = HeaderName::from_static("x-amz-copy-source");

/// Object operations service.
#[derive(Clone)]
pub struct ObjectsService {
    client: Client,
}

impl ObjectsService {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Starts a request to PUT an object.
    pub fn put(&self, bucket: impl Into<String>, key: impl Into<String>) -> PutObjectRequest {
        PutObjectRequest {
            client: self.client.clone(),
            bucket: bucket.into(),
            key: key.into(),
            content_type: None,
            acl: None,
            server_side_encryption: None,
            sse_kms_key_id: None,
            metadata: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Starts a request to GET an object.
    pub fn get(&self, bucket: impl Into<String>, key: impl Into<String>) -> GetObjectRequest {
        GetObjectRequest {
            client: self.client.clone(),
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Starts a request to HEAD an object.
    pub fn head(&self, bucket: impl Into<String>, key: impl Into<String>) -> HeadObjectRequest {
        HeadObjectRequest {
            client: self.client.clone(),
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Starts a server-side copy.
    pub fn copy(
        &self,
        source_bucket: impl Into<String>,
        source_key: impl Into<String>,
        destination_bucket: impl Into<String>,
        destination_key: impl Into<String>,
    ) -> CopyObjectRequest {
        CopyObjectRequest {
            client: self.client.clone(),
            source_bucket: source_bucket.into(),
            source_key: source_key.into(),
            destination_bucket: destination_bucket.into(),
            destination_key: destination_key.into(),
            acl: None,
        }
    }

    /// Starts a request to DELETE an object.
    pub fn delete(&self, bucket: impl Into<String>, key: impl Into<String>) -> DeleteObjectRequest {
        DeleteObjectRequest {
            client: self.client.clone(),
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Starts a paginated ListObjectsV2 listing.
    pub fn list(&self, bucket: impl Into<String>) -> ListObjectsRequest {
        ListObjectsRequest {
            client: self.client.clone(),
            bucket: bucket.into(),
            prefix: None,
            max_keys: None,
        }
    }

    /// Starts a single-page ListObjects (v1) request returning keys only.
    pub fn list_keys(&self, bucket: impl Into<String>) -> ListKeysRequest {
        ListKeysRequest {
            client: self.client.clone(),
            bucket: bucket.into(),
            prefix: None,
            marker: None,
            max_keys: None,
        }
    }
}

/// Request builder for uploading an object.
pub struct PutObjectRequest {
    client: Client,
    bucket: String,
    key: String,
    content_type: Option<String>,
    acl: Option<CannedAcl>,
    server_side_encryption: Option<String>,
    sse_kms_key_id: Option<String>,
    metadata: Vec<(String, String)>,
    body: Bytes,
}

impl PutObjectRequest {
    /// Sets the request body from bytes.
    pub fn body_bytes(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(mut self, value: impl Into<String>) -> Self {
        self.content_type = Some(value.into());
        self
    }

    pub fn acl(mut self, acl: CannedAcl) -> Self {
        self.acl = Some(acl);
        self
    }

    /// Requests server-side encryption, e.g. `AES256` or `aws:kms`.
    pub fn server_side_encryption(mut self, algorithm: impl Into<String>) -> Self {
        self.server_side_encryption = Some(algorithm.into());
        self
    }

    /// Encrypts with the given KMS key. Implies `aws:kms` unless an algorithm was set.
    pub fn sse_kms_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.sse_kms_key_id = Some(key_id.into());
        self
    }

    /// Adds a user metadata entry (`x-amz-meta-*`).
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }

    /// Sends the request.
    pub fn send(self) -> Result<PutObjectOutput> {
        let mut headers = HeaderMap::new();
        if let Some(ct) = &self.content_type {
            headers.insert(http::header::CONTENT_TYPE, header_value(ct, "Content-Type")?);
        }
        if let Some(acl) = &self.acl {
            headers.insert(ACL_HEADER, header_value(acl.as_str(), "x-amz-acl")?);
        }

        let sse = match (&self.server_side_encryption, &self.sse_kms_key_id) {
            (Some(algorithm), _) => Some(algorithm.as_str()),
            (None, Some(_)) => Some("aws:kms"),
            (None, None) => None,
        };
        if let Some(sse) = sse {
            headers.insert(SSE_HEADER, header_value(sse, "server-side encryption")?);
        }
        if let Some(key_id) = &self.sse_kms_key_id {
            headers.insert(SSE_KMS_KEY_HEADER, header_value(key_id, "KMS key id")?);
        }

        for (name, value) in &self.metadata {
            headers.append(
                metadata_header_name(name)?,
                header_value(value, "metadata")?,
            );
        }

        let resp = self.client.execute(
            Method::PUT,
            Some(&self.bucket),
            Some(&self.key),
            Vec::new(),
            headers,
            self.body,
        )?;
        let resp = ensure_success(resp)?;

        Ok(PutObjectOutput {
            etag: header_string(&resp.headers, http::header::ETAG),
        })
    }
}

/// Request builder for downloading an object.
pub struct GetObjectRequest {
    client: Client,
    bucket: String,
    key: String,
}

impl GetObjectRequest {
    /// Sends the request. A missing object or bucket yields `None`.
    pub fn send(self) -> Result<Option<GetObjectOutput>> {
        let resp = self.client.execute(
            Method::GET,
            Some(&self.bucket),
            Some(&self.key),
            Vec::new(),
            HeaderMap::new(),
            Bytes::new(),
        )?;
        let Some(resp) = check_status(resp)? else {
            return Ok(None);
        };

        Ok(Some(GetObjectOutput {
            etag: header_string(&resp.headers, http::header::ETAG),
            content_length: header_u64(&resp.headers, http::header::CONTENT_LENGTH),
            content_type: header_string(&resp.headers, http::header::CONTENT_TYPE),
            last_modified: header_string(&resp.headers, http::header::LAST_MODIFIED),
            body: resp.body,
            headers: resp.headers,
        }))
    }
}

/// Request builder for object metadata.
pub struct HeadObjectRequest {
    client: Client,
    bucket: String,
    key: String,
}

impl HeadObjectRequest {
    /// Sends the request. A missing object yields `None`.
    pub fn send(self) -> Result<Option<ObjectMetadata>> {
        let resp = self.client.execute(
            Method::HEAD,
            Some(&self.bucket),
            Some(&self.key),
            Vec::new(),
            HeaderMap::new(),
            Bytes::new(),
        )?;
        let Some(resp) = check_status(resp)? else {
            return Ok(None);
        };

        let size = required_content_length(&resp.headers)?;
        let size = i64::try_from(size)
            .map_err(|e| Error::decode("Content-Length out of range", Some(Box::new(e))))?;

        Ok(Some(ObjectMetadata {
            key: self.key,
            etag: header_string(&resp.headers, http::header::ETAG).unwrap_or_default(),
            size,
            last_modified: header_string(&resp.headers, http::header::LAST_MODIFIED)
                .unwrap_or_default(),
            content_type: header_string(&resp.headers, http::header::CONTENT_TYPE),
            server_side_encryption: header_string(&resp.headers, SSE_HEADER),
        }))
    }
}

/// Request builder for a server-side copy.
pub struct CopyObjectRequest {
    client: Client,
    source_bucket: String,
    source_key: String,
    destination_bucket: String,
    destination_key: String,
    acl: Option<CannedAcl>,
}

impl CopyObjectRequest {
    /// Sets the ACL of the new object.
    pub fn acl(mut self, acl: CannedAcl) -> Self {
        self.acl = Some(acl);
        self
    }

    /// Sends the request.
    pub fn send(self) -> Result<CopyObjectOutput> {
        let mut headers = HeaderMap::new();
        headers.insert(
            COPY_SOURCE_HEADER,
            header_value(
                &copy_source_header_value(&self.source_bucket, &self.source_key),
                "x-amz-copy-source",
            )?,
        );
        if let Some(acl) = &self.acl {
            headers.insert(ACL_HEADER, header_value(acl.as_str(), "x-amz-acl")?);
        }

        let resp = self.client.execute(
            Method::PUT,
            Some(&self.destination_bucket),
            Some(&self.destination_key),
            Vec::new(),
            headers,
            Bytes::new(),
        )?;
        let resp = ensure_success(resp)?;
        decode::decode_copy_result(&resp.body)
    }
}

/// Request builder for deleting a single object.
pub struct DeleteObjectRequest {
    client: Client,
    bucket: String,
    key: String,
}

impl DeleteObjectRequest {
    /// Sends the request. Returns `false` when the server answers 404.
    pub fn send(self) -> Result<bool> {
        let resp = self.client.execute(
            Method::DELETE,
            Some(&self.bucket),
            Some(&self.key),
            Vec::new(),
            HeaderMap::new(),
            Bytes::new(),
        )?;
        Ok(check_status(resp)?.is_some())
    }
}

/// Request builder for ListObjectsV2.
#[derive(Clone)]
pub struct ListObjectsRequest {
    client: Client,
    bucket: String,
    prefix: Option<String>,
    max_keys: Option<u32>,
}

impl ListObjectsRequest {
    /// Filters by key prefix.
    pub fn prefix(mut self, value: impl Into<String>) -> Self {
        self.prefix = Some(value.into());
        self
    }

    /// Sets the maximum number of keys per page.
    pub fn max_keys(mut self, value: u32) -> Self {
        self.max_keys = Some(value);
        self
    }

    /// Fetches the first page only. A missing bucket yields an empty last page.
    pub fn first_page(&self) -> Result<Page<ObjectMetadata>> {
        self.fetch(None)
    }

    /// Iterates over every page.
    pub fn pager(
        self,
    ) -> Pager<ObjectMetadata, impl FnMut(Option<&str>) -> Result<Page<ObjectMetadata>>> {
        Pager::new(move |cursor: Option<&str>| self.fetch(cursor))
    }

    /// Collects every object of every page.
    pub fn send(self) -> Result<Vec<ObjectMetadata>> {
        self.pager().collect_all()
    }

    fn fetch(&self, cursor: Option<&str>) -> Result<Page<ObjectMetadata>> {
        let mut query = vec![("list-type".to_string(), "2".to_string())];
        if let Some(token) = cursor {
            query.push(("continuation-token".to_string(), token.to_string()));
        }
        if let Some(v) = &self.prefix {
            query.push(("prefix".to_string(), v.clone()));
        }
        if let Some(v) = self.max_keys {
            query.push(("max-keys".to_string(), v.to_string()));
        }

        let resp = self.client.execute(
            Method::GET,
            Some(&self.bucket),
            None,
            query,
            HeaderMap::new(),
            Bytes::new(),
        )?;
        match check_status(resp)? {
            Some(resp) => decode::decode_object_page(&resp.body),
            None => Ok(Page::new(Vec::new(), None)),
        }
    }
}

/// Request builder for a single ListObjects (v1) page.
pub struct ListKeysRequest {
    client: Client,
    bucket: String,
    prefix: Option<String>,
    marker: Option<String>,
    max_keys: Option<u32>,
}

impl ListKeysRequest {
    /// Filters by key prefix.
    pub fn prefix(mut self, value: impl Into<String>) -> Self {
        self.prefix = Some(value.into());
        self
    }

    /// Starts listing after this key.
    pub fn marker(mut self, value: impl Into<String>) -> Self {
        self.marker = Some(value.into());
        self
    }

    /// Sets the maximum number of keys to return.
    pub fn max_keys(mut self, value: u32) -> Self {
        self.max_keys = Some(value);
        self
    }

    /// Sends the request and returns the keys in listing order. A missing
    /// bucket yields no keys.
    pub fn send(self) -> Result<Vec<String>> {
        let mut query = Vec::new();
        if let Some(v) = self.prefix {
            query.push(("prefix".to_string(), v));
        }
        if let Some(v) = self.marker {
            query.push(("marker".to_string(), v));
        }
        if let Some(v) = self.max_keys {
            query.push(("max-keys".to_string(), v.to_string()));
        }

        let resp = self.client.execute(
            Method::GET,
            Some(&self.bucket),
            None,
            query,
            HeaderMap::new(),
            Bytes::new(),
        )?;
        match check_status(resp)? {
            Some(resp) => decode::collect_text(&resp.body, "Key"),
            None => Ok(Vec::new()),
        }
    }
}
