//! Shared request and response types.

use bytes::Bytes;
use http::HeaderMap;

/// Object metadata returned by list and HEAD operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectMetadata {
    /// Object key.
    pub key: String,
    /// Entity tag as sent by the server, quotes included. Empty when absent.
    pub etag: String,
    /// Object size in bytes.
    pub size: i64,
    /// Last-modified timestamp as sent by the server. Empty when absent.
    pub last_modified: String,
    /// Content type; only filled by HEAD.
    pub content_type: Option<String>,
    /// `x-amz-server-side-encryption` value; only filled by HEAD.
    pub server_side_encryption: Option<String>,
}

/// Output from a GET object request.
#[derive(Clone, Debug)]
pub struct GetObjectOutput {
    /// Full response body.
    pub body: Bytes,
    /// Entity tag, if provided.
    pub etag: Option<String>,
    /// Content length, if known.
    pub content_length: Option<u64>,
    /// Content type, if provided.
    pub content_type: Option<String>,
    /// Last-modified timestamp, if provided.
    pub last_modified: Option<String>,
    /// All response headers.
    pub headers: HeaderMap,
}

impl GetObjectOutput {
    /// Returns the body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Output from a PUT object request.
#[derive(Clone, Debug)]
pub struct PutObjectOutput {
    /// Entity tag, if provided.
    pub etag: Option<String>,
}

/// Output from a copy object request.
#[derive(Clone, Debug)]
pub struct CopyObjectOutput {
    /// Entity tag of the new object, if provided.
    pub etag: Option<String>,
    /// Last-modified timestamp, if provided.
    pub last_modified: Option<String>,
}

/// Canned access control list sent as `x-amz-acl`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CannedAcl {
    Private,
    PublicRead,
    PublicReadWrite,
    AuthenticatedRead,
    BucketOwnerRead,
    BucketOwnerFullControl,
    /// Any other value understood by the server.
    Custom(String),
}

impl CannedAcl {
    /// Returns the wire value for this ACL.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Private => "private",
            Self::PublicRead => "public-read",
            Self::PublicReadWrite => "public-read-write",
            Self::AuthenticatedRead => "authenticated-read",
            Self::BucketOwnerRead => "bucket-owner-read",
            Self::BucketOwnerFullControl => "bucket-owner-full-control",
            Self::Custom(v) => v.as_str(),
        }
    }
}

impl std::fmt::Display for CannedAcl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
