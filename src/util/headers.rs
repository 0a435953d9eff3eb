use http::{
    HeaderMap,
    header::{AsHeaderName, HeaderName},
};

use crate::error::{Error, Result};

pub(crate) fn header_string<N>(headers: &HeaderMap, name: N) -> Option<String>
where
    N: AsHeaderName,
{
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

pub(crate) fn header_u64<N>(headers: &HeaderMap, name: N) -> Option<u64>
where
    N: AsHeaderName,
{
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// Like [`header_u64`], but a missing or malformed value is a decode error.
pub(crate) fn required_content_length(headers: &HeaderMap) -> Result<u64> {
    let raw = headers
        .get(http::header::CONTENT_LENGTH)
        .ok_or_else(|| Error::decode("response is missing Content-Length", None))?;
    raw.to_str()
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .ok_or_else(|| Error::decode("response has an invalid Content-Length", None))
}

/// `x-amz-meta-{key}`, lower-cased.
pub(crate) fn metadata_header_name(key: &str) -> Result<HeaderName> {
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::invalid_config("metadata key must not be empty"));
    }

    let name = format!("x-amz-meta-{}", key.to_ascii_lowercase());
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| Error::invalid_config(format!("invalid metadata key {key:?}")))
}

/// `x-amz-copy-source` value: `/{bucket}/{encoded key}`.
pub(crate) fn copy_source_header_value(bucket: &str, key: &str) -> String {
    format!("/{bucket}/{}", crate::encoding::percent_encode(key, false))
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;

    use super::*;

    #[test]
    fn reads_numeric_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::CONTENT_LENGTH, HeaderValue::from_static("42"));
        assert_eq!(header_u64(&headers, http::header::CONTENT_LENGTH), Some(42));
        assert_eq!(required_content_length(&headers).unwrap(), 42);

        headers.insert(http::header::CONTENT_LENGTH, HeaderValue::from_static("-1"));
        assert_eq!(header_u64(&headers, http::header::CONTENT_LENGTH), None);
        assert!(required_content_length(&headers).is_err());

        assert!(required_content_length(&HeaderMap::new()).is_err());
    }

    #[test]
    fn builds_metadata_header_name() {
        let name = metadata_header_name(" Owner ").unwrap();
        assert_eq!(name.as_str(), "x-amz-meta-owner");

        assert!(metadata_header_name("").is_err());
        assert!(metadata_header_name("a b").is_err());
    }

    #[test]
    fn copy_source_encodes_key_only() {
        assert_eq!(
            copy_source_header_value("src", "dir/a b.txt"),
            "/src/dir/a%20b.txt"
        );
    }
}
