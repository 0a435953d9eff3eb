use bytes::Bytes;
use http::{HeaderMap, HeaderName, Method};

use super::common::{check_status, ensure_success, header_value};
use crate::{
    client::Client,
    error::{Error, Result},
    pagination::{Page, Pager},
    types::CannedAcl,
    xml::{self, decode},
};

const ACL_HEADER: HeaderName = HeaderName::from_static("x-amz-acl");
const S3_XMLNS: &str = "http://s3.amazonaws.com/doc/2006-03-01/";

/// Bucket operations service.
#[derive(Clone)]
pub struct BucketsService {
    client: Client,
}

impl BucketsService {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Lists the buckets owned by the caller.
    pub fn list(&self) -> ListBucketsRequest {
        ListBucketsRequest {
            client: self.client.clone(),
        }
    }

    pub fn create(&self, bucket: impl Into<String>) -> CreateBucketRequest {
        CreateBucketRequest {
            client: self.client.clone(),
            bucket: bucket.into(),
            acl: None,
            location_constraint: None,
        }
    }

    pub fn delete(&self, bucket: impl Into<String>) -> DeleteBucketRequest {
        DeleteBucketRequest {
            client: self.client.clone(),
            bucket: bucket.into(),
        }
    }

    /// Returns whether the bucket exists, via a HEAD request.
    pub fn exists(&self, bucket: &str) -> Result<bool> {
        let resp = self.client.execute(
            Method::HEAD,
            Some(bucket),
            None,
            Vec::new(),
            HeaderMap::new(),
            Bytes::new(),
        )?;
        Ok(check_status(resp)?.is_some())
    }
}

/// Request builder for ListBuckets.
#[derive(Clone)]
pub struct ListBucketsRequest {
    client: Client,
}

impl ListBucketsRequest {
    pub fn first_page(&self) -> Result<Page<String>> {
        self.fetch(None)
    }

    /// Iterates over pages of bucket names.
    pub fn pager(self) -> Pager<String, impl FnMut(Option<&str>) -> Result<Page<String>>> {
        Pager::new(move |cursor: Option<&str>| self.fetch(cursor))
    }

    /// Collects every bucket name.
    pub fn send(self) -> Result<Vec<String>> {
        self.pager().collect_all()
    }

    fn fetch(&self, cursor: Option<&str>) -> Result<Page<String>> {
        let query = cursor
            .map(|token| vec![("continuation-token".to_string(), token.to_string())])
            .unwrap_or_default();

        let resp = self.client.execute(
            Method::GET,
            None,
            None,
            query,
            HeaderMap::new(),
            Bytes::new(),
        )?;
        match check_status(resp)? {
            Some(resp) => decode::decode_bucket_page(&resp.body),
            None => Ok(Page::new(Vec::new(), None)),
        }
    }
}

/// Request builder for CreateBucket.
pub struct CreateBucketRequest {
    client: Client,
    bucket: String,
    acl: Option<CannedAcl>,
    location_constraint: Option<String>,
}

impl CreateBucketRequest {
    pub fn acl(mut self, acl: CannedAcl) -> Self {
        self.acl = Some(acl);
        self
    }

    /// Creates the bucket in the given region instead of the endpoint's default.
    pub fn location_constraint(mut self, region: impl Into<String>) -> Self {
        self.location_constraint = Some(region.into());
        self
    }

    pub fn send(self) -> Result<()> {
        let mut headers = HeaderMap::new();
        if let Some(acl) = &self.acl {
            headers.insert(ACL_HEADER, header_value(acl.as_str(), "x-amz-acl")?);
        }

        let body = match &self.location_constraint {
            Some(region) => {
                let region = region.trim();
                if region.is_empty() {
                    return Err(Error::invalid_config(
                        "location constraint must not be empty",
                    ));
                }
                headers.insert(
                    http::header::CONTENT_TYPE,
                    http::HeaderValue::from_static("application/xml"),
                );
                Bytes::from(create_bucket_configuration(region))
            }
            None => Bytes::new(),
        };

        let resp = self.client.execute(
            Method::PUT,
            Some(&self.bucket),
            None,
            Vec::new(),
            headers,
            body,
        )?;
        ensure_success(resp)?;
        Ok(())
    }
}

/// Request builder for DeleteBucket.
pub struct DeleteBucketRequest {
    client: Client,
    bucket: String,
}

impl DeleteBucketRequest {
    /// Returns `false` when the bucket does not exist.
    pub fn send(self) -> Result<bool> {
        let resp = self.client.execute(
            Method::DELETE,
            Some(&self.bucket),
            None,
            Vec::new(),
            HeaderMap::new(),
            Bytes::new(),
        )?;
        Ok(check_status(resp)?.is_some())
    }
}

fn create_bucket_configuration(region: &str) -> String {
    format!(
        "<CreateBucketConfiguration xmlns=\"{S3_XMLNS}\"><LocationConstraint>{}</LocationConstraint></CreateBucketConfiguration>",
        xml::escape(region)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_bucket_configuration_is_well_formed() {
        let body = create_bucket_configuration("eu-west-1");
        assert!(body.starts_with("<CreateBucketConfiguration xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">"));
        assert_eq!(
            decode::collect_text(body.as_bytes(), "LocationConstraint").unwrap(),
            vec!["eu-west-1"]
        );
    }

    #[test]
    fn create_bucket_configuration_escapes_region() {
        let body = create_bucket_configuration("a<b");
        assert!(body.contains("<LocationConstraint>a&lt;b</LocationConstraint>"));
    }
}
