use std::fmt;

use crate::error::Error;

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Region(String);

impl Region {
    pub fn new(value: impl Into<String>) -> Result<Self, Error> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(Error::invalid_config("region must not be empty"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Region").field(&self.0).finish()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for Region {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Request signing scheme.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureVersion {
    /// Legacy HMAC-SHA1 `AWS <access>:<signature>` scheme.
    V2,
    /// `AWS4-HMAC-SHA256` scheme; requires a region.
    V4,
}

/// Static access credentials, optionally bound to a region.
///
/// A region selects SigV4 by default; without one the legacy scheme is used.
#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: Option<Region>,
}

impl Credentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Result<Self, Error> {
        let access_key_id = access_key_id.into();
        let secret_access_key = secret_access_key.into();

        if access_key_id.trim().is_empty() {
            return Err(Error::invalid_config("access_key_id must not be empty"));
        }
        if secret_access_key.trim().is_empty() {
            return Err(Error::invalid_config("secret_access_key must not be empty"));
        }

        Ok(Self {
            access_key_id,
            secret_access_key,
            region: None,
        })
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Result<Self, Error> {
        self.region = Some(Region::new(region)?);
        Ok(self)
    }

    /// Reads `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and, when present,
    /// `AWS_REGION` (falling back to `AWS_DEFAULT_REGION`).
    pub fn from_env() -> Result<Self, Error> {
        let access_key_id = std::env::var("AWS_ACCESS_KEY_ID")
            .map_err(|_| Error::invalid_config("missing AWS_ACCESS_KEY_ID"))?;
        let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY")
            .map_err(|_| Error::invalid_config("missing AWS_SECRET_ACCESS_KEY"))?;
        let region = std::env::var("AWS_REGION")
            .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
            .ok()
            .filter(|v| !v.trim().is_empty());

        let creds = Self::new(access_key_id, secret_access_key)?;
        match region {
            Some(region) => creds.with_region(region),
            None => Ok(creds),
        }
    }

    /// Scheme implied by these credentials.
    pub fn signature_version(&self) -> SignatureVersion {
        if self.region.is_some() {
            SignatureVersion::V4
        } else {
            SignatureVersion::V2
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field(
                "access_key_id",
                &crate::util::redact::redact_value(&self.access_key_id),
            )
            .field("secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_selects_signature_version() {
        let creds = Credentials::new("AKIDEXAMPLE", "secret").unwrap();
        assert_eq!(creds.signature_version(), SignatureVersion::V2);

        let creds = creds.with_region("us-east-1").unwrap();
        assert_eq!(creds.signature_version(), SignatureVersion::V4);
    }

    #[test]
    fn rejects_blank_values() {
        assert!(Credentials::new(" ", "secret").is_err());
        assert!(Credentials::new("access", "").is_err());
        assert!(Region::new("  ").is_err());
    }

    #[test]
    fn debug_redacts_secrets() {
        let creds = Credentials::new("AKIDEXAMPLE123", "very-secret-key").unwrap();
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("very-secret-key"));
        assert!(!rendered.contains("AKIDEXAMPLE123"));
        assert!(rendered.contains("AKID...E123"));
    }
}
