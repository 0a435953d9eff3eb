use url::Url;

use crate::{encoding, error::Error};

pub(crate) struct ResolvedUrl {
    pub(crate) url: Url,
    pub(crate) path: String,
    pub(crate) query: String,
}

/// `/`, `/{bucket}` or `/{bucket}/{encoded key}`. The bucket is used as is.
pub(crate) fn request_path(bucket: Option<&str>, key: Option<&str>) -> String {
    match (bucket, key) {
        (None, _) => "/".to_string(),
        (Some(bucket), None) => format!("/{bucket}"),
        (Some(bucket), Some(key)) => format!("/{bucket}/{}", encoding::percent_encode(key, false)),
    }
}

pub(crate) fn resolve_url(
    base_url: &Url,
    bucket: Option<&str>,
    key: Option<&str>,
    query_params: &[(String, String)],
) -> Result<ResolvedUrl, Error> {
    let mut url = base_url.clone();

    let query = encoding::canonical_query_string(query_params);
    if query.is_empty() {
        url.set_query(None);
    } else {
        url.set_query(Some(&query));
    }

    let path = request_path(bucket, key);
    url.set_path(&path);

    Ok(ResolvedUrl { url, path, query })
}

/// Host header value, with the port only when it differs from the scheme's default.
pub(crate) fn host_header_value(url: &Url) -> Result<String, Error> {
    let host = url
        .host_str()
        .ok_or_else(|| Error::invalid_config("endpoint must include host"))?;
    let default_port = match url.scheme() {
        "http" => Some(80),
        "https" => Some(443),
        _ => None,
    };
    Ok(match (url.port(), default_port) {
        (Some(port), Some(default)) if port != default => format!("{host}:{port}"),
        (Some(port), None) => format!("{host}:{port}"),
        _ => host.to_string(),
    })
}

pub(crate) fn validate_endpoint(endpoint: &str) -> Result<Url, Error> {
    let endpoint = Url::parse(endpoint)
        .map_err(|_| Error::invalid_config("endpoint must be a valid absolute URL"))?;

    if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
        return Err(Error::invalid_config(
            "endpoint scheme must be http or https",
        ));
    }
    if endpoint.host_str().is_none() {
        return Err(Error::invalid_config("endpoint must include host"));
    }
    if endpoint.query().is_some() || endpoint.fragment().is_some() {
        return Err(Error::invalid_config(
            "endpoint must not include query or fragment",
        ));
    }
    if endpoint.path() != "/" && !endpoint.path().is_empty() {
        return Err(Error::invalid_config("endpoint must not include a path"));
    }

    Ok(endpoint)
}
