use http::{HeaderValue, StatusCode};

use crate::{
    error::{Error, Result},
    transport::{HttpResponse, response_error},
};

/// 2xx is `Some`, 404 is `None`, anything else is an error.
pub(crate) fn check_status(resp: HttpResponse) -> Result<Option<HttpResponse>> {
    if resp.status.is_success() {
        return Ok(Some(resp));
    }
    if resp.status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    Err(response_error(resp.status, &resp.headers, &resp.body))
}

/// Like [`check_status`] for operations where a 404 is a failure too.
pub(crate) fn ensure_success(resp: HttpResponse) -> Result<HttpResponse> {
    if resp.status.is_success() {
        return Ok(resp);
    }
    Err(response_error(resp.status, &resp.headers, &resp.body))
}

pub(crate) fn header_value(value: &str, what: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| Error::invalid_config(format!("invalid {what} header")))
}

#[cfg(test)]
mod tests {
    use http::HeaderMap;

    use super::*;

    fn response(status: StatusCode) -> HttpResponse {
        HttpResponse::new(status, HeaderMap::new(), bytes::Bytes::new())
    }

    #[test]
    fn maps_statuses() {
        assert!(check_status(response(StatusCode::OK)).unwrap().is_some());
        assert!(check_status(response(StatusCode::NO_CONTENT)).unwrap().is_some());
        assert!(check_status(response(StatusCode::NOT_FOUND)).unwrap().is_none());
        assert!(matches!(
            check_status(response(StatusCode::FORBIDDEN)),
            Err(Error::Client { .. })
        ));
        assert!(matches!(
            check_status(response(StatusCode::SERVICE_UNAVAILABLE)),
            Err(Error::Server { .. })
        ));
        assert!(matches!(
            ensure_success(response(StatusCode::NOT_FOUND)),
            Err(Error::Client { .. })
        ));
    }
}
