use http::{HeaderMap, HeaderName, Method};
use time::OffsetDateTime;

use super::{SigningContext, header_str, header_value};
use crate::{
    auth::{Credentials, Region},
    encoding,
    error::Result,
};

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";

pub(super) fn sign(
    ctx: &mut SigningContext,
    credentials: &Credentials,
    region: &Region,
) -> Result<()> {
    let now = ctx.timestamp;
    let payload_hash = encoding::hex(&encoding::sha256(&ctx.body));

    ctx.headers
        .insert(http::header::HOST, header_value(&ctx.host, "host")?);
    ctx.headers.insert(
        HeaderName::from_static("x-amz-date"),
        header_value(&amz_datetime(now), "x-amz-date")?,
    );
    ctx.headers.insert(
        HeaderName::from_static("x-amz-content-sha256"),
        header_value(&payload_hash, "x-amz-content-sha256")?,
    );

    let (canonical_headers, signed_headers) = canonicalize_headers(&ctx.headers)?;
    let canonical_request = canonical_request(
        &ctx.method,
        &ctx.path,
        &ctx.query,
        &canonical_headers,
        &signed_headers,
        &payload_hash,
    );

    let string_to_sign = string_to_sign(region, now, &canonical_request);
    let signature = signature(credentials, region, now, &string_to_sign)?;

    let authorization = format!(
        "{ALGORITHM} Credential={}/{},SignedHeaders={},Signature={}",
        credentials.access_key_id,
        credential_scope(region, now),
        signed_headers,
        signature
    );
    ctx.headers.insert(
        http::header::AUTHORIZATION,
        header_value(&authorization, "authorization")?,
    );

    #[cfg(feature = "tracing")]
    tracing::trace!(signed_headers = %signed_headers, "sigv4 request signed");

    Ok(())
}

/// Every header takes part; repeated names are comma-joined in insertion order.
fn canonicalize_headers(headers: &HeaderMap) -> Result<(String, String)> {
    let mut pairs = Vec::with_capacity(headers.keys_len());
    for name in headers.keys() {
        let mut joined = String::new();
        for (idx, value) in headers.get_all(name).iter().enumerate() {
            if idx > 0 {
                joined.push(',');
            }
            joined.push_str(&normalize_header_value(header_str(name, value)?));
        }
        pairs.push((name.as_str().to_ascii_lowercase(), joined));
    }

    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let mut canonical_headers = String::new();
    let mut signed_headers = String::new();
    for (idx, (name, value)) in pairs.into_iter().enumerate() {
        canonical_headers.push_str(&name);
        canonical_headers.push(':');
        canonical_headers.push_str(&value);
        canonical_headers.push('\n');

        if idx > 0 {
            signed_headers.push(';');
        }
        signed_headers.push_str(&name);
    }

    Ok((canonical_headers, signed_headers))
}

fn normalize_header_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_ws = false;
    for c in value.trim().chars() {
        if c.is_whitespace() {
            in_ws = true;
            continue;
        }
        if in_ws && !out.is_empty() {
            out.push(' ');
        }
        in_ws = false;
        out.push(c);
    }
    out
}

fn canonical_request(
    method: &Method,
    canonical_uri: &str,
    canonical_query_string: &str,
    canonical_headers: &str,
    signed_headers: &str,
    payload_hash: &str,
) -> String {
    format!(
        "{method}\n{canonical_uri}\n{canonical_query_string}\n{canonical_headers}\n{signed_headers}\n{payload_hash}"
    )
}

fn string_to_sign(region: &Region, now: OffsetDateTime, canonical_request: &str) -> String {
    let amz_date = amz_datetime(now);
    let scope = credential_scope(region, now);
    let hashed = encoding::hex(&encoding::sha256(canonical_request.as_bytes()));
    format!("{ALGORITHM}\n{amz_date}\n{scope}\n{hashed}")
}

fn signature(
    credentials: &Credentials,
    region: &Region,
    now: OffsetDateTime,
    string_to_sign: &str,
) -> Result<String> {
    let k_date = encoding::hmac_sha256(
        format!("AWS4{}", credentials.secret_access_key).as_bytes(),
        date_stamp(now).as_bytes(),
    )?;
    let k_region = encoding::hmac_sha256(&k_date, region.as_str().as_bytes())?;
    let k_service = encoding::hmac_sha256(&k_region, SERVICE.as_bytes())?;
    let k_signing = encoding::hmac_sha256(&k_service, b"aws4_request")?;
    let sig = encoding::hmac_sha256(&k_signing, string_to_sign.as_bytes())?;
    Ok(encoding::hex(&sig))
}

fn date_stamp(now: OffsetDateTime) -> String {
    let year = now.year();
    let month = now.month() as u8;
    let day = now.day();
    format!("{year:04}{month:02}{day:02}")
}

fn amz_datetime(now: OffsetDateTime) -> String {
    let year = now.year();
    let month = now.month() as u8;
    let day = now.day();
    let hour = now.hour();
    let minute = now.minute();
    let second = now.second();
    format!("{year:04}{month:02}{day:02}T{hour:02}{minute:02}{second:02}Z")
}

fn credential_scope(region: &Region, now: OffsetDateTime) -> String {
    format!(
        "{}/{}/{SERVICE}/aws4_request",
        date_stamp(now),
        region.as_str()
    )
}
