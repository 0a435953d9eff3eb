use http::HeaderMap;
use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

use super::{SigningContext, header_str, header_value};
use crate::{
    auth::Credentials,
    encoding,
    error::{Error, Result},
};

const HTTP_DATE: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

pub(super) fn sign(ctx: &mut SigningContext, credentials: &Credentials) -> Result<()> {
    let content_md5 = if ctx.body.is_empty() {
        String::new()
    } else {
        encoding::base64(&encoding::md5(&ctx.body))
    };
    let date = http_date(ctx.timestamp)?;

    let content_type = match ctx.headers.get(http::header::CONTENT_TYPE) {
        Some(value) => header_str(&http::header::CONTENT_TYPE, value)?.to_string(),
        None => String::new(),
    };

    let string_to_sign = string_to_sign(
        ctx.method.as_str(),
        &content_md5,
        &content_type,
        &date,
        &amz_headers(&ctx.headers)?,
        &ctx.path,
    );
    let signature = signature(&credentials.secret_access_key, &string_to_sign)?;

    ctx.headers
        .insert(http::header::DATE, header_value(&date, "date")?);
    if !content_md5.is_empty() {
        ctx.headers.insert(
            http::header::HeaderName::from_static("content-md5"),
            header_value(&content_md5, "content-md5")?,
        );
    }
    let authorization = format!("AWS {}:{}", credentials.access_key_id, signature);
    ctx.headers.insert(
        http::header::AUTHORIZATION,
        header_value(&authorization, "authorization")?,
    );

    Ok(())
}

/// `name:value[,value]\n` for each `x-amz-` header, sorted by name.
fn amz_headers(headers: &HeaderMap) -> Result<String> {
    let mut names = headers
        .keys()
        .filter(|name| name.as_str().starts_with("x-amz-"))
        .collect::<Vec<_>>();
    names.sort_by(|a, b| a.as_str().cmp(b.as_str()));

    let mut out = String::new();
    for name in names {
        out.push_str(name.as_str());
        out.push(':');
        for (idx, value) in headers.get_all(name).iter().enumerate() {
            if idx > 0 {
                out.push(',');
            }
            out.push_str(header_str(name, value)?);
        }
        out.push('\n');
    }
    Ok(out)
}

fn string_to_sign(
    method: &str,
    content_md5: &str,
    content_type: &str,
    date: &str,
    amz_headers: &str,
    path: &str,
) -> String {
    format!("{method}\n{content_md5}\n{content_type}\n{date}\n{amz_headers}{path}")
}

fn signature(secret: &str, string_to_sign: &str) -> Result<String> {
    let mac = encoding::hmac_sha1(secret.as_bytes(), string_to_sign.as_bytes())?;
    Ok(encoding::base64(&mac))
}

/// `EEE, dd MMM yyyy HH:mm:ss GMT`
fn http_date(now: OffsetDateTime) -> Result<String> {
    now.format(HTTP_DATE)
        .map_err(|e| Error::signing(format!("cannot format Date header: {e}")))
}
