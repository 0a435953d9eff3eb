pub(crate) mod headers;
pub(crate) mod redact;
pub(crate) mod text;
pub(crate) mod url;
