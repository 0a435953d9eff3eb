/// Keeps the first and last four characters of a secret-ish value.
///
/// Values of eight characters or fewer are hidden entirely.
pub(crate) fn redact_value(value: &str) -> String {
    let chars = value.trim().chars().collect::<Vec<_>>();
    if chars.len() <= 8 {
        return "<redacted>".to_string();
    }

    let head = chars[..4].iter().collect::<String>();
    let tail = chars[chars.len() - 4..].iter().collect::<String>();
    format!("{head}...{tail}")
}
