/// Cuts `body` to at most `max_len` bytes on a char boundary, marking the cut with `...`.
pub(crate) fn truncate_snippet(body: &str, max_len: usize) -> String {
    if body.len() <= max_len {
        return body.to_string();
    }

    let mut cut = max_len;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }

    format!("{}...", &body[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_bodies_are_untouched() {
        let body = "a".repeat(10);
        assert_eq!(truncate_snippet(&body, 10), body);
        assert_eq!(truncate_snippet(&body, 5), "aaaaa...");
    }

    #[test]
    fn cuts_on_char_boundary() {
        // each char is three bytes
        let body = "日本語".repeat(4);
        assert_eq!(truncate_snippet(&body, 5), "日...");
        assert_eq!(truncate_snippet(&body, 2), "...");
    }
}
