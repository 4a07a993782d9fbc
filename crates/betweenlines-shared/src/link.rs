use crate::constants::LETTER_PATH_PREFIX;

/// Build the shareable link for a letter: `<origin>/l/<id>`.
pub fn shareable_url(origin: &str, id: &str) -> String {
    format!("{}{}{}", origin.trim_end_matches('/'), LETTER_PATH_PREFIX, id)
}

/// Accept either a bare identifier or a full shareable link and return the
/// identifier part. Query strings and fragments are dropped.
pub fn letter_id_from_link(input: &str) -> Option<&str> {
    let input = input
        .trim()
        .split(|c: char| c == '?' || c == '#')
        .next()
        .unwrap_or_default();
    let id = match input.rfind(LETTER_PATH_PREFIX) {
        Some(pos) => &input[pos + LETTER_PATH_PREFIX.len()..],
        None => input,
    };
    let id = id.trim_end_matches('/');

    if id.is_empty() || id.contains('/') {
        None
    } else {
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shareable_url() {
        assert_eq!(shareable_url("https://x", "abc123"), "https://x/l/abc123");
        assert_eq!(shareable_url("https://x/", "abc123"), "https://x/l/abc123");
    }

    #[test]
    fn test_id_from_link() {
        assert_eq!(letter_id_from_link("https://x/l/abc123"), Some("abc123"));
        assert_eq!(letter_id_from_link("abc123"), Some("abc123"));
        assert_eq!(letter_id_from_link(" https://x/l/abc123/ "), Some("abc123"));
        assert_eq!(letter_id_from_link("https://x/l/"), None);
        assert_eq!(letter_id_from_link("https://x/other/abc"), None);
    }

    #[test]
    fn test_id_from_link_drops_query_and_fragment() {
        assert_eq!(letter_id_from_link("https://x/l/abc?ref=1"), Some("abc"));
        assert_eq!(letter_id_from_link("https://x/l/abc/#top"), Some("abc"));
        assert_eq!(letter_id_from_link("abc?x=1#y"), Some("abc"));
        assert_eq!(letter_id_from_link("https://x/l/?ref=1"), None);
    }
}
