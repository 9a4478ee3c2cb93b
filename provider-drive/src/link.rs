//! Shareable-link resolution
//!
//! Extracts a file id from the URL shapes the backend hands out for folders
//! and files, or from a bare id pasted directly.

/// Minimum length for a bare token to be accepted as a literal id.
///
/// Real backend ids are long; this guards against treating arbitrary short
/// strings (names, typos) as ids.
const MIN_BARE_ID_LEN: usize = 21;

/// Extract a file id from a shareable link.
///
/// Recognized shapes, tried in order:
/// - `.../folders/<id>`
/// - `.../file/d/<id>`
/// - `...?id=<id>` / `...&id=<id>`
/// - a bare token longer than 20 characters containing no `/`
pub fn extract_file_id(link: &str) -> Option<String> {
    let link = link.trim();

    for marker in ["/folders/", "/file/d/"] {
        if let Some(position) = link.find(marker) {
            if let Some(id) = leading_id(&link[position + marker.len()..]) {
                return Some(id);
            }
        }
    }

    for marker in ["?id=", "&id="] {
        if let Some(position) = link.find(marker) {
            if let Some(id) = leading_id(&link[position + marker.len()..]) {
                return Some(id);
            }
        }
    }

    if link.len() >= MIN_BARE_ID_LEN && !link.contains('/') {
        return Some(link.to_string());
    }

    None
}

/// Take the leading run of id characters (`[A-Za-z0-9_-]`), if any.
fn leading_id(text: &str) -> Option<String> {
    let id: String = text
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();

    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_link() {
        assert_eq!(
            extract_file_id("https://storage.example/folders/ABC123"),
            Some("ABC123".to_string())
        );
    }

    #[test]
    fn test_folder_link_with_query_suffix() {
        assert_eq!(
            extract_file_id("https://storage.example/folders/ABC_12-3?usp=sharing"),
            Some("ABC_12-3".to_string())
        );
    }

    #[test]
    fn test_file_link() {
        assert_eq!(
            extract_file_id("https://storage.example/file/d/xYz-42_a/view"),
            Some("xYz-42_a".to_string())
        );
    }

    #[test]
    fn test_id_query_parameter() {
        assert_eq!(
            extract_file_id("https://storage.example/open?id=QWERTY987"),
            Some("QWERTY987".to_string())
        );
        assert_eq!(
            extract_file_id("https://storage.example/open?foo=1&id=QWERTY987"),
            Some("QWERTY987".to_string())
        );
    }

    #[test]
    fn test_bare_token_accepted_when_long_enough() {
        let token = "a".repeat(25);
        assert_eq!(extract_file_id(&token), Some(token.clone()));
    }

    #[test]
    fn test_short_or_pathlike_strings_rejected() {
        assert_eq!(extract_file_id("short"), None);
        assert_eq!(extract_file_id("not/an/id/even/if/quite/long"), None);
        assert_eq!(extract_file_id(""), None);
    }
}
