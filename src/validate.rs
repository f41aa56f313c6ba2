//! Mint form validation.

/// True when every field has non-whitespace content.
///
/// Shared by the submit path and the submit-enabled check.
pub fn is_valid(name: &str, description: &str, image_url: &str) -> bool {
    !name.trim().is_empty() && !description.trim().is_empty() && !image_url.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_fields_present() {
        assert!(is_valid("Cool Dragon #1", "A dragon", "https://example.com/d.png"));
        assert!(is_valid("  padded  ", "x", "y"));
    }

    #[test]
    fn test_empty_or_blank_field() {
        assert!(!is_valid("", "desc", "url"));
        assert!(!is_valid("name", "", "url"));
        assert!(!is_valid("name", "desc", ""));
        assert!(!is_valid("   ", "desc", "url"));
        assert!(!is_valid("name", "\t\n", "url"));
        assert!(!is_valid("name", "desc", " \u{3000} "));
    }
}
