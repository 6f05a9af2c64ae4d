//! Default chat titles.

/// Maximum number of characters kept from the first message.
pub const TITLE_MAX_CHARS: usize = 30;

/// Suffix appended when the message had to be cut.
const ELLIPSIS: &str = "...";

/// Pick the title for a new chat.
///
/// A non-blank explicit title wins. Otherwise the first message is used,
/// cut to [`TITLE_MAX_CHARS`] characters with `...` appended when it was
/// longer than that.
pub fn derive_title(explicit: Option<&str>, first_message: &str) -> String {
    if let Some(title) = explicit.filter(|t| !t.trim().is_empty()) {
        return title.to_string();
    }

    let mut chars = first_message.chars();
    let head: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}{ELLIPSIS}")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_message_is_used_verbatim() {
        assert_eq!(derive_title(None, "Hello, world!"), "Hello, world!");
    }

    #[test]
    fn exactly_thirty_chars_gets_no_ellipsis() {
        let msg = "a".repeat(30);
        assert_eq!(derive_title(None, &msg), msg);
    }

    #[test]
    fn long_message_is_truncated_with_ellipsis() {
        let msg = "Write a LinkedIn post about remote work benefits";
        let title = derive_title(None, msg);
        assert_eq!(title, "Write a LinkedIn post about re...");
        assert_eq!(title.chars().count(), 33);
    }

    #[test]
    fn truncation_respects_multibyte_characters() {
        let msg = "🚀".repeat(31);
        let title = derive_title(None, &msg);
        assert_eq!(title, format!("{}...", "🚀".repeat(30)));
    }

    #[test]
    fn explicit_title_wins() {
        assert_eq!(derive_title(Some("My plan"), "whatever"), "My plan");
    }

    #[test]
    fn blank_explicit_title_falls_back_to_message() {
        assert_eq!(derive_title(Some("  "), "Hi"), "Hi");
    }
}
