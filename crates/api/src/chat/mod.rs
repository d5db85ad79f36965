pub mod events;
pub mod hub;
pub mod ws;

pub use hub::ChatHub;

pub const MAX_MESSAGE_CHARS: usize = 1000;

/// Shared by the REST and socket paths: trim, then enforce non-empty and
/// the length cap. Returns the canonical content to persist.
pub fn validate_message_content(raw: &str) -> Result<String, String> {
    let content = raw.trim();

    if content.is_empty() {
        return Err("message must not be empty".to_string());
    }
    if content.chars().count() > MAX_MESSAGE_CHARS {
        return Err(format!(
            "message must be at most {MAX_MESSAGE_CHARS} characters"
        ));
    }

    Ok(content.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_whitespace() {
        assert!(validate_message_content("").is_err());
        assert!(validate_message_content("   \n").is_err());
    }

    #[test]
    fn enforces_length_in_characters_not_bytes() {
        let at_limit: String = "é".repeat(MAX_MESSAGE_CHARS);
        assert!(validate_message_content(&at_limit).is_ok());

        let over: String = "a".repeat(MAX_MESSAGE_CHARS + 1);
        assert!(validate_message_content(&over).is_err());
    }

    #[test]
    fn trims_before_persisting() {
        assert_eq!(validate_message_content("  hello ").unwrap(), "hello");
    }
}
