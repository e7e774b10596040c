//! Character-based token estimate, used when the backend can't report real usage.
//!
//! This is not any backend's tokenizer: treat the result as an estimate, never as a
//! budget guarantee.

use crate::types::Message;

/// Tokens per character
pub const CHARS_TO_TOKENS: f64 = 0.25;

/// `ceil(total_chars * CHARS_TO_TOKENS)` over every part of every message
pub fn estimate_tokens(messages: &[Message]) -> u32 {
    let chars: usize = messages.iter().map(Message::char_count).sum();
    estimate_from_chars(chars)
}

pub fn estimate_from_chars(chars: usize) -> u32 {
    (chars as f64 * CHARS_TO_TOKENS).ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Part, Role};
    use serde_json::json;

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(estimate_tokens(&[]), 0);
        assert_eq!(estimate_tokens(&[Message::new(Role::User, vec![])]), 0);
    }

    #[test]
    fn test_rounds_up() {
        assert_eq!(estimate_from_chars(1), 1);
        assert_eq!(estimate_from_chars(4), 1);
        assert_eq!(estimate_from_chars(5), 2);
        assert_eq!(estimate_tokens(&[Message::user("hello")]), 2);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // 4 chars, 12 bytes
        assert_eq!(estimate_tokens(&[Message::user("思考过程")]), 1);
    }

    #[test]
    fn test_counts_every_part_kind() {
        let message = Message::new(
            Role::Model,
            vec![
                Part::text("abcd"),
                Part::thinking("efgh"),
                Part::function_response(json!("ij")),
            ],
        );

        // 4 + 4 + 4 ("\"ij\"")
        assert_eq!(estimate_tokens(&[message]), 3);
    }

    #[test]
    fn test_monotonic_in_character_count() {
        let mut previous = 0;
        let mut text = String::new();
        for i in 0..200 {
            text.push(if i % 3 == 0 { 'é' } else { 'a' });
            let estimate = estimate_tokens(&[Message::user(text.clone())]);
            assert!(estimate >= previous, "estimate dropped at {} chars", i + 1);
            previous = estimate;
        }
    }
}
