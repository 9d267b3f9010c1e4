use base64::{engine::general_purpose, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;

/// The size of a session identifier in bytes.
const SESSION_ID_SIZE: usize = 32;

/// Generates a new random session identifier.
///
/// # Returns
///
/// A URL-safe base64-encoded identifier carrying 256 bits of entropy.
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; SESSION_ID_SIZE];
    OsRng.fill_bytes(&mut bytes);

    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Returns a short prefix of a session identifier that is safe to log.
pub fn redact(session_id: &str) -> &str {
    let end = session_id
        .char_indices()
        .nth(8)
        .map(|(i, _)| i)
        .unwrap_or(session_id.len());
    &session_id[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_session_ids_are_unique_and_url_safe() {
        let ids: HashSet<String> = (0..256).map(|_| generate_session_id()).collect();
        assert_eq!(ids.len(), 256);

        for id in &ids {
            assert_eq!(id.len(), 43);
            assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        }
    }

    #[test]
    fn test_redact() {
        assert_eq!(redact("abcdefghijklmnop"), "abcdefgh");
        assert_eq!(redact("abc"), "abc");
    }
}
