//! Deterministic physical identifiers
//!
//! When a caller does not name a resource, the handler derives a name from
//! the logical identifier and the client request token. Every invocation of
//! one operation carries the same token, so every invocation derives the
//! same name: `<logical id prefix>-<12 alphanumeric characters>`.

const SUFFIX_LEN: usize = 12;
const ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a resource identifier no longer than `max_len` characters
///
/// The logical identifier is truncated to leave room for the separator and
/// the suffix; when nothing of it fits, only the suffix is returned.
pub fn generate_resource_identifier(
    logical_id: Option<&str>,
    client_request_token: &str,
    max_len: usize,
) -> String {
    let suffix = token_suffix(client_request_token);
    let prefix_len = max_len.saturating_sub(SUFFIX_LEN + 1);
    let prefix: String = logical_id
        .unwrap_or_default()
        .chars()
        .take(prefix_len)
        .collect();

    if prefix.is_empty() {
        return suffix.chars().take(max_len).collect();
    }
    format!("{prefix}-{suffix}")
}

fn token_suffix(token: &str) -> String {
    let hash = blake3::hash(token.as_bytes());
    hash.as_bytes()
        .iter()
        .take(SUFFIX_LEN)
        .map(|b| char::from(ALPHABET[usize::from(*b) % ALPHABET.len()]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_token_same_name() {
        let a = generate_resource_identifier(Some("NightlyTrigger"), "token-1", 40);
        let b = generate_resource_identifier(Some("NightlyTrigger"), "token-1", 40);
        assert_eq!(a, b);
        assert!(a.starts_with("NightlyTrigger-"));
        assert_eq!(a.len(), "NightlyTrigger-".len() + SUFFIX_LEN);
    }

    #[test]
    fn test_different_tokens_differ() {
        let a = generate_resource_identifier(Some("T"), "token-1", 40);
        let b = generate_resource_identifier(Some("T"), "token-2", 40);
        assert_ne!(a, b);
    }

    #[test]
    fn test_long_logical_id_truncated() {
        let logical = "L".repeat(100);
        let name = generate_resource_identifier(Some(&logical), "tok", 40);
        assert_eq!(name.chars().count(), 40);
        assert!(name.starts_with(&"L".repeat(27)));
    }

    #[test]
    fn test_missing_logical_id_uses_suffix_only() {
        let name = generate_resource_identifier(None, "tok", 40);
        assert_eq!(name.len(), SUFFIX_LEN);
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_tiny_budget() {
        let name = generate_resource_identifier(Some("Trigger"), "tok", 5);
        assert_eq!(name.len(), 5);
    }
}
