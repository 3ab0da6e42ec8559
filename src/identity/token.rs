//! Bearer credential parsing and token surface checks.

/// Length of a token in its external encoding (base32, no padding).
pub const TOKEN_LENGTH: usize = 26;

/// Purposes a token can be issued for. The pipeline authenticates with
/// [`TokenScope::Authentication`] only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenScope {
    Authentication,
    Activation,
    PasswordReset,
}

/// Extract the token value from an `Authorization` header.
///
/// The header must be exactly the literal scheme `Bearer`, one space,
/// and a single non-empty value. Anything else is malformed.
pub fn parse_bearer(header: &str) -> Option<&str> {
    let value = header.strip_prefix("Bearer ")?;
    if value.is_empty() || value.contains(' ') {
        return None;
    }
    Some(value)
}

/// Check the surface shape of a token value. Whether the token is live
/// is the store's call, not ours.
pub fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exact_bearer_form() {
        assert_eq!(parse_bearer("Bearer abc123"), Some("abc123"));
    }

    #[test]
    fn rejects_malformed_headers() {
        assert_eq!(parse_bearer("Bearer"), None);
        assert_eq!(parse_bearer("Bearer "), None);
        assert_eq!(parse_bearer("Bearer a b"), None);
        assert_eq!(parse_bearer("Basic xyz"), None);
        assert_eq!(parse_bearer("bearer abc123"), None);
        assert_eq!(parse_bearer(""), None);
    }

    #[test]
    fn token_shape() {
        assert!(is_well_formed("ABCDEFGHIJKLMNOPQRSTUVWXYZ"));
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("short"));
        assert!(!is_well_formed("ABCDEFGHIJKLMNOPQRSTUVWXYZ0"));
    }
}
