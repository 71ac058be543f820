//! Credentials: password hashing and email normalisation.

mod password;

pub use password::{
    MIN_PASSWORD_LENGTH, PasswordError, check_new_password, hash_password, verify_password,
};

/// Canonical form of an email address used for lookups and uniqueness.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Minimal shape check: one `@` with text on both sides and a dot in the domain.
#[must_use]
pub fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Priya@Example.IN "), "priya@example.in");
    }

    #[rstest]
    #[case("priya@example.in", true)]
    #[case("a@b.co", true)]
    #[case("no-at-sign.in", false)]
    #[case("@example.in", false)]
    #[case("priya@localhost", false)]
    #[case("priya@@example.in", false)]
    #[case("priya@example.", false)]
    fn test_is_plausible_email(#[case] email: &str, #[case] expected: bool) {
        assert_eq!(is_plausible_email(email), expected);
    }
}
