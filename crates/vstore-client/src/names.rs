//! Resource name validation.
//!
//! A resource name becomes a single file name under its kind's directory, so
//! it must not be able to address anything else. Valid names:
//! - Must be non-empty and at most [`MAX_NAME_LEN`] bytes
//! - Must not contain `/`
//! - Must not be `.` or `..`
//! - Must not contain NUL or other control characters
//! - Must not start with the backend staging prefix [`TEMP_PREFIX`]

use vstore_vfs::TEMP_PREFIX;

use crate::error::{StoreError, StoreResult};

/// Longest accepted name, in bytes. Matches DNS subdomain names.
pub const MAX_NAME_LEN: usize = 253;

/// Validate a resource name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use vstore_client::names::validate_name;
///
/// assert!(validate_name("web-frontend").is_ok());
/// assert!(validate_name("api.example.com").is_ok());
/// assert!(validate_name("").is_err());
/// assert!(validate_name("../escape").is_err());
/// ```
pub fn validate_name(name: &str) -> StoreResult<()> {
    let invalid = |reason: &str| StoreError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name must not be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(invalid(&format!("name is longer than {MAX_NAME_LEN} bytes")));
    }
    if name == "." || name == ".." {
        return Err(invalid("name must not be '.' or '..'"));
    }
    if name.contains('/') {
        return Err(invalid("name must not contain '/'"));
    }
    if name.starts_with(TEMP_PREFIX) {
        return Err(invalid(&format!("name must not start with {TEMP_PREFIX:?}")));
    }
    if let Some(ch) = name.chars().find(|c| c.is_control()) {
        return Err(invalid(&format!("contains control character {ch:?}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn valid_names() {
        let longest = "x".repeat(MAX_NAME_LEN);
        for name in ["a", "web", "web-01", "api.example.com", "under_score", "..dots", &longest] {
            assert!(validate_name(name).is_ok(), "{name:?} should be valid");
        }
    }

    #[test]
    fn empty_rejected() {
        assert!(validate_name("").is_err());
    }

    #[test]
    fn dot_names_rejected() {
        assert!(validate_name(".").is_err());
        assert!(validate_name("..").is_err());
    }

    #[test]
    fn slash_rejected() {
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("/abs").is_err());
        assert!(validate_name("trailing/").is_err());
    }

    #[test]
    fn control_characters_rejected() {
        assert!(validate_name("nul\0byte").is_err());
        assert!(validate_name("new\nline").is_err());
        assert!(validate_name("tab\t").is_err());
    }

    #[test]
    fn staging_prefix_rejected() {
        let err = validate_name(&format!("{TEMP_PREFIX}x")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidName { .. }));
        assert!(validate_name(TEMP_PREFIX).is_err());
        assert!(validate_name("x.vstore-tmp-").is_ok());
    }

    #[test]
    fn length_limit() {
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN)).is_ok());
        let err = validate_name(&"x".repeat(MAX_NAME_LEN + 1)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidName { .. }));
    }

    proptest! {
        #[test]
        fn names_without_separators_are_accepted(name in "[a-z0-9][a-z0-9.-]{0,62}") {
            prop_assume!(name != "." && name != "..");
            prop_assert!(validate_name(&name).is_ok());
        }

        #[test]
        fn any_slash_is_rejected(prefix in "[a-z]{0,8}", suffix in "[a-z]{0,8}") {
            let name = format!("{prefix}/{suffix}");
            prop_assert!(validate_name(&name).is_err());
        }
    }
}
