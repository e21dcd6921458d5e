//! Link name validation.
//!
//! Backends only ever manage the immediate children of their root directory,
//! so every name handed to them must be exactly one directory entry.

use std::path::{Component, Path};

use crate::error::{ErrorKind, Result};

/// Validates a link name for security and correctness.
/// Ensures the name is a single, normal path component (no separators, no
/// `.`/`..`, no null bytes) so that joining it onto a root directory can never
/// address anything other than a direct child of that directory.
///
/// # Examples
///
/// ```
/// use emberly_storage::validate_name;
/// // Valid names
/// assert!(validate_name("The Matrix").is_ok());
/// assert!(validate_name("OBriens Movie (2001)").is_ok());
/// // Invalid names
/// assert!(validate_name("..").is_err());
/// assert!(validate_name("a/b").is_err());
/// assert!(validate_name("").is_err());
/// assert!(validate_name("a\0b").is_err());
/// ```
pub fn validate(name: &str) -> Result<&str> {
    // Null bytes pass through Path::components() on Unix but cause
    // truncation in C-based syscalls — reject them explicitly.
    if name.as_bytes().contains(&0) {
        exn::bail!(ErrorKind::InvalidName(name.to_string()));
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(c)), None) if c == name => Ok(name),
        _ => exn::bail!(ErrorKind::InvalidName(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("The Matrix")]
    #[case("Movie")]
    #[case("Spirited Away (2001)")]
    #[case(".hidden")]
    #[case("...")]
    fn test_valid_names(#[case] name: &str) {
        assert_eq!(validate(name).unwrap(), name);
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case("..")]
    #[case("/")]
    #[case("a/b")]
    #[case("/abs")]
    #[case("trailing/")]
    #[case("./Movie")]
    #[case("a\0b")]
    #[case("\0")]
    fn test_invalid_names(#[case] name: &str) {
        let err = validate(name).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidName(_)));
    }
}
