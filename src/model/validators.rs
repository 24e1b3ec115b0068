//! Field validators shared by entity payloads.

use validator::ValidationError;

/// Lowercase ascii letters, digits and single dashes, e.g. `rust-for-beginners`.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let well_formed = !slug.is_empty()
        && slug.len() <= 120
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::new("slug"))
    }
}

/// Quiz questions need at least two non-blank options.
pub fn validate_options(options: &[String]) -> Result<(), ValidationError> {
    if options.len() < 2 || options.iter().any(|o| o.trim().is_empty()) {
        return Err(ValidationError::new("options"));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn slug_test() {
        assert!(validate_slug("rust-101").is_ok());
        assert!(validate_slug("a").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("Rust").is_err());
        assert!(validate_slug("-rust").is_err());
        assert!(validate_slug("rust-").is_err());
        assert!(validate_slug("rust--101").is_err());
        assert!(validate_slug("rust 101").is_err());
    }

    #[test]
    fn options_test() {
        let two = vec![String::from("yes"), String::from("no")];
        assert!(validate_options(&two).is_ok());
        assert!(validate_options(&two[..1]).is_err());
        assert!(validate_options(&[String::from("a"), String::from(" ")]).is_err());
    }
}
