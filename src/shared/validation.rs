use validator::ValidationError;

/// Minimum number of non-whitespace characters in an incident description
pub const MIN_DESCRIPTION_CHARS: usize = 10;

/// Rejects values that are empty once surrounding whitespace is removed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value cannot be empty".into());
        return Err(err);
    }
    Ok(())
}

/// Requires at least [`MIN_DESCRIPTION_CHARS`] characters after trimming.
pub fn validate_description(value: &str) -> Result<(), ValidationError> {
    if value.trim().chars().count() < MIN_DESCRIPTION_CHARS {
        let mut err = ValidationError::new("description_too_short");
        err.message = Some(
            format!(
                "Description must contain at least {} non-whitespace characters",
                MIN_DESCRIPTION_CHARS
            )
            .into(),
        );
        return Err(err);
    }
    Ok(())
}

/// Escape `%`, `_` and `\` so user input matches literally inside ILIKE.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("hello").is_ok());
        assert!(validate_not_blank("  x ").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   \t\n").is_err());
    }

    #[test]
    fn test_validate_description() {
        assert!(validate_description("Broken street light").is_ok());
        assert!(validate_description("          short     ").is_err());
        assert!(validate_description("0123456789").is_ok());
        assert!(validate_description("012345678").is_err());
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("pothole"), "pothole");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("c:\\dir"), "c:\\\\dir");
    }
}
