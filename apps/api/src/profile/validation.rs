use thiserror::Error;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const MAX_PROFILE_TEXT_CHARS: usize = 50_000;
pub const MIN_PROFILE_TEXT_CHARS: usize = 50;
pub const MAX_EVENT_DESCRIPTION_CHARS: usize = 1_000;
pub const MAX_GITHUB_USERNAME_CHARS: usize = 39;

/// A user-correctable input problem. The message is shown as-is next to the field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Checks the declared content type and size of an uploaded file.
pub fn validate_pdf_upload(
    content_type: Option<&str>,
    size_bytes: usize,
    max_size_mb: u64,
) -> Result<(), ValidationError> {
    if content_type != Some(PDF_CONTENT_TYPE) {
        return Err(ValidationError::new("Only PDF files are accepted"));
    }
    let max_bytes = max_size_mb.saturating_mul(1024 * 1024);
    if size_bytes as u64 > max_bytes {
        let size_mb = size_bytes as f64 / 1024.0 / 1024.0;
        return Err(ValidationError(format!(
            "File size ({size_mb:.1}MB) exceeds {max_size_mb}MB limit"
        )));
    }
    Ok(())
}

pub fn validate_text_length(text: &str) -> Result<(), ValidationError> {
    let len = text.chars().count();
    if len > MAX_PROFILE_TEXT_CHARS {
        return Err(ValidationError(format!(
            "Profile text too large ({} characters). Maximum {} characters allowed.",
            group_thousands(len),
            group_thousands(MAX_PROFILE_TEXT_CHARS)
        )));
    }
    if text.trim().chars().count() < MIN_PROFILE_TEXT_CHARS {
        return Err(ValidationError(format!(
            "Profile text must be at least {MIN_PROFILE_TEXT_CHARS} characters."
        )));
    }
    Ok(())
}

pub fn validate_event_description(text: &str) -> Result<(), ValidationError> {
    let len = text.chars().count();
    if len > MAX_EVENT_DESCRIPTION_CHARS {
        return Err(ValidationError(format!(
            "Event description too long ({} characters). Maximum {} characters allowed.",
            group_thousands(len),
            group_thousands(MAX_EVENT_DESCRIPTION_CHARS)
        )));
    }
    Ok(())
}

/// An empty handle is valid: the field is optional.
pub fn validate_github_username(username: &str) -> Result<(), ValidationError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    if trimmed.chars().count() > MAX_GITHUB_USERNAME_CHARS {
        return Err(ValidationError::new("Username must be 39 characters or less"));
    }
    if trimmed.starts_with('-') || trimmed.ends_with('-') {
        return Err(ValidationError::new(
            "Username cannot start or end with a hyphen",
        ));
    }
    if trimmed.contains("--") {
        return Err(ValidationError::new(
            "Username cannot contain consecutive hyphens",
        ));
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ValidationError::new(
            "Username can only contain letters, numbers, and hyphens",
        ));
    }
    Ok(())
}

/// `50000` → `"50,000"`.
fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(r: Result<(), ValidationError>) -> String {
        r.unwrap_err().0
    }

    #[test]
    fn test_non_pdf_is_rejected_before_size() {
        let err = msg(validate_pdf_upload(Some("image/png"), 50 * 1024 * 1024, 10));
        assert_eq!(err, "Only PDF files are accepted");
        assert!(validate_pdf_upload(None, 10, 10).is_err());
    }

    #[test]
    fn test_oversized_pdf_reports_size_with_one_decimal() {
        let err = msg(validate_pdf_upload(
            Some("application/pdf"),
            12 * 1024 * 1024 + 300 * 1024,
            10,
        ));
        assert_eq!(err, "File size (12.3MB) exceeds 10MB limit");
    }

    #[test]
    fn test_pdf_at_limit_is_accepted() {
        assert!(validate_pdf_upload(Some("application/pdf"), 10 * 1024 * 1024, 10).is_ok());
    }

    #[test]
    fn test_text_length_bounds() {
        let err = msg(validate_text_length(&"a".repeat(50_001)));
        assert_eq!(
            err,
            "Profile text too large (50,001 characters). Maximum 50,000 characters allowed."
        );
        let err = msg(validate_text_length(&format!("   {}   ", "a".repeat(49))));
        assert_eq!(err, "Profile text must be at least 50 characters.");
        assert!(validate_text_length(&"a".repeat(50)).is_ok());
    }

    #[test]
    fn test_event_description_limit() {
        assert!(validate_event_description(&"e".repeat(1_000)).is_ok());
        let err = msg(validate_event_description(&"e".repeat(1_234)));
        assert_eq!(
            err,
            "Event description too long (1,234 characters). Maximum 1,000 characters allowed."
        );
    }

    #[test]
    fn test_github_username_rules_in_order() {
        assert!(validate_github_username("").is_ok());
        assert!(validate_github_username("   ").is_ok());
        assert!(validate_github_username("octo-cat42").is_ok());
        assert_eq!(
            msg(validate_github_username(&"-".repeat(40))),
            "Username must be 39 characters or less"
        );
        assert_eq!(
            msg(validate_github_username("-octo")),
            "Username cannot start or end with a hyphen"
        );
        assert_eq!(
            msg(validate_github_username("oc--to")),
            "Username cannot contain consecutive hyphens"
        );
        assert_eq!(
            msg(validate_github_username("octo_cat")),
            "Username can only contain letters, numbers, and hyphens"
        );
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }
}
