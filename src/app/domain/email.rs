use validator::ValidationError;

/// Normalized email address: trimmed and lowercased on entry.
#[derive(Debug, Clone)]
pub struct Email(String);

impl Email {
    /// Validate and normalize a raw address. The shape check is deliberately
    /// shallow (non-empty local part, `@`, dotted domain); deliverability is
    /// the mail system's problem, not ours.
    pub fn new(raw: String) -> Result<Self, ValidationError> {
        let normalized = raw.trim().to_lowercase();

        // RFC 5321 upper bound
        if normalized.len() > 254 {
            let mut error = ValidationError::new("email_too_long");
            error.message = Some("Email address is too long".into());
            return Err(error);
        }

        let shape_ok = normalized
            .split_once('@')
            .map_or(false, |(local, domain)| !local.is_empty() && domain.contains('.'));
        if !shape_ok {
            let mut error = ValidationError::new("invalid_email");
            error.message = Some("Invalid email address format".into());
            return Err(error);
        }

        Ok(Self(normalized))
    }

    /// Get the normalized address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
