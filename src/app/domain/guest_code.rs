use rand_core::{OsRng, RngCore};
use validator::ValidationError;

/// Characters used in generated guest codes. Uppercase alphanumerics with
/// ambiguous glyphs (0/O, 1/I) kept in: codes are pasted, not read aloud.
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a guest code.
pub const GUEST_CODE_LEN: usize = 6;

/// Guest code domain type. 6 alphanumeric characters, stored and compared
/// uppercase; input is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestCode(String);

impl GuestCode {
    /// Normalize and validate a caller-supplied code.
    pub fn new(code: &str) -> Result<Self, ValidationError> {
        let normalized = code.trim().to_uppercase();
        if normalized.len() != GUEST_CODE_LEN
            || !normalized.chars().all(|c| c.is_ascii_alphanumeric())
        {
            let mut error = ValidationError::new("invalid_guest_code");
            error.message = Some("Guest code must be 6 alphanumeric characters".into());
            return Err(error);
        }
        Ok(Self(normalized))
    }

    /// Generate a random code from the OS RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; GUEST_CODE_LEN];
        OsRng.fill_bytes(&mut bytes);
        let code: String = bytes
            .iter()
            .map(|b| CHARSET[*b as usize % CHARSET.len()] as char)
            .collect();
        Self(code)
    }

    /// Get the normalized code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_to_uppercase() {
        let code = GuestCode::new("ab12cd").unwrap();
        assert_eq!(code.as_str(), "AB12CD");
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(GuestCode::new("ABC").is_err());
        assert!(GuestCode::new("ABCDEFG").is_err());
    }

    #[test]
    fn rejects_non_alphanumeric() {
        assert!(GuestCode::new("AB-12!").is_err());
    }

    #[test]
    fn generated_codes_are_valid() {
        for _ in 0..32 {
            let code = GuestCode::generate();
            assert!(GuestCode::new(code.as_str()).is_ok());
        }
    }
}
