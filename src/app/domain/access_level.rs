use validator::ValidationError;

/// Per-organization staff access level, 1–5 (5 = highest).
/// All threshold checks are `>=`; nothing compares with `=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AccessLevel(u8);

impl AccessLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Create from a raw integer, rejecting values outside 1–5.
    pub fn new(level: i64) -> Result<Self, ValidationError> {
        if level < Self::MIN as i64 || level > Self::MAX as i64 {
            let mut error = ValidationError::new("invalid_access_level");
            error.message = Some("Access level must be between 1 and 5".into());
            return Err(error);
        }
        Ok(Self(level as u8))
    }

    /// Raw value for storage.
    pub fn get(&self) -> u8 {
        self.0
    }

    /// Whether this level satisfies a required threshold.
    pub fn satisfies(&self, required: u8) -> bool {
        self.0 >= required
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range() {
        assert!(AccessLevel::new(0).is_err());
        assert!(AccessLevel::new(6).is_err());
        assert!(AccessLevel::new(-1).is_err());
    }

    #[test]
    fn threshold_is_greater_or_equal() {
        let level = AccessLevel::new(4).unwrap();
        assert!(level.satisfies(4));
        assert!(!level.satisfies(5));
        assert!(AccessLevel::new(5).unwrap().satisfies(4));
    }
}
