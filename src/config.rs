use crate::error::VoucherError;

/// Knobs of the voucher lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Months between issue and expiry.
    pub validity_months: u32,
    pub code_length: usize,
    /// Draws allowed before issuance gives up on finding a free code.
    pub max_code_attempts: u32,
    /// Country calling code used to normalise local phone numbers.
    pub country_code: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            validity_months: 12,
            code_length: 5,
            max_code_attempts: 8,
            country_code: "62".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), VoucherError> {
        if self.validity_months == 0 {
            return Err(VoucherError::ValidationError(
                "validity must be at least one month".to_string(),
            ));
        }
        if !(4..=32).contains(&self.code_length) {
            return Err(VoucherError::ValidationError(format!(
                "code length must be between 4 and 32, got {}",
                self.code_length
            )));
        }
        if self.max_code_attempts == 0 {
            return Err(VoucherError::ValidationError(
                "at least one code attempt is required".to_string(),
            ));
        }
        if self.country_code.is_empty() || !self.country_code.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(VoucherError::ValidationError(format!(
                "country code must be digits, got {:?}",
                self.country_code
            )));
        }
        Ok(())
    }
}

/// How delivery messages are worded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageConfig {
    pub store_name: String,
    pub currency: String,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            store_name: "Our Spa".to_string(),
            currency: "Rp".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.validity_months, 12);
        assert_eq!(config.code_length, 5);
    }

    #[test]
    fn test_config_rejects_bad_values() {
        let bad = [
            EngineConfig {
                validity_months: 0,
                ..Default::default()
            },
            EngineConfig {
                code_length: 3,
                ..Default::default()
            },
            EngineConfig {
                max_code_attempts: 0,
                ..Default::default()
            },
            EngineConfig {
                country_code: "+62".to_string(),
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(VoucherError::ValidationError(_))),
                "{config:?} should be rejected"
            );
        }
    }
}
