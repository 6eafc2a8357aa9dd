use crate::error::VoucherError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A strictly positive monetary amount.
///
/// Service prices, order totals and gateway amounts all go through this type,
/// so a zero or negative price never reaches the stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, VoucherError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(VoucherError::ValidationError(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Compares against a gateway-reported figure, ignoring trailing zeros.
    pub fn matches(&self, other: Decimal) -> bool {
        self.0.normalize() == other.normalize()
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = VoucherError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}
