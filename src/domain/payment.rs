use super::order::PaymentStatus;
use crate::error::VoucherError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A payment gateway callback for one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentNotification {
    pub order: u32,
    /// Raw transaction status as the gateway spells it.
    pub status: String,
    pub gross_amount: Option<Decimal>,
}

impl PaymentNotification {
    pub fn new(order: u32, status: impl Into<String>) -> Self {
        Self {
            order,
            status: status.into(),
            gross_amount: None,
        }
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.gross_amount = Some(amount);
        self
    }

    /// The payment status this notification moves the order to.
    ///
    /// `None` means the gateway is still waiting and the order stays pending.
    pub fn target_status(&self) -> Result<Option<PaymentStatus>, VoucherError> {
        match self.status.trim().to_ascii_lowercase().as_str() {
            "capture" | "settlement" | "paid" => Ok(Some(PaymentStatus::Paid)),
            "deny" | "cancel" | "expire" | "failure" | "failed" => {
                Ok(Some(PaymentStatus::Failed))
            }
            "pending" => Ok(None),
            other => Err(VoucherError::ValidationError(format!(
                "Unknown gateway status {other:?} for order {}",
                self.order
            ))),
        }
    }
}
