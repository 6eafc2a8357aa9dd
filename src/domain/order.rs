use super::money::Amount;
use crate::error::VoucherError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    /// `PAID` and `FAILED` are final.
    pub fn is_terminal(self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }

    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        self == PaymentStatus::Pending && next.is_terminal()
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Who paid, and optionally who the voucher is for.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Customer {
    pub name: String,
    pub email: String,
    /// Normalised, digits only.
    pub phone: String,
    pub recipient_name: Option<String>,
    pub recipient_phone: Option<String>,
}

impl Customer {
    pub fn validate(&self) -> Result<(), VoucherError> {
        if self.name.trim().is_empty() {
            return Err(VoucherError::ValidationError(
                "Customer name is required".to_string(),
            ));
        }
        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
            _ => Err(VoucherError::ValidationError(format!(
                "Invalid email address: {email:?}"
            ))),
        }
    }

    /// The name printed on the voucher.
    pub fn recipient(&self) -> &str {
        self.recipient_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.name)
    }

    /// Where the voucher gets delivered.
    pub fn delivery_phone(&self) -> &str {
        self.recipient_phone.as_deref().unwrap_or(&self.phone)
    }
}

/// A checkout record. The total is frozen at the service price of the moment.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Order {
    pub id: u32,
    pub service: u32,
    pub customer: Customer,
    pub total: Amount,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        id: u32,
        service: u32,
        customer: Customer,
        total: Amount,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            service,
            customer,
            total,
            payment_status: PaymentStatus::Pending,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(email: &str) -> Customer {
        Customer {
            name: "Dewi".to_string(),
            email: email.to_string(),
            phone: "6281234567890".to_string(),
            recipient_name: None,
            recipient_phone: None,
        }
    }

    #[test]
    fn test_payment_status_transitions() {
        use PaymentStatus::*;
        assert!(Pending.can_transition_to(Paid));
        assert!(Pending.can_transition_to(Failed));
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Paid.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Paid));
        assert!(!Paid.can_transition_to(Paid));
    }

    #[test]
    fn test_payment_status_serialization() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Paid).unwrap(),
            "\"PAID\""
        );
        assert_eq!(PaymentStatus::Failed.to_string(), "FAILED");
    }

    #[test]
    fn test_customer_email_validation() {
        assert!(customer("dewi@example.com").validate().is_ok());
        assert!(customer("dewi@example").validate().is_err());
        assert!(customer("@example.com").validate().is_err());
        assert!(customer("dewi.example.com").validate().is_err());
    }

    #[test]
    fn test_recipient_falls_back_to_customer() {
        let mut c = customer("dewi@example.com");
        assert_eq!(c.recipient(), "Dewi");
        assert_eq!(c.delivery_phone(), "6281234567890");

        c.recipient_name = Some("Ayu".to_string());
        c.recipient_phone = Some("6289876543210".to_string());
        assert_eq!(c.recipient(), "Ayu");
        assert_eq!(c.delivery_phone(), "6289876543210");
    }
}
