use super::order::Order;
use super::service::Service;
use crate::error::VoucherError;
use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const MAX_CODE_LEN: usize = 32;

/// A voucher code as typed at the front desk: upper-case ASCII letters and digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VoucherCode(String);

impl VoucherCode {
    /// Trims and upper-cases user input before validating it.
    pub fn parse(input: &str) -> Result<Self, VoucherError> {
        let code = input.trim().to_ascii_uppercase();
        if code.is_empty()
            || code.len() > MAX_CODE_LEN
            || !code.bytes().all(|b| b.is_ascii_alphanumeric())
        {
            return Err(VoucherError::InvalidCode(input.to_string()));
        }
        Ok(Self(code))
    }

    /// For codes built from `CODE_ALPHABET`, which are valid by construction.
    pub(super) fn from_alphabet(code: String) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VoucherCode {
    type Error = VoucherError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VoucherCode> for String {
    fn from(code: VoucherCode) -> Self {
        code.0
    }
}

impl fmt::Display for VoucherCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "UPPERCASE")]
pub enum VoucherStatus {
    Active,
    Redeemed,
    Expired,
}

impl fmt::Display for VoucherStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VoucherStatus::Active => "ACTIVE",
            VoucherStatus::Redeemed => "REDEEMED",
            VoucherStatus::Expired => "EXPIRED",
        };
        f.write_str(s)
    }
}

/// A paid order turned into something the spa will honour.
///
/// Status only ever leaves `Active`; `Redeemed` and `Expired` are final.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Voucher {
    pub id: Uuid,
    pub code: VoucherCode,
    pub order: u32,
    pub service: u32,
    pub service_name: String,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub sender_name: String,
    pub status: VoucherStatus,
    /// Last day on which the voucher can be redeemed.
    pub expires_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub redeemed_at: Option<DateTime<Utc>>,
}

impl Voucher {
    /// Builds the voucher for a paid order.
    pub fn issue(
        code: VoucherCode,
        order: &Order,
        service: &Service,
        issued_at: DateTime<Utc>,
        validity_months: u32,
    ) -> Result<Self, VoucherError> {
        let expires_on = issued_at
            .date_naive()
            .checked_add_months(Months::new(validity_months))
            .ok_or_else(|| {
                VoucherError::ValidationError(format!(
                    "Validity of {validity_months} months overflows the calendar"
                ))
            })?;

        Ok(Self {
            id: Uuid::new_v4(),
            code,
            order: order.id,
            service: service.id,
            service_name: service.name.clone(),
            recipient_name: order.customer.recipient().to_string(),
            recipient_phone: order.customer.delivery_phone().to_string(),
            sender_name: order.customer.name.clone(),
            status: VoucherStatus::Active,
            expires_on,
            created_at: issued_at,
            redeemed_at: None,
        })
    }

    /// True once `today` is strictly after the expiry date.
    pub fn is_past_expiry(&self, today: NaiveDate) -> bool {
        today > self.expires_on
    }

    pub fn redeem(&mut self, now: DateTime<Utc>) -> Result<(), VoucherError> {
        match self.status {
            VoucherStatus::Active => {
                self.status = VoucherStatus::Redeemed;
                self.redeemed_at = Some(now);
                Ok(())
            }
            VoucherStatus::Redeemed => Err(VoucherError::AlreadyRedeemed {
                code: self.code.to_string(),
            }),
            VoucherStatus::Expired => Err(self.expired_error()),
        }
    }

    /// Marks an active voucher as expired. Returns false if it was not active.
    pub fn expire(&mut self) -> bool {
        if self.status == VoucherStatus::Active {
            self.status = VoucherStatus::Expired;
            true
        } else {
            false
        }
    }

    pub fn expired_error(&self) -> VoucherError {
        VoucherError::Expired {
            code: self.code.to_string(),
            expired_on: self.expires_on,
        }
    }
}
