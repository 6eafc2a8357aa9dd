use crate::domain::order::PaymentStatus;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, VoucherError>;

#[derive(Error, Debug)]
pub enum VoucherError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid voucher code: {0:?}")]
    InvalidCode(String),
    #[error("Voucher {0} not found")]
    VoucherNotFound(String),
    #[error("Voucher {code} expired on {expired_on}")]
    Expired { code: String, expired_on: NaiveDate },
    #[error("Voucher {code} has already been redeemed")]
    AlreadyRedeemed { code: String },
    #[error("No unused voucher code found after {0} attempts")]
    CodeSpaceExhausted(u32),

    #[error("Service {0} not found")]
    ServiceNotFound(u32),
    #[error("Service {0} is not available")]
    ServiceInactive(u32),
    #[error("Service {0} already exists")]
    DuplicateService(u32),
    #[error("Order {0} not found")]
    OrderNotFound(u32),
    #[error("Order {0} already exists")]
    DuplicateOrder(u32),
    #[error("Order {order} cannot move from {from} to {to}")]
    InvalidTransition {
        order: u32,
        from: PaymentStatus,
        to: PaymentStatus,
    },
    #[error("Order {order} total is {expected}, gateway reported {received}")]
    AmountMismatch {
        order: u32,
        expected: Decimal,
        received: Decimal,
    },

    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}
