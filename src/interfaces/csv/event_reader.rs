use crate::application::command::{Command, NewOrder};
use crate::domain::payment::PaymentNotification;
use crate::error::{Result, VoucherError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum EventType {
    Order,
    Payment,
    Verify,
    Redeem,
}

/// One CSV row; which columns matter depends on `type`.
#[derive(Debug, Deserialize)]
struct EventRecord {
    r#type: EventType,
    order: Option<u32>,
    service: Option<u32>,
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    recipient: Option<String>,
    recipient_phone: Option<String>,
    status: Option<String>,
    amount: Option<Decimal>,
    code: Option<String>,
}

fn required<T>(value: Option<T>, column: &str, kind: EventType) -> Result<T> {
    value.ok_or_else(|| {
        VoucherError::ValidationError(format!("{kind:?} event is missing `{column}`"))
    })
}

impl TryFrom<EventRecord> for Command {
    type Error = VoucherError;

    fn try_from(record: EventRecord) -> Result<Self> {
        let kind = record.r#type;
        match kind {
            EventType::Order => Ok(Command::PlaceOrder(NewOrder {
                id: required(record.order, "order", kind)?,
                service: required(record.service, "service", kind)?,
                name: required(record.name, "name", kind)?,
                email: required(record.email, "email", kind)?,
                phone: required(record.phone, "phone", kind)?,
                recipient_name: record.recipient,
                recipient_phone: record.recipient_phone,
            })),
            EventType::Payment => Ok(Command::ConfirmPayment(PaymentNotification {
                order: required(record.order, "order", kind)?,
                status: required(record.status, "status", kind)?,
                gross_amount: record.amount,
            })),
            EventType::Verify => Ok(Command::Verify(required(record.code, "code", kind)?)),
            EventType::Redeem => Ok(Command::Redeem(required(record.code, "code", kind)?)),
        }
    }
}

/// Reads lifecycle events from a CSV source.
///
/// Expected header: `type, order, service, name, email, phone, recipient,
/// recipient_phone, status, amount, code`. Trailing empty columns may be
/// omitted.
pub struct EventReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> EventReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads and converts rows, one `Result` per row.
    pub fn events(self) -> impl Iterator<Item = Result<Command>> {
        self.reader.into_deserialize().map(|result| {
            let record: EventRecord = result.map_err(VoucherError::from)?;
            Command::try_from(record)
        })
    }
}
