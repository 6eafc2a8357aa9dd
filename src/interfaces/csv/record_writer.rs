use crate::domain::order::Order;
use crate::domain::service::Service;
use crate::domain::voucher::Voucher;
use crate::error::Result;
use chrono::SecondsFormat;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct VoucherRow<'a> {
    code: &'a str,
    order: u32,
    service: u32,
    service_name: &'a str,
    recipient: &'a str,
    recipient_phone: &'a str,
    sender: &'a str,
    status: String,
    expires_on: String,
    created_at: String,
    redeemed_at: Option<String>,
}

impl<'a> From<&'a Voucher> for VoucherRow<'a> {
    fn from(v: &'a Voucher) -> Self {
        Self {
            code: v.code.as_str(),
            order: v.order,
            service: v.service,
            service_name: &v.service_name,
            recipient: &v.recipient_name,
            recipient_phone: &v.recipient_phone,
            sender: &v.sender_name,
            status: v.status.to_string(),
            expires_on: v.expires_on.to_string(),
            created_at: v.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            redeemed_at: v
                .redeemed_at
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }
}

#[derive(Serialize)]
struct OrderRow<'a> {
    id: u32,
    service: u32,
    customer: &'a str,
    email: &'a str,
    phone: &'a str,
    recipient: &'a str,
    total: String,
    status: String,
    created_at: String,
}

impl<'a> From<&'a Order> for OrderRow<'a> {
    fn from(o: &'a Order) -> Self {
        Self {
            id: o.id,
            service: o.service,
            customer: &o.customer.name,
            email: &o.customer.email,
            phone: &o.customer.phone,
            recipient: o.customer.recipient(),
            total: o.total.to_string(),
            status: o.payment_status.to_string(),
            created_at: o.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Writes vouchers, orders and services as CSV tables.
pub struct RecordWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_vouchers<'a>(
        &mut self,
        vouchers: impl IntoIterator<Item = &'a Voucher>,
    ) -> Result<()> {
        self.write_rows(vouchers.into_iter().map(VoucherRow::from))
    }

    pub fn write_orders<'a>(&mut self, orders: impl IntoIterator<Item = &'a Order>) -> Result<()> {
        self.write_rows(orders.into_iter().map(OrderRow::from))
    }

    pub fn write_services<'a>(
        &mut self,
        services: impl IntoIterator<Item = &'a Service>,
    ) -> Result<()> {
        self.write_rows(services.into_iter())
    }

    fn write_rows<T: Serialize>(&mut self, rows: impl Iterator<Item = T>) -> Result<()> {
        for row in rows {
            self.writer.serialize(row)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
