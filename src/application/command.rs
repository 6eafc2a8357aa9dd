use crate::domain::order::Order;
use crate::domain::payment::PaymentNotification;
use crate::domain::voucher::Voucher;

/// Checkout form as submitted by the storefront.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub id: u32,
    pub service: u32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub recipient_name: Option<String>,
    pub recipient_phone: Option<String>,
}

impl NewOrder {
    pub fn new(
        id: u32,
        service: u32,
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id,
            service,
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            recipient_name: None,
            recipient_phone: None,
        }
    }

    pub fn gift_for(mut self, name: impl Into<String>, phone: Option<String>) -> Self {
        self.recipient_name = Some(name.into());
        self.recipient_phone = phone;
        self
    }
}

/// One step of the voucher lifecycle, as replayed from an event stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    PlaceOrder(NewOrder),
    ConfirmPayment(PaymentNotification),
    Verify(String),
    Redeem(String),
}

/// What a payment notification did to its order.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentOutcome {
    pub order: Order,
    /// Set once the order is paid.
    pub voucher: Option<Voucher>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    OrderPlaced(Order),
    Payment(PaymentOutcome),
    Verified(Voucher),
    Redeemed(Voucher),
}
