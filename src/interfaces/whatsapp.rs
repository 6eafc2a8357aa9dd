//! Voucher delivery text for WhatsApp click-to-chat links.

use crate::config::MessageConfig;
use crate::domain::order::Order;
use crate::domain::voucher::Voucher;
use crate::format::{format_currency, format_date};

const WA_BASE: &str = "https://wa.me";

/// The message sent to a voucher's recipient.
pub fn voucher_message(voucher: &Voucher, order: Option<&Order>, config: &MessageConfig) -> String {
    let mut lines = vec![format!("Hi {},", voucher.recipient_name)];
    if voucher.sender_name != voucher.recipient_name {
        lines.push(format!(
            "{} has sent you a gift voucher from {}.",
            voucher.sender_name, config.store_name
        ));
    } else {
        lines.push(format!("Thank you for your purchase at {}.", config.store_name));
    }
    lines.push(String::new());
    lines.push(format!("Treatment: {}", voucher.service_name));
    if let Some(order) = order {
        lines.push(format!(
            "Value: {}",
            format_currency(order.total.value(), &config.currency)
        ));
    }
    lines.push(format!("Voucher code: {}", voucher.code));
    lines.push(format!("Valid until: {}", format_date(voucher.expires_on)));
    lines.push(String::new());
    lines.push("Show this code at reception to book your treatment.".to_string());
    lines.join("\n")
}

/// A click-to-chat link that opens WhatsApp with `text` prefilled.
///
/// `phone` must already be normalised to international digits.
pub fn whatsapp_link(phone: &str, text: &str) -> String {
    format!("{WA_BASE}/{phone}?text={}", urlencoding::encode(text))
}
