use super::money::Amount;
use crate::error::VoucherError;
use serde::{Deserialize, Serialize};

/// A treatment on the price list.
///
/// Services are never removed; clearing `active` takes them off sale while
/// keeping old orders and vouchers resolvable.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Service {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Treatment length in minutes.
    pub duration: u32,
    pub price: Amount,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Service {
    pub fn new(id: u32, name: impl Into<String>, duration: u32, price: Amount) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            duration,
            price,
            active: true,
        }
    }

    pub fn validate(&self) -> Result<(), VoucherError> {
        if self.name.trim().is_empty() {
            return Err(VoucherError::ValidationError(format!(
                "Service {} has no name",
                self.id
            )));
        }
        if self.duration == 0 {
            return Err(VoucherError::ValidationError(format!(
                "Service {} has no duration",
                self.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_service_csv_deserialization() {
        let csv = "id, name, description, duration, price, active\n\
                   1, Balinese Massage, Full body, 60, 250000, true\n\
                   2, Hot Stone, , 90, 400000.50, false";
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(csv.as_bytes());
        let services: Vec<Service> = reader.deserialize().map(|r| r.unwrap()).collect();

        assert_eq!(services.len(), 2);
        assert_eq!(services[0].name, "Balinese Massage");
        assert_eq!(services[0].price.value(), dec!(250000));
        assert!(services[0].active);
        assert_eq!(services[1].description, "");
        assert!(!services[1].active);
    }

    #[test]
    fn test_service_validation() {
        let price = Amount::new(dec!(100000)).unwrap();
        assert!(Service::new(1, "Facial", 45, price).validate().is_ok());
        assert!(matches!(
            Service::new(2, "  ", 45, price).validate(),
            Err(VoucherError::ValidationError(_))
        ));
        assert!(matches!(
            Service::new(3, "Facial", 0, price).validate(),
            Err(VoucherError::ValidationError(_))
        ));
    }
}
