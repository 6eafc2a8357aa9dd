use crate::domain::service::Service;
use crate::error::{Result, VoucherError};
use std::io::Read;

/// Reads the service catalogue (`id, name, description, duration, price, active`).
pub struct ServiceReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ServiceReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn services(self) -> impl Iterator<Item = Result<Service>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(VoucherError::from))
    }
}
