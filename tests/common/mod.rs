#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use spa_vouchers::application::command::NewOrder;
use spa_vouchers::application::engine::VoucherEngine;
use spa_vouchers::config::EngineConfig;
use spa_vouchers::domain::clock::FixedClock;
use spa_vouchers::domain::money::Amount;
use spa_vouchers::domain::ports::VoucherStoreBox;
use spa_vouchers::domain::service::Service;
use spa_vouchers::infrastructure::in_memory::{
    InMemoryOrderStore, InMemoryServiceStore, InMemoryVoucherStore,
};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

pub const EVENTS_HEADER: &str =
    "type, order, service, name, email, phone, recipient, recipient_phone, status, amount, code";

pub fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap(),
    ))
}

pub fn engine_with(
    vouchers: VoucherStoreBox,
    config: EngineConfig,
    clock: Arc<FixedClock>,
) -> VoucherEngine {
    VoucherEngine::new(
        Box::new(InMemoryServiceStore::new()),
        Box::new(InMemoryOrderStore::new()),
        vouchers,
        config,
    )
    .unwrap()
    .with_clock(clock)
}

pub fn engine(clock: Arc<FixedClock>) -> VoucherEngine {
    engine_with(
        Box::new(InMemoryVoucherStore::new()),
        EngineConfig::default(),
        clock,
    )
}

pub fn massage() -> Service {
    Service::new(1, "Balinese Massage", 60, Amount::new(dec!(250000)).unwrap())
}

pub fn checkout(id: u32) -> NewOrder {
    NewOrder::new(id, 1, "Dewi", "dewi@example.com", "081234567890")
}

/// Writes `rows` under the events header into a temp file.
pub fn events_file(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{EVENTS_HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file
}
