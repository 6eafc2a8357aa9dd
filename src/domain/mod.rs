//! Domain layer: entities, their state transitions and the storage ports.

pub mod clock;
pub mod code;
pub mod money;
pub mod order;
pub mod payment;
pub mod ports;
pub mod service;
pub mod voucher;
