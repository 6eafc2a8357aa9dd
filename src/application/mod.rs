//! Application layer: the `VoucherEngine` and the workflows it runs.
//!
//! Each workflow is a handful of store calls; atomicity comes from the
//! stores' conditional operations, never from locks held by the engine.

pub mod command;
pub mod engine;
mod payment;
mod redemption;
