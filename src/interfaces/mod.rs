//! Adapters between the engine and the outside world: CSV files in and out,
//! and delivery messages.

pub mod csv;
pub mod whatsapp;
