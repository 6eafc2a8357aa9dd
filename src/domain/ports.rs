use super::order::{Order, PaymentStatus};
use super::service::Service;
use super::voucher::{Voucher, VoucherCode, VoucherStatus};
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ServiceStore: Send + Sync {
    /// Adds a new service. Returns `false` if the id is already taken.
    async fn insert(&self, service: Service) -> Result<bool>;
    /// Overwrites an existing service (admin edits, soft delete).
    async fn store(&self, service: Service) -> Result<()>;
    async fn get(&self, id: u32) -> Result<Option<Service>>;
    async fn get_all(&self) -> Result<Vec<Service>>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Adds a new order. Returns `false` if the id is already taken.
    async fn insert(&self, order: Order) -> Result<bool>;
    async fn get(&self, id: u32) -> Result<Option<Order>>;
    async fn get_all(&self) -> Result<Vec<Order>>;
    /// Moves the payment status from `expected` to `next`.
    ///
    /// Returns `false`, leaving the order untouched, if the stored status is
    /// not `expected` or the order does not exist.
    async fn update_status(
        &self,
        id: u32,
        expected: PaymentStatus,
        next: PaymentStatus,
    ) -> Result<bool>;
}

/// Result of an insert-if-absent on the voucher store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoucherInsert {
    Inserted,
    CodeTaken,
    OrderHasVoucher,
}

#[async_trait]
pub trait VoucherStore: Send + Sync {
    /// Adds a voucher unless its code is taken or its order already has one.
    async fn insert(&self, voucher: Voucher) -> Result<VoucherInsert>;
    async fn get(&self, code: &VoucherCode) -> Result<Option<Voucher>>;
    async fn find_by_order(&self, order: u32) -> Result<Option<Voucher>>;
    async fn get_all(&self) -> Result<Vec<Voucher>>;
    /// Writes `voucher` only if the stored copy still has status `expected`.
    async fn replace_if_status(&self, voucher: Voucher, expected: VoucherStatus) -> Result<bool>;
}

pub type ServiceStoreBox = Box<dyn ServiceStore>;
pub type OrderStoreBox = Box<dyn OrderStore>;
pub type VoucherStoreBox = Box<dyn VoucherStore>;
