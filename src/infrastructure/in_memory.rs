use crate::domain::order::{Order, PaymentStatus};
use crate::domain::ports::{OrderStore, ServiceStore, VoucherInsert, VoucherStore};
use crate::domain::service::Service;
use crate::domain::voucher::{Voucher, VoucherCode, VoucherStatus};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory service catalogue.
#[derive(Default, Clone)]
pub struct InMemoryServiceStore {
    services: Arc<RwLock<HashMap<u32, Service>>>,
}

impl InMemoryServiceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ServiceStore for InMemoryServiceStore {
    async fn insert(&self, service: Service) -> Result<bool> {
        let mut services = self.services.write().await;
        match services.entry(service.id) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(service);
                Ok(true)
            }
        }
    }

    async fn store(&self, service: Service) -> Result<()> {
        let mut services = self.services.write().await;
        services.insert(service.id, service);
        Ok(())
    }

    async fn get(&self, id: u32) -> Result<Option<Service>> {
        let services = self.services.read().await;
        Ok(services.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Service>> {
        let services = self.services.read().await;
        Ok(services.values().cloned().collect())
    }
}

/// A thread-safe in-memory order book.
///
/// Status changes happen under the write lock, so the compare-and-set in
/// `update_status` is atomic with respect to other callers.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<u32, Order>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<bool> {
        let mut orders = self.orders.write().await;
        match orders.entry(order.id) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(order);
                Ok(true)
            }
        }
    }

    async fn get(&self, id: u32) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.values().cloned().collect())
    }

    async fn update_status(
        &self,
        id: u32,
        expected: PaymentStatus,
        next: PaymentStatus,
    ) -> Result<bool> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(&id) {
            Some(order) if order.payment_status == expected => {
                order.payment_status = next;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[derive(Default)]
struct VoucherTables {
    by_code: HashMap<VoucherCode, Voucher>,
    by_order: HashMap<u32, VoucherCode>,
}

/// A thread-safe in-memory voucher store with an order index.
#[derive(Default, Clone)]
pub struct InMemoryVoucherStore {
    tables: Arc<RwLock<VoucherTables>>,
}

impl InMemoryVoucherStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VoucherStore for InMemoryVoucherStore {
    async fn insert(&self, voucher: Voucher) -> Result<VoucherInsert> {
        let mut tables = self.tables.write().await;
        if tables.by_order.contains_key(&voucher.order) {
            return Ok(VoucherInsert::OrderHasVoucher);
        }
        if tables.by_code.contains_key(&voucher.code) {
            return Ok(VoucherInsert::CodeTaken);
        }
        tables.by_order.insert(voucher.order, voucher.code.clone());
        tables.by_code.insert(voucher.code.clone(), voucher);
        Ok(VoucherInsert::Inserted)
    }

    async fn get(&self, code: &VoucherCode) -> Result<Option<Voucher>> {
        let tables = self.tables.read().await;
        Ok(tables.by_code.get(code).cloned())
    }

    async fn find_by_order(&self, order: u32) -> Result<Option<Voucher>> {
        let tables = self.tables.read().await;
        Ok(tables
            .by_order
            .get(&order)
            .and_then(|code| tables.by_code.get(code))
            .cloned())
    }

    async fn get_all(&self) -> Result<Vec<Voucher>> {
        let tables = self.tables.read().await;
        Ok(tables.by_code.values().cloned().collect())
    }

    async fn replace_if_status(&self, voucher: Voucher, expected: VoucherStatus) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables.by_code.get_mut(&voucher.code) {
            Some(current) if current.status == expected => {
                *current = voucher;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
