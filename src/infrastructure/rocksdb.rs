use crate::domain::order::{Order, PaymentStatus};
use crate::domain::ports::{OrderStore, ServiceStore, VoucherInsert, VoucherStore};
use crate::domain::service::Service;
use crate::domain::voucher::{Voucher, VoucherCode, VoucherStatus};
use crate::error::{Result, VoucherError};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for the service catalogue.
pub const CF_SERVICES: &str = "services";
/// Column Family for orders.
pub const CF_ORDERS: &str = "orders";
/// Column Family for vouchers, keyed by code.
pub const CF_VOUCHERS: &str = "vouchers";
/// Column Family mapping order id to voucher code.
pub const CF_VOUCHER_ORDERS: &str = "voucher_orders";

/// A persistent store implementation using RocksDB.
///
/// Services, orders and vouchers live in separate Column Families, values
/// are JSON. Conditional writes (insert-if-absent, compare-and-set) are
/// serialised through `write_lock`, which makes them atomic as long as this
/// process is the only writer.
///
/// `Clone` shares the underlying `Arc<DB>` and lock.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path,
    /// creating any missing column families.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = [CF_SERVICES, CF_ORDERS, CF_VOUCHERS, CF_VOUCHER_ORDERS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, families)?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            VoucherError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn exists(&self, cf: &str, key: &[u8]) -> Result<bool> {
        Ok(self.db.get_pinned_cf(self.cf(cf)?, key)?.is_some())
    }

    fn put<T: Serialize>(&self, cf: &str, key: &[u8], value: &T) -> Result<()> {
        self.db.put_cf(self.cf(cf)?, key, encode(value)?)?;
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, cf: &str, key: &[u8]) -> Result<Option<T>> {
        match self.db.get_pinned_cf(self.cf(cf)?, key)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn read_all<T: DeserializeOwned>(&self, cf: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        for item in self.db.iterator_cf(self.cf(cf)?, IteratorMode::Start) {
            let (_key, value) = item?;
            items.push(decode(&value)?);
        }
        Ok(items)
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| {
        VoucherError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Serialization error: {}", e),
        )))
    })
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        VoucherError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Deserialization error: {}", e),
        )))
    })
}

#[async_trait]
impl ServiceStore for RocksDBStore {
    async fn insert(&self, service: Service) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let key = service.id.to_be_bytes();
        if self.exists(CF_SERVICES, &key)? {
            return Ok(false);
        }
        self.put(CF_SERVICES, &key, &service)?;
        Ok(true)
    }

    async fn store(&self, service: Service) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.put(CF_SERVICES, &service.id.to_be_bytes(), &service)
    }

    async fn get(&self, id: u32) -> Result<Option<Service>> {
        self.read(CF_SERVICES, &id.to_be_bytes())
    }

    async fn get_all(&self) -> Result<Vec<Service>> {
        self.read_all(CF_SERVICES)
    }
}

#[async_trait]
impl OrderStore for RocksDBStore {
    async fn insert(&self, order: Order) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let key = order.id.to_be_bytes();
        if self.exists(CF_ORDERS, &key)? {
            return Ok(false);
        }
        self.put(CF_ORDERS, &key, &order)?;
        Ok(true)
    }

    async fn get(&self, id: u32) -> Result<Option<Order>> {
        self.read(CF_ORDERS, &id.to_be_bytes())
    }

    async fn get_all(&self) -> Result<Vec<Order>> {
        self.read_all(CF_ORDERS)
    }

    async fn update_status(
        &self,
        id: u32,
        expected: PaymentStatus,
        next: PaymentStatus,
    ) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let key = id.to_be_bytes();
        match self.read::<Order>(CF_ORDERS, &key)? {
            Some(mut order) if order.payment_status == expected => {
                order.payment_status = next;
                self.put(CF_ORDERS, &key, &order)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl VoucherStore for RocksDBStore {
    async fn insert(&self, voucher: Voucher) -> Result<VoucherInsert> {
        let _guard = self.write_lock.lock().await;
        let order_key = voucher.order.to_be_bytes();
        if self.exists(CF_VOUCHER_ORDERS, &order_key)? {
            return Ok(VoucherInsert::OrderHasVoucher);
        }
        let code_key = voucher.code.as_str().as_bytes();
        if self.exists(CF_VOUCHERS, code_key)? {
            return Ok(VoucherInsert::CodeTaken);
        }

        let mut batch = WriteBatch::default();
        batch.put_cf(self.cf(CF_VOUCHERS)?, code_key, encode(&voucher)?);
        batch.put_cf(self.cf(CF_VOUCHER_ORDERS)?, order_key, code_key);
        self.db.write(batch)?;
        Ok(VoucherInsert::Inserted)
    }

    async fn get(&self, code: &VoucherCode) -> Result<Option<Voucher>> {
        self.read(CF_VOUCHERS, code.as_str().as_bytes())
    }

    async fn find_by_order(&self, order: u32) -> Result<Option<Voucher>> {
        let index = self.cf(CF_VOUCHER_ORDERS)?;
        match self.db.get_cf(index, order.to_be_bytes())? {
            Some(code) => self.read(CF_VOUCHERS, &code),
            None => Ok(None),
        }
    }

    async fn get_all(&self) -> Result<Vec<Voucher>> {
        self.read_all(CF_VOUCHERS)
    }

    async fn replace_if_status(&self, voucher: Voucher, expected: VoucherStatus) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let key = voucher.code.as_str().as_bytes();
        match self.read::<Voucher>(CF_VOUCHERS, key)? {
            Some(current) if current.status == expected => {
                self.put(CF_VOUCHERS, key, &voucher)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
