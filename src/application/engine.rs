use super::command::{Command, NewOrder, Outcome};
use crate::config::EngineConfig;
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::code::CodeGenerator;
use crate::domain::order::{Customer, Order};
use crate::domain::ports::{OrderStoreBox, ServiceStoreBox, VoucherStoreBox};
use crate::domain::service::Service;
use crate::domain::voucher::Voucher;
use crate::error::{Result, VoucherError};
use crate::format::normalize_phone;
use std::sync::Arc;
use tracing::info;

/// The entry point for the storefront, the payment callback and the front desk.
///
/// `VoucherEngine` owns the three stores plus the clock and code generator it
/// needs to issue vouchers. It is `Send + Sync`; share it behind an `Arc` to
/// serve concurrent requests.
pub struct VoucherEngine {
    pub(super) services: ServiceStoreBox,
    pub(super) orders: OrderStoreBox,
    pub(super) vouchers: VoucherStoreBox,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) codes: CodeGenerator,
    pub(super) config: EngineConfig,
}

impl VoucherEngine {
    /// Creates an engine on the system clock with an entropy-seeded code generator.
    pub fn new(
        services: ServiceStoreBox,
        orders: OrderStoreBox,
        vouchers: VoucherStoreBox,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            services,
            orders,
            vouchers,
            clock: Arc::new(SystemClock),
            codes: CodeGenerator::new(config.code_length),
            config,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the code generator, keeping the configured code length.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.codes = CodeGenerator::seeded(self.config.code_length, seed);
        self
    }

    /// Runs one command and reports what it changed.
    pub async fn execute(&self, command: Command) -> Result<Outcome> {
        match command {
            Command::PlaceOrder(new_order) => {
                self.place_order(new_order).await.map(Outcome::OrderPlaced)
            }
            Command::ConfirmPayment(notification) => self
                .confirm_payment(notification)
                .await
                .map(Outcome::Payment),
            Command::Verify(code) => self.verify(&code).await.map(Outcome::Verified),
            Command::Redeem(code) => self.redeem(&code).await.map(Outcome::Redeemed),
        }
    }

    pub async fn add_service(&self, service: Service) -> Result<Service> {
        service.validate()?;
        if !self.services.insert(service.clone()).await? {
            return Err(VoucherError::DuplicateService(service.id));
        }
        info!(service = service.id, name = %service.name, "service added");
        Ok(service)
    }

    /// Admin edit of an existing service; the id cannot change.
    pub async fn update_service(&self, service: Service) -> Result<Service> {
        service.validate()?;
        if self.services.get(service.id).await?.is_none() {
            return Err(VoucherError::ServiceNotFound(service.id));
        }
        self.services.store(service.clone()).await?;
        info!(service = service.id, active = service.active, "service updated");
        Ok(service)
    }

    /// Takes a service off sale. Existing orders and vouchers are unaffected.
    pub async fn deactivate_service(&self, id: u32) -> Result<Service> {
        let mut service = self
            .services
            .get(id)
            .await?
            .ok_or(VoucherError::ServiceNotFound(id))?;
        if service.active {
            service.active = false;
            self.services.store(service.clone()).await?;
            info!(service = id, "service deactivated");
        }
        Ok(service)
    }

    pub async fn list_services(&self, active_only: bool) -> Result<Vec<Service>> {
        let mut services = self.services.get_all().await?;
        if active_only {
            services.retain(|s| s.active);
        }
        services.sort_by_key(|s| s.id);
        Ok(services)
    }

    /// Records a checkout as a pending order priced at the current service price.
    pub async fn place_order(&self, new_order: NewOrder) -> Result<Order> {
        let service = self
            .services
            .get(new_order.service)
            .await?
            .ok_or(VoucherError::ServiceNotFound(new_order.service))?;
        if !service.active {
            return Err(VoucherError::ServiceInactive(service.id));
        }

        let country_code = &self.config.country_code;
        let recipient_phone = match new_order.recipient_phone.as_deref().map(str::trim) {
            Some(phone) if !phone.is_empty() => Some(normalize_phone(phone, country_code)?),
            _ => None,
        };
        let customer = Customer {
            name: new_order.name.trim().to_string(),
            email: new_order.email.trim().to_string(),
            phone: normalize_phone(&new_order.phone, country_code)?,
            recipient_name: new_order
                .recipient_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            recipient_phone,
        };
        customer.validate()?;

        let order = Order::new(
            new_order.id,
            service.id,
            customer,
            service.price,
            self.clock.now(),
        );
        if !self.orders.insert(order.clone()).await? {
            return Err(VoucherError::DuplicateOrder(order.id));
        }
        info!(order = order.id, service = service.id, total = %order.total, "order placed");
        Ok(order)
    }

    pub async fn get_order(&self, id: u32) -> Result<Order> {
        self.orders
            .get(id)
            .await?
            .ok_or(VoucherError::OrderNotFound(id))
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        let mut orders = self.orders.get_all().await?;
        orders.sort_by_key(|o| o.id);
        Ok(orders)
    }

    /// The order a voucher was issued for, or `None` if it is no longer on record.
    pub async fn order_for_voucher(&self, voucher: &Voucher) -> Result<Option<Order>> {
        self.orders.get(voucher.order).await
    }

    pub async fn voucher_for_order(&self, order: u32) -> Result<Option<Voucher>> {
        self.vouchers.find_by_order(order).await
    }

    /// All vouchers, oldest first. Statuses are as stored; expiry is only
    /// applied by `verify` and `redeem`.
    pub async fn list_vouchers(&self) -> Result<Vec<Voucher>> {
        let mut vouchers = self.vouchers.get_all().await?;
        vouchers.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.code.cmp(&b.code))
        });
        Ok(vouchers)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{checkout, clock, engine, massage};
    use super::*;
    use crate::domain::money::Amount;
    use crate::domain::order::PaymentStatus;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_add_service_rejects_duplicates() {
        let engine = engine(clock());
        engine.add_service(massage()).await.unwrap();
        assert!(matches!(
            engine.add_service(massage()).await,
            Err(VoucherError::DuplicateService(1))
        ));
    }

    #[tokio::test]
    async fn test_update_and_deactivate_service() {
        let engine = engine(clock());
        engine.add_service(massage()).await.unwrap();

        let mut edited = massage();
        edited.price = Amount::new(dec!(275000)).unwrap();
        engine.update_service(edited).await.unwrap();

        let deactivated = engine.deactivate_service(1).await.unwrap();
        assert!(!deactivated.active);
        assert_eq!(deactivated.price.value(), dec!(275000));

        assert!(engine.list_services(true).await.unwrap().is_empty());
        assert_eq!(engine.list_services(false).await.unwrap().len(), 1);

        let mut unknown = massage();
        unknown.id = 99;
        assert!(matches!(
            engine.update_service(unknown).await,
            Err(VoucherError::ServiceNotFound(99))
        ));
    }

    #[tokio::test]
    async fn test_place_order_copies_price_and_normalises_phone() {
        let engine = engine(clock());
        engine.add_service(massage()).await.unwrap();

        let order = engine.place_order(checkout(10)).await.unwrap();
        assert_eq!(order.total.value(), dec!(250000));
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.customer.phone, "6281234567890");
        assert_eq!(engine.get_order(10).await.unwrap(), order);
    }

    #[tokio::test]
    async fn test_place_order_with_gift_recipient() {
        let engine = engine(clock());
        engine.add_service(massage()).await.unwrap();

        let new_order = checkout(11).gift_for(" Ayu ", Some("0899 1111 2222".to_string()));
        let order = engine.place_order(new_order).await.unwrap();
        assert_eq!(order.customer.recipient(), "Ayu");
        assert_eq!(order.customer.delivery_phone(), "6289911112222");
    }

    #[tokio::test]
    async fn test_place_order_validation() {
        let engine = engine(clock());
        engine.add_service(massage()).await.unwrap();

        let mut unknown_service = checkout(1);
        unknown_service.service = 5;
        assert!(matches!(
            engine.place_order(unknown_service).await,
            Err(VoucherError::ServiceNotFound(5))
        ));

        let mut bad_email = checkout(2);
        bad_email.email = "nope".to_string();
        assert!(matches!(
            engine.place_order(bad_email).await,
            Err(VoucherError::ValidationError(_))
        ));

        engine.place_order(checkout(3)).await.unwrap();
        assert!(matches!(
            engine.place_order(checkout(3)).await,
            Err(VoucherError::DuplicateOrder(3))
        ));

        engine.deactivate_service(1).await.unwrap();
        assert!(matches!(
            engine.place_order(checkout(4)).await,
            Err(VoucherError::ServiceInactive(1))
        ));
        assert_eq!(engine.list_orders().await.unwrap().len(), 1);
    }

    struct OfflineOrders;

    #[async_trait::async_trait]
    impl crate::domain::ports::OrderStore for OfflineOrders {
        async fn insert(&self, _order: Order) -> Result<bool> {
            Err(offline())
        }

        async fn get(&self, _id: u32) -> Result<Option<Order>> {
            Err(offline())
        }

        async fn get_all(&self) -> Result<Vec<Order>> {
            Err(offline())
        }

        async fn update_status(
            &self,
            _id: u32,
            _expected: PaymentStatus,
            _next: PaymentStatus,
        ) -> Result<bool> {
            Err(offline())
        }
    }

    fn offline() -> VoucherError {
        VoucherError::IoError(std::io::Error::other("order store offline"))
    }

    #[tokio::test]
    async fn test_order_for_voucher() {
        use crate::domain::payment::PaymentNotification;

        let engine = engine(clock());
        engine.add_service(massage()).await.unwrap();
        engine.place_order(checkout(1)).await.unwrap();
        let voucher = engine
            .confirm_payment(PaymentNotification::new(1, "settlement"))
            .await
            .unwrap()
            .voucher
            .unwrap();

        let order = engine.order_for_voucher(&voucher).await.unwrap().unwrap();
        assert_eq!(order.id, 1);

        let mut orphan = voucher.clone();
        orphan.order = 99;
        assert!(engine.order_for_voucher(&orphan).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_order_for_voucher_propagates_store_errors() {
        use crate::infrastructure::in_memory::fixtures;
        use crate::infrastructure::in_memory::{InMemoryServiceStore, InMemoryVoucherStore};

        let engine = VoucherEngine::new(
            Box::new(InMemoryServiceStore::new()),
            Box::new(OfflineOrders),
            Box::new(InMemoryVoucherStore::new()),
            EngineConfig::default(),
        )
        .unwrap();

        let voucher = fixtures::voucher("QWERT", 1);
        assert!(matches!(
            engine.order_for_voucher(&voucher).await,
            Err(VoucherError::IoError(_))
        ));
    }

    #[tokio::test]
    async fn test_new_rejects_invalid_config() {
        use crate::infrastructure::in_memory::{
            InMemoryOrderStore, InMemoryServiceStore, InMemoryVoucherStore,
        };
        let result = VoucherEngine::new(
            Box::new(InMemoryServiceStore::new()),
            Box::new(InMemoryOrderStore::new()),
            Box::new(InMemoryVoucherStore::new()),
            EngineConfig {
                code_length: 0,
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(VoucherError::ValidationError(_))));
    }
}
