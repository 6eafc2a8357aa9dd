use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use spa_vouchers::application::engine::VoucherEngine;
use spa_vouchers::config::{EngineConfig, MessageConfig};
use spa_vouchers::domain::clock::FixedClock;
use spa_vouchers::domain::ports::{OrderStoreBox, ServiceStoreBox, VoucherStoreBox};
use spa_vouchers::error::VoucherError;
use spa_vouchers::infrastructure::in_memory::{
    InMemoryOrderStore, InMemoryServiceStore, InMemoryVoucherStore,
};
use spa_vouchers::interfaces::csv::event_reader::EventReader;
use spa_vouchers::interfaces::csv::record_writer::RecordWriter;
use spa_vouchers::interfaces::csv::service_reader::ServiceReader;
use spa_vouchers::interfaces::whatsapp::{voucher_message, whatsapp_link};
use spa_vouchers::observability::{LogFormat, init_tracing};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Args)]
struct Settings {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true, env = "SPA_VOUCHERS_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Months a voucher stays valid after issue
    #[arg(long, global = true, env = "SPA_VOUCHERS_VALIDITY_MONTHS", default_value_t = 12)]
    validity_months: u32,

    #[arg(long, global = true, env = "SPA_VOUCHERS_CODE_LENGTH", default_value_t = 5)]
    code_length: usize,

    #[arg(long, global = true, env = "SPA_VOUCHERS_MAX_CODE_ATTEMPTS", default_value_t = 8)]
    max_code_attempts: u32,

    /// Seed for voucher codes, for reproducible runs
    #[arg(long, global = true, env = "SPA_VOUCHERS_SEED")]
    seed: Option<u64>,

    /// Pretend today is this date (YYYY-MM-DD)
    #[arg(long, global = true, env = "SPA_VOUCHERS_TODAY")]
    today: Option<NaiveDate>,

    #[arg(long, global = true, env = "SPA_VOUCHERS_STORE_NAME", default_value = "Our Spa")]
    store_name: String,

    #[arg(long, global = true, env = "SPA_VOUCHERS_CURRENCY", default_value = "Rp")]
    currency: String,

    /// Calling code for phone numbers written without one
    #[arg(long, global = true, env = "SPA_VOUCHERS_COUNTRY_CODE", default_value = "62")]
    country_code: String,
}

impl Settings {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            validity_months: self.validity_months,
            code_length: self.code_length,
            max_code_attempts: self.max_code_attempts,
            country_code: self.country_code.clone(),
        }
    }

    fn message_config(&self) -> MessageConfig {
        MessageConfig {
            store_name: self.store_name.clone(),
            currency: self.currency.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Cmd {
    /// Apply an event CSV and print every voucher
    Process {
        /// Input events CSV file
        events: PathBuf,

        /// Service catalogue CSV to load first
        #[arg(long)]
        services: Option<PathBuf>,
    },
    /// Print the service catalogue
    Services,
    /// Print all orders
    Orders,
    /// Print all vouchers
    Vouchers,
    /// Look a voucher up without redeeming it
    Verify { code: String },
    /// Redeem a voucher
    Redeem { code: String },
    /// Print the WhatsApp delivery message for a voucher
    Message { code: String },
}

type Stores = (ServiceStoreBox, OrderStoreBox, VoucherStoreBox);

fn in_memory_stores() -> Stores {
    (
        Box::new(InMemoryServiceStore::new()),
        Box::new(InMemoryOrderStore::new()),
        Box::new(InMemoryVoucherStore::new()),
    )
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<&Path>) -> Result<Stores> {
    use spa_vouchers::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(path) => {
            let store = RocksDBStore::open(path).into_diagnostic()?;
            info!(path = %path.display(), "using RocksDB storage");
            let stores: Stores = (
                Box::new(store.clone()),
                Box::new(store.clone()),
                Box::new(store),
            );
            Ok(stores)
        }
        None => Ok(in_memory_stores()),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<&Path>) -> Result<Stores> {
    if db_path.is_some() {
        warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not \
             enabled. Falling back to In-Memory storage."
        );
    }
    Ok(in_memory_stores())
}

fn build_engine(settings: &Settings) -> Result<VoucherEngine> {
    let (services, orders, vouchers) = open_stores(settings.db_path.as_deref())?;
    let mut engine =
        VoucherEngine::new(services, orders, vouchers, settings.engine_config())
            .into_diagnostic()?;
    if let Some(today) = settings.today {
        engine = engine.with_clock(Arc::new(FixedClock::at_date(today)));
    }
    if let Some(seed) = settings.seed {
        engine = engine.with_seed(seed);
    }
    Ok(engine)
}

async fn load_services(engine: &VoucherEngine, path: &Path) -> Result<()> {
    let file = File::open(path).into_diagnostic()?;
    for service in ServiceReader::new(file).services() {
        let service = match service {
            Ok(service) => service,
            Err(e) => {
                warn!("Error reading service: {}", e);
                continue;
            }
        };
        // Re-importing a catalogue updates the services already stored.
        let result = match engine.add_service(service.clone()).await {
            Err(VoucherError::DuplicateService(_)) => engine.update_service(service).await,
            other => other,
        };
        if let Err(e) = result {
            warn!("Error loading service: {}", e);
        }
    }
    Ok(())
}

async fn process(engine: &VoucherEngine, events: &Path) -> Result<()> {
    let file = File::open(events).into_diagnostic()?;
    for event in EventReader::new(file).events() {
        match event {
            Ok(command) => match engine.execute(command).await {
                Ok(outcome) => debug!(?outcome, "event applied"),
                Err(e) => warn!("Error processing event: {}", e),
            },
            Err(e) => {
                warn!("Error reading event: {}", e);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(LogFormat::from_env());
    let cli = Cli::parse();
    let engine = build_engine(&cli.settings)?;

    let stdout = io::stdout();
    let mut writer = RecordWriter::new(stdout.lock());

    match cli.command {
        Cmd::Process { events, services } => {
            if let Some(services) = services {
                load_services(&engine, &services).await?;
            }
            process(&engine, &events).await?;
            let vouchers = engine.list_vouchers().await.into_diagnostic()?;
            info!(vouchers = vouchers.len(), "processing finished");
            writer.write_vouchers(&vouchers).into_diagnostic()?;
        }
        Cmd::Services => {
            let services = engine.list_services(false).await.into_diagnostic()?;
            writer.write_services(&services).into_diagnostic()?;
        }
        Cmd::Orders => {
            let orders = engine.list_orders().await.into_diagnostic()?;
            writer.write_orders(&orders).into_diagnostic()?;
        }
        Cmd::Vouchers => {
            let vouchers = engine.list_vouchers().await.into_diagnostic()?;
            writer.write_vouchers(&vouchers).into_diagnostic()?;
        }
        Cmd::Verify { code } => {
            let voucher = engine.verify(&code).await.into_diagnostic()?;
            writer.write_vouchers([&voucher]).into_diagnostic()?;
        }
        Cmd::Redeem { code } => {
            let voucher = engine.redeem(&code).await.into_diagnostic()?;
            writer.write_vouchers([&voucher]).into_diagnostic()?;
        }
        Cmd::Message { code } => {
            let voucher = engine.verify(&code).await.into_diagnostic()?;
            let order = engine.order_for_voucher(&voucher).await.into_diagnostic()?;
            let text = voucher_message(&voucher, order.as_ref(), &cli.settings.message_config());
            println!("{text}\n\n{}", whatsapp_link(&voucher.recipient_phone, &text));
        }
    }

    Ok(())
}
