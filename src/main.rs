use clap::Parser;
use miette::{IntoDiagnostic, Result};
use regpay::application::engine::PaymentEngine;
use regpay::config::Settings;
use regpay::domain::ports::{NotifierBox, RegistrationStoreBox, TransactionStoreBox};
use regpay::infrastructure::in_memory::{InMemoryRegistrationStore, InMemoryTransactionStore};
use regpay::infrastructure::notifier::{LogNotifier, OutboxNotifier};
use regpay::interfaces::csv::callback_reader::CallbackReader;
use regpay::interfaces::csv::ledger_writer::LedgerWriter;
use regpay::interfaces::csv::registration_reader::RegistrationReader;
use regpay::interfaces::csv::registration_writer::RegistrationWriter;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Registrations CSV file (event, registrant, email, price, currency)
    registrations: PathBuf,

    /// Payment callbacks CSV file (event, registrant, action, provider, amount, currency, timestamp, data)
    callbacks: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// TOML settings with admin recipients and payment plugins
    #[arg(long)]
    config: Option<PathBuf>,

    /// Queue notifications as JSON lines in this file instead of logging them
    #[arg(long)]
    outbox: Option<PathBuf>,

    /// Also write every ledger entry to this CSV file
    #[arg(long)]
    ledger: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.with_ansi(false).init();
    }
}

fn open_stores(db_path: Option<PathBuf>) -> Result<(RegistrationStoreBox, TransactionStoreBox)> {
    #[cfg(feature = "storage-rocksdb")]
    if let Some(db_path) = db_path {
        // Use persistent storage (RocksDB)
        let store = regpay::infrastructure::rocksdb::RocksDBStore::open(db_path).into_diagnostic()?;
        let registrations: RegistrationStoreBox = Box::new(store.clone());
        let transactions: TransactionStoreBox = Box::new(store);
        return Ok((registrations, transactions));
    }

    #[cfg(not(feature = "storage-rocksdb"))]
    if db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }

    // Use in-memory storage
    let registrations: RegistrationStoreBox = Box::new(InMemoryRegistrationStore::new());
    let transactions: TransactionStoreBox = Box::new(InMemoryTransactionStore::new());
    Ok((registrations, transactions))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let settings = match &cli.config {
        Some(path) => Settings::load(path).into_diagnostic()?,
        None => Settings::default(),
    };

    let (registration_store, transaction_store) = open_stores(cli.db_path)?;
    let notifier: NotifierBox = match &cli.outbox {
        Some(path) => Box::new(OutboxNotifier::new(path)),
        None => Box::new(LogNotifier),
    };

    let engine = PaymentEngine::new(registration_store, transaction_store, notifier)
        .with_plugins(settings.plugin_registry())
        .with_admins(settings.admins.clone());

    // Load registrations; ones already stored keep their payment state
    let file = File::open(&cli.registrations).into_diagnostic()?;
    for result in RegistrationReader::new(file).registrations() {
        match result {
            Ok(registration) => {
                if let Err(e) = engine.import_registration(registration).await {
                    error!("Error storing registration: {}", e);
                }
            }
            Err(e) => error!("Error reading registration: {}", e),
        }
    }

    // Process callbacks
    let file = File::open(&cli.callbacks).into_diagnostic()?;
    let mut recorded = 0usize;
    for result in CallbackReader::new(file).callbacks() {
        match result {
            Ok(callback) => match engine.register_transaction(callback).await {
                Ok(Some(_)) => recorded += 1,
                Ok(None) => {}
                Err(e) => error!("Error processing callback: {}", e),
            },
            Err(e) => error!("Error reading callback: {}", e),
        }
    }
    info!(recorded, "Finished processing callbacks");

    if let Some(path) = &cli.ledger {
        let ledger = engine.ledger().await.into_diagnostic()?;
        let file = File::create(path).into_diagnostic()?;
        LedgerWriter::new(file)
            .write_transactions(&ledger)
            .into_diagnostic()?;
    }

    // Collect final state from engine
    let summaries = engine.into_results().await.into_diagnostic()?;

    // Output final state
    let stdout = io::stdout();
    let mut writer = RegistrationWriter::new(stdout.lock());
    writer.write_summaries(summaries).into_diagnostic()?;

    Ok(())
}
