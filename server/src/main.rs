use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use platform_db::{MemoryStore, PgStore, RecordStore, connect};
use platform_obs::{ObsConfig, init_tracing, shutdown_tracing};
use products_hr::{EmployeeService, sample_employees};
use server::{AppConfig, AppState, ServeConfig};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "employee-server", version, about = "Employee record service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server.
    Serve(ServeCommand),
    /// Insert sample employees into the Postgres store.
    Seed,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum StoreKind {
    Memory,
    Postgres,
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, default_value = "0.0.0.0")]
    host: std::net::IpAddr,
    #[arg(long, default_value_t = 8080)]
    port: u16,
    #[arg(long, value_enum, default_value_t = StoreKind::Postgres)]
    store: StoreKind,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(ObsConfig::default())?;
    let cli = Cli::parse();
    let config = Arc::new(AppConfig::load());
    let outcome = match cli.command {
        Command::Serve(cmd) => run_server(cmd, config).await,
        Command::Seed => run_seed(&config).await,
    };
    shutdown_tracing();
    outcome
}

async fn postgres_store(config: &AppConfig) -> Result<PgStore> {
    let pool = connect(&config.database)
        .await
        .context("failed to connect to the employee database")?;
    let store = PgStore::new(pool);
    store
        .ensure_table()
        .await
        .context("failed to prepare the employees table")?;
    Ok(store)
}

async fn run_server(cmd: ServeCommand, config: Arc<AppConfig>) -> Result<()> {
    let store: Arc<dyn RecordStore> = match cmd.store {
        StoreKind::Memory => Arc::new(MemoryStore::new()),
        StoreKind::Postgres => Arc::new(postgres_store(&config).await?),
    };
    info!(store = ?cmd.store, "record store ready");
    let state = AppState::new(store, config);
    server::serve(ServeConfig::new(cmd.host, cmd.port), state).await
}

async fn run_seed(config: &AppConfig) -> Result<()> {
    let store = postgres_store(config).await?;
    let service = EmployeeService::new(Arc::new(store));
    let seeded = service
        .seed(sample_employees())
        .await
        .context("failed to seed sample employees")?;
    info!(count = seeded.len(), "sample employees inserted");
    Ok(())
}
