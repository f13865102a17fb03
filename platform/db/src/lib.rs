//! Record store primitives: the narrow persistence contract the HR service
//! depends on, plus its in-memory and Postgres backends.

mod memory;
mod postgres;

use async_trait::async_trait;
use entity::{Employee, EmployeeId};
use serde::Deserialize;
use sqlx::{Pool, Postgres, postgres::PgPoolOptions};
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Shared Postgres pool alias.
pub type DbPool = Pool<Postgres>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database url missing (set {0})")]
    MissingUrl(String),
    #[error("employee id sequence exhausted")]
    IdsExhausted,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence collaborator for employee records, keyed by a store-assigned id.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert when `record.id` is `None`, otherwise replace (or insert) at that id.
    async fn save(&self, record: Employee) -> StoreResult<Employee>;

    /// `save` for each record, returned in input order.
    async fn save_all(&self, records: Vec<Employee>) -> StoreResult<Vec<Employee>>;

    /// Every record, ordered by id.
    async fn find_all(&self) -> StoreResult<Vec<Employee>>;

    async fn find_by_id(&self, id: EmployeeId) -> StoreResult<Option<Employee>>;

    /// Remove the record. Records without an id, or already gone, are ignored.
    async fn delete(&self, record: &Employee) -> StoreResult<()>;
}

/// Environment-driven connection settings.
#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_url_key")]
    env_key: String,
    #[serde(default = "default_max_connections")]
    max_connections: u32,
}

fn default_url_key() -> String {
    "DATABASE_URL".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            env_key: default_url_key(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseSettings {
    pub fn new(env_key: impl Into<String>) -> Self {
        Self {
            env_key: env_key.into(),
            ..Self::default()
        }
    }

    /// Read `DB_MAX_CONNECTIONS` on top of the defaults.
    pub fn from_env() -> Self {
        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or_else(default_max_connections);
        Self {
            max_connections,
            ..Self::default()
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn database_url(&self) -> StoreResult<String> {
        std::env::var(&self.env_key).map_err(|_| StoreError::MissingUrl(self.env_key.clone()))
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections
    }
}

/// Open a pool against the configured database.
pub async fn connect(settings: &DatabaseSettings) -> StoreResult<DbPool> {
    let url = settings.database_url()?;
    connect_url(&url, settings.max_connections()).await
}

pub async fn connect_url(url: &str, max_connections: u32) -> StoreResult<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await?;
    tracing::debug!(max_connections, "database pool ready");
    Ok(pool)
}
