//! Record storage behind a narrow trait so handlers never touch the backing store.
//!
//! The only backend is `InMemoryRepository`, seeded with demo data at startup.
//! Nothing is durable; a restart resets every collection.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

pub mod seed;

#[derive(Debug, Error, PartialEq)]
pub enum RepoError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} {id} already exists")]
    Duplicate { kind: &'static str, id: String },
}

/// A storable domain record.
pub trait Record: Clone + Send + Sync + 'static {
    /// Partial update accepted by `Repository::update`.
    type Patch: Send + 'static;
    /// Human-readable collection name, used in errors and logs.
    const KIND: &'static str;

    fn id(&self) -> &str;
    fn apply(&mut self, patch: Self::Patch);
}

/// Carried in `AppState` as `Arc<dyn Repository<T>>`.
#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    async fn list(&self) -> Vec<T>;
    async fn get(&self, id: &str) -> Result<T, RepoError>;
    /// Inserts at the front of the collection (newest first).
    async fn insert(&self, record: T) -> Result<T, RepoError>;
    async fn update(&self, id: &str, patch: T::Patch) -> Result<T, RepoError>;
}

/// Artificial latency applied to every call, mimicking a remote store.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedLatency {
    pub read: Duration,
    pub write: Duration,
}

pub struct InMemoryRepository<T> {
    records: RwLock<Vec<T>>,
    latency: SimulatedLatency,
}

impl<T: Record> InMemoryRepository<T> {
    pub fn new(records: Vec<T>, latency: SimulatedLatency) -> Self {
        Self {
            records: RwLock::new(records),
            latency,
        }
    }

    async fn pause(delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl<T: Record> Repository<T> for InMemoryRepository<T> {
    async fn list(&self) -> Vec<T> {
        Self::pause(self.latency.read).await;
        self.records.read().await.clone()
    }

    async fn get(&self, id: &str) -> Result<T, RepoError> {
        Self::pause(self.latency.read).await;
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or_else(|| RepoError::NotFound {
                kind: T::KIND,
                id: id.to_string(),
            })
    }

    async fn insert(&self, record: T) -> Result<T, RepoError> {
        Self::pause(self.latency.write).await;
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.id() == record.id()) {
            return Err(RepoError::Duplicate {
                kind: T::KIND,
                id: record.id().to_string(),
            });
        }
        records.insert(0, record.clone());
        debug!("Inserted {} {} ({} total)", T::KIND, record.id(), records.len());
        Ok(record)
    }

    async fn update(&self, id: &str, patch: T::Patch) -> Result<T, RepoError> {
        Self::pause(self.latency.write).await;
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| RepoError::NotFound {
                kind: T::KIND,
                id: id.to_string(),
            })?;
        record.apply(patch);
        debug!("Updated {} {}", T::KIND, id);
        Ok(record.clone())
    }
}
