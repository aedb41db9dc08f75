use crate::model::{StorageError, Vehicle};

/// Read access to the stored listings needed by [`search`](super::search).
#[async_trait::async_trait]
pub trait VehicleCatalog: Send + Sync {
    /// Up to `limit` vehicles whose year, make or model contains `query`
    /// (case-insensitive).
    async fn find_matching(&self, query: &str, limit: usize) -> Result<Vec<Vehicle>, StorageError>;

    /// Every distinct make currently stored.
    async fn find_distinct_makes(&self) -> Result<Vec<String>, StorageError>;
}
