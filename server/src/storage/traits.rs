use anyhow::Result;
use async_trait::async_trait;
use shared_types::{Environment, Metadata};

/// Versioned storage for environments.
///
/// Every successful `create` or `update` records a new version and returns
/// its uid. Failures that callers may want to tell apart are reported as a
/// [`StorageError`](super::StorageError) inside the `anyhow::Error`.
#[async_trait]
pub trait EnvironmentStore: Send + Sync {
    /// Latest version of every stored environment, in no particular order.
    async fn list(&self) -> Result<Vec<Environment>>;

    /// Store the first version of a new environment and return its uid.
    async fn create(&self, env: &Environment) -> Result<String>;

    /// Fetch the version named by `meta.uid`, or the latest when it is empty.
    async fn get(&self, meta: &Metadata) -> Result<Environment>;

    /// Record a new version of an existing environment and return its uid.
    async fn update(&self, env: &Environment) -> Result<String>;

    /// Remove the version named by `meta.uid`, or every version when it is empty.
    async fn delete(&self, meta: &Metadata) -> Result<()>;
}
