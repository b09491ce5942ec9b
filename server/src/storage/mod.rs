mod backend;
mod config;
mod error;
mod index;
mod traits;


pub use backend::ObjectStoreBackend;
pub use config::StorageConfig;
pub use error::StorageError;
pub use index::{VersionEntry, VersionIndex};
pub use traits::EnvironmentStore;
