use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared_types::{Environment, Metadata};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::config::StorageConfig;
use super::error::StorageError;
use super::index::VersionIndex;
use super::traits::EnvironmentStore;

const ENVIRONMENTS_PREFIX: &str = "environments";
const INDEX_FILE: &str = "index.json";
const VERSIONS_DIR: &str = "versions";

/// Versioned environment store on top of any `object_store` backend.
///
/// Layout:
///   environments/<name>/index.json
///   environments/<name>/versions/<uid>.json
///
/// Writers hold `lock` exclusively, so uid assignment and delete-all are atomic
/// with respect to readers in this process.
pub struct ObjectStoreBackend {
    store: Arc<dyn ObjectStore>,
    lock: RwLock<()>,
}

impl ObjectStoreBackend {
    pub fn from_config(config: StorageConfig) -> Result<Self> {
        let store: Arc<dyn ObjectStore> = match config {
            StorageConfig::Local { path } => {
                std::fs::create_dir_all(&path)
                    .with_context(|| format!("Failed to create storage dir {}", path.display()))?;
                Arc::new(LocalFileSystem::new_with_prefix(path)?)
            }
            StorageConfig::Memory => Arc::new(InMemory::new()),
            StorageConfig::S3 {
                bucket,
                region,
                endpoint,
                access_key_id,
                secret_access_key,
                allow_http,
            } => {
                let mut builder = AmazonS3Builder::new()
                    .with_bucket_name(bucket)
                    .with_allow_http(allow_http);
                if let Some(region) = region {
                    builder = builder.with_region(region);
                }
                if let Some(endpoint) = endpoint {
                    builder = builder.with_endpoint(endpoint);
                }
                if let Some(key) = access_key_id {
                    builder = builder.with_access_key_id(key);
                }
                if let Some(secret) = secret_access_key {
                    builder = builder.with_secret_access_key(secret);
                }
                Arc::new(builder.build()?)
            }
        };
        Ok(Self::new(store))
    }

    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            lock: RwLock::new(()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemory::new()))
    }

    fn environment_prefix(name: &str) -> Path {
        Path::from(ENVIRONMENTS_PREFIX).child(name)
    }

    fn index_path(name: &str) -> Path {
        Self::environment_prefix(name).child(INDEX_FILE)
    }

    fn version_path(name: &str, uid: &str) -> Path {
        Self::environment_prefix(name)
            .child(VERSIONS_DIR)
            .child(format!("{uid}.json"))
    }

    fn validate_name(name: &str) -> Result<()> {
        if name.is_empty() || name.contains('/') {
            return Err(StorageError::InvalidName(name.to_string()).into());
        }
        Ok(())
    }

    async fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        match self.store.get(path).await {
            Ok(result) => {
                let bytes = result.bytes().await?;
                let value = serde_json::from_slice(&bytes)
                    .with_context(|| format!("Corrupt document at {path}"))?;
                Ok(Some(value))
            }
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_vec_pretty(value)?;
        self.store.put(path, PutPayload::from(json)).await?;
        Ok(())
    }

    async fn read_index(&self, name: &str) -> Result<Option<VersionIndex>> {
        self.read_json(&Self::index_path(name)).await
    }

    async fn require_index(&self, name: &str) -> Result<VersionIndex> {
        self.read_index(name)
            .await?
            .ok_or_else(|| StorageError::NotFound(name.to_string()).into())
    }

    async fn read_version(&self, name: &str, uid: &str) -> Result<Environment> {
        self.read_json(&Self::version_path(name, uid))
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("{name}@{uid}")).into())
    }

    /// Persist `env` as version `uid`, stamping the uid into its metadata.
    async fn write_version(&self, env: &Environment, uid: &str) -> Result<()> {
        let mut stored = env.clone();
        stored.metadata.uid = uid.to_string();
        self.write_json(&Self::version_path(env.name(), uid), &stored)
            .await
    }

    async fn delete_all_versions(&self, name: &str) -> Result<()> {
        // Index goes first so the name disappears before its versions do.
        self.store.delete(&Self::index_path(name)).await?;

        let prefix = Self::environment_prefix(name);
        let objects: Vec<_> = self.store.list(Some(&prefix)).try_collect().await?;
        for object in objects {
            match self.store.delete(&object.location).await {
                Ok(()) | Err(object_store::Error::NotFound { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EnvironmentStore for ObjectStoreBackend {
    async fn list(&self) -> Result<Vec<Environment>> {
        let _guard = self.lock.read().await;

        let prefix = Path::from(ENVIRONMENTS_PREFIX);
        let listing = self.store.list_with_delimiter(Some(&prefix)).await?;

        let mut environments = Vec::with_capacity(listing.common_prefixes.len());
        for dir in listing.common_prefixes {
            let Some(index) = self
                .read_json::<VersionIndex>(&dir.child(INDEX_FILE))
                .await?
            else {
                continue;
            };
            if index.current.is_empty() {
                continue;
            }

            let path = dir
                .child(VERSIONS_DIR)
                .child(format!("{}.json", index.current));
            if let Some(env) = self.read_json::<Environment>(&path).await? {
                environments.push(env);
            }
        }

        Ok(environments)
    }

    async fn create(&self, env: &Environment) -> Result<String> {
        let name = env.name();
        Self::validate_name(name)?;

        let _guard = self.lock.write().await;

        if self.read_index(name).await?.is_some() {
            return Err(StorageError::AlreadyExists(name.to_string()).into());
        }

        let mut index = VersionIndex::new();
        let uid = index.push_next();
        self.write_version(env, &uid).await?;
        self.write_json(&Self::index_path(name), &index).await?;

        debug!("Created environment {}@{}", name, uid);
        Ok(uid)
    }

    async fn get(&self, meta: &Metadata) -> Result<Environment> {
        Self::validate_name(&meta.name)?;

        let _guard = self.lock.read().await;

        let index = self.require_index(&meta.name).await?;
        let uid = if meta.has_uid() {
            if !index.contains(&meta.uid) {
                return Err(StorageError::NotFound(meta.to_string()).into());
            }
            meta.uid.as_str()
        } else {
            index.current.as_str()
        };

        if uid.is_empty() {
            return Err(StorageError::NotFound(meta.name.clone()).into());
        }

        self.read_version(&meta.name, uid).await
    }

    async fn update(&self, env: &Environment) -> Result<String> {
        let name = env.name();
        Self::validate_name(name)?;

        let _guard = self.lock.write().await;

        let mut index = self.require_index(name).await?;
        let uid = index.push_next();
        self.write_version(env, &uid).await?;
        self.write_json(&Self::index_path(name), &index).await?;

        debug!("Updated environment {}@{}", name, uid);
        Ok(uid)
    }

    async fn delete(&self, meta: &Metadata) -> Result<()> {
        Self::validate_name(&meta.name)?;

        let _guard = self.lock.write().await;

        let mut index = self.require_index(&meta.name).await?;

        if !meta.has_uid() {
            self.delete_all_versions(&meta.name).await?;
            debug!(
                "Deleted environment {} ({} versions)",
                meta.name,
                index.versions.len()
            );
            return Ok(());
        }

        if !index.remove(&meta.uid) {
            return Err(StorageError::NotFound(meta.to_string()).into());
        }

        if index.is_empty() {
            self.delete_all_versions(&meta.name).await?;
        } else {
            self.store
                .delete(&Self::version_path(&meta.name, &meta.uid))
                .await?;
            self.write_json(&Self::index_path(&meta.name), &index)
                .await?;
        }

        debug!("Deleted environment version {}", meta);
        Ok(())
    }
}
