use crate::config::StorageBackend;
use crate::store::errors::{Result, StoreError};
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Trait for object storage backends.
///
/// One named object per logical table; overwrite is unconditional - no
/// compare-and-swap exists on this interface.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Check whether an object exists under the key
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Fetch the full object body. Missing key fails with [`StoreError::NotFound`].
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Overwrite the object with the given bytes
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()>;
}

// ============================================================================
// S3-compatible Storage Implementation
// ============================================================================

/// Object store backed by any S3-compatible service.
///
/// Built from explicit endpoint/region/credentials; the client is owned by
/// whoever constructs it and passed down - there is no process-wide instance.
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(
        bucket: String,
        endpoint: &str,
        region: &str,
        access_key_id: &str,
        secret_access_key: &str,
        force_path_style: bool,
    ) -> Self {
        let credentials = Credentials::new(access_key_id, secret_access_key, None, None, "Static");
        let config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .endpoint_url(endpoint)
            .credentials_provider(credentials)
            .force_path_style(force_path_style)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(config),
            bucket,
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        match self.client.head_object().bucket(&self.bucket).key(key).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(StoreError::Other(anyhow::anyhow!("head {key}: {service_err}")))
                }
            }
        }
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let output = match self.client.get_object().bucket(&self.bucket).key(key).send().await {
            Ok(output) => output,
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    return Err(StoreError::NotFound);
                }
                return Err(StoreError::Other(anyhow::anyhow!("get {key}: {service_err}")));
            }
        };

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Other(anyhow::anyhow!("read body of {key}: {e}")))?;

        Ok(body.into_bytes().to_vec())
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("application/octet-stream")
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StoreError::Other(anyhow::anyhow!("put {key}: {}", e.into_service_error())))?;

        Ok(())
    }
}

// ============================================================================
// Local Filesystem Storage Implementation
// ============================================================================

/// Directory-backed object store.
/// Useful for development and testing.
pub struct LocalObjectStore {
    base_path: PathBuf,
}

impl LocalObjectStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.base_path.join(key).exists())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let full_path = self.base_path.join(key);

        if !full_path.exists() {
            return Err(StoreError::NotFound);
        }

        let mut file = fs::File::open(&full_path)
            .await
            .map_err(|e| StoreError::Other(anyhow::anyhow!("open {key}: {e}")))?;
        let mut content = Vec::new();
        file.read_to_end(&mut content)
            .await
            .map_err(|e| StoreError::Other(anyhow::anyhow!("read {key}: {e}")))?;

        Ok(content)
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        let full_path = self.base_path.join(key);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Other(anyhow::anyhow!("create dir for {key}: {e}")))?;
        }

        let mut file = fs::File::create(&full_path)
            .await
            .map_err(|e| StoreError::Other(anyhow::anyhow!("create {key}: {e}")))?;
        file.write_all(&bytes)
            .await
            .map_err(|e| StoreError::Other(anyhow::anyhow!("write {key}: {e}")))?;
        file.sync_all()
            .await
            .map_err(|e| StoreError::Other(anyhow::anyhow!("sync {key}: {e}")))?;

        Ok(())
    }
}

// ============================================================================
// Factory
// ============================================================================

/// Create an object store backend based on configuration
pub async fn create_object_store(bucket: &str, backend: &StorageBackend) -> Result<Arc<dyn ObjectStore>> {
    match backend {
        StorageBackend::S3 {
            endpoint,
            region,
            access_key_id,
            secret_access_key,
            force_path_style,
        } => {
            tracing::info!("Creating S3 object store (endpoint: {endpoint}, bucket: {bucket})");
            Ok(Arc::new(S3ObjectStore::new(
                bucket.to_string(),
                endpoint,
                region,
                access_key_id,
                secret_access_key,
                *force_path_style,
            )))
        }
        StorageBackend::Local { path } => {
            // Objects for the bucket live in a subdirectory named after it
            let base = path.join(bucket);
            tracing::info!("Creating local object store (path: {:?})", base);
            if let Err(e) = fs::create_dir_all(&base).await {
                return Err(StoreError::Other(anyhow::anyhow!(
                    "Failed to create local storage directory {:?}: {}",
                    base,
                    e
                )));
            }
            Ok(Arc::new(LocalObjectStore::new(base)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_store_lifecycle() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(temp_dir.path().to_path_buf());

        let content = b"table bytes".to_vec();

        assert!(!store.exists("users.bin").await.unwrap());

        store.put("users.bin", content.clone()).await.unwrap();
        assert!(store.exists("users.bin").await.unwrap());

        let retrieved = store.get("users.bin").await.unwrap();
        assert_eq!(retrieved, content);
    }

    #[tokio::test]
    async fn test_local_store_get_missing_is_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(temp_dir.path().to_path_buf());

        let result = store.get("missing.bin").await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_local_store_put_overwrites() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(temp_dir.path().to_path_buf());

        store.put("bets.bin", b"first".to_vec()).await.unwrap();
        store.put("bets.bin", b"second".to_vec()).await.unwrap();

        assert_eq!(store.get("bets.bin").await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_factory_creates_local_backend() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = StorageBackend::Local {
            path: temp_dir.path().to_path_buf(),
        };

        let store = create_object_store("pool", &backend).await.unwrap();
        store.put("users.bin", b"x".to_vec()).await.unwrap();
        assert!(temp_dir.path().join("pool/users.bin").exists());
    }
}
