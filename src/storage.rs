// Blob storage client for archived post snapshots

use crate::config::StorageConfig;
use crate::errors::StorageError;
use async_trait::async_trait;
use s3::bucket::Bucket;
use s3::bucket_ops::BucketConfiguration;
use s3::creds::Credentials;
use s3::region::Region;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Capability to persist named blobs into a container.
#[async_trait]
pub trait BlobSink: Send + Sync {
    /// Create the target container if it does not already exist.
    async fn ensure_container(&self) -> Result<(), StorageError>;

    /// Upload a blob under `name`, overwriting any existing object with that name.
    async fn put_object(&self, name: &str, data: &[u8]) -> Result<(), StorageError>;
}

/// BlobSink backed by an S3-compatible object store
#[derive(Clone, Debug)]
pub struct S3BlobSink {
    bucket: Arc<Bucket>,
    container: String,
    region: Region,
    credentials: Credentials,
}

impl S3BlobSink {
    /// Create a new blob sink from configuration
    #[instrument(skip(config), fields(endpoint = %config.endpoint, container = %config.container))]
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        info!("Initializing blob storage client");

        // Strip scheme - rust-s3 Region::Custom doesn't expect it
        let endpoint = config
            .endpoint
            .trim_start_matches("http://")
            .trim_start_matches("https://")
            .to_string();

        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| {
            error!(error = %e, "Failed to create storage credentials");
            StorageError::CredentialsFailed(e.to_string())
        })?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint,
        };

        let bucket = Bucket::new(&config.container, region.clone(), credentials.clone())
            .map_err(|e| {
                error!(error = %e, "Failed to create storage client");
                StorageError::ClientFailed(e.to_string())
            })?
            .with_path_style();

        info!(container = %config.container, "Blob storage client initialized");

        Ok(Self {
            bucket: Arc::new(bucket),
            container: config.container.clone(),
            region,
            credentials,
        })
    }
}

/// Responses the store sends when the container already exists
fn container_already_exists(response_text: &str) -> bool {
    response_text.contains("BucketAlreadyOwnedByYou")
        || response_text.contains("BucketAlreadyExists")
}

#[async_trait]
impl BlobSink for S3BlobSink {
    #[instrument(skip(self), fields(container = %self.container))]
    async fn ensure_container(&self) -> Result<(), StorageError> {
        debug!("Ensuring container exists");

        let response = Bucket::create_with_path_style(
            &self.container,
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await
        .map_err(|e| {
            error!(error = %e, container = %self.container, "Container create request failed");
            StorageError::ContainerCreateFailed {
                container: self.container.clone(),
                reason: e.to_string(),
            }
        })?;

        if response.success() || container_already_exists(&response.response_text) {
            debug!("Container ready");
            Ok(())
        } else {
            error!(
                container = %self.container,
                code = response.response_code,
                "Container creation rejected by storage service"
            );
            Err(StorageError::ContainerCreateFailed {
                container: self.container.clone(),
                reason: format!(
                    "status {}: {}",
                    response.response_code, response.response_text
                ),
            })
        }
    }

    #[instrument(skip(self, data), fields(blob = %name, size = data.len()))]
    async fn put_object(&self, name: &str, data: &[u8]) -> Result<(), StorageError> {
        debug!("Uploading blob");

        self.bucket.put_object(name, data).await.map_err(|e| {
            error!(error = %e, blob = %name, "Failed to upload blob");
            StorageError::UploadFailed {
                blob: name.to_string(),
                reason: e.to_string(),
            }
        })?;

        debug!("Blob uploaded");
        Ok(())
    }
}
