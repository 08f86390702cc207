// Error handling framework

use thiserror::Error;

/// Errors raised while fetching the post feed
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Unexpected response status: {0}")]
    UnexpectedStatus(u16),

    #[error("Failed to deserialize response body: {0}")]
    InvalidBody(String),
}

/// Blob storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create storage credentials: {0}")]
    CredentialsFailed(String),

    #[error("Failed to create storage client: {0}")]
    ClientFailed(String),

    #[error("Failed to create container '{container}': {reason}")]
    ContainerCreateFailed { container: String, reason: String },

    #[error("Failed to upload blob '{blob}': {reason}")]
    UploadFailed { blob: String, reason: String },

    #[error("Failed to serialize posts: {0}")]
    SerializationFailed(String),
}

/// Schedule-related errors
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Invalid cron expression '{expression}': {reason}")]
    InvalidCronExpression { expression: String, reason: String },
}
