// Pipeline tests with in-memory source and sink fakes

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use post_archiver::errors::{FetchError, StorageError};
use post_archiver::models::Post;
use post_archiver::pipeline::PostProcessor;
use post_archiver::source::PostSource;
use post_archiver::storage::BlobSink;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn post(id: i64, user_id: i64) -> Post {
    Post {
        id,
        user_id,
        title: format!("title-{}", id),
        body: format!("body-{}", id),
    }
}

// ============================================================================
// Fakes
// ============================================================================

struct StaticSource {
    posts: Vec<Post>,
}

#[async_trait]
impl PostSource for StaticSource {
    async fn fetch_posts(&self) -> Result<Vec<Post>, FetchError> {
        Ok(self.posts.clone())
    }
}

struct FailingSource;

#[async_trait]
impl PostSource for FailingSource {
    async fn fetch_posts(&self) -> Result<Vec<Post>, FetchError> {
        Err(FetchError::RequestFailed("connection refused".to_string()))
    }
}

#[derive(Default)]
struct MemorySink {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    ensure_calls: AtomicUsize,
}

#[async_trait]
impl BlobSink for MemorySink {
    async fn ensure_container(&self) -> Result<(), StorageError> {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn put_object(&self, name: &str, data: &[u8]) -> Result<(), StorageError> {
        self.objects
            .lock()
            .unwrap()
            .insert(name.to_string(), data.to_vec());
        Ok(())
    }
}

enum SinkFailure {
    OnEnsure,
    OnUpload,
}

struct FailingSink {
    failure: SinkFailure,
    uploads_attempted: AtomicUsize,
}

impl FailingSink {
    fn new(failure: SinkFailure) -> Self {
        Self {
            failure,
            uploads_attempted: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl BlobSink for FailingSink {
    async fn ensure_container(&self) -> Result<(), StorageError> {
        match self.failure {
            SinkFailure::OnEnsure => Err(StorageError::ContainerCreateFailed {
                container: "filtered-posts".to_string(),
                reason: "service unavailable".to_string(),
            }),
            SinkFailure::OnUpload => Ok(()),
        }
    }

    async fn put_object(&self, name: &str, _data: &[u8]) -> Result<(), StorageError> {
        self.uploads_attempted.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::UploadFailed {
            blob: name.to_string(),
            reason: "service unavailable".to_string(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn tick_archives_filtered_posts_as_json() {
    let sink = Arc::new(MemorySink::default());
    let source = Arc::new(StaticSource {
        posts: vec![post(1, 1), post(2, 2), post(3, 1)],
    });
    let processor = PostProcessor::new(source, sink.clone(), 1);

    processor.run_tick(None).await;

    let objects = sink.objects.lock().unwrap();
    assert_eq!(objects.len(), 1);

    let (name, data) = objects.iter().next().unwrap();
    assert!(name.starts_with("filtered-posts-"));
    assert!(name.ends_with(".json"));

    let stored: Vec<Post> = serde_json::from_slice(data).unwrap();
    let ids: Vec<i64> = stored.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert!(stored.iter().all(|p| p.user_id == 1));
}

#[tokio::test]
async fn saving_no_posts_uploads_literal_empty_array() {
    let sink = Arc::new(MemorySink::default());
    let source = Arc::new(StaticSource { posts: Vec::new() });
    let processor = PostProcessor::new(source, sink.clone(), 1);

    processor.save(Vec::new()).await;

    assert_eq!(sink.ensure_calls.load(Ordering::SeqCst), 1);
    let objects = sink.objects.lock().unwrap();
    assert_eq!(objects.len(), 1);
    let (_, data) = objects.iter().next().unwrap();
    assert_eq!(data.as_slice(), b"[]");
}

#[tokio::test]
async fn fetch_failure_degrades_to_empty_snapshot() {
    let sink = Arc::new(MemorySink::default());
    let processor = PostProcessor::new(Arc::new(FailingSource), sink.clone(), 1);

    processor.run_tick(None).await;

    let objects = sink.objects.lock().unwrap();
    assert_eq!(objects.len(), 1);
    let (_, data) = objects.iter().next().unwrap();
    assert_eq!(data.as_slice(), b"[]");
}

#[tokio::test]
async fn same_second_saves_overwrite_one_object() {
    let sink = Arc::new(MemorySink::default());
    let source = Arc::new(StaticSource { posts: Vec::new() });
    let processor = PostProcessor::new(source, sink.clone(), 1);

    let at = Utc.with_ymd_and_hms(2026, 8, 30, 14, 5, 9).unwrap();
    processor.save_at(vec![post(1, 1)], at).await;
    processor.save_at(vec![post(1, 1), post(4, 1)], at).await;

    let objects = sink.objects.lock().unwrap();
    assert_eq!(objects.len(), 1, "same-second saves must share one blob name");

    // The later write wins
    let (_, data) = objects.iter().next().unwrap();
    let stored: Vec<Post> = serde_json::from_slice(data).unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn upload_failure_is_swallowed() {
    let sink = Arc::new(FailingSink::new(SinkFailure::OnUpload));
    let source = Arc::new(StaticSource {
        posts: vec![post(1, 1)],
    });
    let processor = PostProcessor::new(source, sink.clone(), 1);

    // Must complete without panicking or propagating
    processor.run_tick(None).await;
    assert_eq!(sink.uploads_attempted.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn container_create_failure_is_swallowed_and_skips_upload() {
    let sink = Arc::new(FailingSink::new(SinkFailure::OnEnsure));
    let source = Arc::new(StaticSource {
        posts: vec![post(1, 1)],
    });
    let processor = PostProcessor::new(source, sink.clone(), 1);

    processor.run_tick(None).await;
    assert_eq!(sink.uploads_attempted.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn tick_with_next_fire_metadata_completes() {
    let sink = Arc::new(MemorySink::default());
    let source = Arc::new(StaticSource {
        posts: vec![post(1, 1)],
    });
    let processor = PostProcessor::new(source, sink.clone(), 1);

    let next = Utc.with_ymd_and_hms(2026, 8, 30, 14, 5, 30).unwrap();
    processor.run_tick(Some(next)).await;

    assert_eq!(sink.objects.lock().unwrap().len(), 1);
}
