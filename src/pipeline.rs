// Per-tick pipeline: fetch, filter, archive

use crate::errors::StorageError;
use crate::filter::filter_by_user;
use crate::models::Post;
use crate::source::PostSource;
use crate::storage::BlobSink;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Blob name for a snapshot taken at `at`, second resolution.
///
/// Two snapshots within the same second share a name and the later upload
/// overwrites the earlier one.
pub fn blob_name(at: DateTime<Utc>) -> String {
    format!("filtered-posts-{}.json", at.format("%Y%m%d%H%M%S"))
}

/// Orchestrates one timer tick: fetch the feed, keep the target author's
/// posts, archive them as a timestamped blob.
pub struct PostProcessor {
    source: Arc<dyn PostSource>,
    sink: Arc<dyn BlobSink>,
    target_user_id: i64,
}

impl PostProcessor {
    pub fn new(source: Arc<dyn PostSource>, sink: Arc<dyn BlobSink>, target_user_id: i64) -> Self {
        Self {
            source,
            sink,
            target_user_id,
        }
    }

    /// Run one tick. Failures at any stage are logged and degraded; this
    /// never returns an error into the timer loop.
    #[instrument(skip(self))]
    pub async fn run_tick(&self, next_fire: Option<DateTime<Utc>>) {
        info!(fired_at = %Utc::now(), "Timer trigger fired");

        let posts = match self.source.fetch_posts().await {
            Ok(posts) => posts,
            Err(e) => {
                error!(error = %e, "Error fetching posts, continuing with empty feed");
                Vec::new()
            }
        };

        let filtered = filter_by_user(posts, self.target_user_id);
        info!(
            count = filtered.len(),
            user_id = self.target_user_id,
            "Filtered posts by author"
        );

        self.save(filtered).await;

        if let Some(next) = next_fire {
            info!(next = %next, "Next timer schedule");
        }
    }

    /// Archive the posts under a blob named with the current time.
    pub async fn save(&self, posts: Vec<Post>) {
        self.save_at(posts, Utc::now()).await;
    }

    /// Archive the posts under a blob named with `at`. Storage failures are
    /// logged and swallowed.
    pub async fn save_at(&self, posts: Vec<Post>, at: DateTime<Utc>) {
        if let Err(e) = self.try_save(&posts, at).await {
            error!(error = %e, "Error saving posts to blob storage");
        }
    }

    async fn try_save(&self, posts: &[Post], at: DateTime<Utc>) -> Result<(), StorageError> {
        self.sink.ensure_container().await?;

        let json = serde_json::to_vec(posts)
            .map_err(|e| StorageError::SerializationFailed(e.to_string()))?;

        let name = blob_name(at);
        self.sink.put_object(&name, &json).await?;

        info!(blob = %name, count = posts.len(), "Filtered posts saved to blob storage");
        Ok(())
    }
}
