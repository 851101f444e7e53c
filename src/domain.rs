use crate::errors::{CaptionError, HistoryError, RenderError};
use crate::models::HistoryEntry;
use async_trait::async_trait;

/// Produces raw caption text for a topic (one caption per line, unsanitized).
#[async_trait]
pub trait CaptionSource: Send + Sync + 'static { // Send+Sync+'static required for Arc<dyn>
    async fn generate(&self, topic: &str, count: usize) -> Result<String, CaptionError>;
}

/// Renders captions onto a meme template and returns the image as a `data:` URL.
#[async_trait]
pub trait ImageRenderer: Send + Sync + 'static {
    /// Primary render path, retried on failure.
    async fn render(&self, template_id: &str, captions: &[String]) -> Result<String, RenderError>;

    /// Single attempt with a shorter timeout, used by the fallback tier.
    async fn render_once(&self, template_id: &str, captions: &[String]) -> Result<String, RenderError>;
}

/// Blob storage addressed by key; backs the key-value history store.
#[async_trait]
pub trait ObjectStorage: Send + Sync + 'static {
    /// Returns `Ok(None)` when nothing is stored under `key`.
    async fn download(&self, key: &str) -> Result<Option<Vec<u8>>, HistoryError>;

    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), HistoryError>;
}

/// Storage for generation history, newest entry first.
#[async_trait]
pub trait HistoryStore: Send + Sync + 'static {
    /// Inserts at the front, evicting the oldest entries past the store's capacity.
    async fn append(&self, entry: HistoryEntry) -> Result<(), HistoryError>;

    async fn list(&self) -> Result<Vec<HistoryEntry>, HistoryError>;

    async fn get(&self, id: &str) -> Result<Option<HistoryEntry>, HistoryError>;

    /// Removes the entry with exactly this id. Returns `false` if nothing matched.
    async fn delete(&self, id: &str) -> Result<bool, HistoryError>;
}
