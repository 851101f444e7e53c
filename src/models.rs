use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of memes returned for every generation request.
pub const BATCH_SIZE: usize = 3;

/// A memegen template: the id used in the image URL plus how many caption boxes it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub boxes: usize,
}

/// Which path produced a meme. Serialized with the tags the web UI already understands.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemeKind {
    #[serde(rename = "memegen")]
    Primary,
    #[serde(rename = "fallback")]
    Fallback,
    #[serde(rename = "svg")]
    Placeholder,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemeResult {
    pub success: bool,
    pub caption: String,
    /// `data:` URL holding the rendered image.
    pub image_base64: String,
    pub topic: String,
    pub template: String,
    #[serde(rename = "type")]
    pub kind: MemeKind,
    /// 1-based position within the batch.
    pub index: usize,
}

/// One completed generation batch as kept by the history store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: String,
    pub topic: String,
    pub memes: Vec<MemeResult>,
    pub timestamp: DateTime<Utc>,
    pub count: usize,
}

impl HistoryEntry {
    /// Builds an entry stamped with the current time. The id is the millisecond epoch,
    /// so two requests finishing in the same millisecond share an id.
    pub fn new(topic: impl Into<String>, mut memes: Vec<MemeResult>) -> Self {
        memes.truncate(BATCH_SIZE);
        let timestamp = Utc::now();
        Self {
            id: timestamp.timestamp_millis().to_string(),
            topic: topic.into(),
            memes,
            timestamp,
            count: BATCH_SIZE,
        }
    }
}

// --- Request / response bodies ---

#[derive(Deserialize, Debug)]
pub struct GenerateMemesRequest {
    pub topic: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMemesResponse {
    pub success: bool,
    pub memes: Vec<MemeResult>,
    pub history_id: String,
}

#[derive(Serialize, Debug)]
pub struct HistoryListResponse {
    pub success: bool,
    pub history: Vec<HistoryEntry>,
    pub total: usize,
}

#[derive(Serialize, Debug)]
pub struct HistoryEntryResponse {
    pub success: bool,
    pub entry: HistoryEntry,
}

#[derive(Serialize, Debug)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
    pub history_count: usize,
    pub templates: usize,
    pub groq_configured: bool,
}
