use crate::{
    domain::{HistoryStore, ObjectStorage},
    errors::HistoryError,
    models::HistoryEntry,
};
use async_trait::async_trait;
use std::{collections::VecDeque, sync::Arc};
use tokio::sync::RwLock;
use tracing::{self, info};

/// Most history entries kept by any backend.
pub const HISTORY_CAPACITY: usize = 50;

/// Process-local history. Cleared whenever the server restarts.
#[derive(Debug)]
pub struct InMemoryHistoryStore {
    entries: RwLock<VecDeque<HistoryEntry>>,
    capacity: usize,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        info!(capacity, "Initializing InMemoryHistoryStore");
        Self { entries: RwLock::new(VecDeque::with_capacity(capacity)), capacity }
    }
}

impl Default for InMemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let mut entries = self.entries.write().await;
        entries.push_front(entry);
        entries.truncate(self.capacity);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        Ok(self.entries.read().await.iter().cloned().collect())
    }

    async fn get(&self, id: &str) -> Result<Option<HistoryEntry>, HistoryError> {
        Ok(self.entries.read().await.iter().find(|e| e.id == id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<bool, HistoryError> {
        let mut entries = self.entries.write().await;
        match entries.iter().position(|e| e.id == id) {
            Some(pos) => {
                entries.remove(pos);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// History kept as a single JSON document under one key of an object store.
///
/// Every write reads the whole collection, changes it and writes it back.
/// Concurrent writers race and the last one wins; there is no locking or
/// versioning across requests.
pub struct KvHistoryStore {
    storage: Arc<dyn ObjectStorage>,
    key: String,
    capacity: usize,
}

impl KvHistoryStore {
    pub fn new(storage: Arc<dyn ObjectStorage>, key: impl Into<String>) -> Self {
        let key = key.into();
        info!(%key, "Initializing KvHistoryStore");
        Self { storage, key, capacity: HISTORY_CAPACITY }
    }

    async fn load(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        match self.storage.download(&self.key).await? {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                tracing::error!(key = %self.key, error = %e, "KV: Failed to parse stored history");
                HistoryError::DataCorruption(format!("history under '{}': {}", self.key, e))
            }),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, entries: &[HistoryEntry]) -> Result<(), HistoryError> {
        let body = serde_json::to_vec(entries)
            .map_err(|e| HistoryError::BackendError(anyhow::Error::new(e).context("Failed to serialize history")))?;
        self.storage.upload(&self.key, body, "application/json").await
    }
}

#[async_trait]
impl HistoryStore for KvHistoryStore {
    async fn append(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let mut entries = self.load().await?;
        entries.insert(0, entry);
        entries.truncate(self.capacity);
        self.save(&entries).await?;
        tracing::debug!(key = %self.key, total = entries.len(), "KV: History entry stored");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        self.load().await
    }

    async fn get(&self, id: &str) -> Result<Option<HistoryEntry>, HistoryError> {
        Ok(self.load().await?.into_iter().find(|e| e.id == id))
    }

    async fn delete(&self, id: &str) -> Result<bool, HistoryError> {
        let mut entries = self.load().await?;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            return Ok(false);
        }
        self.save(&entries).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MemeKind, MemeResult};
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn entry(id: usize) -> HistoryEntry {
        HistoryEntry {
            id: id.to_string(),
            topic: format!("topic {id}"),
            memes: vec![MemeResult {
                success: true,
                caption: "a / b".into(),
                image_base64: "data:image/png;base64,AAAA".into(),
                topic: format!("topic {id}"),
                template: "Doge".into(),
                kind: MemeKind::Primary,
                index: 1,
            }],
            timestamp: Utc::now(),
            count: 3,
        }
    }

    fn ids(entries: &[HistoryEntry]) -> Vec<String> {
        entries.iter().map(|e| e.id.clone()).collect()
    }

    #[derive(Default)]
    struct FakeObjectStorage {
        objects: Mutex<HashMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl ObjectStorage for FakeObjectStorage {
        async fn download(&self, key: &str) -> Result<Option<Vec<u8>>, HistoryError> {
            Ok(self.objects.lock().unwrap().get(key).cloned())
        }

        async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), HistoryError> {
            assert_eq!(content_type, "application/json");
            self.objects.lock().unwrap().insert(key.to_string(), data);
            Ok(())
        }
    }

    fn stores() -> Vec<(&'static str, Box<dyn HistoryStore>)> {
        let memory: Box<dyn HistoryStore> = Box::new(InMemoryHistoryStore::new());
        let kv: Box<dyn HistoryStore> =
            Box::new(KvHistoryStore::new(Arc::new(FakeObjectStorage::default()), "history.json"));
        vec![("memory", memory), ("kv", kv)]
    }

    #[tokio::test]
    async fn lists_most_recent_first() {
        for (name, store) in stores() {
            for id in 1..=5 {
                store.append(entry(id)).await.unwrap();
            }
            assert_eq!(ids(&store.list().await.unwrap()), vec!["5", "4", "3", "2", "1"], "{name}");
        }
    }

    #[tokio::test]
    async fn evicts_oldest_past_capacity() {
        for (name, store) in stores() {
            for id in 1..=HISTORY_CAPACITY + 7 {
                store.append(entry(id)).await.unwrap();
            }
            let listed = store.list().await.unwrap();
            assert_eq!(listed.len(), HISTORY_CAPACITY, "{name}");
            assert_eq!(listed.first().unwrap().id, (HISTORY_CAPACITY + 7).to_string(), "{name}");
            assert_eq!(listed.last().unwrap().id, "8", "{name}");
        }
    }

    #[tokio::test]
    async fn deletes_exact_id_only() {
        for (name, store) in stores() {
            for id in [10, 1, 100] {
                store.append(entry(id)).await.unwrap();
            }
            assert!(store.delete("1").await.unwrap(), "{name}");
            assert_eq!(ids(&store.list().await.unwrap()), vec!["100", "10"], "{name}");
        }
    }

    #[tokio::test]
    async fn deleting_unknown_id_changes_nothing() {
        for (name, store) in stores() {
            store.append(entry(1)).await.unwrap();
            store.append(entry(2)).await.unwrap();
            assert!(!store.delete("nope").await.unwrap(), "{name}");
            assert_eq!(ids(&store.list().await.unwrap()), vec!["2", "1"], "{name}");
        }
    }

    #[tokio::test]
    async fn gets_entry_by_id() {
        for (name, store) in stores() {
            store.append(entry(7)).await.unwrap();
            assert_eq!(store.get("7").await.unwrap().map(|e| e.topic), Some("topic 7".into()), "{name}");
            assert!(store.get("8").await.unwrap().is_none(), "{name}");
        }
    }

    #[tokio::test]
    async fn kv_store_starts_empty_and_round_trips_through_storage() {
        let storage = Arc::new(FakeObjectStorage::default());
        let store = KvHistoryStore::new(storage.clone(), "history.json");
        assert!(store.list().await.unwrap().is_empty());

        store.append(entry(1)).await.unwrap();
        let reopened = KvHistoryStore::new(storage, "history.json");
        assert_eq!(reopened.list().await.unwrap(), store.list().await.unwrap());
    }

    #[tokio::test]
    async fn kv_store_reports_corrupt_documents() {
        let storage = Arc::new(FakeObjectStorage::default());
        storage.objects.lock().unwrap().insert("history.json".into(), b"not json".to_vec());
        let store = KvHistoryStore::new(storage, "history.json");
        assert!(matches!(store.list().await, Err(HistoryError::DataCorruption(_))));
    }
}
