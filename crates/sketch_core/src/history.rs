//! Recent diagrams
//!
//! A newest-first list of at most [`MAX_RECENT_DIAGRAMS`] diagrams, without duplicate markup,
//! stored as one JSON array in the [`HISTORY_KEY`] slot. Every write replaces the whole list.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::storage::KeyValueStore;

/// Storage slot holding the JSON list.
pub const HISTORY_KEY: &str = "recent_diagrams";

pub const MAX_RECENT_DIAGRAMS: usize = 10;

pub const UNTITLED_DIAGRAM: &str = "Untitled Diagram";

const DEFAULT_EXPORT_FILE_NAME: &str = "mermaid-diagram.svg";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub name: String,
    pub code: String,
}

/// First line of `code` reduced to ASCII alphanumerics and whitespace.
fn clean_first_line(code: &str) -> String {
    code.split('\n')
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Name shown for a diagram in the recent list.
pub fn display_name(code: &str) -> String {
    let name = clean_first_line(code);
    if name.is_empty() {
        UNTITLED_DIAGRAM.to_string()
    } else {
        name
    }
}

/// File name used when exporting the rendered diagram, e.g. `graph-td.svg`.
pub fn export_file_name(code: &str) -> String {
    let slug = clean_first_line(code)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();

    if slug.is_empty() {
        DEFAULT_EXPORT_FILE_NAME.to_string()
    } else {
        format!("{}.svg", slug)
    }
}

#[derive(Debug, Default)]
struct HistoryState {
    entries: Vec<HistoryEntry>,
    loaded: bool,
    last_id: i64,
}

impl HistoryState {
    /// Epoch milliseconds, bumped past the previous id when the clock has not moved.
    fn next_id(&mut self) -> String {
        let now = chrono::Utc::now().timestamp_millis();
        self.last_id = now.max(self.last_id.saturating_add(1));
        self.last_id.to_string()
    }

    fn replace(&mut self, entries: Vec<HistoryEntry>) {
        // Ids from the future cannot have been issued by this clock
        let now = chrono::Utc::now().timestamp_millis();
        let newest = entries
            .iter()
            .filter_map(|e| e.id.parse::<i64>().ok())
            .filter(|id| *id <= now)
            .max()
            .unwrap_or_default();
        self.last_id = self.last_id.max(newest);
        self.entries = entries;
        self.loaded = true;
    }
}

pub struct HistoryCache {
    storage: Arc<dyn KeyValueStore>,
    state: Mutex<HistoryState>,
}

impl HistoryCache {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            state: Mutex::new(HistoryState::default()),
        }
    }

    /// Read the persisted list. Missing or corrupted data yields an empty list.
    pub async fn load(&self) -> Vec<HistoryEntry> {
        let mut state = self.state.lock().await;
        let entries = self.read_persisted().await;
        state.replace(entries.clone());
        entries
    }

    /// Put `code` at the front of the list and persist it.
    ///
    /// An existing entry with the same markup is dropped first and the list is cut to
    /// [`MAX_RECENT_DIAGRAMS`]. Concurrent calls are applied one after another.
    pub async fn record(&self, code: &str) -> Result<HistoryEntry> {
        let mut state = self.state.lock().await;
        if !state.loaded {
            let persisted = self.read_persisted().await;
            state.replace(persisted);
        }

        let entry = HistoryEntry {
            id: state.next_id(),
            name: display_name(code),
            code: code.to_string(),
        };

        let mut updated = Vec::with_capacity(MAX_RECENT_DIAGRAMS);
        updated.push(entry.clone());
        updated.extend(state.entries.iter().filter(|e| e.code != code).cloned());
        updated.truncate(MAX_RECENT_DIAGRAMS);

        let json = serde_json::to_string(&updated)?;
        self.storage.set(HISTORY_KEY, &json).await?;
        state.entries = updated;

        tracing::debug!("Recorded diagram '{}' ({})", entry.name, entry.id);
        Ok(entry)
    }

    /// Snapshot of the in-memory list, newest first.
    pub async fn entries(&self) -> Vec<HistoryEntry> {
        let mut state = self.state.lock().await;
        if !state.loaded {
            let persisted = self.read_persisted().await;
            state.replace(persisted);
        }
        state.entries.clone()
    }

    pub async fn get(&self, id: &str) -> Option<HistoryEntry> {
        self.entries().await.into_iter().find(|e| e.id == id)
    }

    /// Drop every entry, persisted and in memory.
    pub async fn clear(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        self.storage.remove(HISTORY_KEY).await?;
        state.entries.clear();
        state.loaded = true;
        Ok(())
    }

    async fn read_persisted(&self) -> Vec<HistoryEntry> {
        let raw = match self.storage.get(HISTORY_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read recent diagrams: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Failed to load recent diagrams: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileKeyValueStore, MemoryKeyValueStore};
    use tempfile::tempdir;

    fn memory_cache() -> (HistoryCache, Arc<MemoryKeyValueStore>) {
        let storage = Arc::new(MemoryKeyValueStore::new());
        (HistoryCache::new(storage.clone()), storage)
    }

    async fn persisted(storage: &MemoryKeyValueStore) -> Vec<HistoryEntry> {
        let raw = storage.get(HISTORY_KEY).await.unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn display_name_uses_first_line() {
        assert_eq!(display_name("graph TD\n    A --> B"), "graph TD");
        assert_eq!(display_name("sequenceDiagram\n  A->>B: hi"), "sequenceDiagram");
    }

    #[test]
    fn display_name_strips_punctuation() {
        assert_eq!(display_name("  %% My: Diagram! \nflowchart TD"), "My Diagram");
    }

    #[test]
    fn display_name_drops_underscores() {
        assert_eq!(display_name("my_flow chart\ngraph TD"), "myflow chart");
        assert_eq!(export_file_name("my_flow chart"), "myflow-chart.svg");
    }

    #[test]
    fn display_name_defaults_when_empty() {
        assert_eq!(display_name(""), UNTITLED_DIAGRAM);
        assert_eq!(display_name("---\ntitle: x"), UNTITLED_DIAGRAM);
        assert_eq!(display_name("\ngraph TD"), UNTITLED_DIAGRAM);
    }

    #[test]
    fn export_file_name_slugifies_first_line() {
        assert_eq!(export_file_name("graph TD\n A-->B"), "graph-td.svg");
        assert_eq!(export_file_name("My   Big  Flow!\n"), "my-big-flow.svg");
    }

    #[test]
    fn export_file_name_defaults_when_empty() {
        assert_eq!(export_file_name(""), "mermaid-diagram.svg");
        assert_eq!(export_file_name("%%%"), "mermaid-diagram.svg");
    }

    #[tokio::test]
    async fn record_prepends_entry() {
        let (cache, storage) = memory_cache();

        cache.record("graph TD\n A-->B").await.unwrap();
        let second = cache.record("sequenceDiagram\n A->>B: hi").await.unwrap();

        let entries = persisted(&storage).await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], second);
        assert_eq!(entries[0].name, "sequenceDiagram");
        assert_eq!(entries[1].code, "graph TD\n A-->B");
    }

    #[tokio::test]
    async fn record_keeps_ten_most_recent() {
        let (cache, storage) = memory_cache();

        for i in 0..11 {
            cache.record(&format!("graph TD\n A{i}-->B")).await.unwrap();
        }

        let entries = persisted(&storage).await;
        assert_eq!(entries.len(), MAX_RECENT_DIAGRAMS);
        let expected: Vec<String> = (1..11).rev().map(|i| format!("graph TD\n A{i}-->B")).collect();
        let codes: Vec<String> = entries.iter().map(|e| e.code.clone()).collect();
        assert_eq!(codes, expected);
    }

    #[tokio::test]
    async fn record_duplicate_moves_to_front() {
        let (cache, storage) = memory_cache();

        let first = cache.record("graph TD\n A-->B").await.unwrap();
        cache.record("classDiagram").await.unwrap();
        let again = cache.record("graph TD\n A-->B").await.unwrap();

        let entries = persisted(&storage).await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].code, "graph TD\n A-->B");
        assert_eq!(entries[0].id, again.id);
        assert_ne!(again.id, first.id);
        assert!(again.id.parse::<i64>().unwrap() > first.id.parse::<i64>().unwrap());
    }

    #[tokio::test]
    async fn record_twice_identical_leaves_one_entry() {
        let (cache, storage) = memory_cache();

        cache.record("graph LR\n X-->Y").await.unwrap();
        let latest = cache.record("graph LR\n X-->Y").await.unwrap();

        let entries = persisted(&storage).await;
        assert_eq!(entries, vec![latest]);
    }

    #[tokio::test]
    async fn ids_are_unique_and_increasing() {
        let (cache, _) = memory_cache();

        let mut ids = Vec::new();
        for i in 0..5 {
            ids.push(cache.record(&format!("d{i}")).await.unwrap().id.parse::<i64>().unwrap());
        }

        assert!(ids.windows(2).all(|w| w[1] > w[0]));
    }

    #[tokio::test]
    async fn record_after_max_persisted_id_issues_fresh_ids() {
        let (cache, storage) = memory_cache();
        storage
            .set(
                HISTORY_KEY,
                r#"[{"id":"9223372036854775807","name":"x","code":"x"}]"#,
            )
            .await
            .unwrap();

        let first = cache.record("graph TD").await.unwrap();
        let second = cache.record("graph LR").await.unwrap();

        let first_id = first.id.parse::<i64>().unwrap();
        let second_id = second.id.parse::<i64>().unwrap();
        assert!(first_id < i64::MAX);
        assert!(second_id > first_id);

        let codes: Vec<String> = persisted(&storage).await.into_iter().map(|e| e.code).collect();
        assert_eq!(codes, vec!["graph LR", "graph TD", "x"]);
    }

    #[test]
    fn next_id_saturates_instead_of_overflowing() {
        let mut state = HistoryState {
            last_id: i64::MAX,
            ..HistoryState::default()
        };

        assert_eq!(state.next_id(), i64::MAX.to_string());
    }

    #[tokio::test]
    async fn load_missing_returns_empty() {
        let (cache, _) = memory_cache();

        assert!(cache.load().await.is_empty());
    }

    #[tokio::test]
    async fn load_corrupted_returns_empty() {
        let (cache, storage) = memory_cache();
        storage.set(HISTORY_KEY, "{not valid json").await.unwrap();

        assert!(cache.load().await.is_empty());
    }

    #[tokio::test]
    async fn record_after_corruption_replaces_list() {
        let (cache, storage) = memory_cache();
        storage.set(HISTORY_KEY, "[{\"broken\":").await.unwrap();

        cache.record("graph TD").await.unwrap();

        let entries = persisted(&storage).await;
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn history_persists_across_instances() {
        let dir = tempdir().unwrap();
        let first = HistoryCache::new(Arc::new(FileKeyValueStore::new(dir.path())));
        first.record("graph TD\n A-->B").await.unwrap();
        first.record("classDiagram").await.unwrap();

        let second = HistoryCache::new(Arc::new(FileKeyValueStore::new(dir.path())));
        let loaded = second.load().await;
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].code, "classDiagram");

        second.record("graph TD\n A-->B").await.unwrap();
        let entries = second.entries().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].code, "graph TD\n A-->B");
    }

    #[tokio::test]
    async fn record_without_load_merges_persisted_list() {
        let (first, storage) = memory_cache();
        first.record("one").await.unwrap();

        let second = HistoryCache::new(storage.clone());
        second.record("two").await.unwrap();

        let codes: Vec<String> = persisted(&storage).await.into_iter().map(|e| e.code).collect();
        assert_eq!(codes, vec!["two", "one"]);
    }

    #[tokio::test]
    async fn concurrent_records_are_not_lost() {
        let (cache, storage) = memory_cache();
        let cache = Arc::new(cache);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.record(&format!("diagram {i}")).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(persisted(&storage).await.len(), 8);
    }

    #[tokio::test]
    async fn get_finds_entry_by_id() {
        let (cache, _) = memory_cache();
        let entry = cache.record("graph TD").await.unwrap();

        assert_eq!(cache.get(&entry.id).await, Some(entry));
        assert!(cache.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let (cache, storage) = memory_cache();
        cache.record("graph TD").await.unwrap();

        cache.clear().await.unwrap();

        assert!(cache.entries().await.is_empty());
        assert!(storage.get(HISTORY_KEY).await.unwrap().is_none());
    }
}
