//! Chapter completion, persisted under a single key of a string key-value
//! store (`localStorage` in the browser, a map in tests).
//!
//! Every failure at the storage boundary is logged and swallowed: a broken
//! store means "nothing completed yet", never a stuck page.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::content::chapters::{Chapter, ChapterId, CHAPTERS};
use crate::core::clock::{iso_timestamp, Clock};

/// Storage key holding the whole progress map as JSON.
pub const PROGRESS_KEY: &str = "odelia-chapter-progress";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("write rejected: {0}")]
    Write(String),
}

/// Durable string storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store for tests and hosts without durable storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.entries.insert(key.to_string(), value.to_string());
        store
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterRecord {
    #[serde(default)]
    pub completed: bool,
    /// ISO-8601 UTC, millisecond precision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_option: Option<String>,
}

/// One record per known chapter. Unknown keys in stored JSON are dropped and
/// missing ones default to incomplete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterProgress {
    #[serde(default)]
    pub valentine: ChapterRecord,
    #[serde(default)]
    pub date_plan: ChapterRecord,
}

impl ChapterProgress {
    pub fn record(&self, id: ChapterId) -> &ChapterRecord {
        match id {
            ChapterId::Valentine => &self.valentine,
            ChapterId::DatePlan => &self.date_plan,
        }
    }

    pub fn record_mut(&mut self, id: ChapterId) -> &mut ChapterRecord {
        match id {
            ChapterId::Valentine => &mut self.valentine,
            ChapterId::DatePlan => &mut self.date_plan,
        }
    }

    pub fn is_completed(&self, id: ChapterId) -> bool {
        self.record(id).completed
    }
}

/// Extra data stored with a completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionMetadata {
    pub selected_option: Option<String>,
}

impl CompletionMetadata {
    pub fn selected(option: impl Into<String>) -> Self {
        Self {
            selected_option: Some(option.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChapterStatus {
    Locked,
    Available,
    Completed,
}

impl ChapterStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ChapterStatus::Locked => "locked",
            ChapterStatus::Available => "available",
            ChapterStatus::Completed => "completed",
        }
    }
}

/// Status of `chapter` given `progress`. Pure: no storage access.
pub fn chapter_status(chapter: &Chapter, progress: &ChapterProgress) -> ChapterStatus {
    if progress.is_completed(chapter.id) {
        return ChapterStatus::Completed;
    }
    match chapter.prerequisite {
        Some(required) if !progress.is_completed(required) => ChapterStatus::Locked,
        _ => ChapterStatus::Available,
    }
}

/// Every chapter in timeline order with its status.
pub fn timeline(progress: &ChapterProgress) -> Vec<(&'static Chapter, ChapterStatus)> {
    CHAPTERS
        .iter()
        .map(|chapter| (chapter, chapter_status(chapter, progress)))
        .collect()
}

/// Reads and writes chapter progress through an injected store.
pub struct ProgressStore<S> {
    storage: S,
    clock: Arc<dyn Clock>,
}

impl<S: KeyValueStore> ProgressStore<S> {
    pub fn new(storage: S, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Current progress; defaults when absent, unreadable or malformed.
    pub fn get_progress(&self) -> ChapterProgress {
        let raw = match self.storage.get(PROGRESS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return ChapterProgress::default(),
            Err(e) => {
                log::error!("failed to load chapter progress: {e}");
                return ChapterProgress::default();
            }
        };
        let stored: serde_json::Map<String, serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(e) => {
                log::error!("failed to parse chapter progress, using defaults: {e}");
                return ChapterProgress::default();
            }
        };

        // A malformed record resets only itself.
        let mut progress = ChapterProgress::default();
        for chapter in CHAPTERS {
            let Some(value) = stored.get(chapter.id.as_str()) else {
                continue;
            };
            match ChapterRecord::deserialize(value) {
                Ok(record) => *progress.record_mut(chapter.id) = record,
                Err(e) => log::warn!(
                    "malformed progress for chapter {}, using defaults: {e}",
                    chapter.id.as_str()
                ),
            }
        }
        progress
    }

    /// Persist `progress`. Failures are logged, not returned.
    pub fn save_progress(&mut self, progress: &ChapterProgress) {
        let json = match serde_json::to_string(progress) {
            Ok(json) => json,
            Err(e) => {
                log::error!("failed to serialize chapter progress: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.set(PROGRESS_KEY, &json) {
            log::error!("failed to save chapter progress: {e}");
        }
    }

    /// Mark `id` completed now. A provided `selected_option` replaces the
    /// stored one; an absent one keeps it. Calling again refreshes the stamp.
    pub fn mark_chapter_complete(
        &mut self,
        id: ChapterId,
        metadata: Option<CompletionMetadata>,
    ) -> ChapterProgress {
        let mut progress = self.get_progress();
        let record = progress.record_mut(id);
        record.completed = true;
        record.completed_at = Some(iso_timestamp(self.clock.now()));
        if let Some(option) = metadata.and_then(|m| m.selected_option) {
            record.selected_option = Some(option);
        }
        self.save_progress(&progress);
        log::info!("chapter {} completed", id.as_str());
        progress
    }

    pub fn is_chapter_completed(&self, id: ChapterId) -> bool {
        self.get_progress().is_completed(id)
    }

    pub fn chapter_status(&self, id: ChapterId) -> ChapterStatus {
        chapter_status(id.chapter(), &self.get_progress())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
