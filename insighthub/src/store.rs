//! Document collection with selection state, persisted whole to a durable
//! key-value store under one fixed key.

use crate::models::ResearchDocument;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

pub const STORAGE_KEY: &str = "research_docs";
pub const STORAGE_VERSION: u32 = 1;

/// Durable key-value collaborator: one string value per key.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> io::Result<()>;
}

/// One JSON file per key inside a directory. Writes go to a `.tmp` sibling
/// and are renamed into place so a crash never leaves a half-written file.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct PersistedCollection {
    version: u32,
    documents: Vec<ResearchDocument>,
}

pub struct DocumentStore {
    documents: Vec<ResearchDocument>,
    selected_id: Option<String>,
    backend: Box<dyn KeyValueStore>,
}

impl DocumentStore {
    /// Opens the store and loads whatever the backend holds. A corrupt or
    /// version-mismatched collection degrades to an empty list with a logged
    /// diagnostic; it is never an error to the caller.
    pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
        let mut store = Self {
            documents: Vec::new(),
            selected_id: None,
            backend,
        };
        store.load();
        store
    }

    pub fn documents(&self) -> &[ResearchDocument] {
        &self.documents
    }

    pub fn documents_mut(&mut self) -> &mut [ResearchDocument] {
        &mut self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ResearchDocument> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// Appends the document and makes it the active selection.
    pub fn add(&mut self, doc: ResearchDocument) {
        self.selected_id = Some(doc.id.clone());
        self.documents.push(doc);
        self.persist();
    }

    /// Removes the document; clears the selection if it pointed at it.
    pub fn remove(&mut self, id: &str) {
        self.documents.retain(|d| d.id != id);
        if self.selected_id.as_deref() == Some(id) {
            self.selected_id = None;
        }
        self.persist();
    }

    /// Full-record replacement by id. No-op when the id is not present.
    pub fn update(&mut self, doc: ResearchDocument) {
        if let Some(slot) = self.documents.iter_mut().find(|d| d.id == doc.id) {
            *slot = doc;
            self.persist();
        }
    }

    /// Selects the document if it exists; returns whether it did.
    pub fn select(&mut self, id: &str) -> bool {
        if self.documents.iter().any(|d| d.id == id) {
            self.selected_id = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected_id = None;
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn selected(&self) -> Option<&ResearchDocument> {
        self.selected_id
            .as_deref()
            .and_then(|id| self.documents.iter().find(|d| d.id == id))
    }

    fn load(&mut self) {
        let Some(raw) = self.backend.get(STORAGE_KEY) else {
            return;
        };
        match serde_json::from_str::<PersistedCollection>(&raw) {
            Ok(collection) if collection.version == STORAGE_VERSION => {
                self.documents = collection.documents;
            }
            Ok(collection) => {
                log::warn!(
                    "persisted documents have version {} (expected {}), starting empty",
                    collection.version,
                    STORAGE_VERSION
                );
            }
            Err(e) => {
                log::error!("failed to parse persisted documents, starting empty: {e}");
            }
        }
    }

    /// Serializes the whole collection. Failures (e.g. storage quota) are
    /// logged and swallowed so a mutation never crashes the caller.
    pub fn persist(&mut self) {
        let collection = PersistedCollection {
            version: STORAGE_VERSION,
            documents: self.documents.clone(),
        };
        match serde_json::to_string(&collection) {
            Ok(raw) => {
                if let Err(e) = self.backend.set(STORAGE_KEY, &raw) {
                    log::warn!("failed to persist documents: {e}");
                }
            }
            Err(e) => log::warn!("failed to serialize documents: {e}"),
        }
    }
}
