use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::StoreError;
use crate::model::Document;
use crate::repository::DocumentStore;

/// In-process store keyed by document id. Counts lookups so callers can check
/// how often the store was hit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: BTreeMap<String, Document>,
    lookups: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the document stored under its id.
    pub fn insert(&mut self, document: Document) {
        self.documents.insert(document.id.clone(), document);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

impl FromIterator<Document> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self {
        let mut store = Self::new();
        for document in iter {
            store.insert(document);
        }
        store
    }
}

impl DocumentStore for MemoryStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Document>, StoreError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        Ok(self.documents.get(id).cloned())
    }

    async fn find_by_path(
        &self,
        local_path: &str,
        file_name: &str,
    ) -> Result<Option<Document>, StoreError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .documents
            .values()
            .find(|d| d.local_path == local_path && d.file_name == file_name)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookups_are_counted_and_misses_are_none() {
        let store: MemoryStore = [Document::new("A/B/0/0/0", "A/B/0/0", "0", b"tile".to_vec())]
            .into_iter()
            .collect();

        let found = store.find_by_id("A/B/0/0/0").await.unwrap();
        assert_eq!(found.map(|d| d.content), Some(b"tile".to_vec()));
        assert!(store.find_by_id("A/B/0/0/1").await.unwrap().is_none());
        assert_eq!(store.lookups(), 2);
    }

    #[tokio::test]
    async fn finds_by_local_path_and_file_name() {
        let mut store = MemoryStore::new();
        store.insert(Document::new("a", "Planetoid_2/Satelite/12/20", "20.png", vec![1u8]));
        store.insert(Document::new("b", "Planetoid_2/Satelite/12/20", "21.png", vec![2u8]));

        let found = store
            .find_by_path("Planetoid_2/Satelite/12/20", "21.png")
            .await
            .unwrap();
        assert_eq!(found.map(|d| d.id), Some("b".to_string()));
        assert!(
            store
                .find_by_path("Planetoid_2/Satelite/12", "21.png")
                .await
                .unwrap()
                .is_none()
        );
    }
}
