//! Passage catalog collaborator.
//!
//! Passages are looked up by id before a session starts, never during one.

use std::collections::HashMap;
use std::future::Future;

use dicta_core::error::Result;
use dicta_core::types::Passage;

/// Lookup service for the passage library.
pub trait PassageCatalog: Send + Sync {
    /// Find a passage by id, `None` if the catalog has no such entry.
    fn find_by_id(&self, id: i64) -> impl Future<Output = Result<Option<Passage>>> + Send;

    /// List all passages, ordered by id.
    fn list(&self) -> impl Future<Output = Result<Vec<Passage>>> + Send;
}

/// In-process catalog seeded from a fixed set of passages.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    passages: HashMap<i64, Passage>,
}

impl InMemoryCatalog {
    pub fn new(passages: Vec<Passage>) -> Self {
        Self {
            passages: passages.into_iter().map(|p| (p.id, p)).collect(),
        }
    }
}

impl PassageCatalog for InMemoryCatalog {
    async fn find_by_id(&self, id: i64) -> Result<Option<Passage>> {
        Ok(self.passages.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Passage>> {
        let mut all: Vec<Passage> = self.passages.values().cloned().collect();
        all.sort_by_key(|p| p.id);
        Ok(all)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> InMemoryCatalog {
        InMemoryCatalog::new(vec![
            Passage::new(2, "second passage", "en-US"),
            Passage::new(1, "first passage", "en-US"),
        ])
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let catalog = sample_catalog();
        let passage = catalog.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(passage.content, "first passage");
    }

    #[tokio::test]
    async fn test_find_unknown_id_is_none() {
        let catalog = sample_catalog();
        assert!(catalog.find_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_ordered_by_id() {
        let catalog = sample_catalog();
        let all = catalog.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, 1);
        assert_eq!(all[1].id, 2);
    }
}
