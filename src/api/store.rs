use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::models::{Item, ItemId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Duplicate item id: {0}")]
pub struct DuplicateId(pub ItemId);

/// Shared in-memory item collection, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ItemStore {
    items: Arc<RwLock<Vec<Item>>>,
}

impl ItemStore {
    /// Create a store holding `items`. Fails if two items share an id.
    pub fn new(items: Vec<Item>) -> Result<Self, DuplicateId> {
        let store = Self::default();
        store.replace(items)?;
        Ok(store)
    }

    /// Seed a store from a JSON array of items.
    pub fn from_seed_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file {}", path.display()))?;
        let items: Vec<Item> =
            serde_json::from_str(&content).context("Failed to parse seed file")?;
        Ok(Self::new(items)?)
    }

    pub fn snapshot(&self) -> Vec<Item> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the whole collection.
    pub fn replace(&self, items: Vec<Item>) -> Result<(), DuplicateId> {
        let mut seen = HashSet::new();
        // Display is canonical, so it agrees with ItemId equality.
        if let Some(dup) = items.iter().find(|item| !seen.insert(item.id.to_string())) {
            return Err(DuplicateId(dup.id.clone()));
        }
        *self.items.write().unwrap_or_else(PoisonError::into_inner) = items;
        Ok(())
    }
}
