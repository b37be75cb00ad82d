//! Selection state, kept as plain id references.
//!
//! The selection never points into the tree. Reads resolve ids against the
//! store, and stale ids are dropped by [`Selection::revalidate`].

use crate::tree::TreeStore;
use blockmail_model::{Block, BlockId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Ordered, without duplicates. The first id is the primary selection.
    ids: Vec<BlockId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection, dropping duplicates but keeping order
    pub fn set<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<BlockId>,
    {
        self.ids.clear();
        for id in ids {
            let id = id.into();
            if !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn ids(&self) -> &[BlockId] {
        &self.ids
    }

    pub fn primary(&self) -> Option<&str> {
        self.ids.first().map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|s| s == id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Drop ids that no longer exist in `store`
    pub fn revalidate(&mut self, store: &TreeStore) {
        self.ids.retain(|id| store.contains(id));
    }

    /// Selected blocks that still exist, in selection order
    pub fn resolve<'a>(&self, store: &'a TreeStore) -> Vec<&'a Block> {
        self.ids.iter().filter_map(|id| store.get_block(id)).collect()
    }
}
