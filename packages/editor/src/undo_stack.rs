//! # Undo/Redo Stack
//!
//! Snapshot-based history for the block tree.
//!
//! ## Design
//!
//! - Before each successful mutation the caller records the pre-mutation tree
//! - Undo restores the most recent snapshot and keeps the current tree for redo
//! - Redo does the reverse
//! - New mutations clear the redo stack
//! - Supports batched operations (several mutations undone as one step)
//!
//! Only tree content and structure are versioned. Selection lives outside
//! the snapshots and is revalidated by the session after undo/redo.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//! let before = store.snapshot();
//! store.remove_block("text-1")?;
//! stack.record(before, "Delete block");
//!
//! stack.undo(&mut store); // text-1 is back
//! stack.redo(&mut store); // and gone again
//! ```

use crate::tree::TreeStore;
use blockmail_model::Block;
use tracing::debug;

/// One history entry: the whole tree as it was before a change
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Immutable copy of the root block
    pub root: Block,

    /// Optional description of the change this snapshot undoes
    pub description: Option<String>,
}

/// Batch being collected between `begin_batch` and `end_batch`
#[derive(Debug, Default)]
struct OpenBatch {
    /// Tree before the first mutation of the batch
    before: Option<Block>,
    description: Option<String>,
    /// Open `begin_batch` calls not yet matched by `end_batch`
    depth: usize,
}

/// Undo/redo stack for block tree editing
#[derive(Debug)]
pub struct UndoStack {
    /// Past states (most recent last)
    undo_stack: Vec<Snapshot>,

    /// Undone states (most recent last)
    redo_stack: Vec<Snapshot>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Currently building a batch
    current_batch: Option<OpenBatch>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Record the tree as it was before a successful mutation
    pub fn record(&mut self, before: Block, description: &str) {
        if let Some(batch) = &mut self.current_batch {
            // Only the state before the first mutation matters
            if batch.before.is_none() {
                batch.before = Some(before);
            }
            if batch.description.is_none() {
                batch.description = Some(description.to_string());
            }
        } else {
            self.push(Snapshot {
                root: before,
                description: Some(description.to_string()),
            });
        }
    }

    /// Start a batch of mutations (will be undone/redone together).
    ///
    /// Nested calls join the open batch; only the outermost `end_batch`
    /// pushes it.
    pub fn begin_batch(&mut self) {
        match &mut self.current_batch {
            Some(batch) => batch.depth += 1,
            None => {
                self.current_batch = Some(OpenBatch {
                    depth: 1,
                    ..Default::default()
                })
            }
        }
    }

    /// End the current batch level, pushing the batch once the outermost level closes
    pub fn end_batch(&mut self) {
        if let Some(batch) = &mut self.current_batch {
            batch.depth = batch.depth.saturating_sub(1);
            if batch.depth > 0 {
                return;
            }
        }
        self.flush_batch();
    }

    /// Close the open batch regardless of nesting
    fn flush_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if let Some(before) = batch.before {
                self.push(Snapshot {
                    root: before,
                    description: batch.description,
                });
            }
        }
    }

    /// Set description for current batch (if batching)
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    pub fn is_batching(&self) -> bool {
        self.current_batch.is_some()
    }

    fn push(&mut self, snapshot: Snapshot) {
        self.undo_stack.push(snapshot);

        // Trim if exceeded max levels
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // New action invalidates the future
        self.redo_stack.clear();
    }

    /// Restore the most recent snapshot. Returns false when there is nothing to undo.
    pub fn undo(&mut self, store: &mut TreeStore) -> bool {
        self.flush_batch();

        match self.undo_stack.pop() {
            Some(snapshot) => {
                debug!(description = ?snapshot.description, "Undo");
                self.redo_stack.push(Snapshot {
                    root: store.snapshot(),
                    description: snapshot.description.clone(),
                });
                store.restore(snapshot.root);
                true
            }
            None => false,
        }
    }

    /// Reapply the most recently undone change. Returns false when there is nothing to redo.
    pub fn redo(&mut self, store: &mut TreeStore) -> bool {
        self.flush_batch();

        match self.redo_stack.pop() {
            Some(snapshot) => {
                debug!(description = ?snapshot.description, "Redo");
                self.undo_stack.push(Snapshot {
                    root: store.snapshot(),
                    description: snapshot.description.clone(),
                });
                store.restore(snapshot.root);
                true
            }
            None => false,
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
            || self
                .current_batch
                .as_ref()
                .map(|batch| batch.before.is_some())
                .unwrap_or(false)
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the number of undo levels available
    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of redo levels available
    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|snapshot| snapshot.description.as_deref())
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|snapshot| snapshot.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
