//! # Edit Session Management
//!
//! An EditSession is one user's editing context for one email template:
//! the block tree, its history, the current selection, the id generator
//! and the drag-and-drop gesture in progress.
//!
//! Sessions are constructed explicitly by the host application and passed
//! to whatever needs them. Every UI intent is a synchronous method call;
//! invalid intents are dropped (logged at debug level) and report `false`.

use crate::drag::{DragCoordinator, DragOutcome, DropFeedback, DropZone, Point, DEFAULT_ACTIVATION_DISTANCE};
use crate::mutations::{BlockPatch, Direction, Mutation};
use crate::selection::Selection;
use crate::tree::TreeStore;
use crate::undo_stack::UndoStack;
use crate::EditorError;
use blockmail_compiler_html::{compile_to_html, CompileOptions};
use blockmail_model::{
    get_document_id, walk_block_mut, Block, BlockId, BlockType, IdGenerator, VisitorMut,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Tunables for an edit session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Maximum undo levels (0 = unlimited)
    #[serde(default = "default_history_levels")]
    pub history_levels: usize,

    /// Pointer travel (px) before a press becomes a drag
    #[serde(default = "default_activation_distance")]
    pub activation_distance: f32,

    /// Key hashed into the prefix of generated block ids
    #[serde(default = "default_id_seed")]
    pub id_seed: String,
}

fn default_history_levels() -> usize {
    100
}

fn default_activation_distance() -> f32 {
    DEFAULT_ACTIVATION_DISTANCE
}

fn default_id_seed() -> String {
    "email-template".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_levels: default_history_levels(),
            activation_distance: default_activation_distance(),
            id_seed: default_id_seed(),
        }
    }
}

/// Single edit session over one block tree
pub struct EditSession {
    /// Unique session identifier
    pub id: String,

    store: TreeStore,
    history: UndoStack,
    selection: Selection,
    ids: IdGenerator,
    drag: DragCoordinator,
}

impl EditSession {
    /// Create a session over an empty document
    pub fn new(id: impl Into<String>, config: &SessionConfig) -> Self {
        Self::with_store(id, TreeStore::new(), config)
    }

    /// Create a session over an existing tree
    pub fn with_store(id: impl Into<String>, store: TreeStore, config: &SessionConfig) -> Self {
        let ids = IdGenerator::resume(get_document_id(&config.id_seed), store.root());

        Self {
            id: id.into(),
            store,
            history: UndoStack::with_max_levels(config.history_levels),
            selection: Selection::new(),
            ids,
            drag: DragCoordinator::with_activation_distance(config.activation_distance),
        }
    }

    /// Replace the document with a tree loaded from JSON.
    ///
    /// History and selection are reset; an in-flight drag is cancelled.
    pub fn load_json(&mut self, json: &str) -> Result<(), EditorError> {
        let store = TreeStore::from_json(json)?;
        info!(session = %self.id, blocks = store.len(), "Loaded document");

        self.ids = IdGenerator::resume(self.ids.seed().to_string(), store.root());
        self.store = store;
        self.history.clear();
        self.selection.clear();
        self.drag.cancel();
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, EditorError> {
        self.store.to_json()
    }

    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    pub fn get_block(&self, id: &str) -> Option<&Block> {
        self.store.get_block(id)
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn drag(&self) -> &DragCoordinator {
        &self.drag
    }

    /// New block of `block_type` with a fresh id and default seed content
    pub fn create_block(&mut self, block_type: BlockType) -> Block {
        Block::template(block_type, self.ids.new_id())
    }

    /// Apply a mutation, recording history when it succeeds
    pub fn apply(&mut self, mutation: Mutation) -> bool {
        if let Err(reason) = mutation.validate(&self.store) {
            debug!(session = %self.id, node_id = mutation.node_id(), %reason, "Mutation rejected");
            return false;
        }

        let before = self.store.snapshot();
        if let Err(reason) = mutation.apply(&mut self.store) {
            warn!(session = %self.id, node_id = mutation.node_id(), %reason, "Mutation failed after validation");
            return false;
        }

        self.history.record(before, mutation.label());
        self.selection.revalidate(&self.store);
        true
    }

    /// Add `block` to `target`, or next to the current selection when no target is given.
    ///
    /// Without a target: a selected container receives the block as its last
    /// child, a selected leaf gets the block inserted right after it, and with
    /// nothing selected the block goes to the end of the root.
    pub fn add_block(&mut self, block: Block, target: Option<&str>) -> bool {
        let mutation = match target {
            Some(parent_id) => Mutation::AddBlock {
                parent_id: parent_id.to_string(),
                block,
            },
            None => self.placement_for_selection(block),
        };
        self.apply(mutation)
    }

    /// Create a block of `block_type` and add it like [`EditSession::add_block`]
    pub fn add_new(&mut self, block_type: BlockType, target: Option<&str>) -> Option<BlockId> {
        let block = self.create_block(block_type);
        let id = block.id.clone();
        self.add_block(block, target).then_some(id)
    }

    fn placement_for_selection(&self, block: Block) -> Mutation {
        let root_id = self.store.root_id().to_string();
        let selected = self
            .selection
            .primary()
            .and_then(|id| self.store.get_block(id));

        match selected {
            Some(sel) if sel.is_container() => Mutation::AddBlock {
                parent_id: sel.id.clone(),
                block,
            },
            Some(sel) => match (self.store.parent_id(&sel.id), self.store.index_of(&sel.id)) {
                (Some(parent_id), Some(index)) => Mutation::InsertBlock {
                    parent_id: parent_id.to_string(),
                    index: index + 1,
                    block,
                },
                _ => Mutation::AddBlock {
                    parent_id: root_id,
                    block,
                },
            },
            None => Mutation::AddBlock {
                parent_id: root_id,
                block,
            },
        }
    }

    pub fn update_block(&mut self, id: &str, patch: BlockPatch) -> bool {
        self.apply(Mutation::UpdateBlock {
            node_id: id.to_string(),
            patch,
        })
    }

    pub fn remove_block(&mut self, id: &str) -> bool {
        self.apply(Mutation::RemoveBlock {
            node_id: id.to_string(),
        })
    }

    pub fn move_block_step(&mut self, id: &str, direction: Direction) -> bool {
        self.apply(Mutation::MoveBlockStep {
            node_id: id.to_string(),
            direction,
        })
    }

    pub fn move_block(&mut self, source: &str, target: &str) -> bool {
        self.apply(Mutation::MoveBlock {
            node_id: source.to_string(),
            new_parent_id: target.to_string(),
        })
    }

    /// Copy a block and its subtree (fresh ids) right after the original
    pub fn duplicate_block(&mut self, id: &str) -> Option<BlockId> {
        let parent_id = self.store.parent_id(id)?.to_string();
        let index = self.store.index_of(id)?;
        let mut copy = self.store.get_block(id)?.clone();

        Reassign(&mut self.ids).visit_block_mut(&mut copy);
        let copy_id = copy.id.clone();

        self.apply(Mutation::InsertBlock {
            parent_id,
            index: index + 1,
            block: copy,
        })
        .then_some(copy_id)
    }

    pub fn set_selected<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<BlockId>,
    {
        self.selection.set(ids);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selected_ids(&self) -> &[BlockId] {
        self.selection.ids()
    }

    /// Selected blocks, re-resolved against the current tree
    pub fn selected_blocks(&self) -> Vec<&Block> {
        self.selection.resolve(&self.store)
    }

    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.store);
        if undone {
            self.selection.revalidate(&self.store);
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo(&mut self.store);
        if redone {
            self.selection.revalidate(&self.store);
        }
        redone
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Group the following mutations into one undo step.
    ///
    /// A nested call joins the open batch and keeps its description.
    pub fn begin_batch(&mut self, description: impl Into<String>) {
        let nested = self.history.is_batching();
        self.history.begin_batch();
        if !nested {
            self.history.set_batch_description(description);
        }
    }

    pub fn end_batch(&mut self) {
        self.history.end_batch();
    }

    /// Pointer pressed on a block. The root cannot be dragged.
    pub fn pointer_down(&mut self, id: &str, point: Point) -> bool {
        if id == self.store.root_id() || !self.store.contains(id) {
            return false;
        }
        self.drag.pointer_down(id, point);
        true
    }

    /// Pointer moved; returns the current hover feedback while dragging
    pub fn pointer_move(&mut self, point: Point, zones: &[DropZone]) -> Option<DropFeedback> {
        self.drag.pointer_move(point, zones, &self.store).cloned()
    }

    /// Pointer released: selects on click, moves on a valid drop
    pub fn pointer_up(&mut self, point: Point, zones: &[DropZone]) -> DragOutcome {
        let outcome = self.drag.pointer_up(point, zones, &self.store);

        match &outcome {
            DragOutcome::Click(id) => self.selection.set([id.clone()]),
            DragOutcome::Drop { source, target } => {
                self.move_block(source, target);
            }
            DragOutcome::Rejected { .. } | DragOutcome::Cancelled | DragOutcome::Ignored => {}
        }

        outcome
    }

    pub fn cancel_drag(&mut self) -> DragOutcome {
        self.drag.cancel()
    }

    /// Render the current tree as a static HTML document
    pub fn export_html(&self, options: &CompileOptions) -> String {
        compile_to_html(self.store.root(), options)
    }
}

/// Gives every block in a subtree a fresh id
struct Reassign<'a>(&'a mut IdGenerator);

impl VisitorMut for Reassign<'_> {
    fn visit_block_mut(&mut self, block: &mut Block) {
        block.id = self.0.new_id();
        walk_block_mut(self, block);
    }
}
