//! # Blockmail Editor
//!
//! Core editing engine for the email template builder.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ UI: clicks, pointer drags, toolbar buttons  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ EditSession                                 │
//! │  - DragCoordinator resolves drop targets    │
//! │  - Mutations validated against TreeStore    │
//! │  - UndoStack snapshots before each change   │
//! │  - Selection kept as id references          │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ compiler-html: block tree → static HTML     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The tree is the source of truth**: selection and drag state refer to it by id
//! 2. **Validate, then mutate**: rejected operations leave the tree untouched
//! 3. **Always a tree**: no block becomes its own ancestor, the root never moves
//! 4. **Whole-tree snapshots** for undo/redo
//!
//! ## Usage
//!
//! ```rust,ignore
//! use blockmail_editor::{EditSession, SessionConfig, BlockPatch};
//! use blockmail_model::BlockType;
//!
//! let mut session = EditSession::new("client-1", &SessionConfig::default());
//!
//! let section = session.add_new(BlockType::Section, None).unwrap();
//! let text = session.add_new(BlockType::Text, Some(&section)).unwrap();
//! session.update_block(&text, BlockPatch::content("Welcome aboard!"));
//!
//! session.undo();
//! let html = session.export_html(&Default::default());
//! ```

mod drag;
mod errors;
mod mutations;
mod selection;
mod session;
mod tree;
mod undo_stack;

pub use drag::{
    hit_test, zone_at, DragCoordinator, DragOutcome, DragState, DropFeedback, DropZone, Point, Rect,
    DEFAULT_ACTIVATION_DISTANCE,
};
pub use errors::EditorError;
pub use mutations::{BlockPatch, Direction, Mutation, MutationError};
pub use selection::Selection;
pub use session::{EditSession, SessionConfig};
pub use tree::{TreeStore, ROOT_ID};
pub use undo_stack::{Snapshot, UndoStack};

// Re-export common types for convenience
pub use blockmail_compiler_html::CompileOptions;
pub use blockmail_model::{Block, BlockId, BlockKind, BlockType};
