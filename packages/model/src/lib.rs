//! # Blockmail Model
//!
//! Block definitions for the email template builder.
//!
//! A document is a tree of [`Block`]s. Container-like blocks (root, container,
//! section, row, column) own an ordered list of children; leaves (text, button,
//! image) do not. Every block carries an opaque `id` plus `styles` and `props`
//! bags that the editor never interprets.
//!
//! ```text
//! root
//! ├── section
//! │   └── row
//! │       ├── column ── text
//! │       └── column ── image
//! └── button
//! ```

pub mod block;
pub mod id_generator;
pub mod visitor;

pub use block::{
    can_contain, Attrs, Block, BlockId, BlockKind, BlockType, DEFAULT_BUTTON_LABEL, DEFAULT_TEXT,
};
pub use id_generator::{get_document_id, IdGenerator};
pub use visitor::{
    collect_ids, contains_type, count_by_type, max_depth, walk_block, walk_block_mut, Visitor,
    VisitorMut,
};
