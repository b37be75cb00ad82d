//! # Block Mutations
//!
//! Every editing intent the UI can issue, expressed as data.
//!
//! ## Mutation Semantics
//!
//! ### MoveBlock
//! - Detaches the subtree and appends it to the new parent
//! - Fails if the new parent is the block itself or one of its descendants
//! - Fails if the new parent is a leaf, or is already the block's parent
//!
//! ### MoveBlockStep
//! - Swaps with the previous/next sibling
//! - Fails at the first/last position
//!
//! ### UpdateBlock
//! - Shallow merge of styles and props, atomic replacement of content
//! - Fails if the patch would leave the block unchanged
//!
//! ### RemoveBlock
//! - Removes the block and all of its descendants
//! - The root cannot be removed
//!
//! A failed mutation leaves the tree exactly as it was.

use crate::tree::TreeStore;
use blockmail_model::{Attrs, Block, BlockId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Direction of a sibling step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Before,
    After,
}

/// Partial update for a block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockPatch {
    /// Merged into the block's styles, overwriting existing keys
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub styles: Attrs,

    /// Merged into the block's props, overwriting existing keys
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub props: Attrs,

    /// Replaces the block's content (text and button only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl BlockPatch {
    pub fn content(value: impl Into<String>) -> Self {
        Self {
            content: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn style(name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut patch = Self::default();
        patch.styles.insert(name.into(), value.into());
        patch
    }

    pub fn prop(name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut patch = Self::default();
        patch.props.insert(name.into(), value.into());
        patch
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty() && self.props.is_empty() && self.content.is_none()
    }
}

/// Structural operations on the block tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Mutation {
    /// Append a block (and its subtree) as the last child of a container
    AddBlock {
        parent_id: BlockId,
        block: Block,
    },

    /// Insert a block at a position inside a container (index is clamped)
    InsertBlock {
        parent_id: BlockId,
        index: usize,
        block: Block,
    },

    /// Shallow-merge fields into a block
    UpdateBlock {
        node_id: BlockId,
        patch: BlockPatch,
    },

    /// Remove a block and its subtree
    RemoveBlock {
        node_id: BlockId,
    },

    /// Swap a block with its adjacent sibling
    MoveBlockStep {
        node_id: BlockId,
        direction: Direction,
    },

    /// Re-parent a block as the last child of another container
    MoveBlock {
        node_id: BlockId,
        new_parent_id: BlockId,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Parent not found: {0}")]
    ParentNotFound(String),

    #[error("Would create cycle")]
    CycleDetected,

    #[error("Cannot move a block into itself")]
    SelfTarget,

    #[error("Block is already a child of {0}")]
    AlreadyInParent(String),

    #[error("Block is not a container: {0}")]
    NotAContainer(String),

    #[error("Block has no content: {0}")]
    NotContentBlock(String),

    #[error("Patch would not change block: {0}")]
    NoChange(String),

    #[error("Duplicate block id: {0}")]
    DuplicateId(String),

    #[error("The root block cannot be removed")]
    CannotRemoveRoot,

    #[error("The root block cannot be moved")]
    CannotMoveRoot,

    #[error("Block is already at the {0:?} boundary")]
    AtBoundary(Direction),

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
}

impl Mutation {
    /// Apply mutation to the store with validation
    pub fn apply(&self, store: &mut TreeStore) -> Result<(), MutationError> {
        match self {
            Mutation::AddBlock { parent_id, block } => store.add_block(block.clone(), parent_id),

            Mutation::InsertBlock {
                parent_id,
                index,
                block,
            } => store.insert_block(block.clone(), parent_id, *index),

            Mutation::UpdateBlock { node_id, patch } => store.update_block(node_id, patch),

            Mutation::RemoveBlock { node_id } => store.remove_block(node_id).map(|_| ()),

            Mutation::MoveBlockStep { node_id, direction } => {
                store.move_block_step(node_id, *direction)
            }

            Mutation::MoveBlock {
                node_id,
                new_parent_id,
            } => store.move_block(node_id, new_parent_id),
        }
    }

    /// Validate without applying
    pub fn validate(&self, store: &TreeStore) -> Result<(), MutationError> {
        match self {
            Mutation::AddBlock { parent_id, block }
            | Mutation::InsertBlock {
                parent_id, block, ..
            } => store.validate_insert(block, parent_id),

            Mutation::UpdateBlock { node_id, patch } => store.validate_update(node_id, patch),

            Mutation::RemoveBlock { node_id } => {
                if node_id == store.root_id() {
                    return Err(MutationError::CannotRemoveRoot);
                }
                store
                    .get_block(node_id)
                    .map(|_| ())
                    .ok_or_else(|| MutationError::NodeNotFound(node_id.clone()))
            }

            Mutation::MoveBlockStep { node_id, direction } => {
                store.step_target(node_id, *direction).map(|_| ())
            }

            Mutation::MoveBlock {
                node_id,
                new_parent_id,
            } => store.validate_move(node_id, new_parent_id),
        }
    }

    /// Id of the block this mutation primarily acts on
    pub fn node_id(&self) -> &str {
        match self {
            Mutation::AddBlock { block, .. } | Mutation::InsertBlock { block, .. } => &block.id,
            Mutation::UpdateBlock { node_id, .. }
            | Mutation::RemoveBlock { node_id }
            | Mutation::MoveBlockStep { node_id, .. }
            | Mutation::MoveBlock { node_id, .. } => node_id,
        }
    }

    /// Short human-readable label, used as the undo description
    pub fn label(&self) -> &'static str {
        match self {
            Mutation::AddBlock { .. } | Mutation::InsertBlock { .. } => "Add block",
            Mutation::UpdateBlock { .. } => "Edit block",
            Mutation::RemoveBlock { .. } => "Delete block",
            Mutation::MoveBlockStep { .. } => "Reorder block",
            Mutation::MoveBlock { .. } => "Move block",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockmail_model::BlockType;

    fn store() -> TreeStore {
        let root = Block::root("root").with_child(
            Block::template(BlockType::Container, "a")
                .with_child(Block::template(BlockType::Text, "t1")),
        );
        TreeStore::from_root(root).unwrap()
    }

    #[test]
    fn test_mutation_serialization() {
        let mutation = Mutation::MoveBlock {
            node_id: "t1".to_string(),
            new_parent_id: "a".to_string(),
        };

        let json = serde_json::to_string(&mutation).unwrap();
        assert!(json.contains("\"kind\":\"moveBlock\""));
        assert!(json.contains("\"newParentId\":\"a\""));

        let deserialized: Mutation = serde_json::from_str(&json).unwrap();
        assert_eq!(mutation, deserialized);
    }

    #[test]
    fn test_validation_rejects_empty_ids() {
        let mutation = Mutation::UpdateBlock {
            node_id: "".to_string(),
            patch: BlockPatch::content("test"),
        };

        assert!(mutation.validate(&store()).is_err());
    }

    #[test]
    fn test_validate_matches_apply() {
        let cases = vec![
            Mutation::RemoveBlock {
                node_id: "root".to_string(),
            },
            Mutation::UpdateBlock {
                node_id: "a".to_string(),
                patch: BlockPatch::content("nope"),
            },
            Mutation::MoveBlock {
                node_id: "a".to_string(),
                new_parent_id: "t1".to_string(),
            },
            Mutation::MoveBlockStep {
                node_id: "t1".to_string(),
                direction: Direction::Before,
            },
            Mutation::UpdateBlock {
                node_id: "t1".to_string(),
                patch: BlockPatch::style("color", "red"),
            },
            Mutation::UpdateBlock {
                node_id: "t1".to_string(),
                patch: BlockPatch::default(),
            },
            Mutation::UpdateBlock {
                node_id: "t1".to_string(),
                patch: BlockPatch::content(blockmail_model::DEFAULT_TEXT),
            },
        ];

        for mutation in cases {
            let mut store = store();
            let validated = mutation.validate(&store);
            let applied = mutation.apply(&mut store);
            assert_eq!(validated, applied, "{:?}", mutation);
        }
    }

    #[test]
    fn test_labels_and_node_ids() {
        let mutation = Mutation::AddBlock {
            parent_id: "root".to_string(),
            block: Block::template(BlockType::Image, "img"),
        };
        assert_eq!(mutation.node_id(), "img");
        assert_eq!(mutation.label(), "Add block");
    }
}
