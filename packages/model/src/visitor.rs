use crate::{Block, BlockId, BlockType};
use std::collections::BTreeMap;

/// Visitor pattern for traversing block trees immutably
///
/// The default implementation walks every child in document order.
/// Override `visit_block` to act on nodes, and call `walk_block` to keep descending.
pub trait Visitor: Sized {
    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }
}

/// Mutable visitor pattern for transforming block trees
pub trait VisitorMut: Sized {
    fn visit_block_mut(&mut self, block: &mut Block) {
        walk_block_mut(self, block);
    }
}

pub fn walk_block<V: Visitor>(visitor: &mut V, block: &Block) {
    if let Some(children) = block.children() {
        for child in children {
            visitor.visit_block(child);
        }
    }
}

pub fn walk_block_mut<V: VisitorMut>(visitor: &mut V, block: &mut Block) {
    if let Some(children) = block.children_mut() {
        for child in children {
            visitor.visit_block_mut(child);
        }
    }
}

/// Pre-order list of every id in the subtree, `block` first
pub fn collect_ids(block: &Block) -> Vec<BlockId> {
    struct Ids(Vec<BlockId>);

    impl Visitor for Ids {
        fn visit_block(&mut self, block: &Block) {
            self.0.push(block.id.clone());
            walk_block(self, block);
        }
    }

    let mut ids = Ids(Vec::new());
    ids.visit_block(block);
    ids.0
}

/// Number of blocks of each type in the subtree
pub fn count_by_type(block: &Block) -> BTreeMap<&'static str, usize> {
    struct Counts(BTreeMap<&'static str, usize>);

    impl Visitor for Counts {
        fn visit_block(&mut self, block: &Block) {
            *self.0.entry(block.block_type().as_str()).or_insert(0) += 1;
            walk_block(self, block);
        }
    }

    let mut counts = Counts(BTreeMap::new());
    counts.visit_block(block);
    counts.0
}

/// Depth of the deepest block below `block` (a lone block has depth 0)
pub fn max_depth(block: &Block) -> usize {
    block
        .children()
        .and_then(|children| children.iter().map(max_depth).max().map(|d| d + 1))
        .unwrap_or(0)
}

/// Whether `block` contains a node of `block_type` anywhere below it
pub fn contains_type(block: &Block, block_type: BlockType) -> bool {
    block
        .children()
        .map(|children| {
            children
                .iter()
                .any(|c| c.block_type() == block_type || contains_type(c, block_type))
        })
        .unwrap_or(false)
}
