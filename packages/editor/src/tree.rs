//! # Tree Store
//!
//! Owns the block tree of one email document.
//!
//! The tree itself is a nested [`Block`] value. Alongside it the store keeps a
//! child → parent id index, so lookups descend along the ancestor path and
//! the cycle check walks upward in O(depth) instead of scanning subtrees.
//!
//! Every operation validates before touching the tree. A rejected operation
//! returns a [`MutationError`] and leaves both the tree and the index as they were.

use crate::mutations::{BlockPatch, Direction, MutationError};
use crate::EditorError;
use blockmail_model::{can_contain, collect_ids, Attrs, Block, BlockId, BlockType};
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

/// Id given to the root of a fresh document
pub const ROOT_ID: &str = "root";

/// In-memory block tree with a parent index
#[derive(Debug, Clone)]
pub struct TreeStore {
    root: Block,

    /// child id → parent id, for every block except the root
    parents: HashMap<BlockId, BlockId>,
}

impl TreeStore {
    /// Create a store holding an empty root
    pub fn new() -> Self {
        Self {
            root: Block::root(ROOT_ID),
            parents: HashMap::new(),
        }
    }

    /// Adopt an existing tree after checking its invariants
    pub fn from_root(root: Block) -> Result<Self, EditorError> {
        if !root.is_root() {
            return Err(EditorError::InvalidTree(format!(
                "top-level block {} has type {}, expected root",
                root.id,
                root.block_type()
            )));
        }

        let mut seen = HashSet::new();
        for id in collect_ids(&root) {
            if !seen.insert(id.clone()) {
                return Err(EditorError::InvalidTree(format!("duplicate block id {}", id)));
            }
        }

        if root
            .children()
            .map(|children| children.iter().any(|c| nests_root(c)))
            .unwrap_or(false)
        {
            return Err(EditorError::InvalidTree(
                "root block nested inside the tree".to_string(),
            ));
        }

        let mut parents = HashMap::new();
        index_children(&mut parents, &root);

        Ok(Self { root, parents })
    }

    /// Load a tree from its JSON form
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        let root: Block = serde_json::from_str(json)?;
        Self::from_root(root)
    }

    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string(&self.root)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }

    pub fn root(&self) -> &Block {
        &self.root
    }

    pub fn root_id(&self) -> &str {
        &self.root.id
    }

    /// Deep copy of the current tree
    pub fn snapshot(&self) -> Block {
        self.root.clone()
    }

    /// Replace the whole tree with a snapshot taken from this store
    pub(crate) fn restore(&mut self, root: Block) {
        let mut parents = HashMap::new();
        index_children(&mut parents, &root);
        self.root = root;
        self.parents = parents;
    }

    /// Number of blocks, root included
    pub fn len(&self) -> usize {
        self.parents.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        id == self.root.id || self.parents.contains_key(id)
    }

    /// Every id in document order, root first
    pub fn ids(&self) -> Vec<BlockId> {
        collect_ids(&self.root)
    }

    /// Ids from just below the root down to `id` (empty for the root itself)
    fn path(&self, id: &str) -> Option<Vec<BlockId>> {
        if id == self.root.id {
            return Some(vec![]);
        }

        let mut chain = vec![id.to_string()];
        let mut current = self.parents.get(id)?;
        while current != &self.root.id {
            chain.push(current.clone());
            current = self.parents.get(current)?;
        }
        chain.reverse();
        Some(chain)
    }

    /// Look up a block by id
    pub fn get_block(&self, id: &str) -> Option<&Block> {
        let path = self.path(id)?;
        let mut node = &self.root;
        for step in &path {
            node = node.children()?.iter().find(|c| &c.id == step)?;
        }
        Some(node)
    }

    fn get_block_mut(&mut self, id: &str) -> Option<&mut Block> {
        let path = self.path(id)?;
        let mut node = &mut self.root;
        for step in &path {
            node = node.children_mut()?.iter_mut().find(|c| &c.id == step)?;
        }
        Some(node)
    }

    /// The container owning `id`, or `None` for the root and unknown ids
    pub fn get_parent(&self, id: &str) -> Option<&Block> {
        self.get_block(self.parents.get(id)?)
    }

    pub fn parent_id(&self, id: &str) -> Option<&str> {
        self.parents.get(id).map(String::as_str)
    }

    /// Position of `id` among its siblings
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.get_parent(id)?
            .children()?
            .iter()
            .position(|c| c.id == id)
    }

    /// Whether `node` lies strictly inside the subtree of `ancestor`.
    ///
    /// A block is never its own descendant, so with `ancestor` set to the
    /// root this holds for every block except the root itself.
    pub fn is_descendant(&self, ancestor: &str, node: &str) -> bool {
        let mut current = node;
        while let Some(parent) = self.parents.get(current) {
            if parent == ancestor {
                return true;
            }
            current = parent.as_str();
        }
        false
    }

    /// Every id below `id`, in document order
    pub fn descendant_ids(&self, id: &str) -> Vec<BlockId> {
        self.get_block(id)
            .map(|block| collect_ids(block).into_iter().skip(1).collect())
            .unwrap_or_default()
    }

    /// Ids above `id`, nearest parent first, ending with the root
    pub fn ancestor_ids(&self, id: &str) -> Vec<BlockId> {
        let mut ancestors = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parents.get(current) {
            ancestors.push(parent.clone());
            current = parent.as_str();
        }
        ancestors
    }

    /// Check that `block` may be inserted into `parent_id`
    pub fn validate_insert(&self, block: &Block, parent_id: &str) -> Result<(), MutationError> {
        let parent = self
            .get_block(parent_id)
            .ok_or_else(|| MutationError::ParentNotFound(parent_id.to_string()))?;

        if !parent.is_container() {
            return Err(MutationError::NotAContainer(parent_id.to_string()));
        }

        if !can_contain(parent.block_type(), block.block_type()) {
            return Err(MutationError::InvalidStructure(format!(
                "{} cannot contain {}",
                parent.block_type(),
                block.block_type()
            )));
        }

        let mut incoming = HashSet::new();
        for id in collect_ids(block) {
            if self.contains(&id) || !incoming.insert(id.clone()) {
                return Err(MutationError::DuplicateId(id));
            }
        }

        if block
            .children()
            .map(|children| children.iter().any(|c| nests_root(c)))
            .unwrap_or(false)
        {
            return Err(MutationError::InvalidStructure(
                "root block nested inside inserted subtree".to_string(),
            ));
        }

        Ok(())
    }

    /// Append `block` as the last child of `parent_id`
    pub fn add_block(&mut self, block: Block, parent_id: &str) -> Result<(), MutationError> {
        self.insert_block(block, parent_id, usize::MAX)
    }

    /// Insert `block` at `index` inside `parent_id` (clamped to the child count)
    #[instrument(skip(self, block), fields(block_id = %block.id, block_type = %block.block_type()))]
    pub fn insert_block(
        &mut self,
        block: Block,
        parent_id: &str,
        index: usize,
    ) -> Result<(), MutationError> {
        self.validate_insert(&block, parent_id)?;

        index_subtree(&mut self.parents, &block, parent_id);

        let children = self
            .get_block_mut(parent_id)
            .and_then(Block::children_mut)
            .ok_or_else(|| MutationError::ParentNotFound(parent_id.to_string()))?;
        let at = index.min(children.len());
        children.insert(at, block);

        debug!(parent_id, index = at, "Inserted block");
        Ok(())
    }

    /// Check that `patch` applies to `id` and would change it
    pub fn validate_update(&self, id: &str, patch: &BlockPatch) -> Result<(), MutationError> {
        let block = self
            .get_block(id)
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;

        if patch.content.is_some() && block.content().is_none() {
            return Err(MutationError::NotContentBlock(id.to_string()));
        }

        let changes_content = patch
            .content
            .as_deref()
            .map_or(false, |value| block.content() != Some(value));
        let changes_attrs = |current: &Attrs, incoming: &Attrs| {
            incoming.iter().any(|(k, v)| current.get(k) != Some(v))
        };

        if patch.is_empty()
            || !(changes_content
                || changes_attrs(&block.styles, &patch.styles)
                || changes_attrs(&block.props, &patch.props))
        {
            return Err(MutationError::NoChange(id.to_string()));
        }

        Ok(())
    }

    /// Shallow-merge `patch` into the block `id`
    pub fn update_block(&mut self, id: &str, patch: &BlockPatch) -> Result<(), MutationError> {
        self.validate_update(id, patch)?;

        let block = self
            .get_block_mut(id)
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;

        block
            .styles
            .extend(patch.styles.iter().map(|(k, v)| (k.clone(), v.clone())));
        block
            .props
            .extend(patch.props.iter().map(|(k, v)| (k.clone(), v.clone())));
        if let (Some(value), Some(content)) = (&patch.content, block.content_mut()) {
            *content = value.clone();
        }

        Ok(())
    }

    /// Detach the subtree rooted at `id` and return it
    #[instrument(skip(self))]
    pub fn remove_block(&mut self, id: &str) -> Result<Block, MutationError> {
        if id == self.root.id {
            return Err(MutationError::CannotRemoveRoot);
        }

        let removed = self.detach(id)?;
        for removed_id in collect_ids(&removed) {
            self.parents.remove(&removed_id);
        }

        debug!(removed = removed.subtree_len(), "Removed block");
        Ok(removed)
    }

    /// Sibling index `id` would swap with when stepping in `direction`
    pub fn step_target(&self, id: &str, direction: Direction) -> Result<usize, MutationError> {
        if id == self.root.id {
            return Err(MutationError::CannotMoveRoot);
        }

        let parent = self
            .get_parent(id)
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;
        let siblings = parent.children().unwrap_or(&[]);
        let pos = siblings
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;

        match direction {
            Direction::Before if pos > 0 => Ok(pos - 1),
            Direction::After if pos + 1 < siblings.len() => Ok(pos + 1),
            _ => Err(MutationError::AtBoundary(direction)),
        }
    }

    /// Swap `id` with its previous or next sibling
    pub fn move_block_step(&mut self, id: &str, direction: Direction) -> Result<(), MutationError> {
        let target = self.step_target(id, direction)?;
        let parent_id = self
            .parents
            .get(id)
            .cloned()
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;

        let siblings = self
            .get_block_mut(&parent_id)
            .and_then(Block::children_mut)
            .ok_or_else(|| MutationError::ParentNotFound(parent_id.clone()))?;
        let pos = match direction {
            Direction::Before => target + 1,
            Direction::After => target - 1,
        };
        siblings.swap(pos, target);

        Ok(())
    }

    /// Check that `source` may be re-parented into `target`
    pub fn validate_move(&self, source: &str, target: &str) -> Result<(), MutationError> {
        if source == target {
            return Err(MutationError::SelfTarget);
        }
        if source == self.root.id {
            return Err(MutationError::CannotMoveRoot);
        }
        if !self.contains(source) {
            return Err(MutationError::NodeNotFound(source.to_string()));
        }

        let target_block = self
            .get_block(target)
            .ok_or_else(|| MutationError::ParentNotFound(target.to_string()))?;
        if !target_block.is_container() {
            return Err(MutationError::NotAContainer(target.to_string()));
        }

        if self.is_descendant(source, target) {
            return Err(MutationError::CycleDetected);
        }

        if self.parent_id(source) == Some(target) {
            return Err(MutationError::AlreadyInParent(target.to_string()));
        }

        Ok(())
    }

    /// Detach `source` and append it as the last child of `target`
    #[instrument(skip(self))]
    pub fn move_block(&mut self, source: &str, target: &str) -> Result<(), MutationError> {
        self.validate_move(source, target)?;

        let block = self.detach(source)?;
        let children = self
            .get_block_mut(target)
            .and_then(Block::children_mut)
            .ok_or_else(|| MutationError::ParentNotFound(target.to_string()))?;
        children.push(block);
        self.parents.insert(source.to_string(), target.to_string());

        debug!("Moved block");
        Ok(())
    }

    /// Remove `id` from its parent's children without touching the index
    fn detach(&mut self, id: &str) -> Result<Block, MutationError> {
        let parent_id = self
            .parents
            .get(id)
            .cloned()
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;

        let siblings = self
            .get_block_mut(&parent_id)
            .and_then(Block::children_mut)
            .ok_or_else(|| MutationError::ParentNotFound(parent_id.clone()))?;
        let pos = siblings
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;

        Ok(siblings.remove(pos))
    }
}

impl Default for TreeStore {
    fn default() -> Self {
        Self::new()
    }
}

fn nests_root(block: &Block) -> bool {
    block.block_type() == BlockType::Root
        || block
            .children()
            .map(|children| children.iter().any(nests_root))
            .unwrap_or(false)
}

/// Register `block` under `parent_id`, then its descendants
fn index_subtree(parents: &mut HashMap<BlockId, BlockId>, block: &Block, parent_id: &str) {
    parents.insert(block.id.clone(), parent_id.to_string());
    index_children(parents, block);
}

fn index_children(parents: &mut HashMap<BlockId, BlockId>, block: &Block) {
    if let Some(children) = block.children() {
        for child in children {
            index_subtree(parents, child, &block.id);
        }
    }
}
