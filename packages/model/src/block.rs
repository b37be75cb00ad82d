use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque block identifier
pub type BlockId = String;

/// Attribute bag attached to a block (styles or props).
///
/// Ordered so that serialized and exported output is deterministic.
pub type Attrs = BTreeMap<String, String>;

/// Seed content for freshly created text blocks
pub const DEFAULT_TEXT: &str = "Enter your text here";

/// Seed label for freshly created button blocks
pub const DEFAULT_BUTTON_LABEL: &str = "Click me";

/// Node of the email document tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,

    /// CSS properties, not interpreted by the editor
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub styles: Attrs,

    /// Element attributes (`src`, `alt`, `href`, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub props: Attrs,

    #[serde(flatten)]
    pub kind: BlockKind,
}

/// Variant-specific payload, discriminated by `type` in JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BlockKind {
    Root {
        #[serde(default)]
        children: Vec<Block>,
    },
    Container {
        #[serde(default)]
        children: Vec<Block>,
    },
    Section {
        #[serde(default)]
        children: Vec<Block>,
    },
    Row {
        #[serde(default)]
        children: Vec<Block>,
    },
    Column {
        #[serde(default)]
        children: Vec<Block>,
    },
    Text {
        #[serde(default)]
        content: String,
    },
    Button {
        #[serde(default)]
        content: String,
    },
    Image,

    /// Any `type` tag this build does not recognise. Never rendered.
    #[serde(other)]
    Unknown,
}

/// Discriminant of a block, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Root,
    Container,
    Section,
    Row,
    Column,
    Text,
    Button,
    Image,
    Unknown,
}

impl BlockType {
    /// Types a user can insert from the palette
    pub const INSERTABLE: [BlockType; 7] = [
        BlockType::Container,
        BlockType::Section,
        BlockType::Row,
        BlockType::Column,
        BlockType::Text,
        BlockType::Button,
        BlockType::Image,
    ];

    /// Whether blocks of this type own an ordered list of children
    pub fn is_container(self) -> bool {
        matches!(
            self,
            BlockType::Root
                | BlockType::Container
                | BlockType::Section
                | BlockType::Row
                | BlockType::Column
        )
    }

    /// Whether blocks of this type carry a `content` string
    pub fn has_content(self) -> bool {
        matches!(self, BlockType::Text | BlockType::Button)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::Root => "root",
            BlockType::Container => "container",
            BlockType::Section => "section",
            BlockType::Row => "row",
            BlockType::Column => "column",
            BlockType::Text => "text",
            BlockType::Button => "button",
            BlockType::Image => "image",
            BlockType::Unknown => "unknown",
        }
    }

    pub fn parse(name: &str) -> Option<BlockType> {
        match name {
            "root" => Some(BlockType::Root),
            "container" => Some(BlockType::Container),
            "section" => Some(BlockType::Section),
            "row" => Some(BlockType::Row),
            "column" => Some(BlockType::Column),
            "text" => Some(BlockType::Text),
            "button" => Some(BlockType::Button),
            "image" => Some(BlockType::Image),
            _ => None,
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a block of type `child` may be placed inside a block of type `parent`.
///
/// Any container-like type accepts any non-root block, nested containers
/// included. Leaves accept nothing.
pub fn can_contain(parent: BlockType, child: BlockType) -> bool {
    parent.is_container() && child != BlockType::Root
}

impl Block {
    /// Empty root block
    pub fn root(id: impl Into<BlockId>) -> Self {
        Self {
            id: id.into(),
            styles: Attrs::new(),
            props: Attrs::new(),
            kind: BlockKind::Root { children: vec![] },
        }
    }

    /// Block of the given type with its default seed content and attributes
    pub fn template(block_type: BlockType, id: impl Into<BlockId>) -> Self {
        let mut styles = Attrs::new();
        let mut props = Attrs::new();

        let kind = match block_type {
            BlockType::Root => BlockKind::Root { children: vec![] },
            BlockType::Container => BlockKind::Container { children: vec![] },
            BlockType::Section => BlockKind::Section { children: vec![] },
            BlockType::Row => {
                styles.insert("display".to_string(), "flex".to_string());
                BlockKind::Row { children: vec![] }
            }
            BlockType::Column => {
                styles.insert("flex".to_string(), "1".to_string());
                BlockKind::Column { children: vec![] }
            }
            BlockType::Text => BlockKind::Text {
                content: DEFAULT_TEXT.to_string(),
            },
            BlockType::Button => {
                props.insert("href".to_string(), "#".to_string());
                BlockKind::Button {
                    content: DEFAULT_BUTTON_LABEL.to_string(),
                }
            }
            BlockType::Image => {
                props.insert("src".to_string(), String::new());
                props.insert("alt".to_string(), String::new());
                BlockKind::Image
            }
            BlockType::Unknown => BlockKind::Unknown,
        };

        Self {
            id: id.into(),
            styles,
            props,
            kind,
        }
    }

    /// Builder helper: append a child (ignored for leaves)
    pub fn with_child(mut self, child: Block) -> Self {
        if let Some(children) = self.children_mut() {
            children.push(child);
        }
        self
    }

    /// Builder helper: replace content (ignored for blocks without content)
    pub fn with_content(mut self, value: impl Into<String>) -> Self {
        if let Some(content) = self.content_mut() {
            *content = value.into();
        }
        self
    }

    pub fn with_style(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.insert(name.into(), value.into());
        self
    }

    pub fn with_prop(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    pub fn block_type(&self) -> BlockType {
        match &self.kind {
            BlockKind::Root { .. } => BlockType::Root,
            BlockKind::Container { .. } => BlockType::Container,
            BlockKind::Section { .. } => BlockType::Section,
            BlockKind::Row { .. } => BlockType::Row,
            BlockKind::Column { .. } => BlockType::Column,
            BlockKind::Text { .. } => BlockType::Text,
            BlockKind::Button { .. } => BlockType::Button,
            BlockKind::Image => BlockType::Image,
            BlockKind::Unknown => BlockType::Unknown,
        }
    }

    pub fn is_container(&self) -> bool {
        self.block_type().is_container()
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, BlockKind::Root { .. })
    }

    /// Ordered children, or `None` for leaves
    pub fn children(&self) -> Option<&[Block]> {
        match &self.kind {
            BlockKind::Root { children }
            | BlockKind::Container { children }
            | BlockKind::Section { children }
            | BlockKind::Row { children }
            | BlockKind::Column { children } => Some(children),
            BlockKind::Text { .. }
            | BlockKind::Button { .. }
            | BlockKind::Image
            | BlockKind::Unknown => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Block>> {
        match &mut self.kind {
            BlockKind::Root { children }
            | BlockKind::Container { children }
            | BlockKind::Section { children }
            | BlockKind::Row { children }
            | BlockKind::Column { children } => Some(children),
            BlockKind::Text { .. }
            | BlockKind::Button { .. }
            | BlockKind::Image
            | BlockKind::Unknown => None,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            BlockKind::Text { content } | BlockKind::Button { content } => Some(content),
            _ => None,
        }
    }

    pub fn content_mut(&mut self) -> Option<&mut String> {
        match &mut self.kind {
            BlockKind::Text { content } | BlockKind::Button { content } => Some(content),
            _ => None,
        }
    }

    /// Number of blocks in this subtree, including `self`
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children()
            .map(|children| children.iter().map(Block::subtree_len).sum())
            .unwrap_or(0)
    }

    /// Recursive search through this subtree
    pub fn find(&self, id: &str) -> Option<&Block> {
        if self.id == id {
            return Some(self);
        }
        self.children()?.iter().find_map(|child| child.find(id))
    }
}
