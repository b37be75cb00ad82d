use crate::visitor::{walk_block, Visitor};
use crate::Block;
use crc32fast::Hasher;

/// Generate a stable document seed from a document key using CRC32
pub fn get_document_id(key: &str) -> String {
    let mut buff = String::from(key);
    if !key.starts_with("blockmail://") {
        buff = format!("blockmail://{}", buff);
    }

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential ID generator for blocks within a document
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String, // Document ID (CRC32)
    count: u64,   // Sequential counter
}

impl IdGenerator {
    pub fn new(key: &str) -> Self {
        Self {
            seed: get_document_id(key),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Continue numbering after every `<seed>-<n>` id already present in `tree`
    pub fn resume(seed: String, tree: &Block) -> Self {
        let mut scan = MaxSuffix {
            prefix: format!("{}-", seed),
            max: 0,
        };
        scan.visit_block(tree);

        Self {
            seed,
            count: scan.max,
        }
    }

    /// Generate next sequential ID.
    ///
    /// When the counter is exhausted the seed is extended and numbering
    /// restarts under the new prefix.
    pub fn new_id(&mut self) -> String {
        self.count = match self.count.checked_add(1) {
            Some(next) => next,
            None => {
                self.seed.push('x');
                1
            }
        };
        format!("{}-{}", self.seed, self.count)
    }

    /// Get document ID seed
    pub fn seed(&self) -> &str {
        &self.seed
    }
}

struct MaxSuffix {
    prefix: String,
    max: u64,
}

impl Visitor for MaxSuffix {
    fn visit_block(&mut self, block: &Block) {
        if let Some(n) = block
            .id
            .strip_prefix(&self.prefix)
            .and_then(|suffix| suffix.parse::<u64>().ok())
        {
            self.max = self.max.max(n);
        }
        walk_block(self, block);
    }
}
