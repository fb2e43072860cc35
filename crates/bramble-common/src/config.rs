//! Configuration structures for BrambleDB.

use serde::{Deserialize, Serialize};

/// Options for opening or creating a tree file.
///
/// When a file is created, `rec_size`, `key_size`, and `min_degree` define
/// the on-disk geometry and must be valid. When an existing file is opened,
/// the geometry stored in the file header takes precedence and these fields
/// are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeOptions {
    /// Size of every stored record in bytes.
    pub rec_size: usize,
    /// Number of leading record bytes that form the comparison key.
    pub key_size: usize,
    /// Minimum degree `t` of the B-tree; nodes hold `t-1..=2t-1` records.
    pub min_degree: usize,
    /// Enable fsync after page writes.
    pub fsync_enabled: bool,
}

impl TreeOptions {
    /// Creates options with the given record geometry and default degree.
    pub fn new(rec_size: usize, key_size: usize) -> Self {
        Self {
            rec_size,
            key_size,
            ..Self::default()
        }
    }

    /// Sets the minimum degree.
    pub fn with_min_degree(mut self, min_degree: usize) -> Self {
        self.min_degree = min_degree;
        self
    }

    /// Disables fsync after page writes.
    pub fn without_fsync(mut self) -> Self {
        self.fsync_enabled = false;
        self
    }
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            rec_size: 0,
            key_size: 0,
            min_degree: 2,
            fsync_enabled: true,
        }
    }
}
