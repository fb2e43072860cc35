//! Tree nodes and their on-disk page image.

use crate::arena::NodeId;
use crate::record::{CompareFn, Record};
use bramble_common::{BrambleError, Result};
use bytes::BytesMut;
use std::cmp::Ordering;

/// Sentinel for "no page assigned" / absent child slot on disk.
pub(crate) const NULL_FPOS: u64 = u64::MAX;

/// On-disk geometry of the tree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Geometry {
    /// Size of every record in bytes.
    pub rec_size: usize,
    /// Leading record bytes forming the comparison key.
    pub key_size: usize,
    /// Minimum degree `t`.
    pub min_degree: usize,
}

impl Geometry {
    /// Maximum records per node, `2t - 1`.
    pub fn max_records(&self) -> usize {
        2 * self.min_degree - 1
    }

    /// Constant page size:
    /// leaf flag (1) + count (8) + `(2t-1)` records + `2t` child offsets.
    pub fn page_size(&self) -> usize {
        1 + 8 + self.max_records() * self.rec_size + 2 * self.min_degree * 8
    }
}

/// Where a key lies relative to one node's records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyPos {
    /// Exact match at this slot.
    InThis(usize),
    /// In the child left of this slot (internal nodes only).
    InLeft(usize),
    /// In the rightmost child; carries `obj_count - 1` (internal nodes only).
    InRight(usize),
    /// Not in this subtree (leaf miss, or empty internal node).
    NotFound,
}

/// Decoded image of one node page.
#[derive(Debug)]
pub(crate) struct DecodedPage {
    pub is_leaf: bool,
    pub records: Vec<Record>,
    /// Child page offsets; empty for leaves and empty nodes.
    pub child_fpos: Vec<u64>,
}

/// In-memory image of one disk page.
///
/// A node is either loaded (records and child links authoritative) or a stub
/// that only remembers its file offset. `children` always has one more entry
/// than `objects`; for leaves every entry is `None`. `parent` and `child_no`
/// are transient wiring refreshed by child loads; they are not persisted.
#[derive(Debug)]
pub(crate) struct TreeNode {
    /// File offset of this node's page.
    pub fpos: u64,
    pub is_leaf: bool,
    /// Whether the in-memory image is authoritative.
    pub loaded: bool,
    /// Index of this node in its parent's child array.
    pub child_no: usize,
    pub parent: Option<NodeId>,
    /// Stored records, sorted ascending under the tree comparator.
    pub objects: Vec<Record>,
    /// Child slots, `objects.len() + 1` entries while loaded.
    pub children: Vec<Option<NodeId>>,
}

impl TreeNode {
    /// A placeholder that only knows where its page lives.
    pub fn stub(fpos: u64) -> Self {
        Self {
            fpos,
            is_leaf: true,
            loaded: false,
            child_no: usize::MAX,
            parent: None,
            objects: Vec::new(),
            children: Vec::new(),
        }
    }

    /// A freshly allocated, loaded, empty leaf.
    pub fn new_leaf(fpos: u64) -> Self {
        Self {
            fpos,
            is_leaf: true,
            loaded: true,
            child_no: usize::MAX,
            parent: None,
            objects: Vec::new(),
            children: vec![None],
        }
    }

    /// Locates `key` relative to this node's records by a left-to-right
    /// scan. Ties resolve to the first equal slot.
    pub fn find_pos(&self, key: &Record, compare: CompareFn) -> KeyPos {
        for (i, obj) in self.objects.iter().enumerate() {
            match compare(key, obj) {
                Ordering::Equal => return KeyPos::InThis(i),
                Ordering::Less => {
                    return if self.is_leaf {
                        KeyPos::NotFound
                    } else {
                        KeyPos::InLeft(i)
                    };
                }
                Ordering::Greater => {}
            }
        }
        if !self.is_leaf && !self.objects.is_empty() {
            KeyPos::InRight(self.objects.len() - 1)
        } else {
            KeyPos::NotFound
        }
    }

    /// First slot whose record is strictly greater than `key`; the insertion
    /// point for a new record.
    pub fn upper_bound(&self, key: &Record, compare: CompareFn) -> usize {
        self.objects
            .iter()
            .position(|obj| compare(key, obj) == Ordering::Less)
            .unwrap_or(self.objects.len())
    }

    /// Removes the record at `slot` from a leaf, shrinking the child array
    /// in step.
    pub fn del_from_leaf(&mut self, slot: usize) {
        debug_assert!(self.is_leaf);
        self.objects.remove(slot);
        self.children.pop();
    }

    /// Serializes this node into a full page buffer. `child_fpos` carries
    /// the resolved offset for each child slot (`NULL_FPOS` when absent).
    pub fn encode(&self, geo: &Geometry, child_fpos: &[u64]) -> BytesMut {
        let mut buf = BytesMut::zeroed(geo.page_size());
        buf[0] = self.is_leaf as u8;
        buf[1..9].copy_from_slice(&(self.objects.len() as u64).to_le_bytes());

        let mut at = 9;
        for obj in &self.objects {
            buf[at..at + geo.rec_size].copy_from_slice(obj.as_bytes());
            at += geo.rec_size;
        }

        if !self.is_leaf && !self.objects.is_empty() {
            let mut at = 9 + geo.max_records() * geo.rec_size;
            for &fpos in child_fpos {
                buf[at..at + 8].copy_from_slice(&fpos.to_le_bytes());
                at += 8;
            }
        }
        buf
    }

    /// Parses one page buffer. Child offsets are surfaced only for internal
    /// nodes; a leaf's child words carry no meaning.
    pub fn decode(buf: &[u8], fpos: u64, geo: &Geometry) -> Result<DecodedPage> {
        let is_leaf = buf[0] == 1;
        let mut word = [0u8; 8];
        word.copy_from_slice(&buf[1..9]);
        let count = u64::from_le_bytes(word) as usize;
        if count > geo.max_records() {
            return Err(BrambleError::PageCorrupted {
                fpos,
                reason: format!(
                    "record count {count} exceeds node capacity {}",
                    geo.max_records()
                ),
            });
        }

        let mut records = Vec::with_capacity(count);
        let mut at = 9;
        for _ in 0..count {
            records.push(Record::new(&buf[at..at + geo.rec_size]));
            at += geo.rec_size;
        }

        let mut child_fpos = Vec::new();
        if !is_leaf && count > 0 {
            let mut at = 9 + geo.max_records() * geo.rec_size;
            for _ in 0..=count {
                word.copy_from_slice(&buf[at..at + 8]);
                child_fpos.push(u64::from_le_bytes(word));
                at += 8;
            }
        }

        Ok(DecodedPage {
            is_leaf,
            records,
            child_fpos,
        })
    }
}
