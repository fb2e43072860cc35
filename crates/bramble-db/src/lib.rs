//! Disk-backed B-tree engine for BrambleDB.
//!
//! A [`BTreeDb`] stores fixed-size records in a single file, ordered by a
//! caller-supplied comparator over the records' leading key bytes. The tree
//! is the classical CLRS B-tree of minimum degree `t`: every node carries
//! between `t-1` and `2t-1` records, one node per fixed-size disk page.
//!
//! Supported operations: insert with overwrite ([`BTreeDb::put`]), point
//! lookup ([`BTreeDb::get`]), deletion ([`BTreeDb::del`]), prefix search
//! ([`BTreeDb::find_all`]), ordered stepping in either direction
//! ([`BTreeDb::seq`], [`BTreeDb::scan`]), in-order traversal
//! ([`BTreeDb::traverse`]), and explicit [`BTreeDb::flush`].
//!
//! The engine is single-threaded: all operations run to completion on the
//! caller's thread against one exclusively-owned file handle. Durability is
//! explicit; nothing is journaled.

mod arena;
mod cursor;
mod node;
mod pager;
mod record;
mod tree;

pub use bramble_common::{BrambleError, Result, TreeOptions};
pub use cursor::{Location, Scan, SeqDirection};
pub use record::{default_compare, CompareFn, Record};
pub use tree::BTreeDb;
