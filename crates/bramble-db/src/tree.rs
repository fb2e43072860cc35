//! The B-tree database: facade and split/merge/rebalance algorithms.
//!
//! All mutating operations descend from the root, lazily loading children as
//! they go; modified nodes are written back in place at their assigned file
//! offset. The algorithms are the classical CLRS B-tree of minimum degree
//! `t`, expressed recursively over tree depth.

use crate::arena::{NodeArena, NodeId};
use crate::cursor::Location;
use crate::node::{Geometry, KeyPos, TreeNode, NULL_FPOS};
use crate::pager::{FileHeader, Pager};
use crate::record::{default_compare, CompareFn, Record};
use bramble_common::{BrambleError, Result, TreeOptions};
use log::{debug, trace};
use std::cmp::Ordering;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A single-file, disk-backed B-tree over fixed-size records.
///
/// The first `key_size` bytes of each record form its comparison key.
/// Inserting a record whose key already exists overwrites the stored record.
#[derive(Debug)]
pub struct BTreeDb {
    pub(crate) pager: Pager,
    pub(crate) arena: NodeArena,
    pub(crate) root: NodeId,
    pub(crate) geo: Geometry,
    pub(crate) compare: CompareFn,
    path: PathBuf,
}

impl BTreeDb {
    /// Opens the tree file at `path`, creating it if absent, with the
    /// default byte-wise comparator.
    ///
    /// On create, `options` must carry a valid geometry. On an existing
    /// file the geometry stored in the header wins and the option fields
    /// are ignored.
    pub fn open(path: impl AsRef<Path>, options: TreeOptions) -> Result<Self> {
        Self::open_with_comparator(path, options, default_compare)
    }

    /// Opens the tree file with a caller-supplied comparator defining the
    /// total order over records.
    pub fn open_with_comparator(
        path: impl AsRef<Path>,
        options: TreeOptions,
        compare: CompareFn,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            // reject bad geometry before the file springs into existence
            Self::validate_options(&options)?;
        }
        let (pager, created) = Pager::open(&path, options.fsync_enabled)?;
        if created {
            Self::create(pager, path, options, compare)
        } else {
            Self::load(pager, path, compare)
        }
    }

    fn validate_options(options: &TreeOptions) -> Result<()> {
        if options.min_degree < 2 {
            return Err(invalid_parameter("min_degree", options.min_degree));
        }
        if options.key_size == 0 {
            return Err(invalid_parameter("key_size", options.key_size));
        }
        if options.rec_size < options.key_size {
            return Err(invalid_parameter("rec_size", options.rec_size));
        }
        Ok(())
    }

    fn create(
        pager: Pager,
        path: PathBuf,
        options: TreeOptions,
        compare: CompareFn,
    ) -> Result<Self> {
        let geo = Geometry {
            rec_size: options.rec_size,
            key_size: options.key_size,
            min_degree: options.min_degree,
        };
        debug!(
            "creating tree file {} ({}-byte records, {}-byte keys, degree {})",
            path.display(),
            geo.rec_size,
            geo.key_size,
            geo.min_degree
        );

        let header = FileHeader {
            root_pos: FileHeader::SIZE as u64,
            rec_size: geo.rec_size as u64,
            key_size: geo.key_size as u64,
            min_degree: geo.min_degree as u64,
        };
        pager.write_at(0, &header.to_bytes())?;

        let root_fpos = pager.allocate(geo.page_size())?;
        let mut arena = NodeArena::new();
        let root = arena.insert(TreeNode::new_leaf(root_fpos));
        let db = Self {
            pager,
            arena,
            root,
            geo,
            compare,
            path,
        };
        db.write_node(db.root)?;
        Ok(db)
    }

    fn load(pager: Pager, path: PathBuf, compare: CompareFn) -> Result<Self> {
        let mut buf = [0u8; FileHeader::SIZE];
        pager.read_at(0, &mut buf).map_err(|err| match err {
            BrambleError::Io(ref io) if io.kind() == ErrorKind::UnexpectedEof => {
                BrambleError::CorruptHeader("file too short for header".to_string())
            }
            other => other,
        })?;
        let header = FileHeader::from_bytes(&buf);

        if header.min_degree < 2
            || header.key_size == 0
            || header.rec_size < header.key_size
            || header.root_pos < FileHeader::SIZE as u64
        {
            return Err(BrambleError::CorruptHeader(format!(
                "implausible geometry: root_pos={} rec_size={} key_size={} min_degree={}",
                header.root_pos, header.rec_size, header.key_size, header.min_degree
            )));
        }

        let geo = Geometry {
            rec_size: header.rec_size as usize,
            key_size: header.key_size as usize,
            min_degree: header.min_degree as usize,
        };
        let mut arena = NodeArena::new();
        let root = arena.insert(TreeNode::stub(header.root_pos));
        let mut db = Self {
            pager,
            arena,
            root,
            geo,
            compare,
            path,
        };
        db.read_node(db.root)?;
        debug!(
            "opened tree file {} ({}-byte records, degree {})",
            db.path.display(),
            db.geo.rec_size,
            db.geo.min_degree
        );
        Ok(db)
    }

    /// Size of every stored record in bytes.
    pub fn rec_size(&self) -> usize {
        self.geo.rec_size
    }

    /// Number of leading record bytes forming the comparison key.
    pub fn key_size(&self) -> usize {
        self.geo.key_size
    }

    /// Minimum degree `t` of the tree.
    pub fn min_degree(&self) -> usize {
        self.geo.min_degree
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Public operations
    // =========================================================================

    /// Inserts a record, overwriting any stored record with the same key.
    ///
    /// The record must be exactly `rec_size` bytes.
    pub fn put(&mut self, rec: &Record) -> Result<()> {
        if rec.len() != self.geo.rec_size {
            return Err(BrambleError::RecordSizeMismatch {
                expected: self.geo.rec_size,
                actual: rec.len(),
            });
        }
        let key = rec.prefix(self.geo.key_size);
        match self.search(&key)? {
            Some(locn) => {
                self.arena.node_mut(locn.node).objects[locn.slot] = rec.clone();
                self.write_node(locn.node)
            }
            None => self.insert(rec.clone()),
        }
    }

    /// Looks up the record stored under `key`.
    pub fn get(&mut self, key: &Record) -> Result<Option<Record>> {
        Ok(self.search(key)?.and_then(|locn| self.get_at(locn)))
    }

    /// Copies the record at an externally held location, if the location is
    /// still valid (its node loaded, its slot in range).
    pub fn get_at(&self, locn: Location) -> Option<Record> {
        let node = self.arena.node(locn.node);
        if !node.loaded || locn.slot >= node.objects.len() {
            return None;
        }
        Some(node.objects[locn.slot].clone())
    }

    /// Deletes the record stored under `key`. Returns false when the key is
    /// not present (including the empty tree).
    pub fn del(&mut self, key: &Record) -> Result<bool> {
        if self.arena.node(self.root).objects.is_empty() {
            return Ok(false);
        }
        let deleted = self.delete_from(self.root, key)?;

        // A merge may have drained the root even when the key was missing,
        // so the collapse check cannot hinge on the delete succeeding.
        let (root_empty, root_is_leaf) = {
            let root = self.arena.node(self.root);
            (root.objects.is_empty(), root.is_leaf)
        };
        if root_empty && !root_is_leaf {
            // the root drained: its single remaining child takes over; the
            // old root's page is orphaned on disk
            let old_root = self.root;
            let new_root = self.load_child(old_root, 0)?;
            self.arena.node_mut(new_root).parent = None;
            self.arena.release(old_root);
            self.root = new_root;
            debug!(
                "root collapsed, new root at offset {}",
                self.arena.node(new_root).fpos
            );
            self.write_root_pos()?;
            self.flush()?;
        }
        Ok(deleted)
    }

    /// Finds the location of `key` under the tree comparator.
    pub fn search(&mut self, key: &Record) -> Result<Option<Location>> {
        self.search_with(key, self.compare)
    }

    /// Finds the location of `key` under a caller-supplied comparator. The
    /// comparator is used for the entire descent.
    pub fn search_with(
        &mut self,
        key: &Record,
        compare: CompareFn,
    ) -> Result<Option<Location>> {
        self.search_from(self.root, key, compare)
    }

    /// Collects the contiguous run of records whose leading bytes match
    /// `prefix` over `min(record_len, prefix_len)` bytes.
    pub fn find_all(&mut self, prefix: &Record) -> Result<Vec<Record>> {
        let mut results = Vec::new();
        let mut started = false;
        self.traverse(|rec, _depth| {
            let n = rec.len().min(prefix.len());
            if rec.as_bytes()[..n] == prefix.as_bytes()[..n] {
                results.push(rec.clone());
                started = true;
                true
            } else {
                // once the run has started the first miss ends the scan
                !started
            }
        })?;
        Ok(results)
    }

    /// Visits every record in comparator order, passing the record and its
    /// node depth. A callback returning false stops the current node's
    /// record loop and its trailing right-child descent; ancestor frames
    /// do not observe the abort.
    pub fn traverse<F>(&mut self, mut callback: F) -> Result<()>
    where
        F: FnMut(&Record, usize) -> bool,
    {
        let root = self.root;
        self.traverse_node(root, 0, &mut callback)
    }

    /// Writes every loaded node, syncs, then unloads the root's children so
    /// memory shrinks back to the root while the structural skeleton stays
    /// valid.
    pub fn flush(&mut self) -> Result<()> {
        self.flush_node(self.root)?;
        self.pager.sync()?;

        let kids: Vec<NodeId> = self
            .arena
            .node(self.root)
            .children
            .iter()
            .flatten()
            .copied()
            .collect();
        for kid in kids {
            self.arena.unload(kid);
        }
        Ok(())
    }

    /// Flushes and closes the database.
    pub fn close(mut self) -> Result<()> {
        self.flush()
    }

    // =========================================================================
    // Node lifecycle
    // =========================================================================

    /// Appends a blank page at end-of-file and registers a loaded, empty
    /// node for it.
    fn allocate_node(&mut self, is_leaf: bool) -> Result<NodeId> {
        let fpos = self.pager.allocate(self.geo.page_size())?;
        trace!("allocated node page at offset {fpos}");
        let mut node = TreeNode::new_leaf(fpos);
        node.is_leaf = is_leaf;
        Ok(self.arena.insert(node))
    }

    /// Returns the child at `idx`, materializing a placeholder if the slot
    /// is empty and reading the page on first access. The child's parent
    /// wiring is refreshed on every call.
    pub(crate) fn load_child(&mut self, parent_id: NodeId, idx: usize) -> Result<NodeId> {
        let child_id = match self.arena.node(parent_id).children[idx] {
            Some(id) => id,
            None => {
                let id = self.arena.insert(TreeNode::stub(NULL_FPOS));
                self.arena.node_mut(parent_id).children[idx] = Some(id);
                id
            }
        };
        if !self.arena.node(child_id).loaded {
            self.read_node(child_id)?;
        }
        let child = self.arena.node_mut(child_id);
        child.parent = Some(parent_id);
        child.child_no = idx;
        Ok(child_id)
    }

    /// Fills a node's image from its disk page. On failure the node's
    /// previous state is left untouched.
    fn read_node(&mut self, id: NodeId) -> Result<()> {
        let fpos = self.arena.node(id).fpos;
        if fpos == NULL_FPOS {
            return Err(BrambleError::PageCorrupted {
                fpos,
                reason: "node has no assigned page".to_string(),
            });
        }
        let mut buf = vec![0u8; self.geo.page_size()];
        self.pager.read_at(fpos, &mut buf)?;
        let page = TreeNode::decode(&buf, fpos, &self.geo)?;

        let mut children: Vec<Option<NodeId>> = Vec::with_capacity(page.records.len() + 1);
        if page.child_fpos.is_empty() {
            children.resize(page.records.len() + 1, None);
        } else {
            for (i, &child_fpos) in page.child_fpos.iter().enumerate() {
                let stub = self.arena.insert(TreeNode::stub(child_fpos));
                self.arena.node_mut(stub).child_no = i;
                children.push(Some(stub));
            }
        }

        let node = self.arena.node_mut(id);
        node.is_leaf = page.is_leaf;
        node.objects = page.records;
        node.children = children;
        node.loaded = true;
        Ok(())
    }

    /// Writes a node's page in place. Unloaded nodes are unchanged by
    /// definition and succeed as no-ops.
    fn write_node(&self, id: NodeId) -> Result<()> {
        let node = self.arena.node(id);
        if !node.loaded {
            return Ok(());
        }
        let child_fpos: Vec<u64> = node
            .children
            .iter()
            .map(|slot| match slot {
                Some(child) => self.arena.node(*child).fpos,
                None => NULL_FPOS,
            })
            .collect();
        let page = node.encode(&self.geo, &child_fpos);
        self.pager.write_at(node.fpos, &page)
    }

    /// Rewrites the root offset at byte 0 of the header.
    fn write_root_pos(&self) -> Result<()> {
        let fpos = self.arena.node(self.root).fpos;
        self.pager.write_at(0, &fpos.to_le_bytes())
    }

    fn flush_node(&self, id: NodeId) -> Result<()> {
        self.write_node(id)?;
        let node = self.arena.node(id);
        if node.loaded && !node.is_leaf {
            let kids: Vec<NodeId> = node.children.iter().flatten().copied().collect();
            for kid in kids {
                self.flush_node(kid)?;
            }
        }
        Ok(())
    }

    /// Refreshes `child_no` and the parent link for every child slot of
    /// `id` from `from` onward. Called after any child-array surgery.
    fn adopt_children(&mut self, id: NodeId, from: usize) {
        let kids: Vec<(usize, NodeId)> = self
            .arena
            .node(id)
            .children
            .iter()
            .enumerate()
            .skip(from)
            .filter_map(|(i, slot)| slot.map(|child| (i, child)))
            .collect();
        for (i, child) in kids {
            let node = self.arena.node_mut(child);
            node.child_no = i;
            node.parent = Some(id);
        }
    }

    // =========================================================================
    // Search
    // =========================================================================

    fn search_from(
        &mut self,
        id: NodeId,
        key: &Record,
        compare: CompareFn,
    ) -> Result<Option<Location>> {
        match self.arena.node(id).find_pos(key, compare) {
            KeyPos::InThis(i) => Ok(Some(Location::new(id, i))),
            KeyPos::InLeft(i) => {
                let child = self.load_child(id, i)?;
                self.search_from(child, key, compare)
            }
            KeyPos::InRight(i) => {
                let child = self.load_child(id, i + 1)?;
                self.search_from(child, key, compare)
            }
            KeyPos::NotFound => Ok(None),
        }
    }

    // =========================================================================
    // Insert
    // =========================================================================

    fn insert(&mut self, rec: Record) -> Result<()> {
        let max = self.geo.max_records();
        if self.arena.node(self.root).objects.len() == max {
            // grow: a new empty root adopts the old one, which then splits
            let old_root = self.root;
            let new_root = self.allocate_node(false)?;
            self.arena.node_mut(new_root).children = vec![Some(old_root)];
            {
                let old = self.arena.node_mut(old_root);
                old.child_no = 0;
                old.parent = Some(new_root);
            }
            self.root = new_root;
            self.split_child(new_root, 0, old_root)?;
            self.insert_non_full(new_root, rec)?;
            self.write_root_pos()
        } else {
            self.insert_non_full(self.root, rec)
        }
    }

    fn insert_non_full(&mut self, id: NodeId, rec: Record) -> Result<()> {
        let compare = self.compare;
        if self.arena.node(id).is_leaf {
            let node = self.arena.node_mut(id);
            let pos = node.upper_bound(&rec, compare);
            node.objects.insert(pos, rec);
            node.children.push(None);
            self.write_node(id)
        } else {
            let mut idx = self.arena.node(id).upper_bound(&rec, compare);
            let child = self.load_child(id, idx)?;
            if self.arena.node(child).objects.len() == self.geo.max_records() {
                self.split_child(id, idx, child)?;
                // the promoted median decides which half receives the record
                if compare(&rec, &self.arena.node(id).objects[idx]) == Ordering::Greater {
                    idx += 1;
                }
            }
            let child = self.load_child(id, idx)?;
            self.insert_non_full(child, rec)
        }
    }

    /// Splits the full child at `idx` of a non-full parent, promoting the
    /// median record into the parent.
    fn split_child(&mut self, parent_id: NodeId, idx: usize, child_id: NodeId) -> Result<()> {
        let t = self.geo.min_degree;
        let child_is_leaf = self.arena.node(child_id).is_leaf;
        let new_id = self.allocate_node(child_is_leaf)?;
        trace!(
            "splitting child {idx} of node at offset {}",
            self.arena.node(parent_id).fpos
        );

        // carve the upper half out of the full child
        let (upper_objects, upper_children, median) = {
            let child = self.arena.node_mut(child_id);
            debug_assert_eq!(child.objects.len(), 2 * t - 1);
            let upper_objects = child.objects.split_off(t);
            let median = child.objects[t - 1].clone();
            child.objects.truncate(t - 1);
            let upper_children = child.children.split_off(t);
            (upper_objects, upper_children, median)
        };
        {
            let node = self.arena.node_mut(new_id);
            node.objects = upper_objects;
            node.children = upper_children;
        }
        self.adopt_children(new_id, 0);

        // shift the parent's upper slots right and wire in the new child
        {
            let parent = self.arena.node_mut(parent_id);
            parent.objects.insert(idx, median);
            parent.children.insert(idx + 1, Some(new_id));
        }
        self.adopt_children(parent_id, idx + 1);

        self.write_node(child_id)?;
        self.write_node(new_id)?;
        self.write_node(parent_id)
    }

    // =========================================================================
    // Delete
    // =========================================================================

    fn delete_from(&mut self, id: NodeId, key: &Record) -> Result<bool> {
        let t = self.geo.min_degree;
        match self.arena.node(id).find_pos(key, self.compare) {
            KeyPos::NotFound => Ok(false),
            KeyPos::InThis(i) => {
                if self.arena.node(id).is_leaf {
                    // case 1: remove directly from the leaf
                    self.arena.node_mut(id).del_from_leaf(i);
                    return Ok(true);
                }
                let left = self.load_child(id, i)?;
                if self.arena.node(left).objects.len() >= t {
                    // case 2a: the predecessor replaces the deleted record
                    let (pred_node, pred_slot) = self.find_pred(left)?;
                    let pred = self.arena.node(pred_node).objects[pred_slot].clone();
                    let deleted = self.delete_from(left, &pred)?;
                    self.arena.node_mut(id).objects[i] = pred;
                    return Ok(deleted);
                }
                let right = self.load_child(id, i + 1)?;
                if self.arena.node(right).objects.len() >= t {
                    // case 2b: symmetric, with the successor
                    let (succ_node, succ_slot) = self.find_succ(right)?;
                    let succ = self.arena.node(succ_node).objects[succ_slot].clone();
                    let deleted = self.delete_from(right, &succ)?;
                    self.arena.node_mut(id).objects[i] = succ;
                    return Ok(deleted);
                }
                // case 2c: both neighbors minimal; pull the record down into
                // the merged child and delete it there
                let merged = self.merge_children(id, i)?;
                self.delete_from(merged, key)
            }
            KeyPos::InLeft(i) => self.delete_descend(id, i, key),
            KeyPos::InRight(i) => self.delete_descend(id, i + 1, key),
        }
    }

    /// Case 3: the key lies in the child at `key_child_pos`. Ensure that
    /// child has at least `t` records before descending.
    fn delete_descend(&mut self, id: NodeId, key_child_pos: usize, key: &Record) -> Result<bool> {
        let t = self.geo.min_degree;
        let child = self.load_child(id, key_child_pos)?;
        if self.arena.node(child).objects.len() >= t {
            return self.delete_from(child, key);
        }

        let obj_count = self.arena.node(id).objects.len();
        let left_sib = if key_child_pos > 0 {
            Some(self.load_child(id, key_child_pos - 1)?)
        } else {
            None
        };
        let right_sib = if key_child_pos < obj_count {
            Some(self.load_child(id, key_child_pos + 1)?)
        } else {
            None
        };

        if let Some(sib) = left_sib.filter(|s| self.arena.node(*s).objects.len() >= t) {
            // case 3a: rotate through the left separator
            self.borrow_from_left(id, key_child_pos, child, sib);
            self.delete_from(child, key)
        } else if let Some(sib) = right_sib.filter(|s| self.arena.node(*s).objects.len() >= t) {
            // case 3a: rotate through the right separator
            self.borrow_from_right(id, key_child_pos, child, sib);
            self.delete_from(child, key)
        } else {
            // case 3b: both siblings minimal; merge around the nearest
            // separator and descend into the merged node
            let sep = if key_child_pos < obj_count {
                key_child_pos
            } else {
                key_child_pos - 1
            };
            let merged = self.merge_children(id, sep)?;
            self.delete_from(merged, key)
        }
    }

    /// Moves the left sibling's last record up to the parent and the
    /// separator down into the child's first slot.
    fn borrow_from_left(
        &mut self,
        parent_id: NodeId,
        key_child_pos: usize,
        child_id: NodeId,
        sib_id: NodeId,
    ) {
        let (moved_obj, moved_child) = {
            let sib = self.arena.node_mut(sib_id);
            let last = sib.objects.len() - 1;
            let obj = sib.objects.remove(last);
            let child = sib.children.remove(last + 1);
            (obj, child)
        };
        let sep = std::mem::replace(
            &mut self.arena.node_mut(parent_id).objects[key_child_pos - 1],
            moved_obj,
        );
        {
            let child = self.arena.node_mut(child_id);
            child.objects.insert(0, sep);
            child.children.insert(0, moved_child);
        }
        self.adopt_children(child_id, 0);
    }

    /// Mirror image of [`Self::borrow_from_left`].
    fn borrow_from_right(
        &mut self,
        parent_id: NodeId,
        key_child_pos: usize,
        child_id: NodeId,
        sib_id: NodeId,
    ) {
        let (moved_obj, moved_child) = {
            let sib = self.arena.node_mut(sib_id);
            let obj = sib.objects.remove(0);
            let child = sib.children.remove(0);
            (obj, child)
        };
        self.adopt_children(sib_id, 0);
        let sep = std::mem::replace(
            &mut self.arena.node_mut(parent_id).objects[key_child_pos],
            moved_obj,
        );
        let adopt_from = {
            let child = self.arena.node_mut(child_id);
            child.objects.push(sep);
            child.children.push(moved_child);
            child.children.len() - 1
        };
        self.adopt_children(child_id, adopt_from);
    }

    /// Merges `children[i]` and `children[i + 1]`, pulling the separator
    /// down between them. The right child's arena slot is reclaimed; its
    /// disk page is orphaned.
    fn merge_children(&mut self, parent_id: NodeId, i: usize) -> Result<NodeId> {
        let c1 = self.load_child(parent_id, i)?;
        let c2 = self.load_child(parent_id, i + 1)?;
        trace!(
            "merging children {i} and {} of node at offset {}",
            i + 1,
            self.arena.node(parent_id).fpos
        );

        let sep = {
            let parent = self.arena.node_mut(parent_id);
            parent.children.remove(i + 1);
            parent.objects.remove(i)
        };
        self.adopt_children(parent_id, i + 1);

        let (mut objects, mut children) = {
            let right = self.arena.node_mut(c2);
            (
                std::mem::take(&mut right.objects),
                std::mem::take(&mut right.children),
            )
        };
        {
            let left = self.arena.node_mut(c1);
            left.objects.push(sep);
            left.objects.append(&mut objects);
            left.children.append(&mut children);
        }
        self.adopt_children(c1, 0);
        self.arena.release(c2);

        self.write_node(c1)?;
        self.write_node(parent_id)?;
        Ok(c1)
    }

    /// Rightmost record of the rightmost descendant leaf.
    fn find_pred(&mut self, id: NodeId) -> Result<(NodeId, usize)> {
        let mut cur = id;
        while !self.arena.node(cur).is_leaf {
            let last = self.arena.node(cur).objects.len();
            cur = self.load_child(cur, last)?;
        }
        let slot = self.arena.node(cur).objects.len() - 1;
        Ok((cur, slot))
    }

    /// Leftmost record of the leftmost descendant leaf.
    fn find_succ(&mut self, id: NodeId) -> Result<(NodeId, usize)> {
        let mut cur = id;
        while !self.arena.node(cur).is_leaf {
            cur = self.load_child(cur, 0)?;
        }
        Ok((cur, 0))
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    fn traverse_node<F>(&mut self, id: NodeId, depth: usize, callback: &mut F) -> Result<()>
    where
        F: FnMut(&Record, usize) -> bool,
    {
        let mut keep_going = true;
        let mut i = 0;
        while keep_going && i < self.arena.node(id).objects.len() {
            if !self.arena.node(id).is_leaf {
                let child = self.load_child(id, i)?;
                self.traverse_node(child, depth + 1, callback)?;
            }
            let rec = self.arena.node(id).objects[i].clone();
            keep_going = callback(&rec, depth);
            i += 1;
        }
        if keep_going && !self.arena.node(id).is_leaf {
            let child = self.load_child(id, i)?;
            self.traverse_node(child, depth + 1, callback)?;
        }
        Ok(())
    }
}

impl Drop for BTreeDb {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

fn invalid_parameter(name: &str, value: usize) -> BrambleError {
    BrambleError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
    }
}
