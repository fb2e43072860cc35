//! Sequential cursor machinery: one-step advance in either direction and a
//! lazy iterator built on top of it.

use crate::arena::NodeId;
use crate::record::Record;
use crate::tree::BTreeDb;
use bramble_common::Result;

/// Direction of sequential stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqDirection {
    Forward,
    Backward,
}

/// A cursor position: one record slot in one loaded node.
///
/// A location is only valid while its node stays loaded; a flush or unload
/// invalidates it and [`BTreeDb::get_at`] reports that as a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub(crate) node: NodeId,
    pub(crate) slot: usize,
}

impl Location {
    pub(crate) fn new(node: NodeId, slot: usize) -> Self {
        Self { node, slot }
    }
}

impl BTreeDb {
    /// Steps the cursor one record in the given direction.
    ///
    /// A `None` location starts from the first record (forward) or the last
    /// (backward). Returns the record at the new position, or `Ok(None)` at
    /// end-of-sequence. The stepping relies on the parent wiring of nodes
    /// on the current path; a location whose node was unloaded in the
    /// meantime (by `flush`) reports end-of-sequence.
    pub fn seq(
        &mut self,
        locn: &mut Option<Location>,
        direction: SeqDirection,
    ) -> Result<Option<Record>> {
        match direction {
            SeqDirection::Forward => self.seq_next(locn),
            SeqDirection::Backward => self.seq_prev(locn),
        }
    }

    /// Returns a lazy iterator over all records in the given direction.
    pub fn scan(&mut self, direction: SeqDirection) -> Scan<'_> {
        Scan {
            db: self,
            locn: None,
            direction,
            done: false,
        }
    }

    fn seq_next(&mut self, locn: &mut Option<Location>) -> Result<Option<Record>> {
        let Some(cur) = *locn else {
            // first call: plunge to the leftmost leaf
            let mut node = self.root;
            while !self.arena.node(node).is_leaf {
                node = self.load_child(node, 0)?;
            }
            if self.arena.node(node).objects.is_empty() {
                return Ok(None);
            }
            *locn = Some(Location::new(node, 0));
            return Ok(Some(self.arena.node(node).objects[0].clone()));
        };

        let (loaded, is_leaf, count, mut child_no, mut up) = {
            let node = self.arena.node(cur.node);
            (
                node.loaded,
                node.is_leaf,
                node.objects.len(),
                node.child_no,
                node.parent,
            )
        };
        if !loaded {
            return Ok(None);
        }

        if !is_leaf {
            // a separator was emitted last: continue in its right subtree
            let mut node = self.load_child(cur.node, cur.slot + 1)?;
            while !self.arena.node(node).is_leaf {
                node = self.load_child(node, 0)?;
            }
            *locn = Some(Location::new(node, 0));
            return Ok(Some(self.arena.node(node).objects[0].clone()));
        }

        if cur.slot + 1 < count {
            *locn = Some(Location::new(cur.node, cur.slot + 1));
            return Ok(Some(
                self.arena.node(cur.node).objects[cur.slot + 1].clone(),
            ));
        }

        // leaf exhausted: climb until an ancestor still has a separator to
        // the right of the subtree we came from
        while let Some(parent) = up {
            let (parent_count, parent_child_no, parent_up) = {
                let node = self.arena.node(parent);
                (node.objects.len(), node.child_no, node.parent)
            };
            if child_no < parent_count {
                *locn = Some(Location::new(parent, child_no));
                return Ok(Some(self.arena.node(parent).objects[child_no].clone()));
            }
            child_no = parent_child_no;
            up = parent_up;
        }
        Ok(None)
    }

    fn seq_prev(&mut self, locn: &mut Option<Location>) -> Result<Option<Record>> {
        let Some(cur) = *locn else {
            // first call: plunge to the rightmost leaf
            let mut node = self.root;
            while !self.arena.node(node).is_leaf {
                let last = self.arena.node(node).objects.len();
                node = self.load_child(node, last)?;
            }
            let count = self.arena.node(node).objects.len();
            if count == 0 {
                return Ok(None);
            }
            *locn = Some(Location::new(node, count - 1));
            return Ok(Some(self.arena.node(node).objects[count - 1].clone()));
        };

        let (loaded, is_leaf, mut child_no, mut up) = {
            let node = self.arena.node(cur.node);
            (node.loaded, node.is_leaf, node.child_no, node.parent)
        };
        if !loaded {
            return Ok(None);
        }

        if !is_leaf {
            // a separator was emitted last: continue in its left subtree
            let mut node = self.load_child(cur.node, cur.slot)?;
            while !self.arena.node(node).is_leaf {
                let last = self.arena.node(node).objects.len();
                node = self.load_child(node, last)?;
            }
            let count = self.arena.node(node).objects.len();
            *locn = Some(Location::new(node, count - 1));
            return Ok(Some(self.arena.node(node).objects[count - 1].clone()));
        }

        if cur.slot > 0 {
            *locn = Some(Location::new(cur.node, cur.slot - 1));
            return Ok(Some(
                self.arena.node(cur.node).objects[cur.slot - 1].clone(),
            ));
        }

        // leaf exhausted: climb until an ancestor has a separator to the
        // left of the subtree we came from
        while let Some(parent) = up {
            let (parent_child_no, parent_up) = {
                let node = self.arena.node(parent);
                (node.child_no, node.parent)
            };
            if child_no > 0 {
                *locn = Some(Location::new(parent, child_no - 1));
                return Ok(Some(self.arena.node(parent).objects[child_no - 1].clone()));
            }
            child_no = parent_child_no;
            up = parent_up;
        }
        Ok(None)
    }
}

/// Lazy iterator over records, produced by [`BTreeDb::scan`].
pub struct Scan<'a> {
    db: &'a mut BTreeDb,
    locn: Option<Location>,
    direction: SeqDirection,
    done: bool,
}

impl Iterator for Scan<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.db.seq(&mut self.locn, self.direction) {
            Ok(Some(rec)) => Some(Ok(rec)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bramble_common::TreeOptions;
    use tempfile::{tempdir, TempDir};

    fn populated_db(dir: &TempDir, count: u32) -> BTreeDb {
        let mut db = BTreeDb::open(
            dir.path().join("tree.bdb"),
            TreeOptions::new(4, 4).without_fsync(),
        )
        .unwrap();
        for v in 1..=count {
            db.put(&Record::from_u32(v)).unwrap();
        }
        db
    }

    fn as_u32(rec: &Record) -> u32 {
        u32::from_le_bytes(rec.as_bytes().try_into().unwrap())
    }

    #[test]
    fn test_seq_forward_visits_in_order() {
        let dir = tempdir().unwrap();
        let mut db = populated_db(&dir, 5);

        let mut locn = None;
        let mut seen = Vec::new();
        while let Some(rec) = db.seq(&mut locn, SeqDirection::Forward).unwrap() {
            seen.push(as_u32(&rec));
        }
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);

        // a further step stays at end-of-sequence
        assert!(db.seq(&mut locn, SeqDirection::Forward).unwrap().is_none());
    }

    #[test]
    fn test_seq_backward_visits_in_reverse() {
        let dir = tempdir().unwrap();
        let mut db = populated_db(&dir, 5);

        let mut locn = None;
        let mut seen = Vec::new();
        while let Some(rec) = db.seq(&mut locn, SeqDirection::Backward).unwrap() {
            seen.push(as_u32(&rec));
        }
        assert_eq!(seen, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_seq_walks_deep_trees_once_each() {
        let dir = tempdir().unwrap();
        // enough records for several levels at t = 2
        let mut db = populated_db(&dir, 64);

        let mut locn = None;
        let mut seen = Vec::new();
        while let Some(rec) = db.seq(&mut locn, SeqDirection::Forward).unwrap() {
            seen.push(as_u32(&rec));
        }
        assert_eq!(seen, (1..=64).collect::<Vec<_>>());

        let mut locn = None;
        let mut seen = Vec::new();
        while let Some(rec) = db.seq(&mut locn, SeqDirection::Backward).unwrap() {
            seen.push(as_u32(&rec));
        }
        assert_eq!(seen, (1..=64).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_seq_on_empty_tree() {
        let dir = tempdir().unwrap();
        let mut db = BTreeDb::open(
            dir.path().join("tree.bdb"),
            TreeOptions::new(4, 4).without_fsync(),
        )
        .unwrap();

        let mut locn = None;
        assert!(db.seq(&mut locn, SeqDirection::Forward).unwrap().is_none());
        assert!(locn.is_none());
        assert!(db.seq(&mut locn, SeqDirection::Backward).unwrap().is_none());
    }

    #[test]
    fn test_seq_single_record() {
        let dir = tempdir().unwrap();
        let mut db = populated_db(&dir, 1);

        let mut locn = None;
        assert_eq!(
            as_u32(&db.seq(&mut locn, SeqDirection::Forward).unwrap().unwrap()),
            1
        );
        assert!(db.seq(&mut locn, SeqDirection::Forward).unwrap().is_none());
    }

    #[test]
    fn test_scan_iterator_forward_and_backward() {
        let dir = tempdir().unwrap();
        let mut db = populated_db(&dir, 12);

        let forward: Vec<u32> = db
            .scan(SeqDirection::Forward)
            .map(|rec| as_u32(&rec.unwrap()))
            .collect();
        assert_eq!(forward, (1..=12).collect::<Vec<_>>());

        let backward: Vec<u32> = db
            .scan(SeqDirection::Backward)
            .map(|rec| as_u32(&rec.unwrap()))
            .collect();
        assert_eq!(backward, (1..=12).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_scan_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tree.bdb");
        {
            let mut db =
                BTreeDb::open(&path, TreeOptions::new(4, 4).without_fsync()).unwrap();
            for v in 1..=9u32 {
                db.put(&Record::from_u32(v)).unwrap();
            }
            db.close().unwrap();
        }

        let mut db = BTreeDb::open(&path, TreeOptions::default()).unwrap();
        let seen: Vec<u32> = db
            .scan(SeqDirection::Forward)
            .map(|rec| as_u32(&rec.unwrap()))
            .collect();
        assert_eq!(seen, (1..=9).collect::<Vec<_>>());
    }
}
