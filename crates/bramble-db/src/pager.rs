//! Page-level file I/O for the tree file.

use bramble_common::{BrambleError, Result};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Header stored at byte 0 of every tree file.
///
/// Layout (32 bytes, all fields u64 little-endian):
/// - root_pos: file offset of the root node page
/// - rec_size: record size in bytes
/// - key_size: comparison key size in bytes
/// - min_degree: minimum degree `t`
///
/// The format is not versioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FileHeader {
    pub root_pos: u64,
    pub rec_size: u64,
    pub key_size: u64,
    pub min_degree: u64,
}

impl FileHeader {
    /// Size of the file header in bytes.
    pub const SIZE: usize = 32;

    /// Serializes the header to bytes.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..8].copy_from_slice(&self.root_pos.to_le_bytes());
        buf[8..16].copy_from_slice(&self.rec_size.to_le_bytes());
        buf[16..24].copy_from_slice(&self.key_size.to_le_bytes());
        buf[24..32].copy_from_slice(&self.min_degree.to_le_bytes());
        buf
    }

    /// Deserializes the header from bytes.
    pub fn from_bytes(buf: &[u8; Self::SIZE]) -> Self {
        let word = |i: usize| {
            let mut w = [0u8; 8];
            w.copy_from_slice(&buf[i..i + 8]);
            u64::from_le_bytes(w)
        };
        Self {
            root_pos: word(0),
            rec_size: word(8),
            key_size: word(16),
            min_degree: word(24),
        }
    }
}

/// Owns the single data file and serializes access to it.
///
/// All node pages live at fixed offsets; reads and writes are synchronous
/// seek-then-transfer operations against the one handle.
#[derive(Debug)]
pub(crate) struct Pager {
    /// The open file handle.
    file: Mutex<File>,
    /// Fsync after every page write.
    fsync_enabled: bool,
}

impl Pager {
    /// Opens the file at `path`, creating it if absent.
    ///
    /// Returns the pager and whether the file was created by this call.
    pub fn open(path: &Path, fsync_enabled: bool) -> Result<(Self, bool)> {
        let existed = path.exists();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        Ok((
            Self {
                file: Mutex::new(file),
                fsync_enabled,
            },
            !existed,
        ))
    }

    /// Reads exactly `buf.len()` bytes starting at `offset`.
    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)?;
        Ok(())
    }

    /// Writes `data` starting at `offset`.
    pub fn write_at(&self, offset: u64, data: &[u8]) -> Result<()> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(data)?;
        if self.fsync_enabled {
            file.sync_all()?;
        }
        Ok(())
    }

    /// Extends the file by one page at end-of-file.
    ///
    /// Returns the offset of the newly reserved page.
    pub fn allocate(&self, page_size: usize) -> Result<u64> {
        let file = self.file.lock();
        let offset = file.metadata()?.len();
        let new_len = offset
            .checked_add(page_size as u64)
            .ok_or_else(|| BrambleError::PageCorrupted {
                fpos: offset,
                reason: "file length overflow".to_string(),
            })?;
        file.set_len(new_len)?;
        Ok(offset)
    }

    /// Returns the current file length in bytes.
    #[cfg(test)]
    pub fn len(&self) -> Result<u64> {
        Ok(self.file.lock().metadata()?.len())
    }

    /// Flushes file contents to stable storage.
    pub fn sync(&self) -> Result<()> {
        self.file.lock().sync_all()?;
        Ok(())
    }
}

impl Drop for Pager {
    fn drop(&mut self) {
        let _ = self.file.lock().sync_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_test_pager() -> (Pager, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let (pager, created) = Pager::open(&dir.path().join("test.bdb"), false).unwrap();
        assert!(created);
        (pager, dir)
    }

    #[test]
    fn test_pager_open_reports_creation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.bdb");

        let (pager, created) = Pager::open(&path, false).unwrap();
        assert!(created);
        drop(pager);

        let (_pager, created) = Pager::open(&path, false).unwrap();
        assert!(!created);
    }

    #[test]
    fn test_pager_allocate_extends_file() {
        let (pager, _dir) = create_test_pager();

        let first = pager.allocate(64).unwrap();
        let second = pager.allocate(64).unwrap();
        assert_eq!(first, 0);
        assert_eq!(second, 64);
        assert_eq!(pager.len().unwrap(), 128);
    }

    #[test]
    fn test_pager_write_read_roundtrip() {
        let (pager, _dir) = create_test_pager();

        pager.allocate(32).unwrap();
        pager.write_at(8, b"bramble").unwrap();

        let mut buf = [0u8; 7];
        pager.read_at(8, &mut buf).unwrap();
        assert_eq!(&buf, b"bramble");
    }

    #[test]
    fn test_pager_read_past_eof_fails() {
        let (pager, _dir) = create_test_pager();

        let mut buf = [0u8; 16];
        assert!(pager.read_at(1024, &mut buf).is_err());
    }

    #[test]
    fn test_file_header_roundtrip() {
        let header = FileHeader {
            root_pos: 32,
            rec_size: 16,
            key_size: 4,
            min_degree: 2,
        };
        let bytes = header.to_bytes();
        assert_eq!(FileHeader::from_bytes(&bytes), header);
    }

    #[test]
    fn test_file_header_layout() {
        let header = FileHeader {
            root_pos: 1,
            rec_size: 2,
            key_size: 3,
            min_degree: 4,
        };
        let bytes = header.to_bytes();
        assert_eq!(bytes[0], 1);
        assert_eq!(bytes[8], 2);
        assert_eq!(bytes[16], 3);
        assert_eq!(bytes[24], 4);
        assert_eq!(FileHeader::SIZE, 32);
    }
}
