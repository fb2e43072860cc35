//! Record blobs and the comparator type.

use bytes::Bytes;
use std::cmp::Ordering;

/// Comparison callback over two records.
///
/// The comparator is a plain function value, not a trait object; it defines
/// the total order of the tree. See [`default_compare`].
pub type CompareFn = fn(&Record, &Record) -> Ordering;

/// An immutable byte blob holding one fixed-size record.
///
/// The first `key_size` bytes of a record act as its comparison key. The
/// blob owns its buffer; clones share it. Equality and ordering are
/// deliberately not implemented on the blob itself — all comparisons go
/// through a [`CompareFn`].
#[derive(Debug, Clone, Default)]
pub struct Record {
    data: Bytes,
}

impl Record {
    /// Creates a record owning a copy of the given bytes.
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: Bytes::copy_from_slice(data),
        }
    }

    /// Creates a record from a 16-bit integer in little-endian layout.
    pub fn from_u16(value: u16) -> Self {
        Self::new(&value.to_le_bytes())
    }

    /// Creates a record from a 32-bit integer in little-endian layout.
    pub fn from_u32(value: u32) -> Self {
        Self::new(&value.to_le_bytes())
    }

    /// Creates a record from a 64-bit integer in little-endian layout.
    pub fn from_u64(value: u64) -> Self {
        Self::new(&value.to_le_bytes())
    }

    /// Returns the underlying bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the record length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the record is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns a record sharing the first `n` bytes of this one (all of it
    /// if shorter). Used to carve the key out of a full record.
    pub fn prefix(&self, n: usize) -> Self {
        Self {
            data: self.data.slice(..n.min(self.data.len())),
        }
    }
}

impl From<&[u8]> for Record {
    fn from(data: &[u8]) -> Self {
        Self::new(data)
    }
}

impl From<Vec<u8>> for Record {
    fn from(data: Vec<u8>) -> Self {
        Self { data: data.into() }
    }
}

impl From<&str> for Record {
    fn from(text: &str) -> Self {
        Self::new(text.as_bytes())
    }
}

impl From<String> for Record {
    fn from(text: String) -> Self {
        Self {
            data: text.into_bytes().into(),
        }
    }
}

/// Default record comparator: byte-wise comparison over the overlap of the
/// two records, `min(len_a, len_b)` bytes. Two records differing only beyond
/// the overlap compare equal; for fixed-size records the overlap is the whole
/// record, so this never triggers.
pub fn default_compare(a: &Record, b: &Record) -> Ordering {
    let n = a.len().min(b.len());
    a.as_bytes()[..n].cmp(&b.as_bytes()[..n])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_slice() {
        let rec = Record::new(b"hello");
        assert_eq!(rec.as_bytes(), b"hello");
        assert_eq!(rec.len(), 5);
        assert!(!rec.is_empty());
    }

    #[test]
    fn test_record_from_str() {
        let rec = Record::from("apple");
        assert_eq!(rec.as_bytes(), b"apple");
    }

    #[test]
    fn test_record_from_integers() {
        assert_eq!(Record::from_u16(0x0201).as_bytes(), &[0x01, 0x02]);
        assert_eq!(
            Record::from_u32(0x04030201).as_bytes(),
            &[0x01, 0x02, 0x03, 0x04]
        );
        assert_eq!(Record::from_u64(1).as_bytes()[0], 1);
        assert_eq!(Record::from_u64(1).len(), 8);
    }

    #[test]
    fn test_record_clone_owns_same_bytes() {
        let rec = Record::new(b"payload");
        let copy = rec.clone();
        assert_eq!(copy.as_bytes(), rec.as_bytes());
    }

    #[test]
    fn test_record_prefix() {
        let rec = Record::new(b"abcdef");
        assert_eq!(rec.prefix(3).as_bytes(), b"abc");
        assert_eq!(rec.prefix(100).as_bytes(), b"abcdef");
        assert_eq!(rec.prefix(0).len(), 0);
    }

    #[test]
    fn test_default_compare_orders_bytes() {
        let a = Record::from_u32(1u32.to_be());
        let b = Record::from_u32(2u32.to_be());
        assert_eq!(default_compare(&a, &b), Ordering::Less);
        assert_eq!(default_compare(&b, &a), Ordering::Greater);
        assert_eq!(default_compare(&a, &a), Ordering::Equal);
    }

    #[test]
    fn test_default_compare_overlap_only() {
        // Records differing only beyond the shorter length compare equal.
        let short = Record::new(b"ab");
        let long = Record::new(b"abXY");
        assert_eq!(default_compare(&short, &long), Ordering::Equal);
        assert_eq!(default_compare(&long, &short), Ordering::Equal);
    }

    #[test]
    fn test_default_compare_empty_is_equal_to_anything() {
        let empty = Record::default();
        let rec = Record::new(b"zz");
        assert_eq!(default_compare(&empty, &rec), Ordering::Equal);
    }
}
