//! Cache entries.

use bytes::Bytes;

/// Opaque serialized token set.
///
/// The cache never looks inside; it only measures the length for weighting.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CacheEntry(Bytes);

impl CacheEntry {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Serialized length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl From<Vec<u8>> for CacheEntry {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl From<&'static str> for CacheEntry {
    fn from(s: &'static str) -> Self {
        Self(Bytes::from_static(s.as_bytes()))
    }
}

impl From<String> for CacheEntry {
    fn from(s: String) -> Self {
        Self(Bytes::from(s))
    }
}

impl AsRef<[u8]> for CacheEntry {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
