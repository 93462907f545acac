//! Cache entry types.

/// The outcome of the last validation pass for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheEntry {
    /// Document version the outcome was computed for.
    pub version: i32,

    /// Whether the document validated successfully.
    pub valid: bool,
}

impl CacheEntry {
    /// Creates a new cache entry.
    pub fn new(version: i32, valid: bool) -> Self {
        Self { version, valid }
    }

    /// Checks if this cache entry is authoritative for the given version.
    pub fn is_valid(&self, version: i32) -> bool {
        self.version == version
    }
}
