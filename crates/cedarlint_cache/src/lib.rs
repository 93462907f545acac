//! # cedarlint_cache
//!
//! In-memory validation cache for CedarLint.
//!
//! This crate answers one question on every document change: does this
//! document need to be checked again?
//!
//! ## Cache Strategy
//!
//! 1. **Version-stamped entries**: an entry is only trusted while the stored
//!    version equals the document's current version. Content is never hashed.
//! 2. **Outcome only**: entries record whether the last check succeeded, not
//!    the diagnostics. Diagnostics are always recomputed on a real check.
//! 3. **Schema dependencies**: policy and entities documents are associated
//!    with the schema they were last checked against, so a schema change can
//!    evict exactly those documents.
//!
//! The cache lives for the editor session only and is never persisted.

mod dependencies;
mod entry;
mod manager;

pub use dependencies::SchemaDependencies;
pub use entry::CacheEntry;
pub use manager::ValidationCache;
