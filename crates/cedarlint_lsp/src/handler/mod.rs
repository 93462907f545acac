//! LSP request/notification handlers.

pub(crate) mod commands;
mod documents;
mod files;
mod initialize;

pub use commands::handle_execute_command;
pub use documents::{handle_did_change, handle_did_close, handle_did_open, handle_did_save};
pub use files::{WatchedChanges, handle_did_change_watched_files};
pub use initialize::{handle_initialize, handle_initialized, handle_shutdown};
