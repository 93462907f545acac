//! Subcommand implementations

pub mod check;
pub mod init;
pub mod lsp;
pub mod schema_export;
