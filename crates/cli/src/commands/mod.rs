//! Subcommand implementations.

pub mod admin;
pub mod images;
pub mod import;
pub mod migrate;
pub mod rewrite;
pub mod translate;
