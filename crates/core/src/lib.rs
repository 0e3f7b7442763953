//! Menucochon Core - Shared domain types.
//!
//! This crate provides the types used across all Menucochon components:
//! - `site` - Public bilingual recipe site, shop and admin back-office
//! - `cli` - Maintenance, import and migration scripts
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and usable anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, locales, emails, ratings, prices and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
