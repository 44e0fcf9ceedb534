//! Green Mango Core - Shared types library.
//!
//! This crate provides common types used across all Green Mango components:
//! - `client` - SDK for the admin back-office REST API
//! - `cli` - Command-line tools built on the SDK
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, prices,
//!   statuses, and the paginated list envelope

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
