//! Core types for Green Mango.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod page;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use page::{PageMeta, Paginated};
pub use price::Price;
pub use status::*;
