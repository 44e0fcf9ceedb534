//! Command implementations.

pub mod auth;
pub mod entities;
pub mod upload;
