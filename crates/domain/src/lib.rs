//! # Ajok Domain
//!
//! Business domain types and models for the Ajok real-estate client.
//!
//! This crate contains:
//! - Wire types for the listings backend (users, listings, favorites,
//!   inquiries, token exchange)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Endpoint paths and token store keys
//!
//! ## Architecture
//! - No dependencies on other Ajok crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
