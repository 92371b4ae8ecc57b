//! Conversions from third-party errors into [`ajok_domain::AjokError`]

mod conversions;

pub use conversions::InfraError;
