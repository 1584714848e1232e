//! Shared types and algorithms for the Maritime Weather Assistant
//!
//! Everything in this crate is pure: grid geometry, weather event
//! classification, and the models exchanged between the weather providers,
//! the grid scanner and the HTTP layer.

pub mod classify;
pub mod error;
pub mod geometry;
pub mod models;
pub mod types;
pub mod validation;

pub use classify::classify;
pub use error::GridError;
pub use models::*;
pub use types::*;
