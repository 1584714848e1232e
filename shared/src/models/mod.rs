//! Domain models for the Maritime Weather Assistant

mod event;
mod weather;

pub use event::*;
pub use weather::*;
