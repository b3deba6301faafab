//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod chain;
pub mod editor;
pub mod entities;
pub mod error;

pub use chain::SectionChain;
pub use editor::{insert, remove, Placement, Removal};
pub use entities::*;
pub use error::DomainError;
