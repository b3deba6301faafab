//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (StationRepository, LineRepository)
//! but are themselves concrete structs, not traits.

mod line;
mod station;

pub use line::{LineLocks, LineService};
pub use station::StationService;
