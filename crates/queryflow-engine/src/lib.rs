//! Queryflow Engine - plan loading, reference resolution, and execution

pub mod controller;
pub mod loader;
pub mod resolver;

pub use controller::{Controller, ControllerConfig};
pub use loader::{PlanSet, Step};
pub use resolver::resolve;
