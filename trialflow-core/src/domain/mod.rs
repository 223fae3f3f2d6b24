pub mod error;
pub mod model;
pub mod ports;
pub mod project;
pub mod registry;
pub mod validation;

// Re-exports for shorter imports elsewhere
pub use error::{DomainError, ScheduleError};
pub use registry::{EntityRegistry, KindProfile};
pub use validation::{Severity, ValidationError};
