pub mod project;

pub use crate::domain::project::{EndpointConfig, EntityConfig, ProjectConfig};
pub use project::load_project_config;
