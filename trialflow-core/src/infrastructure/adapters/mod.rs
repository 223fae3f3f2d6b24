// trialflow-core/src/infrastructure/adapters/mod.rs

pub mod file;
pub mod log;

use std::path::Path;
use std::sync::Arc;

use crate::domain::project::{EndpointConfig, ProjectConfig};
use crate::ports::transmitter::TransmitterSet;

pub use file::JsonFileTransmitter;
pub use log::LogTransmitter;

/// One transmitter per declared endpoint. File endpoints write under the
/// project's target directory.
pub fn build_transmitters(project_dir: &Path, config: &ProjectConfig) -> TransmitterSet {
    let target_dir = project_dir.join(&config.target_path);
    let mut set = TransmitterSet::new();
    for (name, endpoint) in &config.endpoints {
        match endpoint {
            EndpointConfig::File { path } => {
                set.insert(name.clone(), Arc::new(JsonFileTransmitter::new(target_dir.join(path))))
            }
            EndpointConfig::Log => set.insert(name.clone(), Arc::new(LogTransmitter::new(name.clone()))),
        }
    }
    set
}
