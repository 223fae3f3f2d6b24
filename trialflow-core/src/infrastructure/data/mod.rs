// trialflow-core/src/infrastructure/data/mod.rs

pub mod memory;
pub mod yaml_store;

pub use memory::InMemoryDataSource;
pub use yaml_store::YamlDataStore;
