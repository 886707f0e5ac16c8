mod registry;
mod selectors;

pub use registry::{Capability, ModelRegistry, ModelSpec};
pub use selectors::{ModelSelection, ModelSelector, SelectionError};
