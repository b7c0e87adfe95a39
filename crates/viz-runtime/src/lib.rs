//! Runtime wiring for the visualisation pipeline: plugin registries, the
//! extension pipeline and the orchestrator that ties a configuration to a
//! source adapter and style engine.

pub mod hooks;
pub mod registry;
pub mod visualisation;

pub use hooks::{ExtensionPipeline, HookContext, OptionsHook, RecordsHook, RenderHook};
pub use registry::{SourceRegistry, StyleRegistry};
pub use visualisation::{RenderResult, Visualisation};
