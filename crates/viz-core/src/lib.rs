//! Core data model for the dataset visualisation pipeline.
//!
//! Source adapters produce [`RecordSet`]s described by a [`FieldCatalog`];
//! style engines turn those into chart or table specifications. Everything in
//! here is plain data shared by the other crates.

pub mod config;
pub mod error;
pub mod messenger;
pub mod record;

pub use config::{EntityRef, PluginConfiguration, VisualisationConfiguration};
pub use error::VizError;
pub use messenger::Messenger;
pub use record::{value_is_numeric, value_text, FieldCatalog, Record, RecordSet, SYNTHETIC_ID_FIELD};
