//! Typed plugin registries: string id → factory, resolved once at startup.

use indexmap::IndexMap;
use serde_json::Value;

use viz_core::VizError;
use viz_data::{CkanSource, CsvSource, JsonSource, SourceAdapter, SourceDeps};
use viz_style::{AxisChartStyle, ChartKind, StyleEngine, TableStyle};

pub type SourceFactory =
    Box<dyn Fn(&str, &Value, SourceDeps) -> Result<Box<dyn SourceAdapter>, VizError> + Send + Sync>;

/// Maps source plugin ids to adapter factories.
#[derive(Default)]
pub struct SourceRegistry {
    factories: IndexMap<String, SourceFactory>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in adapters: `csv_file`, `csv_remote`,
    /// `json_file` and `ckan_resource`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for id in ["csv_file", "csv_remote"] {
            registry.register(id, |plugin_id, options, deps| {
                Ok(Box::new(CsvSource::new(plugin_id, options, deps)?))
            });
        }
        registry.register("json_file", |plugin_id, options, deps| {
            Ok(Box::new(JsonSource::new(plugin_id, options, deps)?))
        });
        registry.register("ckan_resource", |plugin_id, options, deps| {
            Ok(Box::new(CkanSource::new(plugin_id, options, deps)?))
        });
        registry
    }

    pub fn register(
        &mut self,
        id: impl Into<String>,
        factory: impl Fn(&str, &Value, SourceDeps) -> Result<Box<dyn SourceAdapter>, VizError>
            + Send
            + Sync
            + 'static,
    ) {
        self.factories.insert(id.into(), Box::new(factory));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    pub fn create(
        &self,
        id: &str,
        options: &Value,
        deps: SourceDeps,
    ) -> Result<Box<dyn SourceAdapter>, VizError> {
        let factory = self
            .factories
            .get(id)
            .ok_or_else(|| VizError::UnknownPlugin(id.to_string()))?;
        factory(id, options, deps)
    }
}

pub type StyleFactory = Box<dyn Fn(&Value) -> Result<Box<dyn StyleEngine>, VizError> + Send + Sync>;

/// Maps style plugin ids to engine factories.
#[derive(Default)]
pub struct StyleRegistry {
    factories: IndexMap<String, StyleFactory>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in engines: every chart kind plus `table`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let kinds = [
            ChartKind::Bar,
            ChartKind::Line,
            ChartKind::Spline,
            ChartKind::Scatter,
            ChartKind::Radar,
            ChartKind::Bubble,
            ChartKind::Pie,
            ChartKind::Donut,
            ChartKind::Gauge,
        ];
        for kind in kinds {
            registry.register(kind.plugin_id(), move |options| {
                Ok(Box::new(AxisChartStyle::new(kind, options)?))
            });
        }
        registry.register(TableStyle::PLUGIN_ID, |options| {
            Ok(Box::new(TableStyle::new(options)?))
        });
        registry
    }

    pub fn register(
        &mut self,
        id: impl Into<String>,
        factory: impl Fn(&Value) -> Result<Box<dyn StyleEngine>, VizError> + Send + Sync + 'static,
    ) {
        self.factories.insert(id.into(), Box::new(factory));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    pub fn create(&self, id: &str, options: &Value) -> Result<Box<dyn StyleEngine>, VizError> {
        let factory = self
            .factories
            .get(id)
            .ok_or_else(|| VizError::UnknownPlugin(id.to_string()))?;
        factory(options)
    }
}
