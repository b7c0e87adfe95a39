//! The visualisation orchestrator: binds one source + style configuration
//! to the registries, the extension pipeline and the shared services.

use once_cell::sync::OnceCell;
use serde_json::Value;
use std::sync::Arc;

use viz_core::{FieldCatalog, RecordSet, VisualisationConfiguration, VizError};
use viz_data::{SourceAdapter, SourceDeps};
use viz_style::{RenderOutput, StyleContext, StyleEngine};

use crate::hooks::{ExtensionPipeline, HookContext};
use crate::registry::{SourceRegistry, StyleRegistry};

/// A built render plus the user messages collected along the way.
#[derive(Debug, Clone, Default)]
pub struct RenderResult {
    pub output: RenderOutput,
    /// User-facing messages drained from the messenger, in emission order.
    pub messages: Vec<String>,
}

/// One configured visualisation. Source and style plugins are constructed
/// lazily and memoized for the lifetime of the instance; every failure
/// degrades to empty output plus a user message.
pub struct Visualisation {
    config: VisualisationConfiguration,
    sources: Arc<SourceRegistry>,
    styles: Arc<StyleRegistry>,
    hooks: Arc<ExtensionPipeline>,
    deps: SourceDeps,
    source: OnceCell<Box<dyn SourceAdapter>>,
    style: OnceCell<Box<dyn StyleEngine>>,
}

impl Visualisation {
    pub fn new(
        config: VisualisationConfiguration,
        sources: Arc<SourceRegistry>,
        styles: Arc<StyleRegistry>,
        hooks: Arc<ExtensionPipeline>,
        deps: SourceDeps,
    ) -> Self {
        Self {
            config,
            sources,
            styles,
            hooks,
            deps,
            source: OnceCell::new(),
            style: OnceCell::new(),
        }
    }

    pub fn configuration(&self) -> &VisualisationConfiguration {
        &self.config
    }

    fn hook_context(&self) -> HookContext<'_> {
        HookContext {
            source_plugin_id: &self.config.source.plugin_id,
            style_plugin_id: &self.config.style.plugin_id,
            entity: self.config.entity.as_ref(),
        }
    }

    /// Source options as the adapter will see them: the configured options
    /// with `data.cache_expiry` and `data.data_filters` lifted from the
    /// style options, then the source-configuration hooks applied. Style
    /// configuration is the single authority for both settings.
    fn effective_source_options(&self) -> Value {
        let mut options = self.config.source.options.clone();
        if !options.is_object() {
            options = Value::Object(serde_json::Map::new());
        }
        let style_data = &self.config.style.options["data"];

        for key in ["cache_expiry", "data_filters"] {
            let value = &style_data[key];
            if !value.is_null() {
                options[key] = value.clone();
            }
        }

        self.hooks
            .apply_source_options(&mut options, &self.hook_context());
        options
    }

    fn effective_style_options(&self) -> Value {
        let mut options = self.config.style.options.clone();
        self.hooks
            .apply_style_options(&mut options, &self.hook_context());
        options
    }

    /// The memoized source adapter, constructing it on first use.
    pub fn source_plugin(&self) -> Result<&dyn SourceAdapter, VizError> {
        self.source
            .get_or_try_init(|| {
                let options = self.effective_source_options();
                self.sources
                    .create(&self.config.source.plugin_id, &options, self.deps.clone())
            })
            .map(|adapter| adapter.as_ref())
    }

    /// The memoized style engine, constructing it on first use.
    pub fn style_plugin(&self) -> Result<&dyn StyleEngine, VizError> {
        self.style
            .get_or_try_init(|| {
                let options = self.effective_style_options();
                self.styles.create(&self.config.style.plugin_id, &options)
            })
            .map(|engine| engine.as_ref())
    }

    fn degrade(&self, stage: &str, error: &VizError) {
        tracing::warn!(target: "viz::visualisation", stage, error = %error, "degrading to empty output");
        self.deps
            .messenger
            .error("Unable to display this visualisation.");
    }

    /// The source's field catalog, empty when the source cannot be built.
    pub fn fields(&self) -> FieldCatalog {
        match self.source_plugin() {
            Ok(source) => source.fields(),
            Err(_) => FieldCatalog::new(),
        }
    }

    /// Fetched records with the record hooks applied. A failing source
    /// degrades to an empty set plus a user message.
    pub fn data(&self) -> RecordSet {
        let mut records = match self.source_plugin() {
            Ok(source) => source.records(),
            Err(e) => {
                self.degrade("source", &e);
                RecordSet::new()
            }
        };
        self.hooks.apply_records(&mut records, &self.hook_context());
        records
    }

    /// Builds the full render: style output with the render hooks applied,
    /// plus the drained user messages. Never fails; unknown plugins or
    /// broken sources produce an empty output and a message.
    pub fn render(&self) -> RenderResult {
        let records = self.data();
        let catalog = self.fields();
        let download_url = self
            .source_plugin()
            .ok()
            .and_then(|source| source.download_url());

        let mut output = match self.style_plugin() {
            Ok(style) => {
                let ctx = StyleContext {
                    catalog: &catalog,
                    records: &records,
                    messenger: &self.deps.messenger,
                    download_url: download_url.as_deref(),
                };
                style.build(&ctx)
            }
            Err(e) => {
                self.degrade("style", &e);
                RenderOutput::default()
            }
        };
        self.hooks.apply_render(&mut output, &self.hook_context());

        RenderResult {
            output,
            messages: self.deps.messenger.drain(),
        }
    }
}
