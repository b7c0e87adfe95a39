//! Extension pipeline: four interception points around a visualisation.
//!
//! Handlers run in registration order and receive a mutable payload plus the
//! hook context. A failing handler is logged and skipped so one broken
//! extension cannot abort the whole render.

use serde_json::Value;

use viz_core::{EntityRef, RecordSet};
use viz_style::RenderOutput;

/// Identity of the visualisation a hook is running for.
pub struct HookContext<'a> {
    pub source_plugin_id: &'a str,
    pub style_plugin_id: &'a str,
    /// Owning entity, when the caller supplied one.
    pub entity: Option<&'a EntityRef>,
}

pub type OptionsHook = Box<dyn Fn(&mut Value, &HookContext<'_>) -> anyhow::Result<()> + Send + Sync>;
pub type RecordsHook =
    Box<dyn Fn(&mut RecordSet, &HookContext<'_>) -> anyhow::Result<()> + Send + Sync>;
pub type RenderHook =
    Box<dyn Fn(&mut RenderOutput, &HookContext<'_>) -> anyhow::Result<()> + Send + Sync>;

#[derive(Default)]
pub struct ExtensionPipeline {
    source_options: Vec<OptionsHook>,
    style_options: Vec<OptionsHook>,
    records: Vec<RecordsHook>,
    render: Vec<RenderHook>,
}

impl ExtensionPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs before a source adapter is constructed, over its options.
    pub fn on_source_options(
        &mut self,
        hook: impl Fn(&mut Value, &HookContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> &mut Self {
        self.source_options.push(Box::new(hook));
        self
    }

    /// Runs before a style engine is constructed, over its options.
    pub fn on_style_options(
        &mut self,
        hook: impl Fn(&mut Value, &HookContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> &mut Self {
        self.style_options.push(Box::new(hook));
        self
    }

    /// Runs after records are fetched, before styling.
    pub fn on_records(
        &mut self,
        hook: impl Fn(&mut RecordSet, &HookContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> &mut Self {
        self.records.push(Box::new(hook));
        self
    }

    /// Runs after the render output is built, before returning it.
    pub fn on_render(
        &mut self,
        hook: impl Fn(&mut RenderOutput, &HookContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> &mut Self {
        self.render.push(Box::new(hook));
        self
    }

    pub fn apply_source_options(&self, options: &mut Value, ctx: &HookContext<'_>) {
        run_all("source_options", &self.source_options, options, ctx);
    }

    pub fn apply_style_options(&self, options: &mut Value, ctx: &HookContext<'_>) {
        run_all("style_options", &self.style_options, options, ctx);
    }

    pub fn apply_records(&self, records: &mut RecordSet, ctx: &HookContext<'_>) {
        run_all("records", &self.records, records, ctx);
    }

    pub fn apply_render(&self, output: &mut RenderOutput, ctx: &HookContext<'_>) {
        run_all("render", &self.render, output, ctx);
    }
}

fn run_all<P>(
    stage: &str,
    hooks: &[Box<dyn Fn(&mut P, &HookContext<'_>) -> anyhow::Result<()> + Send + Sync>],
    payload: &mut P,
    ctx: &HookContext<'_>,
) {
    for (index, hook) in hooks.iter().enumerate() {
        if let Err(e) = hook(payload, ctx) {
            tracing::warn!(target: "viz::hooks", stage, index, error = %e, "hook failed, continuing");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> HookContext<'static> {
        HookContext {
            source_plugin_id: "csv_file",
            style_plugin_id: "line_chart",
            entity: None,
        }
    }

    #[test]
    fn hooks_run_in_registration_order() {
        let mut pipeline = ExtensionPipeline::new();
        pipeline
            .on_source_options(|options, _| {
                options["trail"] = json!("first");
                Ok(())
            })
            .on_source_options(|options, _| {
                let trail = options["trail"].as_str().unwrap_or("").to_string();
                options["trail"] = json!(format!("{trail},second"));
                Ok(())
            });

        let mut options = json!({});
        pipeline.apply_source_options(&mut options, &ctx());
        assert_eq!(options["trail"], json!("first,second"));
    }

    #[test]
    fn failing_hook_is_skipped() {
        let mut pipeline = ExtensionPipeline::new();
        pipeline
            .on_records(|_, _| anyhow::bail!("broken extension"))
            .on_records(|records, _| {
                records.insert("added", viz_core::Record::new());
                Ok(())
            });

        let mut records = RecordSet::new();
        pipeline.apply_records(&mut records, &ctx());
        assert!(records.get("added").is_some());
    }

    #[test]
    fn render_hooks_can_mutate_output() {
        let mut pipeline = ExtensionPipeline::new();
        pipeline.on_render(|output, ctx| {
            for group in &mut output.groups {
                group.heading = Some(format!("{} ({})", group.key, ctx.style_plugin_id));
            }
            Ok(())
        });

        let mut output = RenderOutput {
            groups: vec![viz_style::RenderGroup {
                key: "all".into(),
                heading: None,
                chart: None,
                table: None,
                download_uri: None,
            }],
        };
        pipeline.apply_render(&mut output, &ctx());
        assert_eq!(output.groups[0].heading.as_deref(), Some("all (line_chart)"));
    }
}
