//! Per-kind chart layering on top of the shared axis-chart assembly.

pub mod bar;
pub mod bubble;
pub mod donut;
pub mod gauge;
pub mod line;
pub mod pie;
pub mod radar;
pub mod scatter;
pub mod spline;

use serde_json::Value;
use viz_core::VizError;

use crate::axis::AxisChartConfig;

pub use bar::BarOptions;
pub use bubble::BubbleOptions;
pub use donut::DonutOptions;
pub use gauge::GaugeOptions;
pub use line::LineOptions;
pub use radar::RadarOptions;
pub use scatter::ScatterOptions;
pub use spline::SplineOptions;

/// The chart kinds built on the axis-chart base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Line,
    Spline,
    Scatter,
    Radar,
    Bubble,
    Pie,
    Donut,
    Gauge,
}

impl ChartKind {
    pub fn plugin_id(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar_chart",
            ChartKind::Line => "line_chart",
            ChartKind::Spline => "spline_chart",
            ChartKind::Scatter => "scatter_plot_chart",
            ChartKind::Radar => "radar_chart",
            ChartKind::Bubble => "bubble_chart",
            ChartKind::Pie => "pie_chart",
            ChartKind::Donut => "donut_chart",
            ChartKind::Gauge => "gauge_chart",
        }
    }

    /// Configuration section holding this kind's options.
    fn options_key(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar_chart",
            ChartKind::Line => "line_chart",
            ChartKind::Spline => "spline_chart",
            ChartKind::Scatter => "scatter_plot_chart",
            ChartKind::Radar => "radar",
            ChartKind::Bubble => "bubble",
            ChartKind::Pie => "pie_chart",
            ChartKind::Donut => "donut_chart",
            ChartKind::Gauge => "gauge_chart",
        }
    }
}

/// Parsed kind-specific options plus the layering that applies them.
#[derive(Debug, Clone)]
pub enum KindOptions {
    Bar(BarOptions),
    Line(LineOptions),
    Spline(SplineOptions),
    Scatter(ScatterOptions),
    Radar(RadarOptions),
    Bubble(BubbleOptions),
    Pie,
    Donut(DonutOptions),
    Gauge(GaugeOptions),
}

fn section<T: serde::de::DeserializeOwned>(options: &Value, key: &str) -> Result<T, VizError> {
    let section = options
        .get(key)
        .cloned()
        .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
    serde_json::from_value(section)
        .map_err(|e| VizError::Configuration(format!("{key} options: {e}")))
}

impl KindOptions {
    pub fn parse(kind: ChartKind, options: &Value) -> Result<Self, VizError> {
        let key = kind.options_key();
        Ok(match kind {
            ChartKind::Bar => KindOptions::Bar(section(options, key)?),
            ChartKind::Line => KindOptions::Line(section(options, key)?),
            ChartKind::Spline => KindOptions::Spline(section(options, key)?),
            ChartKind::Scatter => KindOptions::Scatter(section(options, key)?),
            ChartKind::Radar => KindOptions::Radar(section(options, key)?),
            ChartKind::Bubble => KindOptions::Bubble(section(options, key)?),
            ChartKind::Pie => KindOptions::Pie,
            ChartKind::Donut => KindOptions::Donut(section(options, key)?),
            ChartKind::Gauge => KindOptions::Gauge(section(options, key)?),
        })
    }

    /// Applies this kind's keys to an assembled settings object. Called only
    /// on non-empty settings; an empty (degraded) build stays empty.
    pub fn layer(&self, settings: &mut Value, config: &AxisChartConfig, base_keys: &[String]) {
        if settings.as_object().map(|o| o.is_empty()).unwrap_or(true) {
            return;
        }
        match self {
            KindOptions::Bar(options) => bar::layer(settings, options, config),
            KindOptions::Line(options) => line::layer(settings, options),
            KindOptions::Spline(options) => spline::layer(settings, options),
            KindOptions::Scatter(options) => scatter::layer(settings, options),
            KindOptions::Radar(options) => radar::layer(settings, options),
            KindOptions::Bubble(options) => bubble::layer(settings, options),
            KindOptions::Pie => pie::layer(settings, config, base_keys),
            KindOptions::Donut(options) => donut::layer(settings, options, config, base_keys),
            KindOptions::Gauge(options) => gauge::layer(settings, options, config),
        }
    }
}
