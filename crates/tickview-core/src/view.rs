//! Presentation blocks produced by a render pass.
//!
//! The web page and the CLI consume the same [`Block`] list; only the final
//! rendering differs (Tera template vs. [`render_text`]).

use serde::Serialize;
use serde_json::{json, Value};

use crate::{format_date, PriceSeries};

/// Usage hints shown under the chart. They describe the interactive chart
/// controls and do not depend on the data.
pub const TIPS: [&str; 5] = [
    "🔎 Left click and hold to zoom into a specific area of the graph",
    "↔️ Left click and drag the axes to move the chart vertically or horizontally",
    "⬇️ Click the camera icon to download the chart as a pdf",
    "✣ Click the four-arrow icon to pan around the chart",
    "📉 Press the autoscale icon (left of the home symbol) or double left-click to revert the graph to default settings",
];

pub const TIPS_HEADING: &str = "Tips:";

/// One visual element of the page body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Block {
    Subheader(String),
    Text { body: String, strong: bool },
    Chart(LineChart),
    Bullet(String),
}

impl Block {
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text {
            body: body.into(),
            strong: false,
        }
    }

    pub fn strong(body: impl Into<String>) -> Self {
        Self::Text {
            body: body.into(),
            strong: true,
        }
    }
}

/// Single-trace line chart: trading dates against adjusted close.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// `YYYY-MM-DD` trading dates.
    pub x: Vec<String>,
    pub y: Vec<f64>,
}

impl LineChart {
    /// Adjusted close over the whole series.
    pub fn adj_close(series: &PriceSeries) -> Self {
        Self {
            title: series.ticker.to_string(),
            x_label: String::from("Date"),
            y_label: String::from("Adj Close"),
            x: series.dates().map(format_date).collect(),
            y: series.adj_closes().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Plotly `{data, layout}` figure for the page script.
    pub fn plotly_figure(&self) -> Value {
        json!({
            "data": [{
                "type": "scatter",
                "mode": "lines",
                "name": self.y_label,
                "x": self.x,
                "y": self.y,
            }],
            "layout": {
                "xaxis": { "title": { "text": self.x_label } },
                "yaxis": { "title": { "text": self.y_label } },
                "margin": { "t": 24 },
            },
        })
    }

    fn summary(&self) -> String {
        match (self.x.first(), self.x.last()) {
            (Some(first), Some(last)) => format!(
                "[line chart: {}, {} points, {first}..{last}]",
                self.y_label,
                self.len()
            ),
            _ => format!("[line chart: {}, 0 points]", self.y_label),
        }
    }
}

/// Deterministic plain-text rendering, one line per block.
pub fn render_text(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        match block {
            Block::Subheader(title) => out.push_str(title),
            Block::Text { body, strong: true } => {
                out.push_str("**");
                out.push_str(body);
                out.push_str("**");
            }
            Block::Text { body, strong: false } => out.push_str(body),
            Block::Chart(chart) => out.push_str(&chart.summary()),
            Block::Bullet(item) => {
                out.push_str("- ");
                out.push_str(item);
            }
        }
        out.push('\n');
    }
    out
}
