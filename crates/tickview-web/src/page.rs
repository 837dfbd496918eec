//! Page handler and template view model.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Html;
use serde::{Deserialize, Serialize};
use tera::Context;
use tickview_core::{format_date, Block, QueryBuilder, RenderOutcome};

use crate::{AppState, WebError};

pub const PAGE_TITLE: &str = "Stock Tracker";
pub const HELP_LINK: &str = "https://ca.finance.yahoo.com/";
pub const PLOTLY_SRC: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Raw sidebar form values.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PageParams {
    pub ticker: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Template-friendly block. Consecutive bullets are grouped into one list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum PageBlock {
    Subheader { text: String },
    Strong { text: String },
    Text { text: String },
    /// Plotly figure as a JSON string, placed in a data attribute.
    Chart { figure: String },
    List { items: Vec<String> },
}

pub(crate) fn page_blocks(blocks: &[Block]) -> Result<Vec<PageBlock>, WebError> {
    let mut out: Vec<PageBlock> = Vec::with_capacity(blocks.len());
    for block in blocks {
        let next = match block {
            Block::Subheader(text) => PageBlock::Subheader { text: text.clone() },
            Block::Text { body, strong: true } => PageBlock::Strong { text: body.clone() },
            Block::Text { body, strong: false } => PageBlock::Text { text: body.clone() },
            Block::Chart(chart) => PageBlock::Chart {
                figure: serde_json::to_string(&chart.plotly_figure())?,
            },
            Block::Bullet(item) => {
                if let Some(PageBlock::List { items }) = out.last_mut() {
                    items.push(item.clone());
                    continue;
                }
                PageBlock::List {
                    items: vec![item.clone()],
                }
            }
        };
        out.push(next);
    }
    Ok(out)
}

pub(crate) async fn page(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> Result<Html<String>, WebError> {
    let today = time::OffsetDateTime::now_utc().date();
    let inputs = QueryBuilder::from_form(
        params.ticker.as_deref(),
        params.start.as_deref(),
        params.end.as_deref(),
        today,
    );

    let outcome = state.pipeline.run(&inputs).await;
    render_page(&state, &inputs, &outcome).map(Html)
}

pub(crate) fn render_page(
    state: &AppState,
    inputs: &QueryBuilder,
    outcome: &RenderOutcome,
) -> Result<String, WebError> {
    let blocks = page_blocks(&outcome.view())?;
    let has_chart = blocks
        .iter()
        .any(|block| matches!(block, PageBlock::Chart { .. }));

    let mut context = Context::new();
    context.insert("page_title", PAGE_TITLE);
    context.insert("help_link", HELP_LINK);
    context.insert("plotly_src", PLOTLY_SRC);
    context.insert("ticker", inputs.ticker());
    context.insert("start", &format_date(inputs.start_date()));
    context.insert("end", &format_date(inputs.end_date()));
    context.insert("status", outcome.status());
    context.insert("has_chart", &has_chart);
    context.insert("blocks", &blocks);

    Ok(state.templates.render("page.html", &context)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullets_are_grouped_into_one_list() {
        let blocks = vec![
            Block::Subheader(String::from("Tips:")),
            Block::Bullet(String::from("one")),
            Block::Bullet(String::from("two")),
        ];

        let page = page_blocks(&blocks).expect("convert");
        assert_eq!(
            page,
            vec![
                PageBlock::Subheader {
                    text: String::from("Tips:")
                },
                PageBlock::List {
                    items: vec![String::from("one"), String::from("two")]
                },
            ]
        );
    }
}
