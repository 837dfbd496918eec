use std::io::Write;

use serde::Serialize;
use tickview_core::{
    format_date, parse_date, render_text, Block, Pipeline, QueryBuilder, RenderOutcome,
};

use crate::cli::{OutputFormat, ShowArgs};
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct ShowOutput<'a> {
    ticker: &'a str,
    start: String,
    end: String,
    source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    outcome: &'a RenderOutcome,
    view: Vec<Block>,
}

pub async fn run(args: &ShowArgs, pipeline: &Pipeline) -> Result<(), CliError> {
    let today = time::OffsetDateTime::now_utc().date();
    let inputs = build_inputs(args, today)?;
    let outcome = pipeline.run(&inputs).await;

    let rendered = render(&inputs, &outcome, pipeline.source_id(), args.format)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Explicit dates on the command line must parse; omitted ones use defaults.
fn build_inputs(args: &ShowArgs, today: time::Date) -> Result<QueryBuilder, CliError> {
    let mut inputs = QueryBuilder::new(today).with_ticker(args.ticker.clone().unwrap_or_default());
    if let Some(start) = &args.start {
        inputs = inputs.with_start_date(parse_date(start)?);
    }
    if let Some(end) = &args.end {
        inputs = inputs.with_end_date(parse_date(end)?);
    }
    Ok(inputs)
}

fn render(
    inputs: &QueryBuilder,
    outcome: &RenderOutcome,
    source: &'static str,
    format: OutputFormat,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Text => Ok(render_text(&outcome.view())),
        OutputFormat::Json => {
            let output = ShowOutput {
                ticker: inputs.ticker(),
                start: format_date(inputs.start_date()),
                end: format_date(inputs.end_date()),
                source,
                message: outcome.message(),
                outcome,
                view: outcome.view(),
            };
            let mut json = serde_json::to_string_pretty(&output)?;
            json.push('\n');
            Ok(json)
        }
    }
}
