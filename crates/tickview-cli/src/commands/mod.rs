mod serve;
mod show;

use std::sync::Arc;

use tickview_core::{
    AppConfig, HttpClient, Pipeline, PipelineOptions, ReqwestHttpClient, SyntheticYahooClient,
    YahooAdapter,
};

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli, config: &AppConfig) -> Result<(), CliError> {
    let pipeline = build_pipeline(cli.fixture, config);

    match &cli.command {
        Command::Serve(_) => serve::run(pipeline, config).await,
        Command::Show(args) => show::run(args, &pipeline).await,
    }
}

fn build_pipeline(fixture: bool, config: &AppConfig) -> Pipeline {
    let http_client: Arc<dyn HttpClient> = if fixture {
        Arc::new(SyntheticYahooClient::new())
    } else {
        Arc::new(ReqwestHttpClient::new(&config.user_agent))
    };
    let adapter = YahooAdapter::new(http_client).with_timeout_ms(config.timeout_ms);

    Pipeline::new(Arc::new(adapter)).with_options(PipelineOptions {
        live_quote: config.live_quote,
    })
}
