use tickview_core::{AppConfig, Pipeline};
use tickview_web::AppState;

use crate::error::CliError;

pub async fn run(pipeline: Pipeline, config: &AppConfig) -> Result<(), CliError> {
    let state = AppState::new(pipeline)?;
    tickview_web::serve(state, config.bind).await?;
    Ok(())
}
