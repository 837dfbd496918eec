//! # Tickview Web
//!
//! The Stock Tracker page served with axum.
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /?ticker=&start=&end=` | Page with the sidebar form and one render pass |
//! | `GET /healthz` | Liveness probe |
//! | `GET /static/*` | Stylesheet |
//!
//! Every page request runs the pipeline from the query string alone; the
//! only shared state is the immutable [`AppState`].

mod error;
mod page;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tera::Tera;
use tickview_core::Pipeline;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::WebError;
pub use page::{PageParams, HELP_LINK, PAGE_TITLE};

/// Directory holding `main.css`, resolved at build time.
pub const DEFAULT_STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

const PAGE_TEMPLATE: &str = include_str!("../templates/page.html");

/// Process-wide state, built once at startup.
pub struct AppState {
    pub(crate) pipeline: Pipeline,
    pub(crate) templates: Tera,
    static_dir: PathBuf,
}

impl AppState {
    /// Compile the page template.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::Template`] when the template does not parse.
    pub fn new(pipeline: Pipeline) -> Result<Self, WebError> {
        let mut templates = Tera::default();
        templates.add_raw_template("page.html", PAGE_TEMPLATE)?;
        Ok(Self {
            pipeline,
            templates,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        })
    }

    pub fn with_static_dir(mut self, static_dir: impl Into<PathBuf>) -> Self {
        self.static_dir = static_dir.into();
        self
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.static_dir);
    Router::new()
        .route("/", get(page::page))
        .route("/healthz", get(healthz))
        .nest_service("/static", static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

/// Serve the page until Ctrl-C.
///
/// # Errors
///
/// Returns [`WebError::Bind`] when the address is taken and
/// [`WebError::Server`] when the server loop fails.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<(), WebError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| WebError::Bind { addr, source })?;
    let local_addr = listener.local_addr().map_err(WebError::Server)?;

    info!(
        addr = %local_addr,
        source = state.pipeline.source_id(),
        "stock tracker listening"
    );

    axum::serve(listener, router(Arc::new(state)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(WebError::Server)?;

    info!("stock tracker stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %error, "failed to listen for ctrl-c");
    }
}
