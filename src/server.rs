//! HTTP surface: the analysis endpoint and the static application shell.
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /api/analysis` | `200` [`AnalysisReport`](crate::models::AnalysisReport) or `500 {error}` |
//! | any other `/api` path | `404 {error}` |
//! | everything else | files from the public directory, falling back to `index.html` |

use crate::api::Summarizer;
use crate::config::AppConfig;
use crate::extract::AnalysisExtractor;
use crate::feeds::FeedFetcher;
use crate::pipeline::run_analysis;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument};

/// Shared, read-only state for all requests.
pub struct AppState<S> {
    pub config: AppConfig,
    pub fetcher: FeedFetcher,
    pub summarizer: S,
    pub extractor: Box<dyn AnalysisExtractor>,
}

/// Build the application router.
pub fn create_router<S>(state: Arc<AppState<S>>, public_dir: &Path) -> Router
where
    S: Summarizer + 'static,
{
    let index = public_dir.join("index.html");
    let shell = ServeDir::new(public_dir).fallback(ServeFile::new(index));

    Router::new()
        .route("/api/analysis", get(analysis_handler::<S>))
        .route("/api", get(api_not_found))
        .route("/api/*rest", get(api_not_found))
        .fallback_service(shell)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn analysis_handler<S>(State(state): State<Arc<AppState<S>>>) -> Response
where
    S: Summarizer + 'static,
{
    match run_analysis(&state.config, &state.fetcher, &state.summarizer).await {
        Ok(run) => {
            let report = run.into_report(state.extractor.as_ref());
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Error in analysis API");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to generate analysis" })),
            )
                .into_response()
        }
    }
}

async fn api_not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}

/// Bind `addr` and serve until the process is stopped.
#[instrument(level = "info", skip_all, fields(%addr, public_dir = %public_dir.display()))]
pub async fn serve<S>(
    state: Arc<AppState<S>>,
    addr: SocketAddr,
    public_dir: PathBuf,
) -> std::io::Result<()>
where
    S: Summarizer + 'static,
{
    let app = create_router(state, &public_dir);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}
