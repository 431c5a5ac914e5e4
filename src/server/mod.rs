//! Prediction API and artifact server
//!
//! ## Endpoints
//!
//! - `GET /health` - Liveness check
//! - `GET /features` - Feature importance table
//! - `POST /predict` - Score one sample (JSON object)
//! - `POST /predict/batch` - Score every row of a CSV body
//! - `GET /recommendations` - Most influential feature with advice
//! - `GET /analytics/correlation` - Correlation nodes from the last report run
//! - `GET /analytics/distributions` - Per-feature histogram bins
//! - `GET /analytics/quality-dist` - Target value counts
//! - `GET /static/plots/{file}` - Read-only report artifacts

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod types;

pub use error::*;
pub use types::*;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;

use crate::model::{LinearModel, Predictor};
use crate::report::AnalyticsSummary;

/// Application context shared across handlers.
///
/// Built once at startup and never mutated. A dependency that failed to load
/// keeps its error message so dependent routes answer 500 while `/health`
/// stays up.
#[derive(Clone)]
pub struct AppState {
    predictor: Result<Arc<dyn Predictor>, String>,
    analytics: Result<Arc<AnalyticsSummary>, String>,
    plots_dir: Arc<PathBuf>,
}

impl AppState {
    /// State with nothing loaded; every model or analytics route fails.
    pub fn new(plots_dir: impl Into<PathBuf>) -> Self {
        Self {
            predictor: Err("Model not loaded".to_string()),
            analytics: Err("Analytics summary not loaded".to_string()),
            plots_dir: Arc::new(plots_dir.into()),
        }
    }

    #[must_use]
    pub fn with_predictor(mut self, predictor: impl Predictor + 'static) -> Self {
        let predictor: Arc<dyn Predictor> = Arc::new(predictor);
        self.predictor = Ok(predictor);
        self
    }

    #[must_use]
    pub fn with_analytics(mut self, analytics: AnalyticsSummary) -> Self {
        self.analytics = Ok(Arc::new(analytics));
        self
    }

    /// Load the model and analytics files, recording failures instead of
    /// aborting startup.
    pub fn load(model_path: &Path, analytics_path: &Path, plots_dir: &Path) -> Self {
        let mut state = Self::new(plots_dir);

        match LinearModel::load(model_path) {
            Ok(model) => {
                tracing::info!(
                    path = %model_path.display(),
                    features = model.features.len(),
                    r_squared = model.metadata.r_squared,
                    "model loaded"
                );
                state = state.with_predictor(model);
            }
            Err(e) => {
                tracing::warn!(path = %model_path.display(), error = %e, "model unavailable");
                state.predictor = Err(format!("Model unavailable: {e}"));
            }
        }

        match AnalyticsSummary::load(analytics_path) {
            Ok(summary) => {
                tracing::info!(
                    path = %analytics_path.display(),
                    features = summary.distributions.len(),
                    "analytics summary loaded"
                );
                state = state.with_analytics(summary);
            }
            Err(e) => {
                tracing::warn!(path = %analytics_path.display(), error = %e, "analytics summary unavailable");
                state.analytics = Err(format!("Analytics summary unavailable: {e:#}"));
            }
        }

        state
    }

    pub fn predictor(&self) -> Result<&Arc<dyn Predictor>, ApiError> {
        self.predictor
            .as_ref()
            .map_err(|msg| ApiError::Internal(msg.clone()))
    }

    pub fn analytics(&self) -> Result<&AnalyticsSummary, ApiError> {
        self.analytics
            .as_deref()
            .map_err(|msg| ApiError::Internal(msg.clone()))
    }

    pub fn plots_dir(&self) -> &Path {
        &self.plots_dir
    }
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/features", get(handlers::features_handler))
        .route("/predict", post(handlers::predict_handler))
        .route("/predict/batch", post(handlers::batch_predict_handler))
        .route("/recommendations", get(handlers::recommendations_handler))
        .route("/analytics/correlation", get(handlers::correlation_handler))
        .route("/analytics/distributions", get(handlers::distributions_handler))
        .route(
            "/analytics/quality-dist",
            get(handlers::quality_distribution_handler),
        )
        .route("/static/plots/:name", get(handlers::static_plot_handler))
        .layer(from_fn(middleware::cors_middleware))
        .layer(from_fn(middleware::trace_middleware))
        .with_state(state)
}
