use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Form, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use ml_workbench_core::backend::{format_metric, ModelReport, Plot};
use ml_workbench_core::Algorithm;

use crate::chart::{ClusterView, ConfusionView, ScatterView};
use crate::AppState;

pub mod train;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub error: Option<String>,
    pub submitting: bool,
    pub dataset: Option<DatasetView>,
    pub results: Option<ResultsView>,
}

pub struct DatasetView {
    pub headers: Vec<HeaderView>,
    pub target: String,
    pub algorithms: Vec<AlgorithmOption>,
    pub preview: Vec<Vec<String>>,
    pub row_count: usize,
    pub can_train: bool,
}

pub struct HeaderView {
    pub name: String,
    pub selected: bool,
}

pub struct AlgorithmOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

pub struct ResultsView {
    pub metrics: Vec<MetricRow>,
    pub trained_at: String,
    pub scatter: Option<ScatterView>,
    pub confusion: Option<ConfusionView>,
    pub cluster: Option<ClusterView>,
}

pub struct MetricRow {
    pub name: String,
    pub value: String,
}

pub fn build_results(report: &ModelReport, trained_at: Option<String>) -> ResultsView {
    let metrics = report
        .metrics
        .iter()
        .map(|(name, value)| MetricRow {
            name: name.clone(),
            value: format_metric(*value),
        })
        .collect();

    let (scatter, confusion, cluster) = match &report.plot {
        Plot::Scatter(points) => (Some(ScatterView::build(points)), None, None),
        Plot::ConfusionMatrix(matrix) => (None, Some(ConfusionView::build(matrix)), None),
        Plot::Cluster(plot) => (None, None, Some(ClusterView::build(plot))),
        Plot::None => (None, None, None),
    };

    ResultsView {
        metrics,
        trained_at: trained_at.unwrap_or_default(),
        scatter,
        confusion,
        cluster,
    }
}

pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.session.lock().unwrap();
    let trained_at = state.trained_at.lock().unwrap().clone();

    let dataset = session.dataset().map(|d| {
        let algorithm = session.algorithm();
        let can_train = !session.selected_features().is_empty()
            && algorithm.is_some()
            && (session.target().is_some() || algorithm == Some(Algorithm::KMeans));

        DatasetView {
            headers: d
                .headers()
                .iter()
                .map(|h| HeaderView {
                    name: h.clone(),
                    selected: session.is_feature_selected(h),
                })
                .collect(),
            target: session.target().unwrap_or("").to_string(),
            algorithms: Algorithm::ALL
                .iter()
                .map(|a| AlgorithmOption {
                    value: a.as_str().to_string(),
                    label: a.display_name().to_string(),
                    selected: algorithm == Some(*a),
                })
                .collect(),
            preview: d.preview(5).to_vec(),
            row_count: d.row_count(),
            can_train,
        }
    });

    let results = session
        .report()
        .map(|report| build_results(report, trained_at));

    IndexTemplate {
        title: "ML Workbench".to_string(),
        error: session.error().map(str::to_string),
        submitting: session.is_submitting(),
        dataset,
        results,
    }
}

#[derive(Deserialize)]
pub struct UploadRequest {
    pub filename: String,
    pub content_type: String,
    pub content: String,
}

pub async fn upload(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UploadRequest>,
) -> StatusCode {
    let is_csv =
        req.content_type == "text/csv" || req.filename.to_ascii_lowercase().ends_with(".csv");

    let mut session = state.session.lock().unwrap();
    if !is_csv {
        tracing::warn!("rejected non-CSV upload: {}", req.filename);
        session.set_error("Please upload a CSV file.");
        return StatusCode::UNSUPPORTED_MEDIA_TYPE;
    }

    match session.load_csv(&req.content) {
        Ok(()) => {
            tracing::info!(
                "loaded {} ({} rows)",
                req.filename,
                session.dataset().map(|d| d.row_count()).unwrap_or(0)
            );
            *state.trained_at.lock().unwrap() = None;
            StatusCode::OK
        }
        Err(e) => {
            tracing::warn!("rejected upload {}: {}", req.filename, e);
            StatusCode::BAD_REQUEST
        }
    }
}

#[derive(Deserialize)]
pub struct FeatureForm {
    pub name: String,
}

pub async fn toggle_feature(
    State(state): State<Arc<AppState>>,
    Form(form): Form<FeatureForm>,
) -> Redirect {
    let mut session = state.session.lock().unwrap();
    if let Err(e) = session.toggle_feature(&form.name) {
        tracing::warn!("feature toggle rejected: {}", e);
    }
    Redirect::to("/")
}

#[derive(Deserialize)]
pub struct TargetForm {
    pub target: String,
}

pub async fn select_target(
    State(state): State<Arc<AppState>>,
    Form(form): Form<TargetForm>,
) -> Redirect {
    let target = if form.target.is_empty() {
        None
    } else {
        Some(form.target)
    };

    let mut session = state.session.lock().unwrap();
    if let Err(e) = session.set_target(target) {
        tracing::warn!("target selection rejected: {}", e);
    }
    Redirect::to("/")
}

#[derive(Deserialize)]
pub struct AlgorithmForm {
    pub algorithm: String,
}

pub async fn select_algorithm(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AlgorithmForm>,
) -> Redirect {
    let mut session = state.session.lock().unwrap();
    if form.algorithm.is_empty() {
        session.set_algorithm(None);
    } else {
        match form.algorithm.parse::<Algorithm>() {
            Ok(algorithm) => session.set_algorithm(Some(algorithm)),
            Err(e) => tracing::warn!("algorithm selection rejected: {}", e),
        }
    }
    Redirect::to("/")
}

pub async fn health() -> &'static str {
    "OK"
}
