use axum::{extract::State, response::Redirect};
use std::sync::Arc;

use ml_workbench_core::Error;

use crate::AppState;

/// Drive one training submission through the gateway.
///
/// The session lock is released while the backend call is in flight; the
/// generation token from `begin_training` decides whether the outcome still
/// applies when it comes back.
pub async fn train(State(state): State<Arc<AppState>>) -> Redirect {
    let (request, token) = {
        let mut session = state.session.lock().unwrap();
        match session.begin_training() {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!("submission rejected: {}", e);
                return Redirect::to("/");
            }
        }
    };

    tracing::info!(
        "submitting {} request with {} features",
        request.algorithm.as_str(),
        request.features.len()
    );

    let outcome = state.client.train(&request).await;

    let mut session = state.session.lock().unwrap();
    match outcome {
        Ok(report) => {
            if session.complete(token, report) {
                let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
                *state.trained_at.lock().unwrap() = Some(now);
                tracing::info!("training succeeded");
            } else {
                tracing::info!("discarded stale training response");
            }
        }
        Err(e) => {
            let message = match &e {
                Error::Training(_) => e.to_string(),
                _ => format!("Failed to communicate with the model backend: {}", e),
            };
            tracing::error!("training failed: {}", e);
            if !session.fail(token, message) {
                tracing::info!("discarded stale training failure");
            }
        }
    }

    Redirect::to("/")
}
