use axum::{
    routing::{get, post},
    Router,
};
use std::sync::{Arc, Mutex};
use tower_http::{services::ServeDir, trace::TraceLayer};

use ml_workbench_core::{TrainingClient, TrainingSession};

mod chart;
mod routes;

pub struct AppState {
    pub session: Mutex<TrainingSession>,
    pub client: TrainingClient,
    pub trained_at: Mutex<Option<String>>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let client = TrainingClient::from_env().expect("Failed to create backend client");
    tracing::info!("training backend at {}", client.base_url());

    let state = Arc::new(AppState {
        session: Mutex::new(TrainingSession::new()),
        client,
        trained_at: Mutex::new(None),
    });

    let app = Router::new()
        .route("/", get(routes::index))
        .route("/upload", post(routes::upload))
        .route("/features/toggle", post(routes::toggle_feature))
        .route("/target", post(routes::select_target))
        .route("/algorithm", post(routes::select_algorithm))
        .route("/train", post(routes::train::train))
        .route("/health", get(routes::health))
        .nest_service("/static", ServeDir::new("crates/web/static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = std::env::var("ML_WEB_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap();

    println!("Server running at http://{}", addr);

    axum::serve(listener, app).await.unwrap();
}
