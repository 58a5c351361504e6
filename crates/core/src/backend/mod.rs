//! HTTP gateway to the external model-training service

mod client;
mod types;

pub use client::TrainingClient;
pub use types::*;
