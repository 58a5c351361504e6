//! ML Workbench Core Library
//!
//! CSV dataset intake, training-session state, and the HTTP gateway to the
//! external model-training backend. Model fitting itself happens in that
//! backend; this crate owns everything up to and back from the wire.

pub mod backend;
pub mod dataset;
pub mod error;
pub mod session;

pub use backend::{Algorithm, ModelReport, Plot, TrainingClient, TrainingRequest};
pub use dataset::Dataset;
pub use error::{Error, Result};
pub use session::{Phase, TrainingSession};
