//! Wire types for the training backend

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Algorithms the backend knows how to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    LinearRegression,
    DecisionTreeRegressor,
    DecisionTreeClassifier,
    KMeans,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::LinearRegression,
        Algorithm::DecisionTreeRegressor,
        Algorithm::DecisionTreeClassifier,
        Algorithm::KMeans,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::LinearRegression => "LinearRegression",
            Algorithm::DecisionTreeRegressor => "DecisionTreeRegressor",
            Algorithm::DecisionTreeClassifier => "DecisionTreeClassifier",
            Algorithm::KMeans => "KMeans",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Algorithm::LinearRegression => "Linear Regression",
            Algorithm::DecisionTreeRegressor => "Decision Tree Regressor",
            Algorithm::DecisionTreeClassifier => "Decision Tree Classifier",
            Algorithm::KMeans => "K-Means Clustering",
        }
    }

    /// Clustering is the only mode that fits without a target column.
    pub fn needs_target(&self) -> bool {
        !matches!(self, Algorithm::KMeans)
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| Error::Validation(format!("Unknown algorithm: {}", s)))
    }
}

/// One submission to `POST /train_model`.
///
/// `target` is the empty string when no target applies (clustering).
#[derive(Debug, Clone, Serialize)]
pub struct TrainingRequest {
    pub csv_data: String,
    pub features: Vec<String>,
    pub target: String,
    pub algorithm: Algorithm,
    pub original_headers: Vec<String>,
}

/// The backend response as it arrives: a loosely-typed bag of optional
/// fields. An `error` field marks failure; everything else is success.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTrainingResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub metrics: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub plot_type: Option<String>,
    #[serde(default)]
    pub plot_data: Option<serde_json::Value>,
    #[serde(default)]
    pub plot_labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScatterPoint {
    #[serde(rename = "true")]
    pub actual: f64,
    pub predicted: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConfusionCells {
    #[serde(rename = "tp")]
    pub true_positives: i64,
    #[serde(rename = "fn")]
    pub false_negatives: i64,
    #[serde(rename = "fp")]
    pub false_positives: i64,
    #[serde(rename = "tn")]
    pub true_negatives: i64,
}

/// Binary targets come back as named cells; anything else is the raw
/// row-major matrix.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConfusionMatrix {
    Binary(ConfusionCells),
    Grid(Vec<Vec<i64>>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClusterPoint {
    pub x: f64,
    pub y: f64,
    pub cluster: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterPlot {
    pub points: Vec<ClusterPoint>,
    pub labels: [String; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSeries {
    pub id: i64,
    pub points: Vec<ClusterPoint>,
}

impl ClusterPlot {
    /// Points grouped by cluster id, ascending. One series per distinct id.
    pub fn series(&self) -> Vec<ClusterSeries> {
        let mut ids: Vec<i64> = self.points.iter().map(|p| p.cluster).collect();
        ids.sort_unstable();
        ids.dedup();

        ids.into_iter()
            .map(|id| ClusterSeries {
                id,
                points: self
                    .points
                    .iter()
                    .filter(|p| p.cluster == id)
                    .cloned()
                    .collect(),
            })
            .collect()
    }
}

/// Display result, keyed by `plot_type` so rendering is exhaustive.
#[derive(Debug, Clone, PartialEq)]
pub enum Plot {
    Scatter(Vec<ScatterPoint>),
    ConfusionMatrix(ConfusionMatrix),
    Cluster(ClusterPlot),
    None,
}

/// A normalized, display-ready training result.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReport {
    pub metrics: BTreeMap<String, f64>,
    pub plot: Plot,
}

impl ModelReport {
    /// Normalize a success response. The caller has already peeled off the
    /// `error` field; a `plot_data` payload that does not match its declared
    /// `plot_type` is a parse error, not a silent empty plot.
    pub fn from_raw(raw: RawTrainingResponse) -> Result<Self> {
        let metrics = raw.metrics.unwrap_or_default();

        let plot = match raw.plot_type.as_deref() {
            Some("scatter") => {
                let data = raw.plot_data.unwrap_or_else(|| serde_json::json!([]));
                Plot::Scatter(serde_json::from_value(data)?)
            }
            Some("confusion_matrix") => {
                let data = raw.plot_data.ok_or_else(|| {
                    Error::Backend("confusion_matrix response without plot_data".to_string())
                })?;
                Plot::ConfusionMatrix(serde_json::from_value(data)?)
            }
            Some("cluster") => {
                let data = raw.plot_data.unwrap_or_else(|| serde_json::json!([]));
                let points: Vec<ClusterPoint> = serde_json::from_value(data)?;
                let labels = match raw.plot_labels.as_deref() {
                    Some([x, y, ..]) => [x.clone(), y.clone()],
                    _ => ["Feature 1".to_string(), "Feature 2".to_string()],
                };
                Plot::Cluster(ClusterPlot { points, labels })
            }
            _ => Plot::None,
        };

        Ok(Self { metrics, plot })
    }
}

/// Metric values render with four decimal places, always.
pub fn format_metric(value: f64) -> String {
    format!("{:.4}", value)
}
