//! Training session state
//!
//! The UI state as an explicit value object: every mutation is a discrete
//! event (file loaded, feature toggled, target chosen, algorithm chosen,
//! submit, response received, error received). Submission outcomes carry a
//! generation token so a stale response can never overwrite newer state.

use crate::backend::{Algorithm, ModelReport, TrainingRequest};
use crate::dataset::Dataset;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Default)]
pub struct TrainingSession {
    raw_csv: Option<String>,
    dataset: Option<Dataset>,
    features: Vec<String>,
    target: Option<String>,
    algorithm: Option<Algorithm>,
    phase: Phase,
    report: Option<ModelReport>,
    error: Option<String>,
    generation: u64,
}

impl TrainingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn raw_csv(&self) -> Option<&str> {
        self.raw_csv.as_deref()
    }

    pub fn selected_features(&self) -> &[String] {
        &self.features
    }

    pub fn is_feature_selected(&self, name: &str) -> bool {
        self.features.iter().any(|f| f == name)
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn algorithm(&self) -> Option<Algorithm> {
        self.algorithm
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }

    pub fn report(&self) -> Option<&ModelReport> {
        self.report.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Record a user-facing error raised outside the submit path, e.g. a
    /// rejected upload.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Replace the dataset wholesale. Selections, results and errors reset;
    /// any in-flight response is orphaned.
    pub fn load_csv(&mut self, text: &str) -> Result<()> {
        match Dataset::parse(text) {
            Ok(dataset) => {
                self.raw_csv = Some(text.to_string());
                self.dataset = Some(dataset);
                self.features.clear();
                self.target = None;
                self.algorithm = None;
                self.report = None;
                self.error = None;
                self.phase = Phase::Idle;
                self.generation += 1;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn toggle_feature(&mut self, name: &str) -> Result<()> {
        let known = self
            .dataset
            .as_ref()
            .map(|d| d.has_column(name))
            .unwrap_or(false);
        if !known {
            return Err(Error::Validation(format!("Unknown column: {}", name)));
        }

        if let Some(pos) = self.features.iter().position(|f| f == name) {
            self.features.remove(pos);
        } else {
            self.features.push(name.to_string());
        }
        Ok(())
    }

    pub fn set_target(&mut self, target: Option<String>) -> Result<()> {
        if let Some(ref name) = target {
            let known = self
                .dataset
                .as_ref()
                .map(|d| d.has_column(name))
                .unwrap_or(false);
            if !known {
                return Err(Error::Validation(format!("Unknown column: {}", name)));
            }
        }
        self.target = target;
        Ok(())
    }

    /// Choosing a different algorithm discards any previous result.
    pub fn set_algorithm(&mut self, algorithm: Option<Algorithm>) {
        if algorithm != self.algorithm {
            self.report = None;
        }
        self.algorithm = algorithm;
    }

    /// Validate the current selections and move to `Submitting`.
    ///
    /// All checks are local and synchronous; a violation stores the
    /// user-facing message, moves to `Failed` and performs no side effect.
    /// On success the returned token must accompany `complete`/`fail`.
    pub fn begin_training(&mut self) -> Result<(TrainingRequest, u64)> {
        if self.phase == Phase::Submitting {
            return Err(Error::Validation(
                "A training request is already in flight.".to_string(),
            ));
        }

        self.report = None;
        self.error = None;

        match self.build_request() {
            Ok(request) => {
                self.phase = Phase::Submitting;
                self.generation += 1;
                Ok((request, self.generation))
            }
            Err(e) => {
                self.phase = Phase::Failed;
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn build_request(&self) -> Result<TrainingRequest> {
        let (csv_data, dataset) = match (&self.raw_csv, &self.dataset) {
            (Some(csv), Some(dataset)) => (csv, dataset),
            _ => {
                return Err(Error::Validation(
                    "Please upload a CSV dataset first.".to_string(),
                ))
            }
        };

        if self.features.is_empty() {
            return Err(Error::Validation(
                "Please select at least one feature column.".to_string(),
            ));
        }

        if self.target.is_none() && self.algorithm != Some(Algorithm::KMeans) {
            return Err(Error::Validation(
                "Please select a target column for regression/classification.".to_string(),
            ));
        }

        let algorithm = match self.algorithm {
            Some(algorithm) => algorithm,
            None => {
                return Err(Error::Validation(
                    "Please select a machine learning algorithm.".to_string(),
                ))
            }
        };

        Ok(TrainingRequest {
            csv_data: csv_data.clone(),
            features: self.features.clone(),
            target: self.target.clone().unwrap_or_default(),
            algorithm,
            original_headers: dataset.headers().to_vec(),
        })
    }

    /// Apply a successful response. Returns false when the token is stale
    /// and the outcome was discarded.
    pub fn complete(&mut self, token: u64, report: ModelReport) -> bool {
        if token != self.generation || self.phase != Phase::Submitting {
            return false;
        }
        self.report = Some(report);
        self.error = None;
        self.phase = Phase::Succeeded;
        true
    }

    /// Apply a failed response. Returns false when the token is stale.
    pub fn fail(&mut self, token: u64, message: String) -> bool {
        if token != self.generation || self.phase != Phase::Submitting {
            return false;
        }
        self.report = None;
        self.error = Some(message);
        self.phase = Phase::Failed;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Plot;
    use std::collections::BTreeMap;

    const SAMPLE_CSV: &str = "age,income,label\n34,52000,1\n41,61000,0\n";

    fn loaded_session() -> TrainingSession {
        let mut session = TrainingSession::new();
        session.load_csv(SAMPLE_CSV).unwrap();
        session
    }

    fn empty_report() -> ModelReport {
        ModelReport {
            metrics: BTreeMap::new(),
            plot: Plot::None,
        }
    }

    #[test]
    fn test_rejects_without_dataset() {
        let mut session = TrainingSession::new();
        let err = session.begin_training().unwrap_err();
        assert_eq!(err.to_string(), "Please upload a CSV dataset first.");
        assert_eq!(session.phase(), Phase::Failed);
        assert_eq!(session.error(), Some("Please upload a CSV dataset first."));
    }

    #[test]
    fn test_rejects_without_features() {
        let mut session = loaded_session();
        let err = session.begin_training().unwrap_err();
        assert_eq!(err.to_string(), "Please select at least one feature column.");
        assert_eq!(session.phase(), Phase::Failed);
    }

    #[test]
    fn test_rejects_without_target_for_supervised() {
        let mut session = loaded_session();
        session.toggle_feature("age").unwrap();
        session.set_algorithm(Some(Algorithm::DecisionTreeClassifier));

        let err = session.begin_training().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please select a target column for regression/classification."
        );
    }

    #[test]
    fn test_target_check_precedes_algorithm_check() {
        // No algorithm chosen at all still complains about the target first.
        let mut session = loaded_session();
        session.toggle_feature("age").unwrap();

        let err = session.begin_training().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please select a target column for regression/classification."
        );
    }

    #[test]
    fn test_rejects_without_algorithm() {
        let mut session = loaded_session();
        session.toggle_feature("age").unwrap();
        session.set_target(Some("label".to_string())).unwrap();

        let err = session.begin_training().unwrap_err();
        assert_eq!(err.to_string(), "Please select a machine learning algorithm.");
    }

    #[test]
    fn test_kmeans_accepts_empty_target() {
        let mut session = loaded_session();
        session.toggle_feature("age").unwrap();
        session.toggle_feature("income").unwrap();
        session.set_algorithm(Some(Algorithm::KMeans));

        let (request, _) = session.begin_training().unwrap();
        assert_eq!(request.target, "");
        assert_eq!(request.features, vec!["age", "income"]);
        assert_eq!(request.original_headers, vec!["age", "income", "label"]);
        assert_eq!(session.phase(), Phase::Submitting);
    }

    #[test]
    fn test_resubmission_gated_while_in_flight() {
        let mut session = loaded_session();
        session.toggle_feature("age").unwrap();
        session.set_algorithm(Some(Algorithm::KMeans));
        session.begin_training().unwrap();

        let err = session.begin_training().unwrap_err();
        assert!(err.to_string().contains("already in flight"));
        assert_eq!(session.phase(), Phase::Submitting);
    }

    #[test]
    fn test_complete_and_fail_round_trip() {
        let mut session = loaded_session();
        session.toggle_feature("age").unwrap();
        session.set_algorithm(Some(Algorithm::KMeans));

        let (_, token) = session.begin_training().unwrap();
        assert!(session.complete(token, empty_report()));
        assert_eq!(session.phase(), Phase::Succeeded);
        assert!(session.report().is_some());

        let (_, token) = session.begin_training().unwrap();
        assert!(session.fail(token, "Model training failed: singular matrix".to_string()));
        assert_eq!(session.phase(), Phase::Failed);
        assert!(session.report().is_none());
        assert!(session.error().unwrap().contains("singular matrix"));
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut session = loaded_session();
        session.toggle_feature("age").unwrap();
        session.set_algorithm(Some(Algorithm::KMeans));
        let (_, token) = session.begin_training().unwrap();

        // A fresh upload supersedes the in-flight request.
        session.load_csv(SAMPLE_CSV).unwrap();

        assert!(!session.complete(token, empty_report()));
        assert!(session.report().is_none());
        assert_eq!(session.phase(), Phase::Idle);

        assert!(!session.fail(token, "too late".to_string()));
        assert!(session.error().is_none());
    }

    #[test]
    fn test_toggle_feature_adds_and_removes() {
        let mut session = loaded_session();
        session.toggle_feature("age").unwrap();
        assert!(session.is_feature_selected("age"));
        session.toggle_feature("age").unwrap();
        assert!(!session.is_feature_selected("age"));

        assert!(session.toggle_feature("nope").is_err());
    }

    #[test]
    fn test_algorithm_change_clears_report() {
        let mut session = loaded_session();
        session.toggle_feature("age").unwrap();
        session.set_algorithm(Some(Algorithm::KMeans));
        let (_, token) = session.begin_training().unwrap();
        session.complete(token, empty_report());

        session.set_algorithm(Some(Algorithm::LinearRegression));
        assert!(session.report().is_none());
    }

    #[test]
    fn test_load_resets_selections() {
        let mut session = loaded_session();
        session.toggle_feature("age").unwrap();
        session.set_target(Some("label".to_string())).unwrap();
        session.set_algorithm(Some(Algorithm::LinearRegression));

        session.load_csv("a,b\n1,2\n").unwrap();
        assert!(session.selected_features().is_empty());
        assert_eq!(session.target(), None);
        assert_eq!(session.algorithm(), None);
    }

    #[test]
    fn test_load_failure_keeps_previous_dataset() {
        let mut session = loaded_session();
        assert!(session.load_csv("   \n").is_err());
        assert!(session.dataset().is_some());
        assert_eq!(session.error(), Some("CSV file is empty."));
    }
}
