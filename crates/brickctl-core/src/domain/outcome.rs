//! Reconciliation outcomes
//!
//! Every use-case run ends in exactly one [`ReconciliationOutcome`], built
//! fresh and returned to the caller unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::newtypes::DatasetPath;
use super::property::WireProperties;

/// Why a reconciliation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Not enough space for the requested reservation or quota
    Capacity,
    /// Destroy refused because the dataset has descendants
    RequiresRecursive,
    /// The operation needs a dataset that does not exist
    Absent,
    /// Any other store failure
    Other,
}

/// Terminal state of a dataset after a reconciliation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetState {
    Absent,
    PresentUnchanged,
    PresentCreated,
    PresentModified,
    Destroyed,
    Failed(FailureKind),
}

impl DatasetState {
    /// Value recorded under `details.outcome`, `None` for failures.
    #[must_use]
    pub fn outcome_label(&self) -> Option<&'static str> {
        match self {
            DatasetState::Absent => Some("absent"),
            DatasetState::PresentUnchanged => Some("unchanged"),
            DatasetState::PresentCreated => Some("created"),
            DatasetState::PresentModified => Some("modified"),
            DatasetState::Destroyed => Some("destroyed"),
            DatasetState::Failed(_) => None,
        }
    }

    fn changes_state(&self) -> bool {
        matches!(
            self,
            DatasetState::PresentCreated | DatasetState::PresentModified | DatasetState::Destroyed
        )
    }
}

/// The result of one reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationOutcome {
    pub path: DatasetPath,
    pub state: DatasetState,
    pub succeeded: bool,
    pub changed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub details: Map<String, Value>,
}

impl ReconciliationOutcome {
    /// A successful outcome in `state`. `changed` follows from the state.
    #[must_use]
    pub fn new(path: DatasetPath, state: DatasetState) -> Self {
        let mut details = Map::new();
        if let Some(label) = state.outcome_label() {
            details.insert("outcome".to_string(), Value::from(label));
        }
        Self {
            path,
            succeeded: !matches!(state, DatasetState::Failed(_)),
            changed: state.changes_state(),
            state,
            error: None,
            details,
        }
    }

    /// A failed outcome. Failures never report a change.
    #[must_use]
    pub fn failed(path: DatasetPath, kind: FailureKind, error: impl Into<String>) -> Self {
        let mut outcome = Self::new(path, DatasetState::Failed(kind));
        outcome.error = Some(error.into());
        outcome
    }

    #[must_use]
    pub fn created(path: DatasetPath, properties: &WireProperties) -> Self {
        Self::new(path, DatasetState::PresentCreated)
            .with_detail("properties", properties_value(properties))
    }

    #[must_use]
    pub fn modified(path: DatasetPath, updates: &WireProperties) -> Self {
        Self::new(path, DatasetState::PresentModified)
            .with_detail("updates", properties_value(updates))
    }

    #[must_use]
    pub fn unchanged(path: DatasetPath) -> Self {
        Self::new(path, DatasetState::PresentUnchanged)
    }

    /// Dataset already absent; nothing to do.
    #[must_use]
    pub fn absent(path: DatasetPath) -> Self {
        Self::new(path, DatasetState::Absent).with_detail("dataset_absent", Value::Bool(true))
    }

    /// Dataset removed, along with `destroyed` in the order they went.
    #[must_use]
    pub fn destroyed(path: DatasetPath, destroyed: &[DatasetPath]) -> Self {
        Self::new(path, DatasetState::Destroyed)
            .with_detail("destroyed", paths_value(destroyed))
    }

    /// Attach a detail entry.
    #[must_use]
    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    /// Human-readable one-line summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let path = &self.path;
        match self.state {
            DatasetState::PresentCreated => format!("Created dataset {path}"),
            DatasetState::PresentModified => format!("Modified properties on dataset {path}"),
            DatasetState::PresentUnchanged => format!("No changes made to dataset {path}"),
            DatasetState::Destroyed => format!("Destroyed dataset {path}"),
            DatasetState::Absent => format!("No changes to already absent dataset {path}"),
            DatasetState::Failed(_) => self
                .error
                .clone()
                .unwrap_or_else(|| format!("Failed to reconcile dataset {path}")),
        }
    }
}

/// Wire properties as a JSON object.
pub(crate) fn properties_value(properties: &WireProperties) -> Value {
    Value::Object(
        properties
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
            .collect(),
    )
}

/// Dataset paths as a JSON array of strings.
pub(crate) fn paths_value(paths: &[DatasetPath]) -> Value {
    Value::Array(paths.iter().map(|p| Value::from(p.as_str())).collect())
}
