use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};
use crate::types::Split;

/// Metrics of one label on one split, shaped by the task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricsPayload {
    /// ROC curve points and the area under them
    Roc {
        fpr: Array1<f64>,
        tpr: Array1<f64>,
        auc: f64,
    },
    /// Observed / predicted values and the coefficient of determination
    Regression {
        y_obs: Array1<f64>,
        y_pred: Array1<f64>,
        r2: f64,
    },
    /// Concordance index
    Survival { c_index: f64 },
}

impl MetricsPayload {
    /// The scalar reported in the summary
    pub fn value(&self) -> f64 {
        match self {
            MetricsPayload::Roc { auc, .. } => *auc,
            MetricsPayload::Regression { r2, .. } => *r2,
            MetricsPayload::Survival { c_index } => *c_index,
        }
    }

    /// Summary name of the scalar
    pub fn metrics_kind(&self) -> &'static str {
        match self {
            MetricsPayload::Roc { .. } => "auc",
            MetricsPayload::Regression { .. } => "r2",
            MetricsPayload::Survival { .. } => "c_index",
        }
    }

    pub fn auc(&self) -> Option<f64> {
        match self {
            MetricsPayload::Roc { auc, .. } => Some(*auc),
            _ => None,
        }
    }

    /// `(fpr, tpr)` of a ROC payload
    pub fn roc(&self) -> Option<(&Array1<f64>, &Array1<f64>)> {
        match self {
            MetricsPayload::Roc { fpr, tpr, .. } => Some((fpr, tpr)),
            _ => None,
        }
    }

    pub fn r2(&self) -> Option<f64> {
        match self {
            MetricsPayload::Regression { r2, .. } => Some(*r2),
            _ => None,
        }
    }

    /// `(y_obs, y_pred)` of a regression payload
    pub fn yy(&self) -> Option<(&Array1<f64>, &Array1<f64>)> {
        match self {
            MetricsPayload::Regression { y_obs, y_pred, .. } => Some((y_obs, y_pred)),
            _ => None,
        }
    }

    pub fn c_index(&self) -> Option<f64> {
        match self {
            MetricsPayload::Survival { c_index } => Some(*c_index),
            _ => None,
        }
    }
}

/// Metrics of one label for the `val` and `test` splits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelMetrics {
    val: MetricsPayload,
    test: MetricsPayload,
}

impl LabelMetrics {
    /// Both payloads must be of the same kind
    pub fn new(val: MetricsPayload, test: MetricsPayload) -> Result<Self> {
        if val.metrics_kind() != test.metrics_kind() {
            return Err(EvalError::invalid_parameter(
                "label_metrics".to_string(),
                format!("val is {} but test is {}", val.metrics_kind(), test.metrics_kind()),
            ));
        }
        Ok(LabelMetrics { val, test })
    }

    pub fn val(&self) -> &MetricsPayload {
        &self.val
    }

    pub fn test(&self) -> &MetricsPayload {
        &self.test
    }

    /// Payload of `split`; there is none for `train`
    pub fn get(&self, split: Split) -> Option<&MetricsPayload> {
        match split {
            Split::Val => Some(&self.val),
            Split::Test => Some(&self.test),
            Split::Train => None,
        }
    }

    pub fn metrics_kind(&self) -> &'static str {
        self.val.metrics_kind()
    }
}

/// Metrics of every label of one group, in label column order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupMetrics {
    labels: Vec<(String, LabelMetrics)>,
}

impl GroupMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: String, metrics: LabelMetrics) {
        self.labels.push((label, metrics));
    }

    pub fn get(&self, label: &str) -> Option<&LabelMetrics> {
        self.labels.iter().find(|(name, _)| name == label).map(|(_, m)| m)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LabelMetrics)> {
        self.labels.iter().map(|(name, m)| (name.as_str(), m))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Metrics of every group, in order of first appearance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WholeMetrics {
    groups: Vec<(String, GroupMetrics)>,
}

impl WholeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, group: String, metrics: GroupMetrics) {
        self.groups.push((group, metrics));
    }

    pub fn get(&self, group: &str) -> Option<&GroupMetrics> {
        self.groups.iter().find(|(name, _)| name == group).map(|(_, m)| m)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GroupMetrics)> {
        self.groups.iter().map(|(name, m)| (name.as_str(), m))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
