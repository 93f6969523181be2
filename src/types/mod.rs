use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{EvalError, Result};

/// Learning task handled by a training run or an evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    Classification,
    Regression,
    #[serde(rename = "deepsurv")]
    DeepSurv,
}

impl Task {
    /// Name of the scalar metric reported in the summary
    pub fn metrics_kind(&self) -> &'static str {
        match self {
            Task::Classification => "auc",
            Task::Regression => "r2",
            Task::DeepSurv => "c_index",
        }
    }

    /// Figure directory / file tag, `None` when the task draws no figure
    pub fn fig_kind(&self) -> Option<&'static str> {
        match self {
            Task::Classification => Some("roc"),
            Task::Regression => Some("yy"),
            Task::DeepSurv => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Classification => "classification",
            Task::Regression => "regression",
            Task::DeepSurv => "deepsurv",
        }
    }
}

impl FromStr for Task {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "classification" => Ok(Task::Classification),
            "regression" => Ok(Task::Regression),
            "deepsurv" => Ok(Task::DeepSurv),
            other => Err(EvalError::InvalidTask(other.to_string())),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dataset partition a prediction row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    /// Splits that carry metrics in the summary, in column order
    pub const EVALUATED: [Split; 2] = [Split::Val, Split::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }
}

impl FromStr for Split {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "train" => Ok(Split::Train),
            "val" => Ok(Split::Val),
            "test" => Ok(Split::Test),
            other => Err(EvalError::invalid_parameter(
                "split".to_string(),
                format!("unknown split '{}'", other),
            )),
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Training phase a loss value was recorded under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Train,
    Val,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Train => "train",
            Phase::Val => "val",
        }
    }
}

impl FromStr for Phase {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "train" => Ok(Phase::Train),
            "val" => Ok(Phase::Val),
            other => Err(EvalError::invalid_parameter(
                "phase".to_string(),
                format!("unknown phase '{}'", other),
            )),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
