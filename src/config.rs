//! Evaluation and loss configuration, loadable from JSON.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{EvalError, Result};
use crate::loss::criterion::Criterion;
use crate::loss::registry::{create_loss_registry, LossRegistry};
use crate::types::Task;

fn default_render_figures() -> bool {
    true
}

/// Read a JSON config; an unrecognized `task` fails as `InvalidTask`
fn read_json_config<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let json = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&json)?;
    if let Some(name) = value.get("task").and_then(serde_json::Value::as_str) {
        name.parse::<Task>()?;
    }
    Ok(serde_json::from_value(value)?)
}

/// How a likelihood file is evaluated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    pub task: Task,
    /// Overrides the summary location derived from the results tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_path: Option<PathBuf>,
    #[serde(default = "default_render_figures")]
    pub render_figures: bool,
}

impl EvalConfig {
    pub fn new(task: Task) -> Self {
        EvalConfig {
            task,
            summary_path: None,
            render_figures: true,
        }
    }

    pub fn builder() -> EvalConfigBuilder {
        EvalConfigBuilder::new()
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        read_json_config(path)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Builder for [`EvalConfig`]
#[derive(Debug, Clone, Default)]
pub struct EvalConfigBuilder {
    task: Option<Task>,
    summary_path: Option<PathBuf>,
    render_figures: Option<bool>,
}

impl EvalConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task(mut self, task: Task) -> Self {
        self.task = Some(task);
        self
    }

    /// Parse the task from its name (`classification`, `regression`, `deepsurv`)
    pub fn task_name(mut self, name: &str) -> Result<Self> {
        self.task = Some(name.parse()?);
        Ok(self)
    }

    pub fn summary_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.summary_path = Some(path.into());
        self
    }

    pub fn render_figures(mut self, render: bool) -> Self {
        self.render_figures = Some(render);
        self
    }

    pub fn build(self) -> Result<EvalConfig> {
        let task = self.task.ok_or_else(|| EvalError::InvalidParameter {
            name: "task".to_string(),
            reason: "Task not specified".to_string(),
        })?;
        Ok(EvalConfig {
            task,
            summary_path: self.summary_path,
            render_figures: self.render_figures.unwrap_or(true),
        })
    }
}

/// Loss bookkeeping setup of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossConfig {
    pub task: Task,
    pub criterion: Criterion,
    pub internal_labels: Vec<String>,
}

impl LossConfig {
    pub fn new(task: Task, criterion: Criterion, internal_labels: Vec<String>) -> Self {
        LossConfig {
            task,
            criterion,
            internal_labels,
        }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        read_json_config(path)
    }

    pub fn build_registry(&self) -> Result<LossRegistry> {
        create_loss_registry(self.task, self.criterion, self.internal_labels.clone())
    }
}
