use ndarray::{ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{EvalError, Result};

/// Loss criterion applied per internal label, always with mean reduction.
///
/// `CrossEntropy` and `Nll` score class outputs (`batch x classes`) against
/// class indices; `Mse`, `Rmse` and `Mae` score flat outputs against values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Criterion {
    #[serde(rename = "CEL")]
    CrossEntropy,
    #[serde(rename = "NLL")]
    Nll,
    #[serde(rename = "MSE")]
    Mse,
    #[serde(rename = "RMSE")]
    Rmse,
    #[serde(rename = "MAE")]
    Mae,
}

impl Criterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::CrossEntropy => "CEL",
            Criterion::Nll => "NLL",
            Criterion::Mse => "MSE",
            Criterion::Rmse => "RMSE",
            Criterion::Mae => "MAE",
        }
    }

    /// Whether the criterion consumes class scores rather than values
    pub fn is_classification(&self) -> bool {
        matches!(self, Criterion::CrossEntropy | Criterion::Nll)
    }

    /// Loss of class outputs (logits for CEL, log-probabilities for NLL)
    pub fn class_loss(&self, output: ArrayView2<f32>, target: ArrayView1<f32>) -> Result<f32> {
        if !self.is_classification() {
            return Err(EvalError::invalid_parameter(
                "criterion".to_string(),
                format!("{} does not score class outputs", self),
            ));
        }
        let (batch_size, num_classes) = output.dim();
        check_batch(batch_size, target.len())?;

        let mut total_loss = 0.0f64;
        for (row, &t) in output.axis_iter(Axis(0)).zip(target.iter()) {
            let class = class_index(t, num_classes)?;
            let log_prob = match self {
                Criterion::CrossEntropy => {
                    let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                    let log_sum_exp = row.iter().map(|&x| (x - max).exp()).sum::<f32>().ln() + max;
                    row[class] - log_sum_exp
                }
                _ => row[class],
            };
            total_loss -= log_prob as f64;
        }
        Ok((total_loss / batch_size as f64) as f32)
    }

    /// Loss of flat regression outputs
    pub fn value_loss(&self, output: ArrayView1<f32>, target: ArrayView1<f32>) -> Result<f32> {
        if self.is_classification() {
            return Err(EvalError::invalid_parameter(
                "criterion".to_string(),
                format!("{} does not score regression outputs", self),
            ));
        }
        check_batch(output.len(), target.len())?;

        let diff = &output - &target;
        let n = output.len() as f32;
        let loss = match self {
            Criterion::Mse => diff.mapv(|e| e * e).sum() / n,
            Criterion::Rmse => (diff.mapv(|e| e * e).sum() / n).sqrt(),
            _ => diff.mapv(f32::abs).sum() / n,
        };
        Ok(loss)
    }
}

fn check_batch(outputs: usize, targets: usize) -> Result<()> {
    if outputs == 0 {
        return Err(EvalError::invalid_parameter("batch", "batch is empty"));
    }
    if outputs != targets {
        return Err(EvalError::dimension_mismatch(
            format!("{} targets", outputs),
            format!("{} targets", targets),
        ));
    }
    Ok(())
}

fn class_index(target: f32, num_classes: usize) -> Result<usize> {
    if target < 0.0 || target.fract() != 0.0 || target as usize >= num_classes {
        return Err(EvalError::invalid_parameter(
            "target".to_string(),
            format!("{} is not a class index below {}", target, num_classes),
        ));
    }
    Ok(target as usize)
}

impl FromStr for Criterion {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CEL" => Ok(Criterion::CrossEntropy),
            "NLL" => Ok(Criterion::Nll),
            "MSE" => Ok(Criterion::Mse),
            "RMSE" => Ok(Criterion::Rmse),
            "MAE" => Ok(Criterion::Mae),
            other => Err(EvalError::invalid_parameter(
                "criterion".to_string(),
                format!("unknown criterion '{}'", other),
            )),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
