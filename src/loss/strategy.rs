use log::debug;
use ndarray::{Array1, Array2, ArrayView1};
use std::collections::HashMap;

use super::criterion::Criterion;
use super::ledger::BatchLoss;
use crate::error::{EvalError, Result};

/// Model outputs and targets of one batch, keyed by internal label
pub struct LossInput<'a> {
    /// `batch x outputs` per internal label
    pub outputs: &'a HashMap<String, Array2<f32>>,
    /// Targets per internal label (class indices or values)
    pub labels: &'a HashMap<String, Array1<f32>>,
    /// Time-to-event, only used by survival losses
    pub periods: Option<ArrayView1<'a, f32>>,
}

impl<'a> LossInput<'a> {
    pub fn new(
        outputs: &'a HashMap<String, Array2<f32>>,
        labels: &'a HashMap<String, Array1<f32>>,
    ) -> Self {
        LossInput { outputs, labels, periods: None }
    }

    pub fn with_periods(mut self, periods: ArrayView1<'a, f32>) -> Self {
        self.periods = Some(periods);
        self
    }

    fn pair(&self, label: &str) -> Result<(&'a Array2<f32>, &'a Array1<f32>)> {
        let output = self.outputs.get(label).ok_or_else(|| {
            EvalError::invalid_parameter("outputs".to_string(), format!("no output for '{}'", label))
        })?;
        let target = self.labels.get(label).ok_or_else(|| {
            EvalError::invalid_parameter("labels".to_string(), format!("no target for '{}'", label))
        })?;
        Ok((output, target))
    }
}

/// Task-specific computation of one batch's loss
pub trait BatchLossStrategy: Send + Sync {
    fn cal_batch_loss(&self, internal_labels: &[String], batch: &LossInput<'_>) -> Result<BatchLoss>;
}

/// One criterion term per label on class scores, summed into the total
pub struct ClassificationLoss {
    criterion: Criterion,
}

impl ClassificationLoss {
    pub fn new(criterion: Criterion) -> Result<Self> {
        if !criterion.is_classification() {
            return Err(EvalError::invalid_parameter(
                "criterion".to_string(),
                format!("{} is not a classification criterion", criterion),
            ));
        }
        Ok(ClassificationLoss { criterion })
    }
}

impl BatchLossStrategy for ClassificationLoss {
    fn cal_batch_loss(&self, internal_labels: &[String], batch: &LossInput<'_>) -> Result<BatchLoss> {
        let mut per_label = Vec::with_capacity(internal_labels.len());
        for label in internal_labels {
            let (output, target) = batch.pair(label)?;
            let loss = self.criterion.class_loss(output.view(), target.view())?;
            per_label.push((label.clone(), loss as f64));
        }
        Ok(BatchLoss::from_labels(per_label))
    }
}

/// Same as classification, with outputs flattened to one value per sample
pub struct RegressionLoss {
    criterion: Criterion,
}

impl RegressionLoss {
    pub fn new(criterion: Criterion) -> Result<Self> {
        if criterion.is_classification() {
            return Err(EvalError::invalid_parameter(
                "criterion".to_string(),
                format!("{} is not a regression criterion", criterion),
            ));
        }
        Ok(RegressionLoss { criterion })
    }
}

impl BatchLossStrategy for RegressionLoss {
    fn cal_batch_loss(&self, internal_labels: &[String], batch: &LossInput<'_>) -> Result<BatchLoss> {
        let mut per_label = Vec::with_capacity(internal_labels.len());
        for label in internal_labels {
            let (output, target) = batch.pair(label)?;
            let flat: Array1<f32> = output.iter().copied().collect();
            let loss = self.criterion.value_loss(flat.view(), target.view())?;
            per_label.push((label.clone(), loss as f64));
        }
        Ok(BatchLoss::from_labels(per_label))
    }
}

/// Negative Cox partial log-likelihood over a single internal label.
///
/// The output is the predicted log-risk, the target the event indicator.
/// Risk sets are taken over the batch (Breslow, ties share a risk set).
pub struct DeepSurvLoss;

impl BatchLossStrategy for DeepSurvLoss {
    fn cal_batch_loss(&self, internal_labels: &[String], batch: &LossInput<'_>) -> Result<BatchLoss> {
        let label = match internal_labels {
            [label] => label,
            _ => {
                return Err(EvalError::invalid_parameter(
                    "internal_labels".to_string(),
                    format!("deepsurv expects one internal label, got {}", internal_labels.len()),
                ))
            }
        };
        let periods = batch.periods.ok_or_else(|| {
            EvalError::invalid_parameter("periods", "deepsurv loss requires periods")
        })?;
        let (output, events) = batch.pair(label)?;
        let risk: Vec<f64> = output.iter().map(|&r| r as f64).collect();
        if risk.len() != events.len() || risk.len() != periods.len() {
            return Err(EvalError::dimension_mismatch(
                format!("{} samples", risk.len()),
                format!("{} events and {} periods", events.len(), periods.len()),
            ));
        }

        let mut log_lik = 0.0f64;
        let mut num_events = 0usize;
        for i in 0..risk.len() {
            if events[i] < 0.5 {
                continue;
            }
            // log-sum-exp over the risk set of sample i
            let at_risk = (0..risk.len()).filter(|&j| periods[j] >= periods[i]);
            let max = at_risk.clone().map(|j| risk[j]).fold(f64::NEG_INFINITY, f64::max);
            let log_risk_set = at_risk.map(|j| (risk[j] - max).exp()).sum::<f64>().ln() + max;
            log_lik += risk[i] - log_risk_set;
            num_events += 1;
        }

        let loss = if num_events == 0 {
            debug!("batch without events, deepsurv loss is zero");
            0.0
        } else {
            -log_lik / num_events as f64
        };
        Ok(BatchLoss::from_labels(vec![(label.clone(), loss)]))
    }
}
