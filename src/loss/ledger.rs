use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::epoch::EpochLoss;
use crate::error::{EvalError, Result};
use crate::types::Phase;

/// Name under which the aggregate over all internal labels is tracked
pub const TOTAL: &str = "total";

/// Loss of one batch, as produced by a batch-loss strategy
#[derive(Debug, Clone, PartialEq)]
pub struct BatchLoss {
    /// Loss per internal label, in any order
    pub per_label: Vec<(String, f64)>,
    /// Sum of the per-label losses
    pub total: f64,
}

impl BatchLoss {
    /// Build from per-label losses; the total is their sum
    pub fn from_labels(per_label: Vec<(String, f64)>) -> Self {
        let total = per_label.iter().map(|(_, loss)| loss).sum();
        BatchLoss { per_label, total }
    }
}

/// Reduces batch losses into per-epoch means for every internal label.
///
/// batch loss -> running loss (sum weighted by batch size) -> epoch loss.
/// `cal_epoch_loss` must run exactly once per phase per epoch, it is the
/// only place running state is cleared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LossLedger {
    internal_labels: Vec<String>,
    epoch_loss: Vec<EpochLoss>,
    total_epoch_loss: EpochLoss,

    #[serde(skip)]
    batch_loss: Vec<Option<f64>>,
    #[serde(skip)]
    batch_total: Option<f64>,
    #[serde(skip)]
    running_loss: Vec<f64>,
    #[serde(skip)]
    running_total: f64,
}

impl LossLedger {
    pub fn new(internal_labels: Vec<String>) -> Result<Self> {
        if internal_labels.is_empty() {
            return Err(EvalError::invalid_parameter(
                "internal_labels",
                "at least one internal label is required",
            ));
        }
        if internal_labels.iter().any(|label| label == TOTAL) {
            return Err(EvalError::invalid_parameter(
                "internal_labels".to_string(),
                format!("'{}' is reserved for the aggregate", TOTAL),
            ));
        }

        let num_labels = internal_labels.len();
        Ok(LossLedger {
            internal_labels,
            epoch_loss: vec![EpochLoss::new(); num_labels],
            total_epoch_loss: EpochLoss::new(),
            batch_loss: vec![None; num_labels],
            batch_total: None,
            running_loss: vec![0.0; num_labels],
            running_total: 0.0,
        })
    }

    pub fn internal_labels(&self) -> &[String] {
        &self.internal_labels
    }

    fn position(&self, label: &str) -> Option<usize> {
        self.internal_labels.iter().position(|name| name == label)
    }

    /// Store the loss of the current batch, replacing the previous one.
    ///
    /// The batch must carry a loss for every internal label.
    pub fn record_batch_loss(&mut self, batch_loss: BatchLoss) -> Result<()> {
        let mut losses = vec![None; self.internal_labels.len()];
        for (label, loss) in batch_loss.per_label {
            let idx = self.position(&label).ok_or_else(|| {
                EvalError::invalid_parameter(
                    "batch_loss".to_string(),
                    format!("unknown internal label '{}'", label),
                )
            })?;
            losses[idx] = Some(loss);
        }
        if let Some(idx) = losses.iter().position(Option::is_none) {
            return Err(EvalError::invalid_parameter(
                "batch_loss".to_string(),
                format!("no loss for internal label '{}'", self.internal_labels[idx]),
            ));
        }
        self.batch_loss = losses;
        self.batch_total = Some(batch_loss.total);
        Ok(())
    }

    /// Loss of the latest batch for `label` (or `"total"`)
    pub fn batch_loss(&self, label: &str) -> Option<f64> {
        if label == TOTAL {
            return self.batch_total;
        }
        self.position(label).and_then(|idx| self.batch_loss[idx])
    }

    /// Running sum of the current epoch for `label` (or `"total"`)
    pub fn running_loss(&self, label: &str) -> Option<f64> {
        if label == TOTAL {
            return Some(self.running_total);
        }
        self.position(label).map(|idx| self.running_loss[idx])
    }

    /// Accumulate the batch loss weighted by `batch_size`.
    ///
    /// Weighting by the batch size keeps the epoch mean exact when the last
    /// batch is smaller than the rest.
    pub fn cal_running_loss(&mut self, batch_size: usize) -> Result<()> {
        for (idx, label) in self.internal_labels.iter().enumerate() {
            let loss = self.batch_loss[idx].ok_or_else(|| {
                EvalError::EmptySequence(format!("no batch loss recorded for '{}'", label))
            })?;
            let weighted = loss * batch_size as f64;
            self.running_loss[idx] += weighted;
            self.running_total += weighted;
        }
        Ok(())
    }

    /// Close `phase` of `epoch`: append epoch means and reset running state.
    ///
    /// The total is the arithmetic mean of the per-label epoch losses, so
    /// every label weighs the same regardless of its scale. On `Val` the best
    /// loss of every label and of the total is re-evaluated.
    pub fn cal_epoch_loss(&mut self, epoch: usize, phase: Phase, dataset_size: usize) -> Result<()> {
        if dataset_size == 0 {
            return Err(EvalError::invalid_parameter("dataset_size", "must be positive"));
        }

        let mut total = 0.0;
        for (idx, epoch_loss) in self.epoch_loss.iter_mut().enumerate() {
            let new_epoch_loss = self.running_loss[idx] / dataset_size as f64;
            epoch_loss.append_epoch_loss(phase, new_epoch_loss);
            total += new_epoch_loss;
        }
        total /= self.internal_labels.len() as f64;
        self.total_epoch_loss.append_epoch_loss(phase, total);

        if phase == Phase::Val {
            for epoch_loss in self.epoch_loss.iter_mut() {
                epoch_loss.update_best_val_loss_epoch(epoch)?;
            }
            self.total_epoch_loss.update_best_val_loss_epoch(epoch)?;
        }

        self.reset_transient();
        Ok(())
    }

    fn reset_transient(&mut self) {
        let num_labels = self.internal_labels.len();
        self.batch_loss = vec![None; num_labels];
        self.batch_total = None;
        self.running_loss = vec![0.0; num_labels];
        self.running_total = 0.0;
    }

    /// Epoch history of `label` (or `"total"`)
    pub fn epoch_loss(&self, label: &str) -> Option<&EpochLoss> {
        if label == TOTAL {
            return Some(&self.total_epoch_loss);
        }
        self.position(label).map(|idx| &self.epoch_loss[idx])
    }

    pub fn total(&self) -> &EpochLoss {
        &self.total_epoch_loss
    }

    /// Log the latest total train/val loss of `epoch` (0-based)
    pub fn print_epoch_loss(&self, num_epochs: usize, epoch: usize) -> Result<()> {
        let train_loss = self.total_epoch_loss.latest_loss(Phase::Train)?;
        let val_loss = self.total_epoch_loss.latest_loss(Phase::Val)?;
        info!("{}", format_epoch_line(num_epochs, epoch, train_loss, val_loss, self.total_epoch_loss.is_updated()));
        Ok(())
    }

    /// Save the epoch histories as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Load epoch histories saved by [`LossLedger::save`]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let mut ledger: LossLedger = serde_json::from_str(&data)?;
        if ledger.epoch_loss.len() != ledger.internal_labels.len() {
            return Err(EvalError::dimension_mismatch(
                format!("{} label histories", ledger.internal_labels.len()),
                format!("{} label histories", ledger.epoch_loss.len()),
            ));
        }
        ledger.reset_transient();
        Ok(ledger)
    }

    /// Write one row per epoch and label (including total) as CSV
    pub fn export_loss_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut w = csv::Writer::from_path(path)?;
        w.write_record(["epoch", "label", "train", "val"])?;

        let histories = self
            .internal_labels
            .iter()
            .map(String::as_str)
            .zip(self.epoch_loss.iter())
            .chain(std::iter::once((TOTAL, &self.total_epoch_loss)));
        for (label, history) in histories {
            let num_epochs = history.train.len().max(history.val.len());
            for epoch in 0..num_epochs {
                w.write_record([
                    (epoch + 1).to_string(),
                    label.to_string(),
                    format_optional(history.train.get(epoch)),
                    format_optional(history.val.get(epoch)),
                ])?;
            }
        }
        w.flush()?;
        Ok(())
    }
}

fn format_optional(value: Option<&f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub(crate) fn format_epoch_line(
    num_epochs: usize,
    epoch: usize,
    train_loss: f64,
    val_loss: f64,
    updated: bool,
) -> String {
    let mut line = format!(
        "epoch [{:>3}/{:<3}], train_loss: {:.4}, val_loss: {:.4}",
        epoch + 1,
        num_epochs,
        train_loss,
        val_loss
    );
    if updated {
        line.push_str("   Updated val_loss!");
    }
    line
}
