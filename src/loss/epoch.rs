use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};
use crate::types::Phase;

/// Per-epoch loss history of one internal label (or of the total).
///
/// Both sequences are indexed by 0-based epoch; `best_epoch` is 1-based.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpochLoss {
    pub train: Vec<f64>,
    pub val: Vec<f64>,
    best_val_loss: Option<f64>,
    best_epoch: Option<usize>,
    #[serde(skip)]
    update_flag: bool,
}

impl EpochLoss {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the epoch loss of `phase`
    pub fn append_epoch_loss(&mut self, phase: Phase, new_epoch_loss: f64) {
        self.history_mut(phase).push(new_epoch_loss);
    }

    /// Most recent epoch loss of `phase`
    pub fn latest_loss(&self, phase: Phase) -> Result<f64> {
        self.history(phase).last().copied().ok_or_else(|| {
            EvalError::EmptySequence(format!("no {} loss recorded yet", phase))
        })
    }

    pub fn history(&self, phase: Phase) -> &[f64] {
        match phase {
            Phase::Train => &self.train,
            Phase::Val => &self.val,
        }
    }

    fn history_mut(&mut self, phase: Phase) -> &mut Vec<f64> {
        match phase {
            Phase::Train => &mut self.train,
            Phase::Val => &mut self.val,
        }
    }

    pub fn best_val_loss(&self) -> Option<f64> {
        self.best_val_loss
    }

    /// 1-based epoch at which `best_val_loss` was observed
    pub fn best_epoch(&self) -> Option<usize> {
        self.best_epoch
    }

    /// Whether the last val epoch improved on the best loss
    pub fn is_updated(&self) -> bool {
        self.update_flag
    }

    /// Compare the latest val loss against the best so far.
    ///
    /// Epoch 0 takes the latest val loss as best without comparison. Later
    /// epochs replace it only when strictly lower, so the first occurrence
    /// of a minimum keeps its epoch.
    pub fn update_best_val_loss_epoch(&mut self, epoch: usize) -> Result<()> {
        let latest_val_loss = self.latest_loss(Phase::Val)?;
        match self.best_val_loss {
            Some(best) if epoch > 0 => {
                if latest_val_loss < best {
                    self.record_best(latest_val_loss, epoch);
                } else {
                    self.update_flag = false;
                }
            }
            _ => self.record_best(latest_val_loss, epoch),
        }
        Ok(())
    }

    fn record_best(&mut self, loss: f64, epoch: usize) {
        self.best_val_loss = Some(loss);
        self.best_epoch = Some(epoch + 1);
        self.update_flag = true;
    }
}
