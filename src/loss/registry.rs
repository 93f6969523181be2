use super::criterion::Criterion;
use super::ledger::LossLedger;
use super::strategy::{BatchLossStrategy, ClassificationLoss, DeepSurvLoss, LossInput, RegressionLoss};
use crate::error::Result;
use crate::types::{Phase, Task};

/// Loss bookkeeping for a training run: the ledger state plus the
/// task-specific strategy that fills it batch by batch.
pub struct LossRegistry {
    ledger: LossLedger,
    strategy: Box<dyn BatchLossStrategy>,
}

impl LossRegistry {
    pub fn new(ledger: LossLedger, strategy: Box<dyn BatchLossStrategy>) -> Self {
        LossRegistry { ledger, strategy }
    }

    /// Compute and store the loss of the current batch
    pub fn cal_batch_loss(&mut self, batch: &LossInput<'_>) -> Result<()> {
        let batch_loss = self.strategy.cal_batch_loss(self.ledger.internal_labels(), batch)?;
        self.ledger.record_batch_loss(batch_loss)
    }

    pub fn cal_running_loss(&mut self, batch_size: usize) -> Result<()> {
        self.ledger.cal_running_loss(batch_size)
    }

    pub fn cal_epoch_loss(&mut self, epoch: usize, phase: Phase, dataset_size: usize) -> Result<()> {
        self.ledger.cal_epoch_loss(epoch, phase, dataset_size)
    }

    pub fn print_epoch_loss(&self, num_epochs: usize, epoch: usize) -> Result<()> {
        self.ledger.print_epoch_loss(num_epochs, epoch)
    }

    pub fn ledger(&self) -> &LossLedger {
        &self.ledger
    }

    /// Hand the ledger over once training ends
    pub fn into_ledger(self) -> LossLedger {
        self.ledger
    }
}

/// Build the loss registry for `task`
pub fn create_loss_registry(
    task: Task,
    criterion: Criterion,
    internal_labels: Vec<String>,
) -> Result<LossRegistry> {
    let strategy: Box<dyn BatchLossStrategy> = match task {
        Task::Classification => Box::new(ClassificationLoss::new(criterion)?),
        Task::Regression => Box::new(RegressionLoss::new(criterion)?),
        Task::DeepSurv => Box::new(DeepSurvLoss),
    };
    Ok(LossRegistry::new(LossLedger::new(internal_labels)?, strategy))
}
