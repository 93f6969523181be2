pub mod criterion;
pub mod epoch;
pub mod ledger;
pub mod registry;
pub mod strategy;

pub use criterion::Criterion;
pub use epoch::EpochLoss;
pub use ledger::{BatchLoss, LossLedger, TOTAL};
pub use registry::{create_loss_registry, LossRegistry};
pub use strategy::{BatchLossStrategy, ClassificationLoss, DeepSurvLoss, LossInput, RegressionLoss};
