//! # evalbook - Loss bookkeeping and evaluation metrics for multi-label models
//!
//! evalbook keeps the per-label loss history of a training run and turns
//! inference results into per-group metrics, summary tables and figures.
//!
//! ## Key Features
//!
//! - **Loss ledger**: batch, running and epoch losses per internal label plus a total
//! - **Best-epoch tracking**: the best validation loss and the epoch it was reached
//! - **Metrics**: macro-averaged ROC/AUC, R² with observed-predicted data, Harrell's C-index
//! - **Reports**: cross-run summary CSV and per-group figures
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use evalbook::evaluator::Evaluator;
//! use evalbook::types::Task;
//!
//! evalbook::logging::init();
//! let evaluator = Evaluator::for_task(Task::Classification);
//! let report = evaluator
//!     .make_metrics("results/sets/2024-01-01-00-00-00/likelihoods/likelihood_weight_epoch-010.csv")
//!     .unwrap();
//! println!("{} groups evaluated", report.whole_metrics.len());
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Evaluation and loss configuration
//! - [`data`] - Prediction table loading
//! - [`error`] - Error types and result handling
//! - [`evaluator`] - Task evaluator and results tree layout
//! - [`logging`] - Logger initialization
//! - [`loss`] - Loss criteria, strategies and the loss ledger
//! - [`metrics`] - Per-label metrics and their aggregation
//! - [`report`] - Summary table and figures
//! - [`types`] - Task, split and phase selectors

pub mod config;
pub mod data;
pub mod error;
pub mod evaluator;
pub mod logging;
pub mod loss;
pub mod metrics;
pub mod report;
pub mod types;

#[cfg(test)]
mod tests;
