use log::debug;
use ndarray::ArrayView1;

use super::calculator::{per_split, LabelMetricsCalculator};
use super::payload::{LabelMetrics, MetricsPayload};
use crate::data::table::{GroupView, PRED_PREFIX};
use crate::error::{EvalError, Result};

/// Regression metrics
pub struct RegressionMetrics;

impl RegressionMetrics {
    /// Root Mean Squared Error
    pub fn rmse(predictions: ArrayView1<f64>, targets: ArrayView1<f64>) -> f64 {
        let diff = &predictions - &targets;
        diff.mapv(|e| e * e).mean().unwrap_or(f64::NAN).sqrt()
    }

    /// Mean Absolute Error
    pub fn mae(predictions: ArrayView1<f64>, targets: ArrayView1<f64>) -> f64 {
        (&predictions - &targets).mapv(f64::abs).mean().unwrap_or(f64::NAN)
    }

    /// R-squared (coefficient of determination), `1 - SS_res / SS_tot`.
    ///
    /// Undefined when the targets are constant or empty.
    pub fn r_squared(predictions: ArrayView1<f64>, targets: ArrayView1<f64>) -> Result<f64> {
        if predictions.len() != targets.len() {
            return Err(EvalError::dimension_mismatch(
                format!("{} predictions", targets.len()),
                format!("{} predictions", predictions.len()),
            ));
        }
        let mean_target = targets
            .mean()
            .ok_or_else(|| EvalError::undefined_metric("r2", "no samples"))?;
        let ss_tot = targets.mapv(|t| (t - mean_target).powi(2)).sum();
        if ss_tot == 0.0 {
            return Err(EvalError::undefined_metric("r2", "ground truth is constant"));
        }
        let ss_res = (&predictions - &targets).mapv(|e| e.powi(2)).sum();

        Ok(1.0 - (ss_res / ss_tot))
    }
}

/// Observed-vs-predicted values and R² per split
#[derive(Debug, Clone, Copy, Default)]
pub struct YyCalculator;

impl LabelMetricsCalculator for YyCalculator {
    fn metrics_kind(&self) -> &'static str {
        "r2"
    }

    fn cal_label_metrics(&self, label: &str, group: &GroupView<'_>) -> Result<LabelMetrics> {
        let pred_column = format!("{}{}", PRED_PREFIX, label);
        per_split(|split| {
            let y_obs = group.split_values(label, split)?;
            let y_pred = group.split_values(&pred_column, split)?;
            let r2 = RegressionMetrics::r_squared(y_pred.view(), y_obs.view()).map_err(|err| match err {
                EvalError::UndefinedMetric { metric, reason } => EvalError::UndefinedMetric {
                    metric,
                    reason: format!("{} ({} / {} / {})", reason, group.group(), label, split),
                },
                other => other,
            })?;
            debug!(
                "{} / {} / {}: r2={:.4} rmse={:.4} mae={:.4}",
                group.group(),
                label,
                split,
                r2,
                RegressionMetrics::rmse(y_pred.view(), y_obs.view()),
                RegressionMetrics::mae(y_pred.view(), y_obs.view()),
            );
            Ok(MetricsPayload::Regression { y_obs, y_pred, r2 })
        })
    }
}
