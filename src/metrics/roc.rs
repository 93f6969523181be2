//! ROC curves and AUC for binary and multi-class labels.
//!
//! Multi-class labels are scored one-vs-rest and macro-averaged: every
//! per-class curve is linearly interpolated onto the union of all false
//! positive rates, the true positive rates are averaged class-wise, and the
//! AUC is taken on the averaged curve. Vertical steps of a curve are kept
//! on the common grid rather than collapsed to their top point.

use ndarray::{Array1, ArrayView1};

use super::calculator::{per_split, LabelMetricsCalculator};
use super::payload::{LabelMetrics, MetricsPayload};
use crate::data::table::{GroupView, PRED_PREFIX};
use crate::error::{EvalError, Result};
use crate::types::Split;

/// Class id whose score is used for binary labels
pub const POSITIVE: i64 = 1;

/// Points of a ROC curve, false positive rate ascending
#[derive(Debug, Clone, PartialEq)]
pub struct RocCurve {
    pub fpr: Array1<f64>,
    pub tpr: Array1<f64>,
}

impl RocCurve {
    /// Area under the curve by the trapezoidal rule
    pub fn auc(&self) -> f64 {
        trapezoid(self.fpr.view(), self.tpr.view())
    }
}

/// ROC curve of `scores` against binary ground truth.
///
/// One point per distinct score, highest first, with collinear points in
/// between dropped and `(0, 0)` prepended. Returns `None` when the
/// positives or the negatives are missing.
pub fn roc_curve(y_true: &[bool], scores: &[f64]) -> Option<RocCurve> {
    if y_true.len() != scores.len() || y_true.is_empty() {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    // cumulative counts at each distinct threshold
    let mut tps: Vec<u64> = Vec::new();
    let mut fps: Vec<u64> = Vec::new();
    let (mut tp, mut fp) = (0u64, 0u64);
    for (k, &i) in order.iter().enumerate() {
        if y_true[i] {
            tp += 1;
        } else {
            fp += 1;
        }
        let last_of_threshold = order
            .get(k + 1)
            .map_or(true, |&next| scores[next] != scores[i]);
        if last_of_threshold {
            tps.push(tp);
            fps.push(fp);
        }
    }
    if tp == 0 || fp == 0 {
        return None;
    }

    let n = tps.len();
    let keep = |k: usize| {
        if k == 0 || k + 1 == n {
            return true;
        }
        let second_diff = |v: &[u64]| v[k + 1] as i64 - 2 * v[k] as i64 + v[k - 1] as i64;
        second_diff(fps.as_slice()) != 0 || second_diff(tps.as_slice()) != 0
    };

    let mut fpr = vec![0.0];
    let mut tpr = vec![0.0];
    for k in (0..n).filter(|&k| keep(k)) {
        fpr.push(fps[k] as f64 / fp as f64);
        tpr.push(tps[k] as f64 / tp as f64);
    }
    Some(RocCurve { fpr: Array1::from_vec(fpr), tpr: Array1::from_vec(tpr) })
}

/// Trapezoidal integration of `y` over `x`
pub fn trapezoid(x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    x.windows(2)
        .into_iter()
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[1] + ys[0]) / 2.0)
        .sum()
}

/// Piecewise-linear interpolation of `(xp, fp)` at `x`.
///
/// `xp` must be non-decreasing. Outside the range the end values are
/// returned; on repeated `xp` values the last point wins.
pub fn interp(x: f64, xp: ArrayView1<f64>, fp: ArrayView1<f64>) -> f64 {
    let n = xp.len();
    if n == 0 {
        return f64::NAN;
    }
    if x < xp[0] {
        return fp[0];
    }
    let upper = xp.iter().position(|&v| v > x).unwrap_or(n);
    let j = upper - 1;
    if j + 1 >= n {
        return fp[n - 1];
    }
    let slope = (fp[j + 1] - fp[j]) / (xp[j + 1] - xp[j]);
    fp[j] + slope * (x - xp[j])
}

/// TPR values a curve takes at `x`: every point sitting exactly on `x` in
/// curve order (a vertical run), else the interpolated value
fn tpr_run_at(curve: &RocCurve, x: f64) -> Vec<f64> {
    let run: Vec<f64> = curve
        .fpr
        .iter()
        .zip(curve.tpr.iter())
        .filter(|(f, _)| **f == x)
        .map(|(_, &t)| t)
        .collect();
    if run.is_empty() {
        vec![interp(x, curve.fpr.view(), curve.tpr.view())]
    } else {
        run
    }
}

/// Macro-average of per-class curves onto the union of their FPR values.
///
/// A grid value where some curve rises vertically is repeated as often as
/// the longest such run, so each step is averaged point by point and
/// averaging identical curves gives the curve back.
///
/// On curves with interior vertical steps the AUC therefore differs from a
/// macro-average built with [`interp`] alone, which keeps only the top of
/// each step.
pub fn macro_average(curves: &[RocCurve]) -> Option<RocCurve> {
    if curves.is_empty() {
        return None;
    }

    let mut all_fpr: Vec<f64> = curves.iter().flat_map(|c| c.fpr.iter().copied()).collect();
    all_fpr.sort_by(f64::total_cmp);
    all_fpr.dedup();

    let mut fpr = Vec::with_capacity(all_fpr.len());
    let mut tpr = Vec::with_capacity(all_fpr.len());
    for x in all_fpr {
        let runs: Vec<Vec<f64>> = curves.iter().map(|c| tpr_run_at(c, x)).collect();
        let run_len = runs.iter().map(Vec::len).max().unwrap_or(1);
        for step in 0..run_len {
            let sum: f64 = runs.iter().map(|run| run[step.min(run.len() - 1)]).sum();
            fpr.push(x);
            tpr.push(sum / curves.len() as f64);
        }
    }

    Some(RocCurve { fpr: Array1::from_vec(fpr), tpr: Array1::from_vec(tpr) })
}

/// AUC as the probability that a positive outranks a negative, ties
/// counting one half. Returns `None` when one class is missing.
pub fn roc_auc_rank(y_true: &[bool], scores: &[f64]) -> Option<f64> {
    let n = scores.len();
    if n == 0 || y_true.len() != n {
        return None;
    }
    let mut items: Vec<(f64, bool)> = scores.iter().copied().zip(y_true.iter().copied()).collect();
    items.sort_by(|a, b| a.0.total_cmp(&b.0));

    let num_pos = items.iter().filter(|(_, y)| *y).count() as f64;
    let num_neg = n as f64 - num_pos;
    if num_pos == 0.0 || num_neg == 0.0 {
        return None;
    }

    let mut auc_num = 0.0f64;
    let mut neg_cum = 0.0f64;
    let mut i = 0;
    while i < n {
        let s = items[i].0;
        let mut j = i;
        let mut pos_sum = 0.0f64;
        let mut neg_sum = 0.0f64;
        while j < n && items[j].0 == s {
            if items[j].1 {
                pos_sum += 1.0;
            } else {
                neg_sum += 1.0;
            }
            j += 1;
        }
        auc_num += pos_sum * neg_cum + 0.5 * pos_sum * neg_sum;
        neg_cum += neg_sum;
        i = j;
    }
    Some(auc_num / (num_pos * num_neg))
}

/// ROC / AUC per split, binary or one-vs-rest macro-averaged
#[derive(Debug, Clone, Copy, Default)]
pub struct RocCalculator;

impl RocCalculator {
    fn split_roc_binary(&self, label: &str, group: &GroupView<'_>, split: Split) -> Result<RocCurve> {
        let positive_pred = format!("{}{}_{}", PRED_PREFIX, label, POSITIVE);
        let y_true = group.split_values(label, split)?;
        let y_score = group.split_values(&positive_pred, split)?;
        if let Some(bad) = y_true.iter().find(|&&y| y != 0.0 && y != 1.0) {
            return Err(EvalError::invalid_parameter(
                label.to_string(),
                format!("binary label expects 0 or 1, found {}", bad),
            ));
        }
        let positives: Vec<bool> = y_true.iter().map(|&y| y == 1.0).collect();
        let scores = y_score.to_vec();
        roc_curve(&positives, &scores).ok_or_else(|| EvalError::degenerate(label, split.as_str()))
    }

    fn split_roc_multi(
        &self,
        label: &str,
        group: &GroupView<'_>,
        split: Split,
        classes: &[(&str, i64)],
    ) -> Result<RocCurve> {
        let y_true = group.split_values(label, split)?;
        let mut curves = Vec::with_capacity(classes.len());
        for &(pred_column, class) in classes {
            let y_score = group.split_values(pred_column, split)?;
            let one_vs_rest: Vec<bool> = y_true.iter().map(|&y| y == class as f64).collect();
            let curve = roc_curve(&one_vs_rest, &y_score.to_vec())
                .ok_or_else(|| EvalError::degenerate(label, split.as_str()))?;
            curves.push(curve);
        }
        macro_average(&curves).ok_or_else(|| EvalError::degenerate(label, split.as_str()))
    }
}

impl LabelMetricsCalculator for RocCalculator {
    fn metrics_kind(&self) -> &'static str {
        "auc"
    }

    fn cal_label_metrics(&self, label: &str, group: &GroupView<'_>) -> Result<LabelMetrics> {
        let classes = group.table().class_pred_columns(label);
        let is_multi_class = classes.len() > 2;

        per_split(|split| {
            let curve = if is_multi_class {
                self.split_roc_multi(label, group, split, &classes)?
            } else {
                self.split_roc_binary(label, group, split)?
            };
            let auc = curve.auc();
            Ok(MetricsPayload::Roc { fpr: curve.fpr, tpr: curve.tpr, auc })
        })
    }
}
