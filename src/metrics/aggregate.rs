use log::debug;

use super::calculator::LabelMetricsCalculator;
use super::payload::{GroupMetrics, WholeMetrics};
use crate::data::table::{GroupView, PredictionTable};
use crate::error::Result;

/// Metrics of every label of one group, labels in column order
pub fn cal_group_metrics(
    calculator: &dyn LabelMetricsCalculator,
    group: &GroupView<'_>,
) -> Result<GroupMetrics> {
    let mut group_metrics = GroupMetrics::new();
    for label in group.table().label_columns() {
        let label_metrics = calculator.cal_label_metrics(label, group)?;
        debug!(
            "{} / {}: val_{kind}={:.4} test_{kind}={:.4}",
            group.group(),
            label,
            label_metrics.val().value(),
            label_metrics.test().value(),
            kind = calculator.metrics_kind(),
        );
        group_metrics.insert(label.to_string(), label_metrics);
    }
    Ok(group_metrics)
}

/// Metrics of every group, groups in order of first appearance
pub fn cal_whole_metrics(
    calculator: &dyn LabelMetricsCalculator,
    table: &PredictionTable,
) -> Result<WholeMetrics> {
    let mut whole_metrics = WholeMetrics::new();
    for group in table.groups() {
        let view = table.group_view(group);
        whole_metrics.insert(group.to_string(), cal_group_metrics(calculator, &view)?);
    }
    Ok(whole_metrics)
}
