use super::payload::{LabelMetrics, MetricsPayload};
use crate::data::table::GroupView;
use crate::error::Result;
use crate::types::Split;

/// Task-specific metrics of one label within one group
pub trait LabelMetricsCalculator: Send + Sync {
    /// Summary name of the scalar metric (`auc`, `r2`, `c_index`)
    fn metrics_kind(&self) -> &'static str;

    /// Metrics of `label` for the `val` and `test` rows of `group`
    fn cal_label_metrics(&self, label: &str, group: &GroupView<'_>) -> Result<LabelMetrics>;
}

/// Run `f` for `val` then `test` and pair the payloads
pub(crate) fn per_split<F>(mut f: F) -> Result<LabelMetrics>
where
    F: FnMut(Split) -> Result<MetricsPayload>,
{
    let val = f(Split::Val)?;
    let test = f(Split::Test)?;
    LabelMetrics::new(val, test)
}
