use ndarray::ArrayView1;

use super::calculator::{per_split, LabelMetricsCalculator};
use super::payload::{LabelMetrics, MetricsPayload};
use crate::data::table::{GroupView, PERIODS_COLUMN, PRED_PREFIX};
use crate::error::{EvalError, Result};

/// Harrell's concordance index.
///
/// `scores` are predicted survival scores: a higher score means a longer
/// expected time to event. A pair is comparable when the earlier of the two
/// had an event; a censored subject at the same time as an event counts as
/// having outlived it. Tied scores count one half.
pub fn concordance_index(
    event_times: ArrayView1<f64>,
    scores: ArrayView1<f64>,
    event_observed: ArrayView1<f64>,
) -> Result<f64> {
    let n = event_times.len();
    if scores.len() != n || event_observed.len() != n {
        return Err(EvalError::dimension_mismatch(
            format!("{} samples", n),
            format!("{} scores and {} events", scores.len(), event_observed.len()),
        ));
    }

    let died = |i: usize| event_observed[i] != 0.0;
    let mut concordant = 0.0f64;
    let mut comparable = 0usize;
    for i in (0..n).filter(|&i| died(i)) {
        for j in 0..n {
            let outlived = event_times[j] > event_times[i]
                || (event_times[j] == event_times[i] && !died(j));
            if i == j || !outlived {
                continue;
            }
            comparable += 1;
            if scores[i] < scores[j] {
                concordant += 1.0;
            } else if scores[i] == scores[j] {
                concordant += 0.5;
            }
        }
    }

    if comparable == 0 {
        return Err(EvalError::undefined_metric("c_index", "no comparable pairs"));
    }
    Ok(concordant / comparable as f64)
}

/// Concordance index per split from `periods`, predicted risk and events
#[derive(Debug, Clone, Copy, Default)]
pub struct CIndexCalculator;

impl LabelMetricsCalculator for CIndexCalculator {
    fn metrics_kind(&self) -> &'static str {
        "c_index"
    }

    fn cal_label_metrics(&self, label: &str, group: &GroupView<'_>) -> Result<LabelMetrics> {
        let pred_column = format!("{}{}", PRED_PREFIX, label);
        per_split(|split| {
            let periods = group.split_values(PERIODS_COLUMN, split)?;
            let preds = group.split_values(&pred_column, split)?;
            let events = group.split_values(label, split)?;
            // higher risk means an earlier event, so risk is negated into a survival score
            let scores = preds.mapv(|p| -p);
            let c_index = concordance_index(periods.view(), scores.view(), events.view())?;
            Ok(MetricsPayload::Survival { c_index })
        })
    }
}
