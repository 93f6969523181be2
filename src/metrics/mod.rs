pub mod aggregate;
pub mod calculator;
pub mod payload;
pub mod regression;
pub mod roc;
pub mod survival;

pub use aggregate::{cal_group_metrics, cal_whole_metrics};
pub use calculator::LabelMetricsCalculator;
pub use payload::{GroupMetrics, LabelMetrics, MetricsPayload, WholeMetrics};
pub use regression::{RegressionMetrics, YyCalculator};
pub use roc::{macro_average, roc_auc_rank, roc_curve, RocCalculator, RocCurve};
pub use survival::{concordance_index, CIndexCalculator};
