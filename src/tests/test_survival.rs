use crate::data::table::PredictionTable;
use crate::error::EvalError;
use crate::metrics::calculator::LabelMetricsCalculator;
use crate::metrics::survival::{concordance_index, CIndexCalculator};
use ndarray::array;

#[test]
fn test_perfect_concordance() {
    let times = array![1.0, 2.0, 3.0, 4.0];
    let scores = array![1.0, 2.0, 3.0, 4.0];
    let events = array![1.0, 1.0, 1.0, 1.0];
    assert_eq!(concordance_index(times.view(), scores.view(), events.view()).unwrap(), 1.0);

    let reversed = array![4.0, 3.0, 2.0, 1.0];
    assert_eq!(concordance_index(times.view(), reversed.view(), events.view()).unwrap(), 0.0);
}

#[test]
fn test_ties_and_censoring() {
    // comparable: (0,1) (0,2) (1,2); the censored subject 2 never anchors a pair
    let times = array![1.0, 2.0, 2.0];
    let scores = array![1.0, 1.0, 3.0];
    let events = array![1.0, 1.0, 0.0];
    let c = concordance_index(times.view(), scores.view(), events.view()).unwrap();
    assert!((c - 2.5 / 3.0).abs() < 1e-12);
}

#[test]
fn test_no_comparable_pairs() {
    let times = array![1.0, 2.0];
    let scores = array![1.0, 2.0];
    let events = array![0.0, 0.0];
    assert!(matches!(
        concordance_index(times.view(), scores.view(), events.view()),
        Err(EvalError::UndefinedMetric { .. })
    ));
    assert!(concordance_index(times.view(), array![1.0].view(), events.view()).is_err());
}

#[test]
fn test_c_index_calculator_uses_negated_risk() {
    let csv = "\
group,split,periods,label_death,pred_label_death
s,val,1,1,0.9
s,val,2,1,0.5
s,val,3,0,0.1
s,test,1,1,0.1
s,test,2,1,0.5
s,test,3,1,0.9
";
    let table = PredictionTable::from_reader(csv.as_bytes()).unwrap();
    let metrics = CIndexCalculator.cal_label_metrics("label_death", &table.group_view("s")).unwrap();
    assert_eq!(metrics.val().c_index(), Some(1.0));
    assert_eq!(metrics.test().c_index(), Some(0.0));
    assert_eq!(metrics.metrics_kind(), "c_index");
}
