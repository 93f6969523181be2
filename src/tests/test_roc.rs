use crate::data::table::PredictionTable;
use crate::error::EvalError;
use crate::metrics::calculator::LabelMetricsCalculator;
use crate::metrics::roc::{interp, macro_average, roc_auc_rank, roc_curve, RocCalculator, RocCurve};
use ndarray::array;

fn classic_curve() -> RocCurve {
    roc_curve(&[false, false, true, true], &[0.1, 0.4, 0.35, 0.8]).unwrap()
}

#[test]
fn test_roc_curve_points() {
    let curve = classic_curve();
    assert_eq!(curve.fpr, array![0.0, 0.0, 0.5, 0.5, 1.0]);
    assert_eq!(curve.tpr, array![0.0, 0.5, 0.5, 1.0, 1.0]);
    assert!((curve.auc() - 0.75).abs() < 1e-12);
}

#[test]
fn test_collinear_points_dropped() {
    // tied scores collapse into one threshold; the straight run is dropped
    let curve = roc_curve(
        &[true, false, true, false, true, false],
        &[0.9, 0.9, 0.5, 0.5, 0.1, 0.1],
    )
    .unwrap();
    assert_eq!(curve.fpr.len(), 3);
    assert_eq!(curve.fpr[0], 0.0);
    assert_eq!(curve.fpr[2], 1.0);
    assert!((curve.fpr[1] - 1.0 / 3.0).abs() < 1e-12);
    assert!((curve.auc() - 0.5).abs() < 1e-12);
}

#[test]
fn test_single_class_is_degenerate() {
    assert!(roc_curve(&[true, true], &[0.2, 0.7]).is_none());
    assert!(roc_curve(&[false, false], &[0.2, 0.7]).is_none());
    assert!(roc_auc_rank(&[true, true], &[0.2, 0.7]).is_none());
}

#[test]
fn test_curve_auc_matches_rank_auc() {
    let y = [true, false, true, true, false, false, true, false];
    let s = [0.9, 0.8, 0.8, 0.55, 0.5, 0.3, 0.3, 0.1];
    let curve_auc = roc_curve(&y, &s).unwrap().auc();
    let rank_auc = roc_auc_rank(&y, &s).unwrap();
    assert!((curve_auc - rank_auc).abs() < 1e-12);
}

#[test]
fn test_interp_repeated_xp_last_wins() {
    let xp = array![0.0, 0.0, 0.5, 1.0];
    let fp = array![0.0, 0.4, 0.8, 1.0];
    assert_eq!(interp(0.0, xp.view(), fp.view()), 0.4);
    assert!((interp(0.25, xp.view(), fp.view()) - 0.6).abs() < 1e-12);
    assert_eq!(interp(2.0, xp.view(), fp.view()), 1.0);
    assert_eq!(interp(-1.0, xp.view(), fp.view()), 0.0);
}

#[test]
fn test_macro_of_identical_curves() {
    let curve = classic_curve();
    let macro_curve = macro_average(&[curve.clone(), curve.clone(), curve.clone()]).unwrap();
    assert_eq!(macro_curve, curve);
    assert!((macro_curve.auc() - curve.auc()).abs() < 1e-12);
}

#[test]
fn test_macro_of_different_curves() {
    let diagonal = RocCurve { fpr: array![0.0, 1.0], tpr: array![0.0, 1.0] };
    let perfect = RocCurve { fpr: array![0.0, 0.0, 1.0], tpr: array![0.0, 1.0, 1.0] };
    let macro_curve = macro_average(&[diagonal, perfect]).unwrap();
    assert_eq!(macro_curve.fpr, array![0.0, 0.0, 1.0]);
    assert_eq!(macro_curve.tpr, array![0.0, 0.5, 1.0]);
    assert!((macro_curve.auc() - 0.75).abs() < 1e-12);
    assert!(macro_average(&[]).is_none());
}

const BINARY_CSV: &str = "\
group,split,label_a,pred_label_a_0,pred_label_a_1
g1,val,0,0.9,0.1
g1,val,0,0.6,0.4
g1,val,1,0.65,0.35
g1,val,1,0.2,0.8
g1,test,0,0.8,0.2
g1,test,1,0.1,0.9
g1,train,1,0.5,0.5
";

#[test]
fn test_binary_calculator() {
    let table = PredictionTable::from_reader(BINARY_CSV.as_bytes()).unwrap();
    let view = table.group_view("g1");
    let metrics = RocCalculator.cal_label_metrics("label_a", &view).unwrap();
    assert!((metrics.val().value() - 0.75).abs() < 1e-12);
    assert!((metrics.test().value() - 1.0).abs() < 1e-12);
    assert_eq!(metrics.metrics_kind(), "auc");
}

#[test]
fn test_binary_calculator_degenerate_split() {
    let csv = "\
group,split,label_a,pred_label_a_0,pred_label_a_1
g1,val,1,0.9,0.1
g1,val,1,0.6,0.4
g1,test,0,0.8,0.2
g1,test,1,0.1,0.9
";
    let table = PredictionTable::from_reader(csv.as_bytes()).unwrap();
    let err = RocCalculator
        .cal_label_metrics("label_a", &table.group_view("g1"))
        .unwrap_err();
    match err {
        EvalError::DegenerateLabelSet { label, split } => {
            assert_eq!(label, "label_a");
            assert_eq!(split, "val");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_binary_calculator_rejects_class_ids() {
    let csv = "\
group,split,label_a,pred_label_a_0,pred_label_a_1
g1,val,2,0.9,0.1
g1,val,0,0.6,0.4
g1,test,0,0.8,0.2
g1,test,1,0.1,0.9
";
    let table = PredictionTable::from_reader(csv.as_bytes()).unwrap();
    assert!(matches!(
        RocCalculator.cal_label_metrics("label_a", &table.group_view("g1")),
        Err(EvalError::InvalidParameter { .. })
    ));
}

#[test]
fn test_multi_class_calculator() {
    // every class is perfectly separated by its own score column
    let csv = "\
group,split,label_m,pred_label_m_0,pred_label_m_1,pred_label_m_2
g,val,0,0.8,0.1,0.1
g,val,1,0.1,0.8,0.1
g,val,2,0.1,0.1,0.8
g,test,0,0.7,0.2,0.1
g,test,1,0.2,0.7,0.1
g,test,2,0.2,0.1,0.7
";
    let table = PredictionTable::from_reader(csv.as_bytes()).unwrap();
    let metrics = RocCalculator.cal_label_metrics("label_m", &table.group_view("g")).unwrap();
    assert!((metrics.val().value() - 1.0).abs() < 1e-12);
    assert!((metrics.test().value() - 1.0).abs() < 1e-12);
    let (fpr, tpr) = metrics.val().roc().unwrap();
    assert_eq!(fpr.len(), tpr.len());
}

#[test]
fn test_multi_class_missing_class_in_test_split() {
    let csv = "\
group,split,label_m,pred_label_m_0,pred_label_m_1,pred_label_m_2
g,val,0,0.8,0.1,0.1
g,val,1,0.1,0.8,0.1
g,val,2,0.1,0.1,0.8
g,test,0,0.7,0.2,0.1
g,test,1,0.2,0.7,0.1
g,test,1,0.3,0.6,0.1
";
    let table = PredictionTable::from_reader(csv.as_bytes()).unwrap();
    match RocCalculator.cal_label_metrics("label_m", &table.group_view("g")) {
        Err(EvalError::DegenerateLabelSet { label, split }) => {
            assert_eq!(label, "label_m");
            assert_eq!(split, "test");
        }
        other => panic!("unexpected result: {:?}", other.map(|m| m.metrics_kind())),
    }
}
