use crate::metrics::payload::{GroupMetrics, LabelMetrics, MetricsPayload, WholeMetrics};
use crate::report::figure::{
    diagonal_extent, figure_path, make_save_fig, FigureRenderer, RocFigure, SeriesStyle, YyFigure,
};
use ndarray::array;
use std::path::Path;
use tempfile::tempdir;

fn yy_metrics() -> GroupMetrics {
    let val = MetricsPayload::Regression {
        y_obs: array![0.0, 50.0, 100.0],
        y_pred: array![10.0, 40.0, 90.0],
        r2: 0.9,
    };
    let test = MetricsPayload::Regression {
        y_obs: array![3.0, 3.0],
        y_pred: array![3.0, 3.0],
        r2: 1.0,
    };
    let mut group_metrics = GroupMetrics::new();
    group_metrics.insert("label_size".to_string(), LabelMetrics::new(val, test).unwrap());
    group_metrics
}

fn roc_metrics() -> GroupMetrics {
    let payload = |auc| MetricsPayload::Roc {
        fpr: array![0.0, 0.0, 1.0],
        tpr: array![0.0, 1.0, 1.0],
        auc,
    };
    let mut group_metrics = GroupMetrics::new();
    group_metrics.insert(
        "label_cancer".to_string(),
        LabelMetrics::new(payload(1.0), payload(0.875)).unwrap(),
    );
    group_metrics
}

#[test]
fn test_diagonal_padding() {
    let (lo, hi) = diagonal_extent(&array![0.0, 100.0], &array![20.0, 50.0]);
    assert!((lo + 1.0).abs() < 1e-12);
    assert!((hi - 101.0).abs() < 1e-12);

    // constant data gives a zero-length diagonal
    assert_eq!(diagonal_extent(&array![3.0, 3.0], &array![3.0]), (3.0, 3.0));
}

#[test]
fn test_yy_panels() {
    let figure = YyFigure.plot_group("g1", &yy_metrics()).unwrap();
    assert_eq!(figure.fig_kind, "yy");
    assert_eq!(figure.panels.len(), 2);

    let val_panel = &figure.panels[0];
    assert_eq!(val_panel.title, "g1: label_size val: Observed-Predicted Plot");
    assert_eq!(val_panel.x_label, "Observed");
    assert_eq!(val_panel.y_label, "Predicted");
    assert_eq!(val_panel.series[0].style, SeriesStyle::Scatter);
    assert_eq!(val_panel.series[0].points.len(), 3);
    assert_eq!(val_panel.series[1].points, vec![(-1.0, -1.0), (101.0, 101.0)]);

    let test_panel = &figure.panels[1];
    assert_eq!(test_panel.series[1].points, vec![(3.0, 3.0), (3.0, 3.0)]);
    let ((x_min, x_max), _) = test_panel.bounds();
    assert!(x_min < x_max);
}

#[test]
fn test_roc_panels() {
    let figure = RocFigure.plot_group("g1", &roc_metrics()).unwrap();
    assert_eq!(figure.panels.len(), 1);
    let panel = &figure.panels[0];
    assert_eq!(panel.title, "g1: label_cancer");
    assert_eq!(panel.x_label, "1 - Specificity");
    assert_eq!(panel.y_label, "Sensitivity");
    assert_eq!(panel.series[0].name, "AUC_val = 1.00");
    assert_eq!(panel.series[1].name, "AUC_test = 0.88");
}

#[test]
fn test_renderer_rejects_wrong_payload() {
    assert!(RocFigure.plot_group("g1", &yy_metrics()).is_err());
    assert!(YyFigure.plot_group("g1", &roc_metrics()).is_err());
}

#[test]
fn test_figure_file_naming() {
    let path = figure_path(Path::new("run/roc"), "g1", "roc", "weight_epoch-010");
    assert_eq!(path, Path::new("run/roc/g1_roc_weight_epoch-010.png"));
}

#[test]
fn test_make_save_fig_writes_one_file_per_group() {
    let dir = tempdir().unwrap();
    let mut whole = WholeMetrics::new();
    whole.insert("g1".to_string(), yy_metrics());
    whole.insert("g2".to_string(), yy_metrics());

    let save_dir = dir.path().join("yy");
    let written = make_save_fig(&YyFigure, &whole, &save_dir, "weight").unwrap();
    assert_eq!(written.len(), 2);
    for path in &written {
        assert!(path.exists());
        assert!(path.starts_with(&save_dir));
    }
    let name = written[0].file_stem().unwrap().to_str().unwrap();
    assert_eq!(name, "g1_yy_weight");
}
