use crate::metrics::payload::{GroupMetrics, LabelMetrics, MetricsPayload, WholeMetrics};
use crate::report::summary::{make_summary, metric_column, update_summary, RunIdentity};
use crate::types::Split;
use tempfile::tempdir;

fn survival(val: f64, test: f64) -> LabelMetrics {
    LabelMetrics::new(
        MetricsPayload::Survival { c_index: val },
        MetricsPayload::Survival { c_index: test },
    )
    .unwrap()
}

fn whole(groups: &[(&str, f64)]) -> WholeMetrics {
    let mut whole = WholeMetrics::new();
    for &(group, value) in groups {
        let mut group_metrics = GroupMetrics::new();
        group_metrics.insert("label_death".to_string(), survival(value, value / 2.0));
        whole.insert(group.to_string(), group_metrics);
    }
    whole
}

#[test]
fn test_make_summary_rows() {
    let run = RunIdentity::new("2024-01-01-00-00-00", "weight_epoch-003.pt");
    let rows = make_summary(&whole(&[("b", 0.8), ("a", 0.666)]), &run, "c_index");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].group, "a");
    assert_eq!(
        rows[0].columns(),
        vec!["datetime", "weight", "group", "label_death_val_c_index", "label_death_test_c_index"]
    );
    assert_eq!(rows[0].get("label_death_val_c_index"), Some("0.67"));
    assert_eq!(rows[0].get("label_death_test_c_index"), Some("0.33"));
    assert_eq!(rows[1].get("weight"), Some("weight_epoch-003.pt"));
    assert_eq!(metric_column("label_x", Split::Test, "auc"), "label_x_test_auc");
}

#[test]
fn test_run_identity_now_format() {
    let run = RunIdentity::now("weight.pt");
    assert_eq!(run.datetime.len(), "2024-01-01-00-00-00".len());
    assert_eq!(run.datetime.matches('-').count(), 5);
    assert_eq!(run.weight, "weight.pt");
}

#[test]
fn test_mismatched_payload_kinds_rejected() {
    let result = LabelMetrics::new(
        MetricsPayload::Survival { c_index: 0.5 },
        MetricsPayload::Regression {
            y_obs: ndarray::array![1.0],
            y_pred: ndarray::array![1.0],
            r2: 1.0,
        },
    );
    assert!(result.is_err());
}

#[test]
fn test_two_persists_append_rows() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("summary").join("summary.csv");

    let first = make_summary(&whole(&[("a", 0.7)]), &RunIdentity::new("d1", "w1.pt"), "c_index");
    update_summary(&first, &path).unwrap();
    let second = make_summary(&whole(&[("a", 0.9)]), &RunIdentity::new("d2", "w2.pt"), "c_index");
    update_summary(&second, &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "datetime,weight,group,label_death_val_c_index,label_death_test_c_index"
    );
    assert_eq!(lines[1], "d1,w1.pt,a,0.70,0.35");
    assert_eq!(lines[2], "d2,w2.pt,a,0.90,0.45");
}

#[test]
fn test_header_union_pads_missing_cells() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("summary.csv");

    let first = make_summary(&whole(&[("a", 0.5)]), &RunIdentity::new("d1", "w1.pt"), "c_index");
    update_summary(&first, &path).unwrap();

    let mut other = WholeMetrics::new();
    let mut group_metrics = GroupMetrics::new();
    group_metrics.insert("label_relapse".to_string(), survival(0.6, 0.6));
    other.insert("a".to_string(), group_metrics);
    let second = make_summary(&other, &RunIdentity::new("d2", "w2.pt"), "c_index");
    update_summary(&second, &path).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let header: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(header.len(), 7);
    assert_eq!(header[5], "label_relapse_val_c_index");

    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(&records[0][5], "");
    assert_eq!(&records[1][3], "");
    assert_eq!(&records[1][5], "0.60");
}

#[test]
fn test_persist_resorts_whole_table_by_group() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("summary.csv");

    let first = make_summary(&whole(&[("b", 0.5), ("c", 0.5)]), &RunIdentity::new("d1", "w1.pt"), "c_index");
    update_summary(&first, &path).unwrap();
    let second = make_summary(&whole(&[("a", 0.8), ("b", 0.8)]), &RunIdentity::new("d2", "w2.pt"), "c_index");
    update_summary(&second, &path).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let rows: Vec<(String, String)> = reader
        .records()
        .map(|r| {
            let r = r.unwrap();
            (r[0].to_string(), r[2].to_string())
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            ("d2".to_string(), "a".to_string()),
            ("d1".to_string(), "b".to_string()),
            ("d2".to_string(), "b".to_string()),
            ("d1".to_string(), "c".to_string()),
        ]
    );
}
