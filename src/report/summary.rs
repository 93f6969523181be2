//! Cross-run summary table.
//!
//! Each evaluation contributes one row per group. Rows are appended to the
//! summary CSV by reading the existing file and rewriting it in full, stably
//! sorted by group. Rows are never edited in place. There
//! is no locking, so concurrent evaluations writing the same summary can
//! lose rows (last writer wins). Callers serialize report writes.

use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::metrics::payload::WholeMetrics;
use crate::types::Split;

pub const DATETIME_COLUMN: &str = "datetime";
pub const WEIGHT_COLUMN: &str = "weight";
pub const GROUP_COLUMN: &str = "group";

/// Which run and which weight file a summary row describes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunIdentity {
    pub datetime: String,
    pub weight: String,
}

impl RunIdentity {
    pub fn new<S: Into<String>>(datetime: S, weight: S) -> Self {
        RunIdentity {
            datetime: datetime.into(),
            weight: weight.into(),
        }
    }

    /// Identity stamped with the current local time
    pub fn now<S: Into<String>>(weight: S) -> Self {
        let datetime = chrono::Local::now().format("%Y-%m-%d-%H-%M-%S").to_string();
        RunIdentity {
            datetime,
            weight: weight.into(),
        }
    }
}

/// One group's line of the summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub datetime: String,
    pub weight: String,
    pub group: String,
    /// `(<label>_<split>_<kind>, value formatted with 2 decimals)`
    pub metrics: Vec<(String, String)>,
}

impl SummaryRow {
    /// Header of this row, identity columns first
    pub fn columns(&self) -> Vec<String> {
        let mut columns = vec![
            DATETIME_COLUMN.to_string(),
            WEIGHT_COLUMN.to_string(),
            GROUP_COLUMN.to_string(),
        ];
        columns.extend(self.metrics.iter().map(|(name, _)| name.clone()));
        columns
    }

    /// Cell of `column`, if the row has it
    pub fn get(&self, column: &str) -> Option<&str> {
        match column {
            DATETIME_COLUMN => Some(&self.datetime),
            WEIGHT_COLUMN => Some(&self.weight),
            GROUP_COLUMN => Some(&self.group),
            _ => self
                .metrics
                .iter()
                .find(|(name, _)| name == column)
                .map(|(_, value)| value.as_str()),
        }
    }
}

/// Summary column of `label` on `split`
pub fn metric_column(label: &str, split: Split, metrics_kind: &str) -> String {
    format!("{}_{}_{}", label, split, metrics_kind)
}

/// One row per group, sorted by group name
pub fn make_summary(whole_metrics: &WholeMetrics, run: &RunIdentity, metrics_kind: &str) -> Vec<SummaryRow> {
    let mut rows: Vec<SummaryRow> = whole_metrics
        .iter()
        .map(|(group, group_metrics)| {
            let mut metrics = Vec::with_capacity(group_metrics.len() * Split::EVALUATED.len());
            for (label, label_metrics) in group_metrics.iter() {
                for split in Split::EVALUATED {
                    if let Some(payload) = label_metrics.get(split) {
                        metrics.push((
                            metric_column(label, split, metrics_kind),
                            format!("{:.2}", payload.value()),
                        ));
                    }
                }
            }
            SummaryRow {
                datetime: run.datetime.clone(),
                weight: run.weight.clone(),
                group: group.to_string(),
                metrics,
            }
        })
        .collect();
    rows.sort_by(|a, b| a.group.cmp(&b.group));
    rows
}

/// Log every group's val/test metric per label
pub fn print_metrics(rows: &[SummaryRow], metrics_kind: &str) {
    let val_suffix = format!("_{}_{}", Split::Val, metrics_kind);
    let test_suffix = format!("_{}_{}", Split::Test, metrics_kind);
    for row in rows {
        info!("{}", row.group);
        for (column, val_value) in row.metrics.iter() {
            let Some(label) = column.strip_suffix(&val_suffix) else {
                continue;
            };
            let test_value = row.get(&format!("{}{}", label, test_suffix)).unwrap_or("");
            info!(
                "{:<25} val_{kind}: {:>7}, test_{kind}: {:>7}",
                label,
                val_value,
                test_value,
                kind = metrics_kind
            );
        }
    }
}

/// Append `rows` to the summary CSV at `summary_path`.
///
/// An existing file is read and rewritten with the new rows beneath the old
/// ones, then the whole table is stably sorted by group. When the headers
/// differ, the union of columns is written and missing cells stay empty. A
/// missing parent directory is created.
pub fn update_summary<P: AsRef<Path>>(rows: &[SummaryRow], summary_path: P) -> Result<()> {
    let summary_path = summary_path.as_ref();

    let mut header: Vec<String> = Vec::new();
    let mut records: Vec<Vec<String>> = Vec::new();
    if summary_path.exists() {
        let mut reader = csv::Reader::from_path(summary_path)?;
        header = reader.headers()?.iter().map(str::to_string).collect();
        for record in reader.records() {
            records.push(record?.iter().map(str::to_string).collect());
        }
    } else if let Some(parent) = summary_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    for row in rows {
        for column in row.columns() {
            if !header.contains(&column) {
                header.push(column);
            }
        }
    }

    for record in records.iter_mut() {
        record.resize(header.len(), String::new());
    }
    for row in rows {
        records.push(
            header
                .iter()
                .map(|column| row.get(column).unwrap_or("").to_string())
                .collect(),
        );
    }

    if let Some(group_idx) = header.iter().position(|column| column == GROUP_COLUMN) {
        records.sort_by(|a, b| a[group_idx].cmp(&b[group_idx]));
    }

    let mut w = csv::Writer::from_path(summary_path)?;
    w.write_record(&header)?;
    for record in &records {
        w.write_record(record)?;
    }
    w.flush()?;
    info!("Updated summary: {}", summary_path.display());
    Ok(())
}
