use ndarray::Array1;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::error::{EvalError, Result};
use crate::types::Split;

pub const GROUP_COLUMN: &str = "group";
pub const SPLIT_COLUMN: &str = "split";
pub const PERIODS_COLUMN: &str = "periods";
pub const LABEL_PREFIX: &str = "label_";
pub const PRED_PREFIX: &str = "pred_";

fn is_numeric_column(name: &str) -> bool {
    name.starts_with(LABEL_PREFIX) || name.starts_with(PRED_PREFIX) || name == PERIODS_COLUMN
}

/// Inference results, one row per sample.
///
/// `group` and `split` are kept per row; `label_*`, `pred_*` and `periods`
/// are parsed as numbers. Other columns are only kept by name.
#[derive(Debug, Clone)]
pub struct PredictionTable {
    columns: Vec<String>,
    groups: Vec<String>,
    splits: Vec<Split>,
    numeric: HashMap<String, Vec<f64>>,
}

impl PredictionTable {
    /// Load a likelihood CSV
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = csv::Reader::from_path(path)?;
        Self::from_csv(reader)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_csv(csv::Reader::from_reader(reader))
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let position = |name: &str| {
            columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| EvalError::MissingColumn(name.to_string()))
        };
        let group_idx = position(GROUP_COLUMN)?;
        let split_idx = position(SPLIT_COLUMN)?;
        let numeric_idx: Vec<(usize, &String)> = columns
            .iter()
            .enumerate()
            .filter(|(_, name)| is_numeric_column(name))
            .collect();

        let mut groups = Vec::new();
        let mut splits = Vec::new();
        let mut numeric: Vec<Vec<f64>> = vec![Vec::new(); numeric_idx.len()];

        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let field = |idx: usize| record.get(idx).unwrap_or("").trim();
            groups.push(field(group_idx).to_string());
            splits.push(field(split_idx).parse::<Split>()?);
            for (values, &(idx, name)) in numeric.iter_mut().zip(numeric_idx.iter()) {
                let raw = field(idx);
                let value = raw.parse::<f64>().map_err(|_| {
                    EvalError::invalid_parameter(
                        name.clone(),
                        format!("row {}: '{}' is not a number", row + 1, raw),
                    )
                })?;
                values.push(value);
            }
        }

        let numeric = numeric_idx
            .iter()
            .map(|(_, name)| (*name).clone())
            .zip(numeric)
            .collect();

        Ok(PredictionTable { columns, groups, splits, numeric })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Ground-truth columns in header order
    pub fn label_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.starts_with(LABEL_PREFIX))
            .map(String::as_str)
            .collect()
    }

    /// Per-class prediction columns `pred_<label>_<class>` in header order
    pub fn class_pred_columns(&self, label: &str) -> Vec<(&str, i64)> {
        let prefix = format!("{}{}_", PRED_PREFIX, label);
        self.columns
            .iter()
            .filter_map(|c| {
                let class = c.strip_prefix(&prefix)?.parse::<i64>().ok()?;
                Some((c.as_str(), class))
            })
            .collect()
    }

    /// Numeric column by name
    pub fn column(&self, name: &str) -> Result<&[f64]> {
        self.numeric
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| EvalError::MissingColumn(name.to_string()))
    }

    /// Distinct groups in order of first appearance
    pub fn groups(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for group in &self.groups {
            if !seen.contains(&group.as_str()) {
                seen.push(group.as_str());
            }
        }
        seen
    }

    pub fn group_view<'a>(&'a self, group: &'a str) -> GroupView<'a> {
        let rows = self
            .groups
            .iter()
            .enumerate()
            .filter(|(_, g)| g.as_str() == group)
            .map(|(i, _)| i)
            .collect();
        GroupView { table: self, group, rows }
    }
}

/// Rows of one group
pub struct GroupView<'a> {
    table: &'a PredictionTable,
    group: &'a str,
    rows: Vec<usize>,
}

impl<'a> GroupView<'a> {
    pub fn table(&self) -> &'a PredictionTable {
        self.table
    }

    pub fn group(&self) -> &'a str {
        self.group
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of `column` for the rows of `split`
    pub fn split_values(&self, column: &str, split: Split) -> Result<Array1<f64>> {
        let values = self.table.column(column)?;
        Ok(self
            .rows
            .iter()
            .filter(|&&i| self.table.splits[i] == split)
            .map(|&i| values[i])
            .collect())
    }
}
