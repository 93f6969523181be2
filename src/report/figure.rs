//! Per-group diagnostic figures: ROC curves for classification and
//! observed-vs-predicted (YY) scatter plots for regression.
//!
//! Renderers only assemble the figure data. PNG output needs the `plots`
//! feature; without it the same data is written as JSON next to where the
//! PNG would go.

use log::info;
#[cfg(not(feature = "plots"))]
use log::warn;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{EvalError, Result};
use crate::metrics::payload::{GroupMetrics, LabelMetrics, WholeMetrics};
use crate::types::Split;

/// How a series is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesStyle {
    Line,
    Scatter,
    /// Reference line, drawn without legend entry
    Reference,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub style: SeriesStyle,
    pub points: Vec<(f64, f64)>,
}

/// One subplot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

impl Panel {
    /// `((x_min, x_max), (y_min, y_max))` over every point, widened when flat
    pub fn bounds(&self) -> ((f64, f64), (f64, f64)) {
        let points = self.series.iter().flat_map(|s| s.points.iter());
        let (mut x_min, mut x_max, mut y_min, mut y_max) =
            (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
        for &(x, y) in points {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
        (widen(x_min, x_max), widen(y_min, y_max))
    }
}

fn widen(lo: f64, hi: f64) -> (f64, f64) {
    if !lo.is_finite() || !hi.is_finite() {
        (0.0, 1.0)
    } else if lo == hi {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    }
}

/// All panels of one group, laid out in a single row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupFigure {
    pub group: String,
    pub fig_kind: String,
    pub panels: Vec<Panel>,
}

/// Builds the figure of one group from its metrics
pub trait FigureRenderer: Send + Sync {
    /// Directory and file tag of the figures (`roc`, `yy`)
    fn fig_kind(&self) -> &'static str;

    fn plot_group(&self, group: &str, group_metrics: &GroupMetrics) -> Result<GroupFigure>;
}

fn missing_payload(label: &str, expected: &str) -> EvalError {
    EvalError::invalid_parameter(
        label.to_string(),
        format!("{} figure needs {} metrics", expected, expected),
    )
}

fn zip_points(x: &Array1<f64>, y: &Array1<f64>) -> Vec<(f64, f64)> {
    x.iter().copied().zip(y.iter().copied()).collect()
}

/// One panel per label with the val and test ROC curves
#[derive(Debug, Clone, Copy, Default)]
pub struct RocFigure;

impl RocFigure {
    fn roc_series(label: &str, label_metrics: &LabelMetrics, split: Split) -> Result<Series> {
        let payload = label_metrics.get(split).ok_or_else(|| missing_payload(label, "roc"))?;
        let (fpr, tpr) = payload.roc().ok_or_else(|| missing_payload(label, "roc"))?;
        Ok(Series {
            name: format!("AUC_{} = {:.2}", split, payload.value()),
            style: SeriesStyle::Line,
            points: zip_points(fpr, tpr),
        })
    }
}

impl FigureRenderer for RocFigure {
    fn fig_kind(&self) -> &'static str {
        "roc"
    }

    fn plot_group(&self, group: &str, group_metrics: &GroupMetrics) -> Result<GroupFigure> {
        let mut panels = Vec::with_capacity(group_metrics.len());
        for (label, label_metrics) in group_metrics.iter() {
            panels.push(Panel {
                title: format!("{}: {}", group, label),
                x_label: "1 - Specificity".to_string(),
                y_label: "Sensitivity".to_string(),
                series: vec![
                    Self::roc_series(label, label_metrics, Split::Val)?,
                    Self::roc_series(label, label_metrics, Split::Test)?,
                ],
            });
        }
        Ok(GroupFigure {
            group: group.to_string(),
            fig_kind: self.fig_kind().to_string(),
            panels,
        })
    }
}

/// Extent of the unit diagonal for a YY plot: the range of observed and
/// predicted values together, padded by 1% of that range on both ends.
pub fn diagonal_extent(y_obs: &Array1<f64>, y_pred: &Array1<f64>) -> (f64, f64) {
    let values = y_obs.iter().chain(y_pred.iter()).copied();
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 0.0);
    }
    let pad = (max - min) * 0.01;
    (min - pad, max + pad)
}

/// Two panels per label (val, test): scatter plus unit diagonal
#[derive(Debug, Clone, Copy, Default)]
pub struct YyFigure;

impl YyFigure {
    fn yy_panel(group: &str, label: &str, label_metrics: &LabelMetrics, split: Split) -> Result<Panel> {
        let payload = label_metrics.get(split).ok_or_else(|| missing_payload(label, "yy"))?;
        let (y_obs, y_pred) = payload.yy().ok_or_else(|| missing_payload(label, "yy"))?;
        let (lo, hi) = diagonal_extent(y_obs, y_pred);
        Ok(Panel {
            title: format!("{}: {} {}: Observed-Predicted Plot", group, label, split),
            x_label: "Observed".to_string(),
            y_label: "Predicted".to_string(),
            series: vec![
                Series {
                    name: split.to_string(),
                    style: SeriesStyle::Scatter,
                    points: zip_points(y_obs, y_pred),
                },
                Series {
                    name: "diagonal".to_string(),
                    style: SeriesStyle::Reference,
                    points: vec![(lo, lo), (hi, hi)],
                },
            ],
        })
    }
}

impl FigureRenderer for YyFigure {
    fn fig_kind(&self) -> &'static str {
        "yy"
    }

    fn plot_group(&self, group: &str, group_metrics: &GroupMetrics) -> Result<GroupFigure> {
        let mut panels = Vec::with_capacity(group_metrics.len() * Split::EVALUATED.len());
        for (label, label_metrics) in group_metrics.iter() {
            for split in Split::EVALUATED {
                panels.push(Self::yy_panel(group, label, label_metrics, split)?);
            }
        }
        Ok(GroupFigure {
            group: group.to_string(),
            fig_kind: self.fig_kind().to_string(),
            panels,
        })
    }
}

/// `<save_dir>/<group>_<fig_kind>_<weight_stem>.png`
pub fn figure_path(save_dir: &Path, group: &str, fig_kind: &str, weight_stem: &str) -> PathBuf {
    save_dir.join(format!("{}_{}_{}.png", group, fig_kind, weight_stem))
}

/// Figure data of every group, groups in metrics order
pub fn make_figures(renderer: &dyn FigureRenderer, whole_metrics: &WholeMetrics) -> Result<Vec<GroupFigure>> {
    whole_metrics
        .iter()
        .map(|(group, group_metrics)| renderer.plot_group(group, group_metrics))
        .collect()
}

/// Write already built figures into `save_dir`, returning the written files
pub fn save_figures(figures: &[GroupFigure], save_dir: &Path, weight_stem: &str) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(save_dir)?;
    figures
        .iter()
        .map(|figure| {
            let path = figure_path(save_dir, &figure.group, &figure.fig_kind, weight_stem);
            save_figure(figure, &path)
        })
        .collect()
}

/// Render every group's figure into `save_dir`
pub fn make_save_fig(
    renderer: &dyn FigureRenderer,
    whole_metrics: &WholeMetrics,
    save_dir: &Path,
    weight_stem: &str,
) -> Result<Vec<PathBuf>> {
    let figures = make_figures(renderer, whole_metrics)?;
    save_figures(&figures, save_dir, weight_stem)
}

/// Write `figure` as PNG at `path`
#[cfg(feature = "plots")]
pub fn save_figure(figure: &GroupFigure, path: &Path) -> Result<PathBuf> {
    render_png(figure, path)?;
    info!("Saved figure: {}", path.display());
    Ok(path.to_path_buf())
}

/// Without the `plots` feature the figure data goes to `<path>.json`
#[cfg(not(feature = "plots"))]
pub fn save_figure(figure: &GroupFigure, path: &Path) -> Result<PathBuf> {
    let json_path = path.with_extension("json");
    warn!(
        "plots feature is not enabled, writing figure data to {}",
        json_path.display()
    );
    fs::write(&json_path, serde_json::to_string_pretty(figure)?)?;
    info!("Saved figure data: {}", json_path.display());
    Ok(json_path)
}

#[cfg(feature = "plots")]
fn plot_err<E: std::fmt::Display>(err: E) -> EvalError {
    EvalError::Plot(err.to_string())
}

#[cfg(feature = "plots")]
fn render_png(figure: &GroupFigure, path: &Path) -> Result<()> {
    use plotters::prelude::*;

    const PANEL_SIZE: u32 = 480;
    let num_panels = figure.panels.len().max(1);
    let root = BitMapBackend::new(path, (PANEL_SIZE * num_panels as u32, PANEL_SIZE)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;
    let areas = root.split_evenly((1, num_panels));

    for (panel, area) in figure.panels.iter().zip(areas.iter()) {
        let ((x_min, x_max), (y_min, y_max)) = panel.bounds();
        let mut chart = ChartBuilder::on(area)
            .margin(20)
            .caption(&panel.title, ("sans-serif", 16))
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(plot_err)?;
        chart
            .configure_mesh()
            .x_desc(panel.x_label.as_str())
            .y_desc(panel.y_label.as_str())
            .draw()
            .map_err(plot_err)?;

        for (idx, series) in panel.series.iter().enumerate() {
            let color = Palette99::pick(idx).to_rgba();
            match series.style {
                SeriesStyle::Line => {
                    chart
                        .draw_series(LineSeries::new(series.points.iter().copied(), color.stroke_width(2)))
                        .map_err(plot_err)?
                        .label(series.name.as_str())
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
                }
                SeriesStyle::Scatter => {
                    chart
                        .draw_series(
                            series
                                .points
                                .iter()
                                .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
                        )
                        .map_err(plot_err)?
                        .label(series.name.as_str())
                        .legend(move |(x, y)| Circle::new((x + 10, y), 3, color.filled()));
                }
                SeriesStyle::Reference => {
                    chart
                        .draw_series(LineSeries::new(series.points.iter().copied(), &RED))
                        .map_err(plot_err)?;
                }
            }
        }
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(plot_err)?;
    }
    root.present().map_err(plot_err)?;
    Ok(())
}
