//! Task evaluator: one metrics calculator plus an optional figure renderer.
//!
//! The results tree is laid out as
//! `<project>/<…>/<datetime>/likelihoods/likelihood_<weight>.csv`, and
//! every output location of an evaluation derives from the likelihood path.

use log::info;
use std::path::{Path, PathBuf};

use crate::config::EvalConfig;
use crate::data::table::PredictionTable;
use crate::error::{EvalError, Result};
use crate::metrics::aggregate;
use crate::metrics::calculator::LabelMetricsCalculator;
use crate::metrics::payload::WholeMetrics;
use crate::metrics::regression::YyCalculator;
use crate::metrics::roc::RocCalculator;
use crate::metrics::survival::CIndexCalculator;
use crate::report::figure::{self, FigureRenderer, RocFigure, YyFigure};
use crate::report::summary::{self, RunIdentity, SummaryRow};
use crate::types::Task;

const LIKELIHOOD_PREFIX: &str = "likelihood_";
const WEIGHT_EXTENSION: &str = "pt";

/// Output locations of one likelihood file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsLayout {
    pub run: RunIdentity,
    /// File stem with the `likelihood_` prefix removed
    pub weight_stem: String,
    pub datetime_dir: PathBuf,
    pub summary_path: PathBuf,
}

impl ResultsLayout {
    pub fn from_likelihood_path<P: AsRef<Path>>(likelihood_path: P) -> Result<Self> {
        let path = likelihood_path.as_ref();
        let too_shallow = || {
            EvalError::invalid_parameter(
                "likelihood_path".to_string(),
                format!(
                    "{} is not inside <project>/<...>/<datetime>/likelihoods/",
                    path.display()
                ),
            )
        };

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(too_shallow)?;
        let weight_stem = stem.strip_prefix(LIKELIHOOD_PREFIX).unwrap_or(stem).to_string();

        let mut ancestors = path.ancestors().skip(2);
        let datetime_dir = ancestors.next().ok_or_else(too_shallow)?;
        let project_dir = ancestors.nth(1).ok_or_else(too_shallow)?;
        let datetime = datetime_dir
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(too_shallow)?;

        Ok(ResultsLayout {
            run: RunIdentity::new(
                datetime.to_string(),
                format!("{}.{}", weight_stem, WEIGHT_EXTENSION),
            ),
            weight_stem,
            datetime_dir: datetime_dir.to_path_buf(),
            summary_path: project_dir.join("summary").join("summary.csv"),
        })
    }

    /// `<datetime>/<fig_kind>/`
    pub fn fig_dir(&self, fig_kind: &str) -> PathBuf {
        self.datetime_dir.join(fig_kind)
    }
}

/// What one evaluation computed and wrote
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub layout: ResultsLayout,
    pub whole_metrics: WholeMetrics,
    pub rows: Vec<SummaryRow>,
    pub figures: Vec<PathBuf>,
}

pub struct Evaluator {
    task: Task,
    calculator: Box<dyn LabelMetricsCalculator>,
    figure: Option<Box<dyn FigureRenderer>>,
    summary_path: Option<PathBuf>,
}

impl Evaluator {
    pub fn new(
        task: Task,
        calculator: Box<dyn LabelMetricsCalculator>,
        figure: Option<Box<dyn FigureRenderer>>,
    ) -> Self {
        Evaluator {
            task,
            calculator,
            figure,
            summary_path: None,
        }
    }

    /// Calculator and renderer of `task`; survival has no figure
    pub fn for_task(task: Task) -> Self {
        match task {
            Task::Classification => Self::new(task, Box::new(RocCalculator), Some(Box::new(RocFigure))),
            Task::Regression => Self::new(task, Box::new(YyCalculator), Some(Box::new(YyFigure))),
            Task::DeepSurv => Self::new(task, Box::new(CIndexCalculator), None),
        }
    }

    /// Evaluator by task name
    pub fn set_eval(task_name: &str) -> Result<Self> {
        Ok(Self::for_task(task_name.parse()?))
    }

    pub fn from_config(config: &EvalConfig) -> Self {
        let mut evaluator = Self::for_task(config.task);
        if !config.render_figures {
            evaluator.figure = None;
        }
        evaluator.summary_path = config.summary_path.clone();
        evaluator
    }

    pub fn task(&self) -> Task {
        self.task
    }

    pub fn metrics_kind(&self) -> &'static str {
        self.calculator.metrics_kind()
    }

    pub fn renders_figures(&self) -> bool {
        self.figure.is_some()
    }

    pub fn cal_whole_metrics(&self, table: &PredictionTable) -> Result<WholeMetrics> {
        aggregate::cal_whole_metrics(self.calculator.as_ref(), table)
    }

    /// Evaluate one likelihood file.
    ///
    /// Metrics, figure data and summary rows are all computed before
    /// anything is written, so a failing group leaves no partial output.
    pub fn make_metrics<P: AsRef<Path>>(&self, likelihood_path: P) -> Result<EvaluationReport> {
        let likelihood_path = likelihood_path.as_ref();
        let mut layout = ResultsLayout::from_likelihood_path(likelihood_path)?;
        if let Some(summary_path) = &self.summary_path {
            layout.summary_path = summary_path.clone();
        }
        info!("Evaluating {} ({})", likelihood_path.display(), self.task);

        let table = PredictionTable::from_path(likelihood_path)?;
        let whole_metrics = self.cal_whole_metrics(&table)?;
        let figures = match &self.figure {
            Some(renderer) => Some((renderer.fig_kind(), figure::make_figures(renderer.as_ref(), &whole_metrics)?)),
            None => None,
        };
        let rows = summary::make_summary(&whole_metrics, &layout.run, self.metrics_kind());
        summary::print_metrics(&rows, self.metrics_kind());

        let written = match figures {
            Some((fig_kind, figures)) => figure::save_figures(&figures, &layout.fig_dir(fig_kind), &layout.weight_stem)?,
            None => Vec::new(),
        };
        summary::update_summary(&rows, &layout.summary_path)?;

        Ok(EvaluationReport {
            layout,
            whole_metrics,
            rows,
            figures: written,
        })
    }
}
