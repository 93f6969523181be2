pub mod figure;
pub mod summary;

pub use figure::{make_figures, make_save_fig, save_figures, FigureRenderer, GroupFigure, Panel, RocFigure, Series, SeriesStyle, YyFigure};
pub use summary::{make_summary, print_metrics, update_summary, RunIdentity, SummaryRow};
