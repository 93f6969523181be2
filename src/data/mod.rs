pub mod table;

pub use table::{GroupView, PredictionTable};
