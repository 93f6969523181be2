pub mod test_epoch_loss;
pub mod test_figure;
pub mod test_roc;
pub mod test_summary;
pub mod test_survival;
