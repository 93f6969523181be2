use crate::error::EvalError;
use crate::loss::epoch::EpochLoss;
use crate::types::Phase;

#[test]
fn test_best_val_loss_tracking() {
    let mut epoch_loss = EpochLoss::new();
    let mut flags = Vec::new();
    for (epoch, &val) in [0.5, 0.3, 0.4, 0.3].iter().enumerate() {
        epoch_loss.append_epoch_loss(Phase::Val, val);
        epoch_loss.update_best_val_loss_epoch(epoch).unwrap();
        flags.push(epoch_loss.is_updated());
    }

    assert_eq!(epoch_loss.best_val_loss(), Some(0.3));
    assert_eq!(epoch_loss.best_epoch(), Some(2));
    assert_eq!(flags, vec![true, true, false, false]);
}

#[test]
fn test_epoch_zero_takes_latest_without_comparison() {
    let mut epoch_loss = EpochLoss::new();
    epoch_loss.append_epoch_loss(Phase::Val, 0.2);
    epoch_loss.update_best_val_loss_epoch(0).unwrap();

    // a restarted run at epoch 0 overwrites the best even when worse
    epoch_loss.append_epoch_loss(Phase::Val, 0.9);
    epoch_loss.update_best_val_loss_epoch(0).unwrap();
    assert_eq!(epoch_loss.best_val_loss(), Some(0.9));
    assert_eq!(epoch_loss.best_epoch(), Some(1));
}

#[test]
fn test_latest_loss_empty() {
    let epoch_loss = EpochLoss::new();
    assert!(matches!(
        epoch_loss.latest_loss(Phase::Train),
        Err(EvalError::EmptySequence(_))
    ));

    let mut epoch_loss = EpochLoss::new();
    assert!(epoch_loss.update_best_val_loss_epoch(0).is_err());
}

#[test]
fn test_histories_are_per_phase() {
    let mut epoch_loss = EpochLoss::new();
    epoch_loss.append_epoch_loss(Phase::Train, 1.0);
    epoch_loss.append_epoch_loss(Phase::Train, 0.8);
    epoch_loss.append_epoch_loss(Phase::Val, 1.2);

    assert_eq!(epoch_loss.history(Phase::Train), &[1.0, 0.8]);
    assert_eq!(epoch_loss.history(Phase::Val), &[1.2]);
    assert_eq!(epoch_loss.latest_loss(Phase::Train).unwrap(), 0.8);
}

#[test]
fn test_equal_loss_keeps_first_epoch() {
    let mut epoch_loss = EpochLoss::new();
    for (epoch, &val) in [0.4, 0.4].iter().enumerate() {
        epoch_loss.append_epoch_loss(Phase::Val, val);
        epoch_loss.update_best_val_loss_epoch(epoch).unwrap();
    }
    assert_eq!(epoch_loss.best_epoch(), Some(1));
    assert!(!epoch_loss.is_updated());
}
