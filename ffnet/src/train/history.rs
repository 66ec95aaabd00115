use crate::dtype::DType;
use std::fmt::{Display, Formatter};

/// Per-epoch losses of one training run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrainingHistory<F: DType> {
    training_losses: Vec<F>,
    validation_losses: Vec<F>,
    stopped_at_epoch: Option<usize>,
    cancelled: bool,
}

impl<F: DType> TrainingHistory<F> {
    pub fn new() -> Self {
        TrainingHistory {
            training_losses: Vec::new(),
            validation_losses: Vec::new(),
            stopped_at_epoch: None,
            cancelled: false,
        }
    }

    pub(crate) fn record(&mut self, training_loss: F, validation_loss: Option<F>) {
        self.training_losses.push(training_loss);
        if let Some(loss) = validation_loss {
            self.validation_losses.push(loss);
        }
    }

    /// Set at most once; later calls are ignored.
    pub(crate) fn mark_stopped_early(&mut self, epoch: usize) {
        if self.stopped_at_epoch.is_none() {
            self.stopped_at_epoch = Some(epoch);
        }
    }

    pub(crate) fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    #[inline]
    pub fn training_losses(&self) -> &[F] {
        &self.training_losses
    }

    #[inline]
    pub fn validation_losses(&self) -> &[F] {
        &self.validation_losses
    }

    #[inline]
    pub fn total_epochs(&self) -> usize {
        self.training_losses.len()
    }

    pub fn final_training_loss(&self) -> Option<F> {
        self.training_losses.last().copied()
    }

    pub fn final_validation_loss(&self) -> Option<F> {
        self.validation_losses.last().copied()
    }

    pub fn best_training_loss(&self) -> Option<F> {
        min_loss(&self.training_losses)
    }

    pub fn best_validation_loss(&self) -> Option<F> {
        min_loss(&self.validation_losses)
    }

    #[inline]
    pub fn stopped_early(&self) -> bool {
        self.stopped_at_epoch.is_some()
    }

    /// 1-indexed epoch at which early stopping triggered.
    #[inline]
    pub fn stopped_at_epoch(&self) -> Option<usize> {
        self.stopped_at_epoch
    }

    #[inline]
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }
}

fn min_loss<F: DType>(losses: &[F]) -> Option<F> {
    losses.iter().copied().reduce(F::min)
}

impl<F: DType> Display for TrainingHistory<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "TrainingHistory[epochs={}", self.total_epochs())?;
        if let Some(loss) = self.final_training_loss() {
            write!(f, ", loss={:.6}", loss)?;
        }
        if let Some(loss) = self.final_validation_loss() {
            write!(f, ", val_loss={:.6}", loss)?;
        }
        if let Some(epoch) = self.stopped_at_epoch {
            write!(f, ", stopped_early_at={}", epoch)?;
        }
        if self.cancelled {
            f.write_str(", cancelled")?;
        }
        f.write_str("]")
    }
}
