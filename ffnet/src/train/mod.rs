mod early_stopping;
mod history;
mod monitor;


use crate::config::TrainingConfig;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::net::Net;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub use early_stopping::EarlyStopping;
pub use history::TrainingHistory;
pub use monitor::LossMonitor;

/// Summary of one completed epoch.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EpochReport<F: DType> {
    /// 1-indexed
    pub epoch: usize,
    pub total_epochs: usize,
    pub training_loss: F,
    pub validation_loss: Option<F>,
}

pub trait EpochObserver<F: DType> {
    fn on_epoch_end(&mut self, report: &EpochReport<F>);
}

pub struct NoOpObserver;

impl<F: DType> EpochObserver<F> for NoOpObserver {
    #[inline]
    fn on_epoch_end(&mut self, _report: &EpochReport<F>) {}
}

impl<F: DType, O: EpochObserver<F> + ?Sized> EpochObserver<F> for &mut O {
    #[inline]
    fn on_epoch_end(&mut self, report: &EpochReport<F>) {
        (**self).on_epoch_end(report)
    }
}

/// Drives epochs of mini-batch training over a borrowed [`Net`].
pub struct Trainer<'n, F: DType> {
    net: &'n mut Net<F>,
    config: TrainingConfig,
    rng: StdRng,
    observer: Box<dyn EpochObserver<F> + 'n>,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl<'n, F: DType> Trainer<'n, F> {
    /// Shuffles with an entropy-seeded generator.
    pub fn new(net: &'n mut Net<F>, config: TrainingConfig) -> Self {
        Self::from_rng(net, config, StdRng::from_entropy())
    }

    pub fn with_seed(net: &'n mut Net<F>, config: TrainingConfig, seed: u64) -> Self {
        Self::from_rng(net, config, StdRng::seed_from_u64(seed))
    }

    pub fn from_rng(net: &'n mut Net<F>, config: TrainingConfig, rng: StdRng) -> Self {
        Trainer {
            net,
            config,
            rng,
            observer: Box::new(NoOpObserver),
            cancel_flag: None,
        }
    }

    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: EpochObserver<F> + 'n,
    {
        self.observer = Box::new(observer);
        self
    }

    /// Training stops before the next batch once the flag is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    #[inline]
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: TrainingConfig) {
        self.config = config;
    }

    #[inline]
    pub fn net(&self) -> &Net<F> {
        &*self.net
    }

    pub fn train<X, Y>(&mut self, inputs: &[X], targets: &[Y]) -> Result<TrainingHistory<F>>
    where
        X: AsRef<[F]>,
        Y: AsRef<[F]>,
    {
        self.run(inputs, targets, None)
    }

    /// Like [`Trainer::train`], evaluating the validation set after every
    /// epoch. Early stopping only applies here.
    pub fn train_with_validation<X, Y>(
        &mut self,
        inputs: &[X],
        targets: &[Y],
        validation_inputs: &[X],
        validation_targets: &[Y],
    ) -> Result<TrainingHistory<F>>
    where
        X: AsRef<[F]>,
        Y: AsRef<[F]>,
    {
        self.run(inputs, targets, Some((validation_inputs, validation_targets)))
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn run<X, Y>(
        &mut self,
        inputs: &[X],
        targets: &[Y],
        validation: Option<(&[X], &[Y])>,
    ) -> Result<TrainingHistory<F>>
    where
        X: AsRef<[F]>,
        Y: AsRef<[F]>,
    {
        Error::check_len("training targets", inputs.len(), targets.len())?;
        if let Some((val_inputs, val_targets)) = validation {
            Error::check_len("validation targets", val_inputs.len(), val_targets.len())?;
            if val_inputs.is_empty() {
                return Err(Error::EmptyDataset);
            }
        }
        if inputs.is_empty() {
            return Err(Error::EmptyDataset);
        }
        self.config.validate()?;

        let net_learning_rate = self.net.config().learning_rate();
        if net_learning_rate != self.config.learning_rate() {
            warn!(
                training = self.config.learning_rate(),
                network = net_learning_rate,
                "learning rates differ, the network's rate is applied"
            );
        }

        let total_epochs = self.config.epochs();
        let num_samples = inputs.len();
        let batch_size = self.config.batch_size().min(num_samples);
        let early_stopping_enabled = self.config.use_early_stopping() && validation.is_some();
        let mut early_stopping = EarlyStopping::new(self.config.patience(), F::from_f64(self.config.min_delta()));
        let mut history = TrainingHistory::new();

        let mut indices: Vec<usize> = Vec::with_capacity(num_samples);
        let mut batch_inputs: Vec<&[F]> = Vec::with_capacity(batch_size);
        let mut batch_targets: Vec<&[F]> = Vec::with_capacity(batch_size);

        debug!(total_epochs, num_samples, batch_size, "starting training");

        'epochs: for epoch in 0..total_epochs {
            indices.clear();
            indices.extend(0..num_samples);
            if self.config.shuffle() {
                indices.shuffle(&mut self.rng);
            }

            let mut training_loss = F::ZERO;
            for batch in indices.chunks(batch_size) {
                if self.is_cancelled() {
                    info!(epoch = epoch + 1, "training cancelled");
                    history.mark_cancelled();
                    break 'epochs;
                }
                batch_inputs.clear();
                batch_targets.clear();
                for &idx in batch {
                    batch_inputs.push(inputs[idx].as_ref());
                    batch_targets.push(targets[idx].as_ref());
                }
                let batch_loss = self.net.train_on_batch(&batch_inputs, &batch_targets)?;
                training_loss += batch_loss * F::from_usize(batch.len());
            }
            training_loss /= F::from_usize(num_samples);

            let validation_loss = match validation {
                Some((val_inputs, val_targets)) => Some(self.net.evaluate(val_inputs, val_targets)?),
                None => None,
            };

            history.record(training_loss, validation_loss);
            self.net.record_training_loss(training_loss);
            if let Some(loss) = validation_loss {
                self.net.record_validation_loss(loss);
            }

            let report = EpochReport {
                epoch: epoch + 1,
                total_epochs,
                training_loss,
                validation_loss,
            };
            self.observer.on_epoch_end(&report);

            if self.config.verbose() && (epoch + 1) % self.config.print_every_n_epochs() == 0 {
                match validation_loss {
                    Some(val_loss) => info!(
                        epoch = epoch + 1,
                        total_epochs,
                        loss = %training_loss,
                        val_loss = %val_loss,
                        "epoch complete"
                    ),
                    None => info!(epoch = epoch + 1, total_epochs, loss = %training_loss, "epoch complete"),
                }
            }

            if early_stopping_enabled {
                if let Some(val_loss) = validation_loss {
                    if early_stopping.update(val_loss) {
                        if self.config.verbose() {
                            info!(epoch = epoch + 1, best = %early_stopping.best(), "early stopping");
                        }
                        history.mark_stopped_early(epoch + 1);
                        break;
                    }
                }
            }
        }

        Ok(history)
    }
}
