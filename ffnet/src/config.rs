use crate::error::{Error, Result};
use crate::loss::LossFn;

fn check_learning_rate(value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::invalid("learning_rate", "must be positive and finite"))
    }
}

fn check_positive(field: &'static str, value: usize) -> Result<()> {
    if value > 0 {
        Ok(())
    } else {
        Err(Error::invalid(field, "must be positive"))
    }
}

fn check_min_delta(value: f64) -> Result<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::invalid("min_delta", "must be non-negative and finite"))
    }
}

fn check_validation_split(value: f64) -> Result<()> {
    if (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid("validation_split", "must be in [0, 1)"))
    }
}

/// Hyper-parameters a [`Net`](crate::net::Net) carries. The learning rate and
/// loss function are read on every training step.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct NetworkConfig {
    learning_rate: f64,
    epochs: usize,
    batch_size: usize,
    loss_fn: LossFn,
    use_early_stopping: bool,
    patience: usize,
    min_delta: f64,
    validation_split: f64,
    verbose: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            learning_rate: 0.01,
            epochs: 100,
            batch_size: 32,
            loss_fn: LossFn::MSE,
            use_early_stopping: false,
            patience: 10,
            min_delta: 0.001,
            validation_split: 0.0,
            verbose: true,
        }
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<()> {
        check_learning_rate(self.learning_rate)?;
        check_positive("epochs", self.epochs)?;
        check_positive("batch_size", self.batch_size)?;
        check_positive("patience", self.patience)?;
        check_min_delta(self.min_delta)?;
        check_validation_split(self.validation_split)
    }

    #[inline]
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
    #[inline]
    pub fn epochs(&self) -> usize {
        self.epochs
    }
    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
    #[inline]
    pub fn loss_fn(&self) -> LossFn {
        self.loss_fn
    }
    #[inline]
    pub fn use_early_stopping(&self) -> bool {
        self.use_early_stopping
    }
    #[inline]
    pub fn patience(&self) -> usize {
        self.patience
    }
    #[inline]
    pub fn min_delta(&self) -> f64 {
        self.min_delta
    }
    /// Informational only, splitting data is up to the caller.
    #[inline]
    pub fn validation_split(&self) -> f64 {
        self.validation_split
    }
    #[inline]
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) -> Result<()> {
        check_learning_rate(learning_rate)?;
        self.learning_rate = learning_rate;
        Ok(())
    }
    pub fn set_epochs(&mut self, epochs: usize) -> Result<()> {
        check_positive("epochs", epochs)?;
        self.epochs = epochs;
        Ok(())
    }
    pub fn set_batch_size(&mut self, batch_size: usize) -> Result<()> {
        check_positive("batch_size", batch_size)?;
        self.batch_size = batch_size;
        Ok(())
    }
    pub fn set_loss_fn(&mut self, loss_fn: LossFn) {
        self.loss_fn = loss_fn;
    }
    pub fn set_use_early_stopping(&mut self, use_early_stopping: bool) {
        self.use_early_stopping = use_early_stopping;
    }
    pub fn set_patience(&mut self, patience: usize) -> Result<()> {
        check_positive("patience", patience)?;
        self.patience = patience;
        Ok(())
    }
    pub fn set_min_delta(&mut self, min_delta: f64) -> Result<()> {
        check_min_delta(min_delta)?;
        self.min_delta = min_delta;
        Ok(())
    }
    pub fn set_validation_split(&mut self, validation_split: f64) -> Result<()> {
        check_validation_split(validation_split)?;
        self.validation_split = validation_split;
        Ok(())
    }
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Result<Self> {
        self.set_learning_rate(learning_rate)?;
        Ok(self)
    }
    pub fn with_epochs(mut self, epochs: usize) -> Result<Self> {
        self.set_epochs(epochs)?;
        Ok(self)
    }
    pub fn with_batch_size(mut self, batch_size: usize) -> Result<Self> {
        self.set_batch_size(batch_size)?;
        Ok(self)
    }
    pub fn with_loss_fn(mut self, loss_fn: LossFn) -> Self {
        self.loss_fn = loss_fn;
        self
    }
    pub fn with_early_stopping(mut self, patience: usize, min_delta: f64) -> Result<Self> {
        self.set_patience(patience)?;
        self.set_min_delta(min_delta)?;
        self.use_early_stopping = true;
        Ok(self)
    }
    pub fn with_validation_split(mut self, validation_split: f64) -> Result<Self> {
        self.set_validation_split(validation_split)?;
        Ok(self)
    }
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Settings for one [`Trainer`](crate::train::Trainer) run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct TrainingConfig {
    learning_rate: f64,
    epochs: usize,
    batch_size: usize,
    shuffle: bool,
    use_early_stopping: bool,
    patience: usize,
    min_delta: f64,
    verbose: bool,
    print_every_n_epochs: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            learning_rate: 0.01,
            epochs: 100,
            batch_size: 32,
            shuffle: true,
            use_early_stopping: false,
            patience: 10,
            min_delta: 0.001,
            verbose: true,
            print_every_n_epochs: 1,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        check_learning_rate(self.learning_rate)?;
        check_positive("epochs", self.epochs)?;
        check_positive("batch_size", self.batch_size)?;
        check_positive("patience", self.patience)?;
        check_min_delta(self.min_delta)?;
        check_positive("print_every_n_epochs", self.print_every_n_epochs)
    }

    /// Copies the shared settings of a network config.
    pub fn from_network_config(config: &NetworkConfig) -> Self {
        TrainingConfig {
            learning_rate: config.learning_rate,
            epochs: config.epochs,
            batch_size: config.batch_size,
            use_early_stopping: config.use_early_stopping,
            patience: config.patience,
            min_delta: config.min_delta,
            verbose: config.verbose,
            ..Default::default()
        }
    }

    #[inline]
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
    #[inline]
    pub fn epochs(&self) -> usize {
        self.epochs
    }
    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
    #[inline]
    pub fn shuffle(&self) -> bool {
        self.shuffle
    }
    #[inline]
    pub fn use_early_stopping(&self) -> bool {
        self.use_early_stopping
    }
    #[inline]
    pub fn patience(&self) -> usize {
        self.patience
    }
    #[inline]
    pub fn min_delta(&self) -> f64 {
        self.min_delta
    }
    #[inline]
    pub fn verbose(&self) -> bool {
        self.verbose
    }
    #[inline]
    pub fn print_every_n_epochs(&self) -> usize {
        self.print_every_n_epochs
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) -> Result<()> {
        check_learning_rate(learning_rate)?;
        self.learning_rate = learning_rate;
        Ok(())
    }
    pub fn set_epochs(&mut self, epochs: usize) -> Result<()> {
        check_positive("epochs", epochs)?;
        self.epochs = epochs;
        Ok(())
    }
    pub fn set_batch_size(&mut self, batch_size: usize) -> Result<()> {
        check_positive("batch_size", batch_size)?;
        self.batch_size = batch_size;
        Ok(())
    }
    pub fn set_shuffle(&mut self, shuffle: bool) {
        self.shuffle = shuffle;
    }
    pub fn set_use_early_stopping(&mut self, use_early_stopping: bool) {
        self.use_early_stopping = use_early_stopping;
    }
    pub fn set_patience(&mut self, patience: usize) -> Result<()> {
        check_positive("patience", patience)?;
        self.patience = patience;
        Ok(())
    }
    pub fn set_min_delta(&mut self, min_delta: f64) -> Result<()> {
        check_min_delta(min_delta)?;
        self.min_delta = min_delta;
        Ok(())
    }
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }
    pub fn set_print_every_n_epochs(&mut self, print_every_n_epochs: usize) -> Result<()> {
        check_positive("print_every_n_epochs", print_every_n_epochs)?;
        self.print_every_n_epochs = print_every_n_epochs;
        Ok(())
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Result<Self> {
        self.set_learning_rate(learning_rate)?;
        Ok(self)
    }
    pub fn with_epochs(mut self, epochs: usize) -> Result<Self> {
        self.set_epochs(epochs)?;
        Ok(self)
    }
    pub fn with_batch_size(mut self, batch_size: usize) -> Result<Self> {
        self.set_batch_size(batch_size)?;
        Ok(self)
    }
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }
    pub fn with_early_stopping(mut self, patience: usize, min_delta: f64) -> Result<Self> {
        self.set_patience(patience)?;
        self.set_min_delta(min_delta)?;
        self.use_early_stopping = true;
        Ok(self)
    }
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
    pub fn with_print_every_n_epochs(mut self, print_every_n_epochs: usize) -> Result<Self> {
        self.set_print_every_n_epochs(print_every_n_epochs)?;
        Ok(self)
    }
}

#[cfg(feature = "serde")]
macro_rules! impl_json {
    ($config:ty) => {
        impl $config {
            /// Parses and validates a config. Missing fields take their defaults.
            pub fn from_json(json: &str) -> Result<Self> {
                let config: Self = serde_json::from_str(json)?;
                config.validate()?;
                Ok(config)
            }

            pub fn to_json(&self) -> Result<String> {
                Ok(serde_json::to_string_pretty(self)?)
            }
        }
    };
}

#[cfg(feature = "serde")]
impl_json!(NetworkConfig);
#[cfg(feature = "serde")]
impl_json!(TrainingConfig);
