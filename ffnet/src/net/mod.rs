use crate::config::NetworkConfig;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::net::initializer::{WeightInitializer, XavierInitializer};
use crate::net::layer::{ConcreteLayer, ConcreteLayerParams, ForwardRecord, Layer, LayerParams};
use std::fmt::{Debug, Display, Formatter};
use tracing::debug;

pub mod initializer;
pub mod layer;


/// Ordered stack of layers trained with plain stochastic gradient descent.
pub struct Net<F: DType> {
    layers: Vec<ConcreteLayer<F>>,
    config: NetworkConfig,
    training_loss_history: Vec<F>,
    validation_loss_history: Vec<F>,
}

/// Records of one forward evaluation through every layer of a [`Net`].
/// Consumed by [`Net::backward`].
#[derive(Clone, Debug)]
pub struct ForwardPass<F: DType> {
    records: Vec<ForwardRecord<F>>,
}

impl<F: DType> ForwardPass<F> {
    #[inline]
    pub fn output(&self) -> &[F] {
        match self.records.last() {
            Some(record) => record.output(),
            None => &[],
        }
    }

    #[inline]
    pub fn records(&self) -> &[ForwardRecord<F>] {
        &self.records
    }

    pub fn into_output(mut self) -> Vec<F> {
        self.records.pop().map(ForwardRecord::into_output).unwrap_or_default()
    }
}

impl<F: DType> Net<F> {
    pub fn new(config: NetworkConfig) -> Self {
        Net {
            layers: Vec::new(),
            config,
            training_loss_history: Vec::new(),
            validation_loss_history: Vec::new(),
        }
    }

    /// Appends a layer. Its input width must equal the output width of the
    /// current last layer.
    pub fn add_layer<L>(&mut self, layer: L) -> Result<()>
    where
        L: Into<ConcreteLayer<F>>,
    {
        let layer = layer.into();
        if let Some(last) = self.layers.last() {
            Error::check_len("layer input", last.output_size(), layer.input_size())?;
        }
        debug!(index = self.layers.len(), layer = %layer, "added layer");
        self.layers.push(layer);
        Ok(())
    }

    pub fn forward(&self, input: &[F]) -> Result<ForwardPass<F>> {
        if self.layers.is_empty() {
            return Err(Error::EmptyNetwork);
        }
        let mut records: Vec<ForwardRecord<F>> = Vec::with_capacity(self.layers.len());
        for layer in self.layers.iter() {
            let record = match records.last() {
                None => layer.forward(input)?,
                Some(prev) => layer.forward(prev.output())?,
            };
            records.push(record);
        }
        Ok(ForwardPass { records })
    }

    /// Runs every layer's backward step in reverse order, one SGD update per layer.
    pub fn backward(&mut self, pass: ForwardPass<F>, loss_gradient: &[F]) -> Result<()> {
        if self.layers.is_empty() {
            return Err(Error::EmptyNetwork);
        }
        if pass.records.len() != self.layers.len() {
            return Err(Error::StaleForwardPass {
                expected: self.layers.len(),
                actual: pass.records.len(),
            });
        }
        Error::check_len("loss gradient", self.output_size()?, loss_gradient.len())?;
        // every record is checked before any layer is updated
        for (layer, record) in self.layers.iter().zip(&pass.records) {
            layer.check_record(record)?;
        }

        let learn_rate = F::from_f64(self.config.learning_rate());
        let mut gradient = loss_gradient.to_vec();
        for (layer, record) in self.layers.iter_mut().rev().zip(pass.records.into_iter().rev()) {
            gradient = layer.backward(record, &gradient, learn_rate)?;
        }
        Ok(())
    }

    /// Forward, loss, backward. Returns the loss before the update.
    pub fn train_on_example(&mut self, input: &[F], target: &[F]) -> Result<F> {
        let pass = self.forward(input)?;
        let loss_fn = self.config.loss_fn();
        let loss = loss_fn.compute(pass.output(), target)?;
        let gradient = loss_fn.gradient(pass.output(), target)?;
        self.backward(pass, &gradient)?;
        Ok(loss)
    }

    /// Trains on each sample in turn and returns the mean loss. Parameters are
    /// updated after every sample, not once per batch.
    pub fn train_on_batch<X, Y>(&mut self, inputs: &[X], targets: &[Y]) -> Result<F>
    where
        X: AsRef<[F]>,
        Y: AsRef<[F]>,
    {
        Error::check_len("batch targets", inputs.len(), targets.len())?;
        if inputs.is_empty() {
            return Err(Error::EmptyDataset);
        }
        let mut total = F::ZERO;
        for (input, target) in inputs.iter().zip(targets) {
            total += self.train_on_example(input.as_ref(), target.as_ref())?;
        }
        Ok(total / F::from_usize(inputs.len()))
    }

    pub fn predict(&self, input: &[F]) -> Result<Vec<F>> {
        Ok(self.forward(input)?.into_output())
    }

    pub fn predict_batch<X: AsRef<[F]>>(&self, inputs: &[X]) -> Result<Vec<Vec<F>>> {
        inputs.iter().map(|input| self.predict(input.as_ref())).collect()
    }

    /// Mean loss over a dataset. Does not modify the network.
    pub fn evaluate<X, Y>(&self, inputs: &[X], targets: &[Y]) -> Result<F>
    where
        X: AsRef<[F]>,
        Y: AsRef<[F]>,
    {
        Error::check_len("evaluation targets", inputs.len(), targets.len())?;
        if inputs.is_empty() {
            return Err(Error::EmptyDataset);
        }
        let loss_fn = self.config.loss_fn();
        let mut total = F::ZERO;
        for (input, target) in inputs.iter().zip(targets) {
            let output = self.predict(input.as_ref())?;
            total += loss_fn.compute(&output, target.as_ref())?;
        }
        Ok(total / F::from_usize(inputs.len()))
    }

    #[inline]
    pub fn layers(&self) -> &[ConcreteLayer<F>] {
        &self.layers
    }

    #[inline]
    pub fn layer(&self, idx: usize) -> Option<&ConcreteLayer<F>> {
        self.layers.get(idx)
    }

    #[inline]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn input_size(&self) -> Result<usize> {
        self.layers.first().map(|l| l.input_size()).ok_or(Error::EmptyNetwork)
    }

    pub fn output_size(&self) -> Result<usize> {
        self.layers.last().map(|l| l.output_size()).ok_or(Error::EmptyNetwork)
    }

    pub fn num_parameters(&self) -> usize {
        self.layers.iter().map(|l| l.num_parameters()).sum()
    }

    #[inline]
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    #[inline]
    pub fn config_mut(&mut self) -> &mut NetworkConfig {
        &mut self.config
    }

    pub fn set_config(&mut self, config: NetworkConfig) {
        self.config = config;
    }

    #[inline]
    pub fn training_loss_history(&self) -> &[F] {
        &self.training_loss_history
    }

    #[inline]
    pub fn validation_loss_history(&self) -> &[F] {
        &self.validation_loss_history
    }

    pub fn record_training_loss(&mut self, loss: F) {
        self.training_loss_history.push(loss);
    }

    pub fn record_validation_loss(&mut self, loss: F) {
        self.validation_loss_history.push(loss);
    }

    pub fn clear_history(&mut self) {
        self.training_loss_history.clear();
        self.validation_loss_history.clear();
    }
}

pub struct NetBuilder<F: DType> {
    input_size: usize,
    initializer: Box<dyn WeightInitializer<F>>,
    layers: Vec<ConcreteLayerParams>,
    config: NetworkConfig,
}

impl<F: DType> NetBuilder<F> {
    pub fn new(input_size: usize) -> Self {
        NetBuilder {
            input_size,
            initializer: Box::new(XavierInitializer::default()),
            layers: Vec::new(),
            config: NetworkConfig::default(),
        }
    }

    pub fn with_initializer<I>(mut self, initializer: I) -> Self
    where
        I: 'static + WeightInitializer<F>,
    {
        self.initializer = Box::new(initializer);
        self
    }

    pub fn with_layer<T>(mut self, layer: T) -> Self
    where
        T: Into<ConcreteLayerParams>,
    {
        self.layers.push(layer.into());
        self
    }

    pub fn with_config(mut self, config: NetworkConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(mut self) -> Result<Net<F>> {
        if self.input_size == 0 {
            return Err(Error::invalid("input_size", "must be positive"));
        }
        if self.layers.is_empty() {
            return Err(Error::EmptyNetwork);
        }
        self.config.validate()?;
        debug!(
            initializer = self.initializer.name(),
            layers = self.layers.len(),
            "building network"
        );
        let mut net = Net::new(self.config);
        let mut input_size = self.input_size;
        for params in self.layers.iter() {
            let layer = params.create_layer(input_size, self.initializer.as_mut())?;
            input_size = layer.output_size();
            net.add_layer(layer)?;
        }
        Ok(net)
    }
}

impl<F: DType> Debug for Net<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Net")
            .field("config", &self.config)
            .field("layers", &self.layers)
            .finish_non_exhaustive()
    }
}

impl<F: DType> Display for Net<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Net[{} layers, {} parameters]", self.layers.len(), self.num_parameters())?;
        for (i, layer) in self.layers.iter().enumerate() {
            write!(f, "\n  {i}: {layer}")?;
        }
        Ok(())
    }
}
