mod concrete;
mod dense;

use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::net::initializer::WeightInitializer;
use std::fmt::Debug;

pub use concrete::{ConcreteLayer, ConcreteLayerParams};
pub use dense::{DenseLayer, DenseLayerParams};

pub trait LayerParams<F: DType>: Clone + Debug {
    type Layer: Layer<F>;

    fn create_layer(&self, input_size: usize, initializer: &mut dyn WeightInitializer<F>) -> Result<Self::Layer>;
}

pub trait Layer<F: DType>: Debug {
    /// Evaluates the layer without touching its parameters. The returned
    /// record must be handed back to [`Layer::backward`].
    fn forward(&self, input: &[F]) -> Result<ForwardRecord<F>>;

    /// Applies one gradient descent step and returns the gradient of the loss
    /// with respect to the layer input.
    fn backward(&mut self, record: ForwardRecord<F>, output_gradient: &[F], learn_rate: F) -> Result<Vec<F>>;

    fn input_size(&self) -> usize;
    fn output_size(&self) -> usize;
    fn num_parameters(&self) -> usize;

    /// Fails if `record` does not have this layer's shape.
    fn check_record(&self, record: &ForwardRecord<F>) -> Result<()> {
        Error::check_len("forward record input", self.input_size(), record.input().len())?;
        Error::check_len("forward record weighted sum", self.output_size(), record.weighted_sum().len())?;
        Error::check_len("forward record output", self.output_size(), record.output().len())
    }
}

/// Values captured by one forward evaluation of a layer.
#[derive(Clone, Debug, PartialEq)]
pub struct ForwardRecord<F: DType> {
    input: Vec<F>,
    weighted_sum: Vec<F>,
    output: Vec<F>,
}

impl<F: DType> ForwardRecord<F> {
    pub(crate) fn new(input: Vec<F>, weighted_sum: Vec<F>, output: Vec<F>) -> Self {
        ForwardRecord {
            input,
            weighted_sum,
            output,
        }
    }

    #[inline]
    pub fn input(&self) -> &[F] {
        &self.input
    }

    #[inline]
    pub fn weighted_sum(&self) -> &[F] {
        &self.weighted_sum
    }

    #[inline]
    pub fn output(&self) -> &[F] {
        &self.output
    }

    #[inline]
    pub fn into_output(self) -> Vec<F> {
        self.output
    }
}
