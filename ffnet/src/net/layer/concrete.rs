use super::{DenseLayer, DenseLayerParams, ForwardRecord, Layer, LayerParams};
use crate::dtype::DType;
use crate::error::Result;
use crate::net::initializer::WeightInitializer;
use std::fmt::{Debug, Display, Formatter};

// LayerParams has an associated type, so it can't be boxed as a trait object.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConcreteLayerParams {
    Dense(DenseLayerParams),
}

impl<F: DType> LayerParams<F> for ConcreteLayerParams {
    type Layer = ConcreteLayer<F>;

    fn create_layer(&self, input_size: usize, initializer: &mut dyn WeightInitializer<F>) -> Result<Self::Layer> {
        match self {
            ConcreteLayerParams::Dense(params) => params.create_layer(input_size, initializer).map(ConcreteLayer::Dense),
        }
    }
}

/// Every layer kind a [`Net`](crate::net::Net) can hold.
#[derive(Clone)]
pub enum ConcreteLayer<F: DType> {
    Dense(DenseLayer<F>),
}

impl<F: DType> ConcreteLayer<F> {
    fn inner(&self) -> &dyn Layer<F> {
        match self {
            ConcreteLayer::Dense(inner) => inner,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Layer<F> {
        match self {
            ConcreteLayer::Dense(inner) => inner,
        }
    }

    pub fn as_dense(&self) -> Option<&DenseLayer<F>> {
        match self {
            ConcreteLayer::Dense(inner) => Some(inner),
        }
    }
}

impl<F: DType> Layer<F> for ConcreteLayer<F> {
    #[inline]
    fn forward(&self, input: &[F]) -> Result<ForwardRecord<F>> {
        self.inner().forward(input)
    }

    #[inline]
    fn backward(&mut self, record: ForwardRecord<F>, output_gradient: &[F], learn_rate: F) -> Result<Vec<F>> {
        self.inner_mut().backward(record, output_gradient, learn_rate)
    }

    #[inline]
    fn input_size(&self) -> usize {
        self.inner().input_size()
    }

    #[inline]
    fn output_size(&self) -> usize {
        self.inner().output_size()
    }

    #[inline]
    fn num_parameters(&self) -> usize {
        self.inner().num_parameters()
    }

    #[inline]
    fn check_record(&self, record: &ForwardRecord<F>) -> Result<()> {
        self.inner().check_record(record)
    }
}

impl<F: DType> From<DenseLayer<F>> for ConcreteLayer<F> {
    fn from(layer: DenseLayer<F>) -> Self {
        ConcreteLayer::Dense(layer)
    }
}

impl<F: DType> Debug for ConcreteLayer<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self.inner(), f)
    }
}

impl<F: DType> Display for ConcreteLayer<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConcreteLayer::Dense(inner) => Display::fmt(inner, f),
        }
    }
}
