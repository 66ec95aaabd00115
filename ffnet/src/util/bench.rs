use crate::activation::ActivationFn;
use crate::dtype::DType;
use crate::error::Result;
use crate::net::initializer::HeInitializer;
use crate::net::layer::{DenseLayer, DenseLayerParams};
use crate::net::{Net, NetBuilder};
use crate::tensor::{Dim1, Dim2, Tensor1, Tensor2};
use rand::prelude::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::StandardNormal;

pub const SIZE_LG: usize = 1024;
pub const SIZE_MD: usize = 256;
pub const SIZE_SM: usize = 64;
const SEED: u64 = 0x8371943;

/// Square layer plus one input vector, both seeded.
pub fn get_dense_layer<F>(size: usize, activation_fn: ActivationFn) -> Result<(DenseLayer<F>, Vec<F>)>
where
    F: DType,
    StandardNormal: Distribution<F>,
{
    let mut init = HeInitializer::seed_from_u64(SEED);
    let layer = DenseLayer::new(size, size, activation_fn, &mut init)?;
    let mut rng = StdRng::seed_from_u64(SEED);
    let input = Tensor1::from_distribution(&mut rng, StandardNormal, Dim1(size));
    Ok((layer, input.into_vec()))
}

/// `samples` rows of normally distributed inputs and targets.
pub fn get_dataset<F>(samples: usize, input_size: usize, output_size: usize) -> (Tensor2<F>, Tensor2<F>)
where
    StandardNormal: Distribution<F>,
{
    let mut rng = StdRng::seed_from_u64(SEED);
    (
        Tensor2::from_distribution(&mut rng, StandardNormal, Dim2(samples, input_size)),
        Tensor2::from_distribution(&mut rng, StandardNormal, Dim2(samples, output_size)),
    )
}

/// `input -> hidden -> hidden -> output` ReLU network with a linear head.
pub fn get_net<F: DType>(input_size: usize, hidden_size: usize, output_size: usize) -> Result<Net<F>> {
    NetBuilder::new(input_size)
        .with_initializer(HeInitializer::seed_from_u64(SEED))
        .with_layer(DenseLayerParams::new(hidden_size, ActivationFn::ReLU))
        .with_layer(DenseLayerParams::new(hidden_size, ActivationFn::ReLU))
        .with_layer(DenseLayerParams::new(output_size, ActivationFn::Linear))
        .build()
}
