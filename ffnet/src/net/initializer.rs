use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::tensor::{Dim1, Dim2, Dims, Tensor, Tensor1, Tensor2};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Produces the starting parameters of a layer.
pub trait WeightInitializer<F: DType> {
    /// Weight matrix of dims `(output_size, input_size)`
    fn init_weights(&mut self, input_size: usize, output_size: usize) -> Tensor2<F>;
    fn init_biases(&mut self, output_size: usize) -> Tensor1<F>;
    fn name(&self) -> &'static str;
}

fn sample_tensor<F, D, S>(rng: &mut StdRng, dist: S, dims: D) -> Tensor<F, D>
where
    F: DType,
    D: Dims,
    S: Distribution<f64>,
{
    let data = dist.sample_iter(rng).take(dims.tensor_len()).map(F::from_f64).collect();
    Tensor::from_vec(data, dims)
}

fn sample_normal<F: DType, R: Rng>(rng: &mut R, std: f64, dims: Dim2) -> Tensor2<F> {
    let data = rng
        .sample_iter(StandardNormal)
        .take(dims.tensor_len())
        .map(|z: f64| F::from_f64(z * std))
        .collect();
    Tensor::from_vec(data, dims)
}

macro_rules! impl_rng_constructors {
    ($name:ident { $($field:ident: $value:expr),* }) => {
        impl $name {
            /// Seeded from OS entropy.
            pub fn new() -> Self {
                Self::from_rng(StdRng::from_entropy())
            }
            pub fn seed_from_u64(seed: u64) -> Self {
                Self::from_rng(StdRng::seed_from_u64(seed))
            }
            pub fn from_rng(rng: StdRng) -> Self {
                $name { rng, $($field: $value),* }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

/// Weights and biases drawn uniformly from `[min, max]`.
#[derive(Debug, Clone)]
pub struct RandomUniformInitializer {
    rng: StdRng,
    min: f64,
    max: f64,
}

impl_rng_constructors!(RandomUniformInitializer { min: -1.0, max: 1.0 });

impl RandomUniformInitializer {
    pub fn with_range(mut self, min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(Error::invalid("uniform range", "bounds must be finite"));
        }
        if min > max {
            return Err(Error::invalid("uniform range", "min must not exceed max"));
        }
        self.min = min;
        self.max = max;
        Ok(self)
    }

    #[inline]
    pub fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }
}

impl<F: DType> WeightInitializer<F> for RandomUniformInitializer {
    fn init_weights(&mut self, input_size: usize, output_size: usize) -> Tensor2<F> {
        let dist = Uniform::new_inclusive(self.min, self.max);
        sample_tensor(&mut self.rng, dist, Dim2(output_size, input_size))
    }

    fn init_biases(&mut self, output_size: usize) -> Tensor1<F> {
        let dist = Uniform::new_inclusive(self.min, self.max);
        sample_tensor(&mut self.rng, dist, Dim1(output_size))
    }

    fn name(&self) -> &'static str {
        "Random Uniform"
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum XavierDistribution {
    /// `U[-sqrt(6 / (n_in + n_out)), +sqrt(6 / (n_in + n_out))]`
    #[default]
    Uniform,
    /// `N(0, 2 / (n_in + n_out))`
    Normal,
}

/// Glorot initialization, biases start at zero.
#[derive(Debug, Clone)]
pub struct XavierInitializer {
    rng: StdRng,
    distribution: XavierDistribution,
}

impl_rng_constructors!(XavierInitializer { distribution: XavierDistribution::Uniform });

impl XavierInitializer {
    pub fn with_distribution(mut self, distribution: XavierDistribution) -> Self {
        self.distribution = distribution;
        self
    }

    #[inline]
    pub fn distribution(&self) -> XavierDistribution {
        self.distribution
    }
}

impl<F: DType> WeightInitializer<F> for XavierInitializer {
    fn init_weights(&mut self, input_size: usize, output_size: usize) -> Tensor2<F> {
        let fan = (input_size + output_size) as f64;
        let dims = Dim2(output_size, input_size);
        match self.distribution {
            XavierDistribution::Uniform => {
                let limit = (6.0 / fan).sqrt();
                sample_tensor(&mut self.rng, Uniform::new_inclusive(-limit, limit), dims)
            }
            XavierDistribution::Normal => sample_normal(&mut self.rng, (2.0 / fan).sqrt(), dims),
        }
    }

    fn init_biases(&mut self, output_size: usize) -> Tensor1<F> {
        Tensor::zeroed(Dim1(output_size))
    }

    fn name(&self) -> &'static str {
        match self.distribution {
            XavierDistribution::Uniform => "Xavier (Uniform)",
            XavierDistribution::Normal => "Xavier (Gaussian)",
        }
    }
}

/// Kaiming initialization `N(0, 2 / n_in)`, biases start at zero.
#[derive(Debug, Clone)]
pub struct HeInitializer {
    rng: StdRng,
}

impl_rng_constructors!(HeInitializer {});

impl<F: DType> WeightInitializer<F> for HeInitializer {
    fn init_weights(&mut self, input_size: usize, output_size: usize) -> Tensor2<F> {
        let std = (2.0 / input_size as f64).sqrt();
        sample_normal(&mut self.rng, std, Dim2(output_size, input_size))
    }

    fn init_biases(&mut self, output_size: usize) -> Tensor1<F> {
        Tensor::zeroed(Dim1(output_size))
    }

    fn name(&self) -> &'static str {
        "He"
    }
}
