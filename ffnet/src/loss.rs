use crate::dtype::DType;
use crate::error::{Error, Result};
use std::fmt::{Display, Formatter};

/// Probabilities are clipped into `[EPSILON, 1 - EPSILON]` before taking logs.
const CROSS_ENTROPY_EPSILON: f64 = 1e-7;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LossFn {
    /// `0.5 * sum((t - p)^2) / n`
    #[default]
    MSE,
    /// `-sum(t * ln(p)) / n`
    CrossEntropy,
}

impl LossFn {
    pub fn compute<F: DType>(&self, predicted: &[F], target: &[F]) -> Result<F> {
        Error::check_len("loss target", predicted.len(), target.len())?;
        let n = F::from_usize(predicted.len());
        let loss = match self {
            LossFn::MSE => {
                let sum = predicted.iter().zip(target).fold(F::ZERO, |acc, (&p, &t)| {
                    let err = t - p;
                    acc + err * err
                });
                F::from_f64(0.5) * sum / n
            }
            LossFn::CrossEntropy => {
                let sum = predicted
                    .iter()
                    .zip(target)
                    .fold(F::ZERO, |acc, (&p, &t)| acc - t * clip_probability(p).ln());
                sum / n
            }
        };
        Ok(loss)
    }

    /// Gradient of the loss with respect to each predicted output.
    pub fn gradient<F: DType>(&self, predicted: &[F], target: &[F]) -> Result<Vec<F>> {
        Error::check_len("loss target", predicted.len(), target.len())?;
        let n = F::from_usize(predicted.len());
        let grad = predicted
            .iter()
            .zip(target)
            .map(|(&p, &t)| match self {
                LossFn::MSE => (p - t) / n,
                LossFn::CrossEntropy => -(t / clip_probability(p)) / n,
            })
            .collect();
        Ok(grad)
    }

    pub fn name(&self) -> &'static str {
        match self {
            LossFn::MSE => "Mean Squared Error",
            LossFn::CrossEntropy => "Cross-Entropy",
        }
    }
}

#[inline]
fn clip_probability<F: DType>(p: F) -> F {
    let eps = F::from_f64(CROSS_ENTROPY_EPSILON);
    p.max(eps).min(F::ONE - eps)
}

impl Display for LossFn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
