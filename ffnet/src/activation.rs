use crate::dtype::DType;
use std::fmt::{Display, Formatter};

const SIGMOID_CLAMP: f64 = 700.0;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActivationFn {
    Linear,
    ReLU,
    #[default]
    Sigmoid,
    Tanh,
}

impl ActivationFn {
    pub fn activate<F: DType>(&self, x: F) -> F {
        match self {
            ActivationFn::Linear => x,
            ActivationFn::ReLU => x.max(F::ZERO),
            ActivationFn::Sigmoid => {
                if x < F::from_f64(-SIGMOID_CLAMP) {
                    F::ZERO
                } else if x > F::from_f64(SIGMOID_CLAMP) {
                    F::ONE
                } else {
                    F::ONE / (F::ONE + (-x).exp())
                }
            }
            ActivationFn::Tanh => x.tanh(),
        }
    }

    /// Derivative of the activation at one neuron. Sigmoid and Tanh read the
    /// already activated `output`, ReLU and Linear the `weighted_sum`.
    pub fn derivative<F: DType>(&self, weighted_sum: F, output: F) -> F {
        match self {
            ActivationFn::Linear => F::ONE,
            ActivationFn::ReLU => {
                if weighted_sum > F::ZERO {
                    F::ONE
                } else {
                    F::ZERO
                }
            }
            ActivationFn::Sigmoid => output * (F::ONE - output),
            ActivationFn::Tanh => F::ONE - output * output,
        }
    }

    pub fn compute<F: DType>(&self, weighted_sum: &[F], output: &mut [F]) {
        debug_assert_eq!(weighted_sum.len(), output.len());
        for (o, &z) in output.iter_mut().zip(weighted_sum) {
            *o = self.activate(z);
        }
    }

    /// `result_i = out_error_i * f'(z_i)`
    pub fn compute_error<F: DType>(&self, weighted_sum: &[F], output: &[F], out_error: &[F], result: &mut [F]) {
        debug_assert_eq!(weighted_sum.len(), result.len());
        debug_assert_eq!(output.len(), result.len());
        debug_assert_eq!(out_error.len(), result.len());
        for (i, r) in result.iter_mut().enumerate() {
            *r = out_error[i] * self.derivative(weighted_sum[i], output[i]);
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActivationFn::Linear => "Linear",
            ActivationFn::ReLU => "ReLU",
            ActivationFn::Sigmoid => "Sigmoid",
            ActivationFn::Tanh => "Tanh",
        }
    }
}

impl Display for ActivationFn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod test {
    use super::ActivationFn;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_relu() {
        let relu = ActivationFn::ReLU;
        assert_eq!(relu.activate(-1.0), 0.0);
        assert_eq!(relu.activate(2.5), 2.5);
        assert_eq!(relu.derivative(-1.0, 0.0), 0.0);
        assert_eq!(relu.derivative(0.0, 0.0), 0.0);
        assert_eq!(relu.derivative(3.0, 3.0), 1.0);
    }

    #[test]
    fn test_linear() {
        let linear = ActivationFn::Linear;
        assert_eq!(linear.activate(-4.25), -4.25);
        assert_eq!(linear.derivative(-4.25, -4.25), 1.0);
    }

    #[test]
    fn test_sigmoid_saturates() {
        let sigmoid = ActivationFn::Sigmoid;
        assert_eq!(sigmoid.activate(0.0), 0.5);
        assert_eq!(sigmoid.activate(-701.0), 0.0);
        assert_eq!(sigmoid.activate(701.0), 1.0);
        assert_eq!(sigmoid.activate(-1e308), 0.0);
        assert!(sigmoid.activate(700.0f64).is_finite());
        assert_eq!(sigmoid.activate(-800.0f32), 0.0);
    }

    #[test]
    fn test_output_derivatives_match_closed_form() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..200 {
            let z: f64 = rng.gen_range(-10.0..=10.0);

            let sigmoid = ActivationFn::Sigmoid;
            let s = 1.0 / (1.0 + (-z).exp());
            let a = sigmoid.activate(z);
            assert_abs_diff_eq!(sigmoid.derivative(z, a), s * (1.0 - s), epsilon = 1e-12);

            let tanh = ActivationFn::Tanh;
            let a = tanh.activate(z);
            let sech = 1.0 / z.cosh();
            assert_abs_diff_eq!(tanh.derivative(z, a), sech * sech, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_compute_error() {
        let z = [-1.0, 2.0];
        let mut a = [0.0; 2];
        ActivationFn::ReLU.compute(&z, &mut a);
        assert_eq!(a, [0.0, 2.0]);
        let mut delta = [0.0; 2];
        ActivationFn::ReLU.compute_error(&z, &a, &[5.0, 7.0], &mut delta);
        assert_eq!(delta, [0.0, 7.0]);
    }

    #[test]
    fn test_names() {
        assert_eq!(ActivationFn::default(), ActivationFn::Sigmoid);
        assert_eq!(ActivationFn::Tanh.to_string(), "Tanh");
    }
}
