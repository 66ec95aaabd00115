use crate::activation::ActivationFn;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::math::sub_assign_scaled;
use crate::net::initializer::WeightInitializer;
use crate::net::layer::{ConcreteLayerParams, ForwardRecord, Layer, LayerParams};
use crate::tensor::{Dim1, Dim2, ITensor, Tensor, Tensor1, Tensor2};
use std::fmt::{Debug, Display, Formatter};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DenseLayerParams {
    pub size: usize,
    pub activation_fn: ActivationFn,
}

impl DenseLayerParams {
    pub fn new(size: usize, activation_fn: ActivationFn) -> Self {
        DenseLayerParams { size, activation_fn }
    }
}

impl<F: DType> LayerParams<F> for DenseLayerParams {
    type Layer = DenseLayer<F>;

    fn create_layer(&self, input_size: usize, initializer: &mut dyn WeightInitializer<F>) -> Result<Self::Layer> {
        DenseLayer::new(input_size, self.size, self.activation_fn, initializer)
    }
}

impl From<DenseLayerParams> for ConcreteLayerParams {
    fn from(params: DenseLayerParams) -> Self {
        ConcreteLayerParams::Dense(params)
    }
}

/// Fully connected layer computing `a = f(W x + b)`.
#[derive(Clone)]
pub struct DenseLayer<F: DType> {
    input_size: usize,
    output_size: usize,
    weights: Tensor2<F>,
    biases: Tensor1<F>,
    weight_gradients: Tensor2<F>,
    bias_gradients: Tensor1<F>,
    activation_fn: ActivationFn,
}

impl<F: DType> DenseLayer<F> {
    pub fn new(
        input_size: usize,
        output_size: usize,
        activation_fn: ActivationFn,
        initializer: &mut dyn WeightInitializer<F>,
    ) -> Result<Self> {
        check_widths(input_size, output_size)?;
        let weights = initializer.init_weights(input_size, output_size);
        let biases = initializer.init_biases(output_size);
        Self::from_parts(weights, biases, activation_fn)
    }

    /// Builds a layer around existing parameters. `weights` has dims
    /// `(output_size, input_size)`.
    pub fn from_parts(weights: Tensor2<F>, biases: Tensor1<F>, activation_fn: ActivationFn) -> Result<Self> {
        let Dim2(output_size, input_size) = *weights.dims();
        check_widths(input_size, output_size)?;
        Error::check_len("bias vector", output_size, biases.len())?;
        Ok(DenseLayer {
            input_size,
            output_size,
            weights,
            biases,
            weight_gradients: Tensor::zeroed(Dim2(output_size, input_size)),
            bias_gradients: Tensor::zeroed(Dim1(output_size)),
            activation_fn,
        })
    }

    #[inline]
    pub fn weights(&self) -> &Tensor2<F> {
        &self.weights
    }

    #[inline]
    pub fn biases(&self) -> &Tensor1<F> {
        &self.biases
    }

    /// Gradients from the most recent backward call, zero before the first one.
    #[inline]
    pub fn weight_gradients(&self) -> &Tensor2<F> {
        &self.weight_gradients
    }

    #[inline]
    pub fn bias_gradients(&self) -> &Tensor1<F> {
        &self.bias_gradients
    }

    #[inline]
    pub fn activation_fn(&self) -> ActivationFn {
        self.activation_fn
    }
}

fn check_widths(input_size: usize, output_size: usize) -> Result<()> {
    if input_size == 0 {
        return Err(Error::invalid("input_size", "must be positive"));
    }
    if output_size == 0 {
        return Err(Error::invalid("output_size", "must be positive"));
    }
    Ok(())
}

impl<F: DType> Layer<F> for DenseLayer<F> {
    fn forward(&self, input: &[F]) -> Result<ForwardRecord<F>> {
        Error::check_len("dense layer input", self.input_size, input.len())?;

        let mut weighted_sum = self.biases.as_ref().to_vec();
        F::matrix_multiply(
            self.output_size,
            self.input_size,
            1,
            F::ONE,
            self.weights.as_ref(),
            false,
            input,
            false,
            F::ONE,
            &mut weighted_sum,
        );

        let mut output = vec![F::ZERO; self.output_size];
        self.activation_fn.compute(&weighted_sum, &mut output);

        Ok(ForwardRecord::new(input.to_vec(), weighted_sum, output))
    }

    fn backward(&mut self, record: ForwardRecord<F>, output_gradient: &[F], learn_rate: F) -> Result<Vec<F>> {
        Error::check_len("dense layer output gradient", self.output_size, output_gradient.len())?;
        self.check_record(&record)?;

        let mut delta = vec![F::ZERO; self.output_size];
        self.activation_fn
            .compute_error(record.weighted_sum(), record.output(), output_gradient, &mut delta);

        // must read the weights before they are updated below
        let mut input_gradient = vec![F::ZERO; self.input_size];
        F::matrix_multiply(
            1,
            self.output_size,
            self.input_size,
            F::ONE,
            &delta,
            false,
            self.weights.as_ref(),
            false,
            F::ZERO,
            &mut input_gradient,
        );

        // outer product delta * x^T
        F::matrix_multiply(
            self.output_size,
            1,
            self.input_size,
            F::ONE,
            &delta,
            false,
            record.input(),
            false,
            F::ZERO,
            self.weight_gradients.as_mut(),
        );
        self.bias_gradients.as_mut().copy_from_slice(&delta);

        sub_assign_scaled(learn_rate, self.weight_gradients.as_ref(), self.weights.as_mut());
        sub_assign_scaled(learn_rate, self.bias_gradients.as_ref(), self.biases.as_mut());

        Ok(input_gradient)
    }

    #[inline]
    fn input_size(&self) -> usize {
        self.input_size
    }

    #[inline]
    fn output_size(&self) -> usize {
        self.output_size
    }

    #[inline]
    fn num_parameters(&self) -> usize {
        self.weights.len() + self.biases.len()
    }
}

impl<F: DType> Debug for DenseLayer<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DenseLayer")
            .field("input_size", &self.input_size)
            .field("output_size", &self.output_size)
            .field("activation_fn", &self.activation_fn)
            .field("weights", &self.weights)
            .field("biases", &self.biases)
            .finish_non_exhaustive()
    }
}

impl<F: DType> Display for DenseLayer<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DenseLayer[in={}, out={}, activation={}]",
            self.input_size, self.output_size, self.activation_fn
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::net::initializer::{HeInitializer, XavierInitializer};
    use approx::assert_abs_diff_eq;

    fn assert_all_close(actual: &[f64], expected: &[f64], epsilon: f64) {
        assert_eq!(actual.len(), expected.len());
        for (&a, &e) in actual.iter().zip(expected) {
            assert_abs_diff_eq!(a, e, epsilon = epsilon);
        }
    }

    fn fixed_layer(activation_fn: ActivationFn) -> DenseLayer<f64> {
        let weights = Tensor2::from_rows(&[[0.2f64, -0.4, 0.1], [0.5, 0.3, -0.6]]);
        let biases = Tensor1::from_vec_1d(vec![0.05, -0.1]);
        DenseLayer::from_parts(weights, biases, activation_fn).unwrap()
    }

    #[test]
    fn test_output_and_gradient_lengths() {
        let mut init = XavierInitializer::seed_from_u64(11);
        for (n_in, n_out) in [(1, 1), (3, 7), (8, 2), (16, 16)] {
            let mut layer = DenseLayer::<f64>::new(n_in, n_out, ActivationFn::Tanh, &mut init).unwrap();
            let input: Vec<f64> = (0..n_in).map(|i| i as f64 * 0.1).collect();
            let record = layer.forward(&input).unwrap();
            assert_eq!(record.output().len(), n_out);
            let grad = layer.backward(record, &vec![1.0; n_out], 0.01).unwrap();
            assert_eq!(grad.len(), n_in);
            assert_eq!(layer.num_parameters(), n_in * n_out + n_out);
        }
    }

    #[test]
    fn test_forward_values() {
        let layer = fixed_layer(ActivationFn::Linear);
        let record = layer.forward(&[1.0, 2.0, 3.0]).unwrap();
        assert_all_close(record.weighted_sum(), &[-0.25, -0.8], 1e-12);
        assert_all_close(record.output(), &[-0.25, -0.8], 1e-12);
        assert_eq!(record.input(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_backward_updates_parameters() {
        let weights = Tensor2::from_rows(&[[0.5f64, -0.5]]);
        let biases = Tensor1::from_vec_1d(vec![0.1]);
        let mut layer = DenseLayer::from_parts(weights, biases, ActivationFn::Linear).unwrap();

        let record = layer.forward(&[1.0, 2.0]).unwrap();
        assert_abs_diff_eq!(record.output()[0], -0.4, epsilon = 1e-12);

        let input_grad = layer.backward(record, &[1.0], 0.1).unwrap();
        // computed from the weights before the update
        assert_all_close(&input_grad, &[0.5, -0.5], 1e-12);
        assert_all_close(layer.weight_gradients().as_ref(), &[1.0, 2.0], 1e-12);
        assert_all_close(layer.bias_gradients().as_ref(), &[1.0], 1e-12);
        assert_all_close(layer.weights().as_ref(), &[0.4, -0.7], 1e-12);
        assert_all_close(layer.biases().as_ref(), &[0.0], 1e-12);
    }

    #[test]
    fn test_gradients_recomputed_each_call() {
        let mut layer = fixed_layer(ActivationFn::Linear);
        let record = layer.forward(&[1.0, 1.0, 1.0]).unwrap();
        layer.backward(record, &[1.0, 1.0], 0.0).unwrap();
        let record = layer.forward(&[1.0, 1.0, 1.0]).unwrap();
        layer.backward(record, &[2.0, 0.0], 0.0).unwrap();
        assert_all_close(layer.bias_gradients().as_ref(), &[2.0, 0.0], 1e-12);
        assert_all_close(layer.weight_gradients().as_ref(), &[2.0, 2.0, 2.0, 0.0, 0.0, 0.0], 1e-12);
    }

    #[test]
    fn test_finite_difference_gradients() {
        // loss = sum_i g_i * a_i, with a zero learning rate so the parameters stay fixed
        let g = [0.7, -1.3];
        let x = [0.3, -0.2, 0.9];
        for activation_fn in [ActivationFn::Sigmoid, ActivationFn::Tanh, ActivationFn::Linear] {
            let mut layer = fixed_layer(activation_fn);
            let loss = |layer: &DenseLayer<f64>, x: &[f64]| -> f64 {
                let record = layer.forward(x).unwrap();
                record.output().iter().zip(&g).map(|(a, g)| a * g).sum()
            };

            let record = layer.forward(&x).unwrap();
            let input_grad = layer.backward(record, &g, 0.0).unwrap();

            let h = 1e-6;
            for j in 0..x.len() {
                let mut plus = x;
                let mut minus = x;
                plus[j] += h;
                minus[j] -= h;
                let numeric = (loss(&layer, &plus) - loss(&layer, &minus)) / (2.0 * h);
                assert_abs_diff_eq!(input_grad[j], numeric, epsilon = 1e-6);
            }

            for i in 0..2 {
                for j in 0..3 {
                    let mut plus = layer.clone();
                    let mut minus = layer.clone();
                    plus.weights[(i, j)] += h;
                    minus.weights[(i, j)] -= h;
                    let numeric = (loss(&plus, &x) - loss(&minus, &x)) / (2.0 * h);
                    assert_abs_diff_eq!(layer.weight_gradients()[(i, j)], numeric, epsilon = 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_size_mismatch() {
        let mut layer = fixed_layer(ActivationFn::ReLU);
        let err = layer.forward(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 3, actual: 2, .. }));

        let record = layer.forward(&[1.0, 2.0, 3.0]).unwrap();
        let before = layer.weights().clone();
        let err = layer.backward(record, &[1.0, 2.0, 3.0], 0.1).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 2, actual: 3, .. }));
        assert!(*layer.weights() == before);
    }

    #[test]
    fn test_foreign_record_rejected() {
        let mut init = HeInitializer::seed_from_u64(3);
        let small = DenseLayer::<f64>::new(2, 2, ActivationFn::ReLU, &mut init).unwrap();
        let mut layer = fixed_layer(ActivationFn::ReLU);
        let record = small.forward(&[1.0, 1.0]).unwrap();
        assert!(layer.backward(record, &[1.0, 1.0], 0.1).is_err());
    }

    #[test]
    fn test_invalid_construction() {
        let mut init = XavierInitializer::seed_from_u64(0);
        assert!(DenseLayer::<f32>::new(0, 3, ActivationFn::ReLU, &mut init).is_err());
        assert!(DenseLayer::<f32>::new(3, 0, ActivationFn::ReLU, &mut init).is_err());
        let weights = Tensor2::from_rows(&[[1.0f32, 2.0]]);
        let biases = Tensor1::from_vec_1d(vec![0.0, 0.0]);
        assert!(DenseLayer::from_parts(weights, biases, ActivationFn::ReLU).is_err());
    }

    #[test]
    fn test_display() {
        let layer = fixed_layer(ActivationFn::Tanh);
        assert_eq!(layer.to_string(), "DenseLayer[in=3, out=2, activation=Tanh]");
    }
}
