use crate::tensor::{Dims, ITensor, Tensor};
use approx::{AbsDiffEq, RelativeEq};
use std::iter::zip;

impl<T: AbsDiffEq, D: Dims> AbsDiffEq for Tensor<T, D>
where
    T::Epsilon: Copy,
{
    type Epsilon = T::Epsilon;
    fn default_epsilon() -> Self::Epsilon {
        T::default_epsilon()
    }
    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.dims() == other.dims()
            && zip(self.as_ref(), other.as_ref()).all(|(a, b)| T::abs_diff_eq(a, b, epsilon))
    }
}

impl<T: RelativeEq, D: Dims> RelativeEq for Tensor<T, D>
where
    T::Epsilon: Copy,
{
    fn default_max_relative() -> Self::Epsilon {
        T::default_max_relative()
    }
    fn relative_eq(&self, other: &Self, epsilon: Self::Epsilon, max_relative: Self::Epsilon) -> bool {
        self.dims() == other.dims()
            && zip(self.as_ref(), other.as_ref())
                .all(|(a, b)| T::relative_eq(a, b, epsilon, max_relative))
    }
}

#[cfg(all(test, feature = "approx"))]
mod test {
    use crate::tensor::{Dim1, Dim2, Tensor, Tensor1, Tensor2};
    use approx::{assert_abs_diff_eq, assert_abs_diff_ne, assert_relative_eq};

    #[test]
    fn test_tensor_approx_eq() {
        let a = Tensor2::from_rows(&[[1.0f64, 2.0], [3.0, 4.0]]);
        let b = Tensor2::from_rows(&[[1.0 + 1e-10, 2.0], [3.0, 4.0 - 1e-10]]);
        assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        assert_relative_eq!(a, b, max_relative = 1e-9);
        assert_abs_diff_ne!(a, Tensor2::from_rows(&[[1.0, 2.0], [3.0, 4.5]]), epsilon = 1e-9);
    }

    #[test]
    fn test_dims_must_match() {
        let row = Tensor::from_vec(vec![0.0f64; 4], Dim2(1, 4));
        let col = Tensor::from_vec(vec![0.0f64; 4], Dim2(4, 1));
        assert_abs_diff_ne!(row, col);
        let v: Tensor1<f64> = Tensor::zeroed(Dim1(3));
        assert_abs_diff_eq!(v, Tensor1::from_vec_1d(vec![0.0, 0.0, 0.0]));
    }
}
