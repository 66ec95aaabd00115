use num_traits::{Float, NumAssignOps};
use std::fmt::{Debug, Display};

/// Scalar type the network computes in.
pub trait DType: 'static + Float + NumAssignOps + Default + Debug + Display + Send + Sync {
    const ZERO: Self;
    const ONE: Self;
    fn from_f64(val: f64) -> Self;
    fn from_usize(val: usize) -> Self;
    fn as_f64(self) -> f64;

    /// performs a generic matrix multiplication (gemm) on row-major slices:
    /// `c = alpha * op(a) * op(b) + beta * c` where `op(a)` is `m x k` and `op(b)` is `k x n`
    fn matrix_multiply(
        m: usize,
        k: usize,
        n: usize,
        alpha: Self,
        a: &[Self],
        ta: bool,
        b: &[Self],
        tb: bool,
        beta: Self,
        c: &mut [Self],
    );
}

macro_rules! impl_dtype {
    ($ty:ty, $gemm:ident) => {
        impl DType for $ty {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            #[inline]
            fn from_f64(val: f64) -> Self {
                val as $ty
            }
            #[inline]
            fn from_usize(val: usize) -> Self {
                val as $ty
            }
            #[inline]
            fn as_f64(self) -> f64 {
                self as f64
            }

            fn matrix_multiply(
                m: usize,
                k: usize,
                n: usize,
                alpha: Self,
                a: &[Self],
                ta: bool,
                b: &[Self],
                tb: bool,
                beta: Self,
                c: &mut [Self],
            ) {
                assert_eq!(a.len(), m * k, "Invalid length for matrix a");
                assert_eq!(b.len(), k * n, "Invalid length for matrix b");
                assert_eq!(c.len(), m * n, "Invalid length for matrix c");
                // a stored as (m, k) or, when transposed, as (k, m)
                let (rsa, csa) = if ta { (1, m as isize) } else { (k as isize, 1) };
                let (rsb, csb) = if tb { (1, k as isize) } else { (n as isize, 1) };
                unsafe {
                    matrixmultiply::$gemm(
                        m,
                        k,
                        n,
                        alpha,
                        a.as_ptr(),
                        rsa,
                        csa,
                        b.as_ptr(),
                        rsb,
                        csb,
                        beta,
                        c.as_mut_ptr(),
                        n as isize,
                        1,
                    );
                }
            }
        }
    };
}

impl_dtype!(f32, sgemm);
impl_dtype!(f64, dgemm);

#[cfg(test)]
mod test {
    use crate::dtype::DType;

    macro_rules! assert_slice_equal {
        ($a:ident, $b:expr) => {{
            let b = $b;
            if $a.len() != b.len()
                || !std::iter::zip(&$a, &b).all(|(&i, &j)| (i - j).abs() <= f64::EPSILON)
            {
                let mismatch: Vec<usize> = std::iter::zip(&$a, &b)
                    .enumerate()
                    .filter(|&(_, (&i, &j))| (i - j).abs() > f64::EPSILON)
                    .map(|(idx, _)| idx)
                    .collect();
                panic!(
                    "slices not equal: left={:?}, right={:?}, mismatched indexes={:?}",
                    &$a, &b, &mismatch
                );
            }
        }};
    }

    #[test]
    fn test_mat_mul() {
        let a = [1., 2., 3., 4., 5., 6.]; // 2x3
        let b = [7., 8., 9., 10., 11., 12.]; // 3x2
        let c = [0.5, 1., 1., 0.25]; // 2x2

        let mut r2x2 = [100.0f64; 4]; // existing values should be ignored
        f64::matrix_multiply(2, 3, 2, 1.0, &a, false, &b, false, 0.0, &mut r2x2);
        assert_slice_equal!(r2x2, [58., 64., 139., 154.]);

        let mut r2x2 = [1.0f64; 4];
        f64::matrix_multiply(2, 3, 2, 0.5, &a, false, &b, false, 5.0, &mut r2x2);
        assert_slice_equal!(r2x2, [34., 37., 74.5, 82.]);

        // C X Bt
        let mut r2x3 = [100.0f64; 6];
        f64::matrix_multiply(2, 2, 3, 1.0, &c, false, &b, true, 0.0, &mut r2x3);
        assert_slice_equal!(r2x3, [11.5, 14.5, 17.5, 9., 11.5, 14.]);

        // At X C
        let mut r3x2 = [100.0f64; 6];
        f64::matrix_multiply(3, 2, 2, 1.0, &a, true, &c, false, 0.0, &mut r3x2);
        assert_slice_equal!(r3x2, [4.5, 2., 6., 3.25, 7.5, 4.5]);
    }

    #[test]
    fn test_vector_products() {
        let w = [1., 2., 3., 4., 5., 6.]; // 2x3
        let x = [1., 0., -1.];
        let mut z = [0.5f64, -0.5];
        f64::matrix_multiply(2, 3, 1, 1.0, &w, false, &x, false, 1.0, &mut z);
        assert_slice_equal!(z, [-1.5, -2.5]);

        let delta = [1., 2.];
        let mut grad = [0.0f64; 3];
        f64::matrix_multiply(1, 2, 3, 1.0, &delta, false, &w, false, 0.0, &mut grad);
        assert_slice_equal!(grad, [9., 12., 15.]);
    }
}
