use crate::dtype::DType;
use std::iter::zip;

/// `target -= alpha * source`
#[inline]
pub(crate) fn sub_assign_scaled<F: DType>(alpha: F, source: &[F], target: &mut [F]) {
    debug_assert_eq!(source.len(), target.len());
    for (t, &s) in zip(target, source) {
        *t -= alpha * s;
    }
}

#[inline]
pub(crate) fn sum<F: DType>(arr: &[F]) -> F {
    arr.iter().fold(F::ZERO, |acc, &x| acc + x)
}
