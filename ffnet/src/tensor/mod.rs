mod dims;
mod debug;
mod owned;
#[cfg(feature = "approx")]
mod approx;

pub use dims::*;
pub use owned::*;

/// Shape-aware view of a tensor
pub trait ITensor<D: Dims> {
    fn len(&self) -> usize;
    fn dims(&self) -> &D;
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
