use crate::tensor::{Dim1, Dim2, ITensor, Tensor};
use std::fmt::{Debug, Formatter, Write};

const DEBUG_LIMIT_DIM_OUTER: usize = 5;
const DEBUG_LIMIT_DIM_INNER: usize = 10;

fn fmt_slice_elements<T: Debug>(f: &mut Formatter<'_>, slice: &[T]) -> std::fmt::Result {
    let mut first = true;
    for x in slice {
        if first {
            first = false;
        } else {
            f.write_str(", ")?;
        }
        Debug::fmt(x, f)?;
    }
    Ok(())
}

fn fmt_slice<T: Debug>(f: &mut Formatter<'_>, slice: &[T], limit: usize) -> std::fmt::Result {
    f.write_char('[')?;
    if slice.len() > limit {
        let half = limit / 2;
        fmt_slice_elements(f, &slice[..half])?;
        write!(f, ", ...({} hidden), ", slice.len() - 2 * half)?;
        fmt_slice_elements(f, &slice[slice.len() - half..])?;
    } else {
        fmt_slice_elements(f, slice)?;
    }
    f.write_char(']')
}

impl<T: Debug> Debug for Tensor<T, Dim1> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tensor{} ", self.dims())?;
        fmt_slice(f, self.as_ref(), DEBUG_LIMIT_DIM_INNER)
    }
}

impl<T: Debug> Debug for Tensor<T, Dim2> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tensor{} [", self.dims())?;
        let rows = self.dims().rows();
        for (i, row) in self.rows().enumerate() {
            if rows > DEBUG_LIMIT_DIM_OUTER && i == DEBUG_LIMIT_DIM_OUTER - 1 && i != rows - 1 {
                write!(f, ", ...({} hidden)", rows - i)?;
                break;
            }
            if i > 0 {
                f.write_str(", ")?;
            }
            fmt_slice(f, row, DEBUG_LIMIT_DIM_INNER)?;
        }
        f.write_char(']')
    }
}
