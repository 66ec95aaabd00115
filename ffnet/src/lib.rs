pub mod activation;
pub mod config;
pub mod dtype;
pub mod error;
pub mod loss;
mod math;
pub mod net;
pub mod tensor;
pub mod train;
pub mod util;

pub use error::{Error, Result};

extern crate matrixmultiply;
extern crate num_traits;
extern crate rand;
extern crate rand_distr;
