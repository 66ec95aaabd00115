use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("network has no layers")]
    EmptyNetwork,
    #[error("forward pass was recorded over {actual} layers but the network has {expected}")]
    StaleForwardPass { expected: usize, actual: usize },
    #[error("training set is empty")]
    EmptyDataset,
    #[error("invalid configuration for {field}: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
    #[cfg(feature = "serde")]
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    #[inline]
    pub(crate) fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Error::DimensionMismatch {
                what,
                expected,
                actual,
            })
        }
    }

    #[inline]
    pub(crate) fn invalid(field: &'static str, reason: &'static str) -> Self {
        Error::InvalidConfig { field, reason }
    }
}
