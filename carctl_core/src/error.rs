use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CarError {
    #[error("unknown vehicle variant: {0}")]
    UnknownVariant(String),
    #[error("invalid calibration for {variant}: {reason}")]
    Calibration {
        variant: &'static str,
        reason: &'static str,
    },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid trace row: {0}")]
    Trace(String),
}

impl From<carctl_traits::ParseVariantError> for CarError {
    fn from(e: carctl_traits::ParseVariantError) -> Self {
        CarError::UnknownVariant(e.0)
    }
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
