use thiserror::Error;

use crate::kind::PixelKind;

/// Errors reported by the image engine.
///
/// Input-validation errors are detected before any mutation. Numeric-domain
/// failures inside a bulk pass never surface here; the offending pixel is
/// marked bad and the pass continues. An operation only escalates to a hard
/// error when its entire output would be invalid.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ImageError {
    #[error("required input is missing: {0}")]
    NullInput(&'static str),

    #[error("incompatible dimensions: {0}x{1} vs {2}x{3}")]
    IncompatibleInput(usize, usize, usize, usize),

    #[error("operand kinds cannot be combined: {0} vs {1}")]
    TypeMismatch(PixelKind, PixelKind),

    #[error("pixel kind {0} is not supported by {1}")]
    InvalidType(PixelKind, &'static str),

    #[error("parameter out of range: {0}")]
    IllegalInput(String),

    #[error("coordinate ({0}, {1}) outside {2}x{3} image")]
    AccessOutOfRange(i64, i64, usize, usize),

    #[error("division by zero")]
    DivisionByZero,

    #[error("operation produced no valid output")]
    DataNotFound,

    #[error("unsupported mode: {0}")]
    UnsupportedMode(String),
}

pub type ImageResult<T> = Result<T, ImageError>;

impl ImageError {
    /// Shorthand for an [`ImageError::IllegalInput`] with a formatted reason.
    pub(crate) fn illegal(reason: impl Into<String>) -> Self {
        ImageError::IllegalInput(reason.into())
    }
}
