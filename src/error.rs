//! Error type for configuration and input validation.
//!
//! Collision outcomes are never errors; only misuse of the entry points is.

/// All errors that the crate can generate
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The margin type string is neither `percentage` nor `absolute`
    #[error("unknown margin type `{0}` (expected `percentage` or `absolute`)")]
    UnknownMarginType(String),

    /// A rectangle has a negative width or height
    #[error("rectangle {index} has a negative size ({width} x {height})")]
    NegativeSize {
        /// Position of the rectangle in the input
        index: usize,
        /// Width as supplied
        width: f64,
        /// Height as supplied
        height: f64,
    },

    /// A rectangle has a NaN or infinite coordinate or extent
    #[error("rectangle {index} has a non-finite coordinate")]
    NonFiniteGeometry {
        /// Position of the rectangle in the input
        index: usize,
    },

    /// A simulation parameter is out of range
    #[error("invalid value {value} for parameter `{name}`")]
    InvalidParameter {
        /// Option name
        name: &'static str,
        /// Offending value
        value: f64,
    },
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
