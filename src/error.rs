use std::fmt::Display;

use serde::{de, ser};

/// Error type for `param_qs`.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The input could not be converted into a list of key-value pairs.
    ///
    /// Returned by `encode` when the top-level value is neither an ordered
    /// pair list nor a mapping, and by the flat dialect for values that
    /// have no scalar form.
    #[error("type conversion error: {0}")]
    TypeConversion(String),

    /// Custom string-based error
    #[error("{0}")]
    Custom(String),

    /// Unsupported type for conversion
    #[error("unsupported type for serialization: {0}")]
    Unsupported(&'static str),
}

impl Error {
    /// Generate error for a value that has the wrong shape to be encoded.
    pub fn type_conversion<T: Display>(msg: T) -> Self {
        Error::TypeConversion(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Error::Custom(msg.to_string())
    }
}

impl ser::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
