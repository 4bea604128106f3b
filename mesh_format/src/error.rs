use std::{io, path::PathBuf};

use common::serde::DeserializeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot open `{}`: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The source ended before the layout said it would.
    #[error("truncated mesh data at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Only produced when [`common::config::ParseConfig::strict_length`] is set.
    #[error("mesh declares {declared} triangles but has {trailing} trailing bytes")]
    MalformedLength { declared: u32, trailing: usize },

    #[error("failed to read mesh data: {0}")]
    Read(#[source] io::Error),

    /// Returned when writing, the count field is a `u32`.
    #[error("cannot encode {count} triangles, at most {} fit in the count field", u32::MAX)]
    TooManyTriangles { count: usize },
}

impl From<DeserializeError> for ParseError {
    fn from(value: DeserializeError) -> Self {
        match value {
            DeserializeError::Eof {
                offset,
                needed,
                available,
            } => ParseError::Truncated {
                offset,
                needed,
                available,
            },
            DeserializeError::Io(err) => ParseError::Read(err),
        }
    }
}
