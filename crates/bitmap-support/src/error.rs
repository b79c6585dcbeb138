use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodeError {
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("text string is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    #[error("unsupported encoding: major type {major}, additional info {info}")]
    UnsupportedMajorType { major: u8, info: u8 },

    #[error("value nesting exceeds {max} levels")]
    NestingTooDeep { max: usize },
}

pub type DecodeResult<T> = core::result::Result<T, DecodeError>;
