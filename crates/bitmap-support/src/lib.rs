//! Wire-level helpers for bitmap inscription data.
//!
//! - [`ByteReader`]: bounds-checked cursor over a byte slice
//! - [`BinaryValueDecoder`]: lenient decoder for CBOR-like metadata payloads
//! - [`Value`]: the decoded, display-oriented value tree
//!
//! Everything here is synchronous and performs no I/O.

pub mod byte_reader;
pub mod decoder;
pub mod error;
pub mod value;

pub use byte_reader::ByteReader;
pub use decoder::{decode_all, BinaryValueDecoder, Decoded, MAX_DEPTH};
pub use error::{DecodeError, DecodeResult};
pub use value::Value;
