//! Recursive-descent decoder for the CBOR-like metadata encoding.
//!
//! Each header byte carries a major type in its top three bits and an
//! argument encoding in the low five: 0..=23 literal, 24/25/26/27 for a
//! following 1/2/4/8 byte big-endian argument. Only the definite-length forms
//! observed in inscription metadata are decoded.
//!
//! Unrecognised simple values (major type 7) do not fail. They decode to their
//! raw argument as [`Value::UnsignedInt`], are logged, and are counted so a
//! caller can tell a lenient decode from a clean one.

use crate::byte_reader::ByteReader;
use crate::error::{DecodeError, DecodeResult};
use crate::value::Value;
use indexmap::IndexMap;
use log::warn;

pub const MAX_DEPTH: usize = 128;

const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_NEGATIVE: u8 = 1;
const MAJOR_BYTES: u8 = 2;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;
const MAJOR_TAG: u8 = 6;

const SIMPLE_FALSE: u8 = 20;
const SIMPLE_TRUE: u8 = 21;
const SIMPLE_NULL: u8 = 22;
const SIMPLE_UNDEFINED: u8 = 23;
const FLOAT_HALF: u8 = 25;
const FLOAT_SINGLE: u8 = 26;
const FLOAT_DOUBLE: u8 = 27;

/// Result of decoding a whole buffer with [`decode_all`].
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub value: Value,
    /// Number of unrecognised simple values replaced by their raw argument.
    pub lenient_fallbacks: usize,
    /// Bytes left in the buffer after the first value.
    pub trailing: usize,
}

impl Decoded {
    pub fn is_clean(&self) -> bool {
        self.lenient_fallbacks == 0
    }
}

#[derive(Debug, Default)]
pub struct BinaryValueDecoder {
    lenient_fallbacks: usize,
}

impl BinaryValueDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lenient_fallbacks(&self) -> usize {
        self.lenient_fallbacks
    }

    /// Decode exactly one value and leave the reader just past it.
    pub fn decode(&mut self, reader: &mut ByteReader<'_>) -> DecodeResult<Value> {
        self.decode_at(reader, 0)
    }

    fn decode_at(&mut self, reader: &mut ByteReader<'_>, depth: usize) -> DecodeResult<Value> {
        if depth > MAX_DEPTH {
            return Err(DecodeError::NestingTooDeep { max: MAX_DEPTH });
        }
        let header = reader.read_u8()?;
        let major = header >> 5;
        let info = header & 0x1f;

        match major {
            MAJOR_UNSIGNED => Ok(Value::UnsignedInt(read_argument(reader, major, info)?)),
            MAJOR_NEGATIVE => {
                let arg = read_argument(reader, major, info)?;
                Ok(Value::NegativeInt(-1 - arg as i128))
            }
            MAJOR_BYTES => {
                let len = read_length(reader, major, info, 1)?;
                Ok(Value::bytes(reader.read_bytes(len)?))
            }
            MAJOR_TEXT => {
                let len = read_length(reader, major, info, 1)?;
                let raw = reader.read_bytes(len)?;
                let text = core::str::from_utf8(raw)
                    .map_err(|e| DecodeError::InvalidUtf8(e.to_string()))?;
                Ok(Value::TextString(text.to_string()))
            }
            MAJOR_ARRAY => {
                let len = read_length(reader, major, info, 1)?;
                let mut items = Vec::with_capacity(len.min(reader.remaining()));
                for _ in 0..len {
                    items.push(self.decode_at(reader, depth + 1)?);
                }
                Ok(Value::Array(items))
            }
            MAJOR_MAP => {
                let len = read_length(reader, major, info, 2)?;
                let mut entries = IndexMap::with_capacity(len.min(reader.remaining() / 2));
                for _ in 0..len {
                    let key = self.decode_at(reader, depth + 1)?;
                    let value = self.decode_at(reader, depth + 1)?;
                    // A repeated key overwrites in place, keeping its first position.
                    entries.insert(key.to_key_string(), value);
                }
                Ok(Value::Map(entries))
            }
            MAJOR_TAG => {
                let tag = read_argument(reader, major, info)?;
                let inner = self.decode_at(reader, depth + 1)?;
                Ok(Value::tagged(tag, inner))
            }
            _ => self.decode_simple(reader, info),
        }
    }

    fn decode_simple(&mut self, reader: &mut ByteReader<'_>, info: u8) -> DecodeResult<Value> {
        match info {
            SIMPLE_FALSE => Ok(Value::Bool(false)),
            SIMPLE_TRUE => Ok(Value::Bool(true)),
            SIMPLE_NULL => Ok(Value::Null),
            SIMPLE_UNDEFINED => Ok(Value::Undefined),
            FLOAT_HALF => {
                // Consume the payload so the reader stays aligned with the next value.
                reader.read_bytes(2)?;
                Ok(Value::Unsupported("half-precision float"))
            }
            FLOAT_SINGLE => Ok(Value::Float(f32::from_bits(reader.read_u32_be()?) as f64)),
            FLOAT_DOUBLE => Ok(Value::Float(f64::from_bits(reader.read_u64_be()?))),
            _ => {
                let raw = if info == 24 {
                    reader.read_u8()? as u64
                } else {
                    info as u64
                };
                self.lenient_fallbacks += 1;
                warn!(
                    "unrecognised simple value (info {info}) at offset {}, keeping raw argument {raw}",
                    reader.position()
                );
                Ok(Value::UnsignedInt(raw))
            }
        }
    }
}

fn read_argument(reader: &mut ByteReader<'_>, major: u8, info: u8) -> DecodeResult<u64> {
    match info {
        0..=23 => Ok(info as u64),
        24 => Ok(reader.read_u8()? as u64),
        25 => Ok(reader.read_u16_be()? as u64),
        26 => Ok(reader.read_u32_be()? as u64),
        27 => reader.read_u64_be(),
        _ => Err(DecodeError::UnsupportedMajorType { major, info }),
    }
}

/// Read a length argument and reject it early when the input cannot possibly
/// hold `len * min_item_size` more bytes.
fn read_length(
    reader: &mut ByteReader<'_>,
    major: u8,
    info: u8,
    min_item_size: usize,
) -> DecodeResult<usize> {
    let arg = read_argument(reader, major, info)?;
    let remaining = reader.remaining();
    let len = usize::try_from(arg).map_err(|_| DecodeError::UnexpectedEof {
        needed: usize::MAX,
        remaining,
    })?;
    let needed = len.saturating_mul(min_item_size);
    if needed > remaining {
        return Err(DecodeError::UnexpectedEof { needed, remaining });
    }
    Ok(len)
}

/// Decode the first value in `bytes`, reporting leniency and trailing bytes.
pub fn decode_all(bytes: &[u8]) -> DecodeResult<Decoded> {
    let mut reader = ByteReader::new(bytes);
    let mut decoder = BinaryValueDecoder::new();
    let value = decoder.decode(&mut reader)?;
    Ok(Decoded {
        value,
        lenient_fallbacks: decoder.lenient_fallbacks(),
        trailing: reader.remaining(),
    })
}
