//! Inscription metadata decoding.
//!
//! Metadata arrives in more than one shape: as a JSON string literal of hex
//! digits, as raw binary (CBOR-like), or as plain text. [`decode_metadata`]
//! tries those readings in that order and always produces something
//! displayable; decoding failures never escape this module.

use bitmap_support::{decode_all, Value};
use core::fmt::{self, Display, Formatter};
use log::debug;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataPayload<'a> {
    Bytes(&'a [u8]),
    Text(&'a str),
}

impl<'a> MetadataPayload<'a> {
    fn as_bytes(&self) -> &'a [u8] {
        match self {
            MetadataPayload::Bytes(bytes) => bytes,
            MetadataPayload::Text(text) => text.as_bytes(),
        }
    }

    fn as_text(&self) -> Option<&'a str> {
        match self {
            MetadataPayload::Bytes(bytes) => core::str::from_utf8(bytes).ok(),
            MetadataPayload::Text(text) => Some(text),
        }
    }
}

impl<'a> From<&'a [u8]> for MetadataPayload<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        MetadataPayload::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for MetadataPayload<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        MetadataPayload::Bytes(bytes)
    }
}

impl<'a> From<&'a str> for MetadataPayload<'a> {
    fn from(text: &'a str) -> Self {
        MetadataPayload::Text(text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetadataDisplay {
    /// The inscription carries no metadata.
    None,
    Text { text: String },
    /// A decoded array or map.
    Structured { value: JsonValue, lenient: bool },
    /// A decoded scalar, labelled with its type.
    Scalar {
        type_name: &'static str,
        value: String,
        lenient: bool,
    },
}

impl MetadataDisplay {
    pub fn is_none(&self) -> bool {
        matches!(self, MetadataDisplay::None)
    }
}

impl Display for MetadataDisplay {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MetadataDisplay::None => write!(f, "(no metadata)"),
            MetadataDisplay::Text { text } => write!(f, "{text}"),
            MetadataDisplay::Structured { value, .. } => {
                let pretty = serde_json::to_string_pretty(value).map_err(|_| fmt::Error)?;
                write!(f, "{pretty}")
            }
            MetadataDisplay::Scalar {
                type_name, value, ..
            } => write!(f, "{type_name}: {value}"),
        }
    }
}

/// Decode a metadata payload for display. Never fails.
pub fn decode_metadata<'a>(payload: impl Into<MetadataPayload<'a>>) -> MetadataDisplay {
    let payload = payload.into();
    if is_empty_payload(&payload) {
        return MetadataDisplay::None;
    }
    quoted_hex_text(&payload)
        .or_else(|| binary_value(&payload))
        .unwrap_or_else(|| plain_text(&payload))
}

fn is_empty_payload(payload: &MetadataPayload<'_>) -> bool {
    if payload.as_bytes().is_empty() {
        return true;
    }
    matches!(payload.as_text().map(str::trim), Some("" | "\"\"" | "null"))
}

/// `"48656c6c6f"` -> `Hello`; non-printable bytes become `\xNN`.
fn quoted_hex_text(payload: &MetadataPayload<'_>) -> Option<MetadataDisplay> {
    let text = payload.as_text()?.trim();
    let inner = text.strip_prefix('"')?.strip_suffix('"')?;
    if inner.is_empty() || !inner.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let bytes = hex::decode(inner).ok()?;
    Some(MetadataDisplay::Text {
        text: printable_ascii(&bytes),
    })
}

fn printable_ascii(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for byte in bytes {
        if (32..=126).contains(byte) {
            out.push(*byte as char);
        } else {
            out.push_str(&format!("\\x{byte:02x}"));
        }
    }
    out
}

fn binary_value(payload: &MetadataPayload<'_>) -> Option<MetadataDisplay> {
    let decoded = match decode_all(payload.as_bytes()) {
        Ok(decoded) => decoded,
        Err(e) => {
            debug!("metadata is not a binary value: {e}");
            return None;
        }
    };
    if decoded.trailing > 0 {
        debug!(
            "metadata binary decode left {} trailing bytes, treating as text",
            decoded.trailing
        );
        return None;
    }
    let lenient = !decoded.is_clean();
    let display = if decoded.value.is_structured() {
        MetadataDisplay::Structured {
            value: decoded.value.to_json(),
            lenient,
        }
    } else {
        MetadataDisplay::Scalar {
            type_name: decoded.value.type_name(),
            value: scalar_text(&decoded.value),
            lenient,
        }
    };
    Some(display)
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Tagged(..) => value.to_json().to_string(),
        other => other.to_string(),
    }
}

fn plain_text(payload: &MetadataPayload<'_>) -> MetadataDisplay {
    let text = match payload {
        MetadataPayload::Text(text) => Cow::Borrowed(*text),
        MetadataPayload::Bytes(bytes) => String::from_utf8_lossy(bytes),
    };
    MetadataDisplay::Text {
        text: text.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_empty_payload_is_no_metadata() {
        assert_eq!(decode_metadata(&[0u8; 0][..]), MetadataDisplay::None);
        assert_eq!(decode_metadata(""), MetadataDisplay::None);
        assert_eq!(decode_metadata("\"\""), MetadataDisplay::None);
        assert_eq!(decode_metadata("null").to_string(), "(no metadata)");
    }

    #[test]
    fn test_quoted_hex_string() {
        assert_eq!(
            decode_metadata("\"48656c6c6f\""),
            MetadataDisplay::Text {
                text: "Hello".to_string()
            }
        );
        assert_eq!(decode_metadata(&b"\"48656c6c6f\"\n".to_vec()).to_string(), "Hello");
    }

    #[test]
    fn test_quoted_hex_escapes_non_printable() {
        assert_eq!(
            decode_metadata("\"410a7f42\"").to_string(),
            "A\\x0a\\x7fB"
        );
    }

    #[test]
    fn test_binary_map_is_structured() {
        // {"name": "0.bitmap"}
        let mut bytes = vec![0xa1, 0x64];
        bytes.extend_from_slice(b"name");
        bytes.push(0x68);
        bytes.extend_from_slice(b"0.bitmap");
        assert_eq!(
            decode_metadata(&bytes),
            MetadataDisplay::Structured {
                value: json!({"name": "0.bitmap"}),
                lenient: false
            }
        );
    }

    #[test]
    fn test_binary_scalar_is_labelled() {
        let display = decode_metadata(&[0x19u8, 0x03, 0xe8][..]);
        assert_eq!(
            display,
            MetadataDisplay::Scalar {
                type_name: "uint",
                value: "1000".to_string(),
                lenient: false
            }
        );
        assert_eq!(display.to_string(), "uint: 1000");
    }

    #[test]
    fn test_lenient_decode_is_flagged() {
        let display = decode_metadata(&[0x81u8, 0xf0][..]);
        assert_eq!(
            display,
            MetadataDisplay::Structured {
                value: json!([16]),
                lenient: true
            }
        );
    }

    #[test]
    fn test_plain_text_falls_through() {
        assert_eq!(
            decode_metadata("hello world").to_string(),
            "hello world"
        );
        // Odd-length hex is not a hex string and not a complete binary value.
        assert_eq!(decode_metadata("\"abc\"").to_string(), "\"abc\"");
    }

    #[test]
    fn test_invalid_utf8_bytes_fall_back_lossily() {
        // Text header promising 2 bytes, followed by invalid UTF-8.
        let display = decode_metadata(&[0x62u8, 0xc3, 0x28][..]);
        assert_eq!(
            display,
            MetadataDisplay::Text {
                text: String::from_utf8_lossy(&[0x62, 0xc3, 0x28]).into_owned()
            }
        );
    }
}
