//! Sat-index page parsing.
//!
//! Each page holds up to [`PAGE_SIZE`] districts as two parallel lists: sat
//! deltas (running sums give absolute sat numbers) and the page slot each
//! sum belongs to. The published pages are not consistently formatted, so
//! the text is normalized by trying a fixed, ordered list of strategies until
//! one yields a `(deltas, indices)` pair.

use crate::config::DEFAULT_BARE_PAIR_PAGES;
use crate::district::PAGE_SIZE;
use crate::{Result, SatIndexError};
use log::{debug, warn};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// A named normalization strategy: page text in, `(deltas, indices)` out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    BracketWrappedPair,
    CompactNewlineIndent,
    CompactDoubleSpaces,
    RawJson,
}

impl Strategy {
    /// Strategies for pages published as regular JSON, in priority order.
    pub const JSON: [Strategy; 3] = [
        Strategy::CompactNewlineIndent,
        Strategy::CompactDoubleSpaces,
        Strategy::RawJson,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::BracketWrappedPair => "bracket_wrapped_pair",
            Strategy::CompactNewlineIndent => "compact_newline_indent",
            Strategy::CompactDoubleSpaces => "compact_double_spaces",
            Strategy::RawJson => "raw_json",
        }
    }

    pub fn apply(self, text: &str, page_size: usize) -> Option<(Vec<u64>, Vec<u64>)> {
        match self {
            Strategy::BracketWrappedPair => bracket_wrapped_pair(text, page_size),
            Strategy::CompactNewlineIndent => compact_newline_indent(text),
            Strategy::CompactDoubleSpaces => compact_double_spaces(text),
            Strategy::RawJson => raw_json(text),
        }
    }
}

/// A JSON string payload is re-parsed at most this many times.
const MAX_STRING_UNWRAPS: usize = 3;

/// Treat the text as a pair missing its outer brackets, `[..],[..]`.
///
/// A flat list of numbers after wrapping holds `page_size` deltas followed
/// by the indices.
pub fn bracket_wrapped_pair(text: &str, page_size: usize) -> Option<(Vec<u64>, Vec<u64>)> {
    let wrapped = format!("[{}]", text.trim());
    let value = parse_json(&wrapped)?;
    if let Some(pair) = shape_pair(&value) {
        return Some(pair);
    }
    let flat = number_list(&value)?;
    if flat.len() != page_size * 2 {
        return None;
    }
    let (deltas, indices) = flat.split_at(page_size);
    Some((deltas.to_vec(), indices.to_vec()))
}

/// Drop newline-plus-two-space indentation, real or escaped, then parse.
pub fn compact_newline_indent(text: &str) -> Option<(Vec<u64>, Vec<u64>)> {
    let compacted = text.replace("\\n  ", "").replace("\n  ", "");
    shape_pair(&parse_json(&compacted)?)
}

pub fn compact_double_spaces(text: &str) -> Option<(Vec<u64>, Vec<u64>)> {
    shape_pair(&parse_json(&text.replace("  ", ""))?)
}

pub fn raw_json(text: &str) -> Option<(Vec<u64>, Vec<u64>)> {
    shape_pair(&parse_json(text)?)
}

/// Parse JSON, unwrapping double-encoded string payloads.
fn parse_json(text: &str) -> Option<JsonValue> {
    let mut value: JsonValue = serde_json::from_str(text.trim()).ok()?;
    for _ in 0..MAX_STRING_UNWRAPS {
        match value {
            JsonValue::String(inner) => value = serde_json::from_str(inner.trim()).ok()?,
            _ => return Some(value),
        }
    }
    None
}

/// `[deltas, indices]` or a two-key object holding them in that order.
fn shape_pair(value: &JsonValue) -> Option<(Vec<u64>, Vec<u64>)> {
    let (first, second) = match value {
        JsonValue::Array(items) if items.len() == 2 => (&items[0], &items[1]),
        JsonValue::Object(map) if map.len() == 2 => {
            let mut values = map.values();
            (values.next()?, values.next()?)
        }
        _ => return None,
    };
    Some((number_list(first)?, number_list(second)?))
}

/// Arrays, or objects keyed `"0"`, `"1"`, ... as typed arrays serialize.
fn number_list(value: &JsonValue) -> Option<Vec<u64>> {
    match value {
        JsonValue::Array(items) => items.iter().map(as_number).collect(),
        JsonValue::Object(map) => {
            let mut entries = map
                .iter()
                .map(|(key, value)| Some((key.parse::<usize>().ok()?, as_number(value)?)))
                .collect::<Option<Vec<_>>>()?;
            entries.sort_unstable_by_key(|(position, _)| *position);
            if entries.iter().enumerate().any(|(i, (position, _))| i != *position) {
                return None;
            }
            Some(entries.into_iter().map(|(_, n)| n).collect())
        }
        JsonValue::String(inner) => number_list(&parse_json(inner)?),
        _ => None,
    }
}

fn as_number(value: &JsonValue) -> Option<u64> {
    match value {
        JsonValue::Number(n) => n.as_u64().or_else(|| {
            let f = n.as_f64()?;
            (f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64).then_some(f as u64)
        }),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("running sat sum overflows at delta {0}")]
pub struct DeltaOverflow(pub usize);

/// Rebuild absolute sats from deltas and scatter them into page slots.
///
/// Slots no index points at stay 0. Delta order drives the running sum;
/// indices only decide placement.
pub fn reconstruct(
    deltas: &[u64],
    indices: &[u64],
    page_size: usize,
) -> core::result::Result<Vec<u64>, DeltaOverflow> {
    if deltas.len() != indices.len() {
        warn!(
            "delta page has {} deltas but {} indices, using the first {}",
            deltas.len(),
            indices.len(),
            deltas.len().min(indices.len())
        );
    }
    let mut sats = vec![0u64; page_size];
    let mut running = 0u64;
    for (position, (delta, index)) in deltas.iter().zip(indices).enumerate() {
        running = if position == 0 {
            *delta
        } else {
            running.checked_add(*delta).ok_or(DeltaOverflow(position))?
        };
        match usize::try_from(*index).ok().and_then(|i| sats.get_mut(i)) {
            Some(slot) => *slot = running,
            None => warn!("delta page index {index} is outside a page of {page_size}, skipping"),
        }
    }
    Ok(sats)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaPageParser {
    page_size: usize,
    bare_pair_pages: Vec<usize>,
}

impl Default for DeltaPageParser {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl DeltaPageParser {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            bare_pair_pages: DEFAULT_BARE_PAIR_PAGES.to_vec(),
        }
    }

    pub fn with_bare_pair_pages(mut self, pages: impl IntoIterator<Item = usize>) -> Self {
        self.bare_pair_pages = pages.into_iter().collect();
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Strategy order for a page. Only bare-pair pages try the bracket
    /// strategy, and they try it first.
    pub fn strategies_for(&self, page: usize) -> Vec<Strategy> {
        let mut strategies = Vec::with_capacity(Strategy::JSON.len() + 1);
        if self.bare_pair_pages.contains(&page) {
            strategies.push(Strategy::BracketWrappedPair);
        }
        strategies.extend(Strategy::JSON);
        strategies
    }

    pub fn normalize(&self, page: usize, text: &str) -> Result<(Vec<u64>, Vec<u64>)> {
        for strategy in self.strategies_for(page) {
            let name = strategy.name();
            match strategy.apply(text, self.page_size) {
                Some(pair) => {
                    debug!(
                        "page {page} normalized by {name}: {} deltas, {} indices",
                        pair.0.len(),
                        pair.1.len()
                    );
                    return Ok(pair);
                }
                None => debug!("page {page}: strategy {name} did not apply"),
            }
        }
        Err(SatIndexError::PageFormatUnrecognized {
            page,
            reason: "no normalization strategy produced a deltas/indices pair".to_string(),
        })
    }

    /// Parse one page into `page_size` absolute sats (0 = unresolved).
    pub fn parse(&self, page: usize, text: &str) -> Result<Vec<u64>> {
        let (deltas, indices) = self.normalize(page, text)?;
        reconstruct(&deltas, &indices, self.page_size).map_err(|e| {
            SatIndexError::PageFormatUnrecognized {
                page,
                reason: e.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pair(deltas: &[u64], indices: &[u64]) -> Option<(Vec<u64>, Vec<u64>)> {
        Some((deltas.to_vec(), indices.to_vec()))
    }

    #[test]
    fn test_reconstruct_scatters_running_sums() {
        let sats = reconstruct(&[1000, 5, 10], &[2, 0, 1], 5).unwrap();
        assert_eq!(sats, vec![1005, 1015, 1000, 0, 0]);
    }

    #[test]
    fn test_reconstruct_skips_bad_indices_and_uneven_lists() {
        let sats = reconstruct(&[7, 1, 1, 1], &[0, 9, 2], 3).unwrap();
        assert_eq!(sats, vec![7, 0, 9]);
    }

    #[test]
    fn test_reconstruct_overflow() {
        assert_eq!(
            reconstruct(&[u64::MAX, 1], &[0, 1], 2),
            Err(DeltaOverflow(1))
        );
    }

    #[test]
    fn test_raw_json() {
        assert_eq!(raw_json("[[1,2],[0,1]]"), pair(&[1, 2], &[0, 1]));
        assert_eq!(raw_json("[1,2],[0,1]"), None);
    }

    #[test]
    fn test_raw_json_double_encoded_and_object_shapes() {
        assert_eq!(raw_json(r#""[[3,4],[1,0]]""#), pair(&[3, 4], &[1, 0]));
        assert_eq!(
            raw_json(r#"{"deltas":[3,4.0,"5"],"indices":[0,1,2]}"#),
            pair(&[3, 4, 5], &[0, 1, 2])
        );
        assert_eq!(
            raw_json(r#"{"d":{"1":9,"0":8},"i":{"0":1,"1":0}}"#),
            pair(&[8, 9], &[1, 0])
        );
        assert_eq!(raw_json(r#"{"d":[1],"i":[0],"x":[]}"#), None);
        assert_eq!(raw_json("[[1.5],[0]]"), None);
    }

    #[test]
    fn test_compact_newline_indent() {
        assert_eq!(
            compact_newline_indent("[\n  [10,\n  20],\n  [0,\n  1]\n]"),
            pair(&[10, 20], &[0, 1])
        );
        // Indentation escaped inside a double-encoded payload.
        assert_eq!(
            compact_newline_indent(r#""[\n  [10],\n  [0]]""#),
            pair(&[10], &[0])
        );
    }

    #[test]
    fn test_compact_double_spaces() {
        assert_eq!(
            compact_double_spaces("[[1,  2],  [0,  1]]"),
            pair(&[1, 2], &[0, 1])
        );
        assert_eq!(compact_double_spaces("not json"), None);
    }

    #[test]
    fn test_bracket_wrapped_pair() {
        assert_eq!(bracket_wrapped_pair("[5,6],[1,0]", 2), pair(&[5, 6], &[1, 0]));
        assert_eq!(bracket_wrapped_pair(" 5,6,1,0\n", 2), pair(&[5, 6], &[1, 0]));
        assert_eq!(bracket_wrapped_pair("5,6,1", 2), None);
        assert_eq!(bracket_wrapped_pair("[[5],[1]]", 2), None);
    }

    #[test]
    fn test_flat_list_splits_at_page_size() {
        assert_eq!(
            bracket_wrapped_pair("1,2,3,0,1,2", 3),
            pair(&[1, 2, 3], &[0, 1, 2])
        );
        // Even length, but not two full page-size halves.
        assert_eq!(bracket_wrapped_pair("1,2,0,1", 3), None);
        assert_eq!(bracket_wrapped_pair("1,2,3,4,5,0,1,2", 3), None);
    }

    #[test]
    fn test_strategy_order_per_page() {
        let parser = DeltaPageParser::default();
        let names = |page| {
            parser
                .strategies_for(page)
                .into_iter()
                .map(Strategy::name)
                .collect::<Vec<_>>()
        };
        assert_eq!(names(2)[0], "bracket_wrapped_pair");
        assert_eq!(names(3)[0], "bracket_wrapped_pair");
        assert_eq!(
            names(0),
            vec!["compact_newline_indent", "compact_double_spaces", "raw_json"]
        );
    }

    #[test]
    fn test_parse_each_page_shape() {
        let parser = DeltaPageParser::new(4);
        let expected = vec![11, 10, 0, 0];
        assert_eq!(parser.parse(0, "[[10,1],[1,0]]").unwrap(), expected);
        assert_eq!(parser.parse(2, "[10,1],[1,0]").unwrap(), expected);
        assert_eq!(parser.parse(3, "[[10,1],[1,0]]").unwrap(), expected);
    }

    #[test]
    fn test_bare_pair_rejected_on_regular_pages() {
        let parser = DeltaPageParser::new(1);
        assert!(matches!(
            parser.parse(0, "7,3"),
            Err(SatIndexError::PageFormatUnrecognized { page: 0, .. })
        ));
        assert!(matches!(
            parser.parse(5, "[10,1],[1,0]"),
            Err(SatIndexError::PageFormatUnrecognized { page: 5, .. })
        ));
        let parser = DeltaPageParser::default();
        assert!(matches!(
            parser.parse(5, "404,0"),
            Err(SatIndexError::PageFormatUnrecognized { page: 5, .. })
        ));
        // The same body on a bare-pair page is a one-district page.
        assert_eq!(DeltaPageParser::new(1).parse(2, "7,0").unwrap(), vec![7]);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let parser = DeltaPageParser::new(8);
        let text = "[\n  [100,\n  3,\n  4],\n  [7,\n  0,\n  3]\n]";
        let first = parser.parse(1, text).unwrap();
        assert_eq!(first, parser.parse(1, text).unwrap());
        assert_eq!(first, vec![103, 0, 0, 107, 0, 0, 0, 100]);
    }

    #[test]
    fn test_parse_unrecognized() {
        let parser = DeltaPageParser::new(4);
        assert!(matches!(
            parser.parse(1, "<html>not found</html>"),
            Err(SatIndexError::PageFormatUnrecognized { page: 1, .. })
        ));
        assert!(matches!(
            parser.parse(0, "[[18446744073709551615,1],[0,1]]"),
            Err(SatIndexError::PageFormatUnrecognized { page: 0, .. })
        ));
    }
}
