//! District numbers and their placement in the paged sat index.

use crate::{Result, SatIndexError};
use core::fmt::{self, Display, Formatter};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Number of districts in the index, `0..DISTRICT_COUNT`.
pub const DISTRICT_COUNT: u32 = 840_000;
/// Districts per index page.
pub const PAGE_SIZE: usize = 100_000;
/// Pages needed to cover every district.
pub const PAGE_COUNT: usize = 9;

const NAME_SUFFIX: &str = ".bitmap";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct District(u32);

impl District {
    /// Validate a raw district number. Negative and too-large values are
    /// rejected here so no lookup is ever attempted for them.
    pub fn new(number: i64) -> Result<Self> {
        if (0..DISTRICT_COUNT as i64).contains(&number) {
            Ok(Self(number as u32))
        } else {
            Err(SatIndexError::DistrictOutOfRange(number))
        }
    }

    pub fn number(self) -> u32 {
        self.0
    }

    pub fn page(self) -> usize {
        self.0 as usize / PAGE_SIZE
    }

    pub fn slot(self) -> usize {
        self.0 as usize % PAGE_SIZE
    }
}

impl TryFrom<i64> for District {
    type Error = SatIndexError;

    fn try_from(number: i64) -> Result<Self> {
        Self::new(number)
    }
}

impl From<District> for u32 {
    fn from(district: District) -> Self {
        district.0
    }
}

impl Display for District {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{NAME_SUFFIX}", self.0)
    }
}

/// Accepts `"123"` as well as the `"123.bitmap"` name form.
impl FromStr for District {
    type Err = SatIndexError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed.strip_suffix(NAME_SUFFIX).unwrap_or(trimmed);
        let number: i64 = digits
            .parse()
            .map_err(|_| SatIndexError::InvalidDistrict(s.to_string()))?;
        Self::new(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_bounds() {
        assert!(District::new(0).is_ok());
        assert_eq!(District::new(839_999).unwrap().number(), 839_999);
        assert_eq!(
            District::new(840_000),
            Err(SatIndexError::DistrictOutOfRange(840_000))
        );
        assert_eq!(District::new(-1), Err(SatIndexError::DistrictOutOfRange(-1)));
    }

    #[test]
    fn test_page_and_slot() {
        let district = District::new(123_456).unwrap();
        assert_eq!(district.page(), 1);
        assert_eq!(district.slot(), 23_456);
        assert_eq!(District::new(839_999).unwrap().page(), 8);
    }

    #[test]
    fn test_parse_name_forms() {
        assert_eq!("42".parse::<District>().unwrap().number(), 42);
        assert_eq!(" 42.bitmap ".parse::<District>().unwrap().number(), 42);
        assert_eq!(District::new(7).unwrap().to_string(), "7.bitmap");
        assert!(matches!(
            "abc.bitmap".parse::<District>(),
            Err(SatIndexError::InvalidDistrict(_))
        ));
        assert!(matches!(
            "900000".parse::<District>(),
            Err(SatIndexError::DistrictOutOfRange(900_000))
        ));
    }

    #[test]
    fn test_serde_validates() {
        let district: District = serde_json::from_str("17").unwrap();
        assert_eq!(district.number(), 17);
        assert!(serde_json::from_str::<District>("-4").is_err());
        assert_eq!(serde_json::to_string(&district).unwrap(), "17");
    }
}
