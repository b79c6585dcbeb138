use bitcoin::{hashes::Hash, Txid};
use core::fmt::{self, Display, Formatter};
use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const TXID_LEN: usize = 64;
const MIN_LEN: usize = TXID_LEN + 2;

/// `<txid>i<index>`, the identifier ord reports for an inscription.
#[derive(Debug, PartialEq, Copy, Clone, Hash, Eq, PartialOrd, Ord)]
pub struct InscriptionId {
    pub txid: Txid,
    pub index: u32,
}

impl Default for InscriptionId {
    fn default() -> Self {
        Self {
            txid: Txid::all_zeros(),
            index: 0,
        }
    }
}

impl Display for InscriptionId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}i{}", self.txid, self.index)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid character: '{0}'")]
    Character(char),
    #[error("invalid length: {0}")]
    Length(usize),
    #[error("invalid separator: `{0}`")]
    Separator(char),
    #[error("invalid txid: {0}")]
    Txid(String),
    #[error("invalid index: {0}")]
    Index(String),
}

impl FromStr for InscriptionId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(c) = s.chars().find(|c| !c.is_ascii()) {
            return Err(ParseError::Character(c));
        }
        if s.len() < MIN_LEN {
            return Err(ParseError::Length(s.len()));
        }

        let (txid, rest) = s.split_at(TXID_LEN);
        let mut rest_chars = rest.chars();
        match rest_chars.next() {
            Some('i') => {}
            Some(other) => return Err(ParseError::Separator(other)),
            None => return Err(ParseError::Length(s.len())),
        }

        Ok(Self {
            txid: txid.parse().map_err(|e| ParseError::Txid(format!("{e}")))?,
            index: rest_chars
                .as_str()
                .parse()
                .map_err(|e| ParseError::Index(format!("{e}")))?,
        })
    }
}

impl Serialize for InscriptionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for InscriptionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
