//! Response bodies and paths for the ord server's recursive endpoints.
//!
//! Only the read-only `/r/...` routes used for district resolution are
//! modelled here.

use crate::inscription_id::InscriptionId;
use serde::{Deserialize, Serialize};

/// Body of `/r/sat/<SAT>/at/<INDEX>`.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct SatInscription {
    pub id: Option<InscriptionId>,
}

/// Body of `/r/sat/<SAT>/<PAGE>`.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct SatInscriptions {
    pub ids: Vec<InscriptionId>,
    pub more: bool,
    pub page: u64,
}

/// URL builder for recursive endpoints rooted at an ord server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrdEndpoints {
    base: String,
}

impl OrdEndpoints {
    pub fn new(base: impl AsRef<str>) -> Self {
        Self {
            base: base.as_ref().trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn sat_inscription_at(&self, sat: u64, offset: u64) -> String {
        format!("{}/r/sat/{sat}/at/{offset}", self.base)
    }

    pub fn sat_inscriptions(&self, sat: u64, page: u64) -> String {
        format!("{}/r/sat/{sat}/{page}", self.base)
    }

    pub fn metadata(&self, inscription: &InscriptionId) -> String {
        format!("{}/r/metadata/{inscription}", self.base)
    }
}
