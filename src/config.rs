//! Engine configuration.

use crate::district::PAGE_COUNT;
use crate::{Result, SatIndexError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_ORD_URL: &str = "https://ordinals.com";
/// Appended to `ord_url` for each page; `{page}` is replaced by 0..=8.
pub const DEFAULT_PAGE_PATH_TEMPLATE: &str = "/bitmap/sat-index/{page}.json";
/// Pages published as a bare `[..],[..]` pair without enclosing brackets.
pub const DEFAULT_BARE_PAIR_PAGES: [usize; 2] = [2, 3];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SatIndexConfig {
    /// Ord server serving the recursive `/r/...` endpoints
    pub ord_url: String,

    /// Path template for index pages, used when `page_urls` is not set
    pub page_path_template: String,

    /// Explicit page URLs, indexed by page number (overrides the template)
    pub page_urls: Option<Vec<String>>,

    /// Pages whose payload should be tried as a bracket-less pair first
    pub bare_pair_pages: Vec<usize>,

    /// District number -> inscription offset on its sat, for districts whose
    /// bitmap inscription is not the first one on the sat
    pub offset_overrides: BTreeMap<u32, u64>,

    /// Request timeout in seconds (native transport)
    pub timeout_seconds: u64,
}

impl Default for SatIndexConfig {
    fn default() -> Self {
        Self {
            ord_url: DEFAULT_ORD_URL.to_string(),
            page_path_template: DEFAULT_PAGE_PATH_TEMPLATE.to_string(),
            page_urls: None,
            bare_pair_pages: DEFAULT_BARE_PAIR_PAGES.to_vec(),
            offset_overrides: BTreeMap::new(),
            timeout_seconds: 600,
        }
    }
}

impl SatIndexConfig {
    pub fn with_ord_url(mut self, ord_url: impl Into<String>) -> Self {
        self.ord_url = ord_url.into();
        self
    }

    pub fn with_page_urls(mut self, page_urls: Vec<String>) -> Self {
        self.page_urls = Some(page_urls);
        self
    }

    /// Parse a JSON config document; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// The fixed page URL table, one entry per page.
    pub fn page_urls(&self) -> Vec<String> {
        match &self.page_urls {
            Some(urls) => urls.clone(),
            None => {
                let base = self.ord_url.trim_end_matches('/');
                (0..PAGE_COUNT)
                    .map(|page| {
                        let path = self.page_path_template.replace("{page}", &page.to_string());
                        format!("{base}{path}")
                    })
                    .collect()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.ord_url.starts_with("http://") || self.ord_url.starts_with("https://")) {
            return Err(SatIndexError::Configuration(format!(
                "ord_url must be an http(s) URL, got {:?}",
                self.ord_url
            )));
        }
        match &self.page_urls {
            Some(urls) if urls.len() != PAGE_COUNT => {
                return Err(SatIndexError::Configuration(format!(
                    "expected {PAGE_COUNT} page URLs, got {}",
                    urls.len()
                )));
            }
            None if !self.page_path_template.contains("{page}") => {
                return Err(SatIndexError::Configuration(
                    "page_path_template must contain {page}".to_string(),
                ));
            }
            _ => {}
        }
        if let Some(page) = self.bare_pair_pages.iter().find(|p| **p >= PAGE_COUNT) {
            return Err(SatIndexError::Configuration(format!(
                "bare pair page {page} is out of range"
            )));
        }
        Ok(())
    }
}
