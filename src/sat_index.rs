//! Lazily loaded district -> sat index.
//!
//! The index is split into [`PAGE_COUNT`] pages that are fetched on first
//! use and kept for the life of the cache. Concurrent lookups that hit the
//! same unloaded page share one fetch: the first caller installs a shared
//! load future in the page slot and everyone else awaits a clone of it.
//! The load future records its own outcome in the slot, and is also
//! detached onto the ambient executor, so an abandoned wait never leaves a
//! page stuck in `Loading`.

use crate::config::SatIndexConfig;
use crate::delta_page::DeltaPageParser;
use crate::district::{District, PAGE_COUNT};
use crate::traits::NetworkProvider;
use crate::{Result, SatIndexError};
use cfg_if::cfg_if;
use core::future::Future;
use futures::future::{FutureExt, Shared};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type PageResult = Result<Arc<[u64]>>;

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        type PageLoad = Shared<futures::future::LocalBoxFuture<'static, PageResult>>;

        fn share<F: Future<Output = PageResult> + 'static>(load: F) -> PageLoad {
            load.boxed_local().shared()
        }

        /// Drive a load to completion independently of its waiters.
        fn detach(load: PageLoad) {
            wasm_bindgen_futures::spawn_local(async move {
                let _ = load.await;
            });
        }
    } else {
        type PageLoad = Shared<futures::future::BoxFuture<'static, PageResult>>;

        fn share<F: Future<Output = PageResult> + Send + 'static>(load: F) -> PageLoad {
            load.boxed().shared()
        }

        /// Drive a load to completion independently of its waiters. Without
        /// a runtime the waiters drive it instead.
        fn detach(load: PageLoad) {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    let _ = load.await;
                });
            }
        }
    }
}

/// Observable state of one index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum PageStatus {
    NotLoaded,
    Loading,
    Loaded,
    LoadFailed(SatIndexError),
}

enum PageState {
    NotLoaded,
    Loading(PageLoad),
    Loaded(Arc<[u64]>),
    LoadFailed(SatIndexError),
}

struct CacheInner<N> {
    network: N,
    page_urls: Vec<String>,
    parser: DeltaPageParser,
    pages: Vec<Mutex<PageState>>,
}

impl<N: NetworkProvider + 'static> CacheInner<N> {
    fn slot(&self, page: usize) -> Result<MutexGuard<'_, PageState>> {
        let slot = self
            .pages
            .get(page)
            .ok_or(SatIndexError::PageOutOfRange(page))?;
        // A panic while holding the lock cannot leave the state half-written.
        Ok(slot.lock().unwrap_or_else(PoisonError::into_inner))
    }

    async fn fetch_and_parse(&self, page: usize) -> PageResult {
        let url = self
            .page_urls
            .get(page)
            .ok_or(SatIndexError::PageOutOfRange(page))?;
        info!("loading sat index page {page} from {url}");
        let body = self
            .network
            .get(url)
            .await
            .map_err(|e| SatIndexError::PageFetchFailed {
                page,
                reason: e.to_string(),
            })?;
        let sats = self.parser.parse(page, &String::from_utf8_lossy(&body))?;
        info!(
            "sat index page {page} loaded, {} of {} districts mapped",
            sats.iter().filter(|sat| **sat != 0).count(),
            sats.len()
        );
        Ok(sats.into())
    }

    fn record(&self, page: usize, outcome: &PageResult) {
        let Ok(mut state) = self.slot(page) else {
            return;
        };
        *state = match outcome {
            Ok(sats) => PageState::Loaded(sats.clone()),
            Err(e) => {
                warn!("sat index page {page} failed to load: {e}");
                PageState::LoadFailed(e.clone())
            }
        };
    }

    fn load(self: Arc<Self>, page: usize) -> PageLoad {
        let load = async move {
            let outcome = self.fetch_and_parse(page).await;
            self.record(page, &outcome);
            outcome
        };
        share(load)
    }
}

pub struct SatIndexCache<N> {
    inner: Arc<CacheInner<N>>,
}

impl<N> Clone for SatIndexCache<N> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<N: NetworkProvider + 'static> SatIndexCache<N> {
    pub fn new(network: N, config: &SatIndexConfig) -> Result<Self> {
        config.validate()?;
        let parser = DeltaPageParser::default().with_bare_pair_pages(config.bare_pair_pages.clone());
        Ok(Self::with_parser(network, config.page_urls(), parser))
    }

    /// Build a cache over an explicit page URL table.
    pub fn with_parser(network: N, page_urls: Vec<String>, parser: DeltaPageParser) -> Self {
        let pages = (0..page_urls.len().min(PAGE_COUNT))
            .map(|_| Mutex::new(PageState::NotLoaded))
            .collect();
        Self {
            inner: Arc::new(CacheInner {
                network,
                page_urls,
                parser,
                pages,
            }),
        }
    }

    pub fn network(&self) -> &N {
        &self.inner.network
    }

    /// Resolve a raw district number. Out-of-range numbers fail before any
    /// page is touched.
    pub async fn resolve(&self, district: i64) -> Result<Option<u64>> {
        self.lookup(District::new(district)?).await
    }

    /// Sat for a district, or `None` when the index has no entry for it.
    pub async fn lookup(&self, district: District) -> Result<Option<u64>> {
        let sats = self.load_page(district.page()).await?;
        Ok(sats.get(district.slot()).copied().filter(|sat| *sat != 0))
    }

    pub async fn preload(&self, page: usize) -> Result<()> {
        self.load_page(page).await.map(|_| ())
    }

    async fn load_page(&self, page: usize) -> PageResult {
        let (load, started) = {
            let mut state = self.inner.slot(page)?;
            let in_flight = match &*state {
                PageState::Loaded(sats) => return Ok(sats.clone()),
                PageState::LoadFailed(e) => return Err(e.clone()),
                PageState::Loading(load) => Some(load.clone()),
                PageState::NotLoaded => None,
            };
            match in_flight {
                Some(load) => (load, false),
                None => {
                    let load = self.inner.clone().load(page);
                    *state = PageState::Loading(load.clone());
                    (load, true)
                }
            }
        };
        if started {
            detach(load.clone());
        }
        load.await
    }

    pub fn page_status(&self, page: usize) -> Result<PageStatus> {
        let state = self.inner.slot(page)?;
        Ok(match &*state {
            PageState::NotLoaded => PageStatus::NotLoaded,
            PageState::Loading(_) => PageStatus::Loading,
            PageState::Loaded(_) => PageStatus::Loaded,
            PageState::LoadFailed(e) => PageStatus::LoadFailed(e.clone()),
        })
    }

    /// Clear a failed page so the next lookup fetches it again. Returns
    /// whether the page was in the failed state.
    pub fn retry_page(&self, page: usize) -> Result<bool> {
        let mut state = self.inner.slot(page)?;
        if matches!(*state, PageState::LoadFailed(_)) {
            info!("sat index page {page} reset for retry");
            *state = PageState::NotLoaded;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn loaded_pages(&self) -> usize {
        (0..self.inner.pages.len())
            .filter(|page| matches!(self.page_status(*page), Ok(PageStatus::Loaded)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_provider::MockNetwork;
    use pretty_assertions::assert_eq;

    fn urls() -> Vec<String> {
        (0..PAGE_COUNT).map(|p| format!("http://index/{p}")).collect()
    }

    fn cache(network: MockNetwork) -> SatIndexCache<MockNetwork> {
        SatIndexCache::with_parser(network, urls(), DeltaPageParser::default())
    }

    #[tokio::test]
    async fn test_lookup_maps_zero_to_none() {
        let network = MockNetwork::new();
        network.respond("http://index/0", "[[500,1],[3,4]]");
        let cache = cache(network);
        assert_eq!(cache.resolve(3).await.unwrap(), Some(500));
        assert_eq!(cache.resolve(4).await.unwrap(), Some(501));
        assert_eq!(cache.resolve(5).await.unwrap(), None);
        assert_eq!(cache.page_status(0).unwrap(), PageStatus::Loaded);
        assert_eq!(cache.network().calls("http://index/0"), 1);
    }

    #[tokio::test]
    async fn test_page_out_of_range() {
        let cache = cache(MockNetwork::new());
        assert_eq!(
            cache.page_status(PAGE_COUNT),
            Err(SatIndexError::PageOutOfRange(PAGE_COUNT))
        );
        assert!(cache.retry_page(42).is_err());
    }

    #[tokio::test]
    async fn test_retry_only_resets_failed_pages() {
        let network = MockNetwork::new();
        network.fail("http://index/1", "boom");
        let cache = cache(network);
        assert!(!cache.retry_page(1).unwrap());
        assert!(matches!(
            cache.resolve(100_000).await,
            Err(SatIndexError::PageFetchFailed { page: 1, .. })
        ));
        assert!(matches!(
            cache.page_status(1).unwrap(),
            PageStatus::LoadFailed(_)
        ));
        assert!(cache.retry_page(1).unwrap());
        assert_eq!(cache.page_status(1).unwrap(), PageStatus::NotLoaded);
    }
}
