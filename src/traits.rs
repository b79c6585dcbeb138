//! Platform seams for the resolution engine.
//
// The engine itself never performs I/O directly. Everything it needs from the
// outside world is a plain GET through `NetworkProvider`, so the same code runs
// natively (reqwest), in the browser (fetch) and against the mock in tests.
//
// Native futures must be `Send` so loads can be detached onto a tokio runtime;
// wasm32 futures are single-threaded and carry no such bound.

use crate::Result;
use async_trait::async_trait;
use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        /// No thread-safety requirement on single-threaded wasm targets.
        pub trait MaybeSend {}
        impl<T: ?Sized> MaybeSend for T {}
    } else {
        /// `Send + Sync` on native targets.
        pub trait MaybeSend: Send + Sync {}
        impl<T: ?Sized + Send + Sync> MaybeSend for T {}
    }
}

/// Fetch raw bytes for a URL. Implementations perform no retry or caching.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait NetworkProvider: MaybeSend {
    /// HTTP GET; a non-success status is an error.
    async fn get(&self, url: &str) -> Result<Vec<u8>>;
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl<T: NetworkProvider + ?Sized> NetworkProvider for std::sync::Arc<T> {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        (**self).get(url).await
    }
}
