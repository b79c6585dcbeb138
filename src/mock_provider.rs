use crate::traits::NetworkProvider;
use crate::{Result, SatIndexError};
use async_trait::async_trait;
use core::task::Poll;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
enum MockResponse {
    Body(Vec<u8>),
    Failure(String),
}

#[derive(Debug, Default)]
struct MockState {
    responses: HashMap<String, MockResponse>,
    calls: HashMap<String, usize>,
    requested: Vec<String>,
}

/// Mock transport for testing: canned responses per URL and call counters.
///
/// Clones share state, so a test can hand one clone to the engine and keep
/// another to inspect what was requested.
#[derive(Debug, Clone, Default)]
pub struct MockNetwork {
    state: Arc<Mutex<MockState>>,
    yields: usize,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Yield to the executor this many times before answering, so concurrent
    /// callers get a chance to observe an in-flight request.
    pub fn with_yields(mut self, yields: usize) -> Self {
        self.yields = yields;
        self
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn respond(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.state()
            .responses
            .insert(url.into(), MockResponse::Body(body.into()));
    }

    pub fn fail(&self, url: impl Into<String>, reason: impl Into<String>) {
        self.state()
            .responses
            .insert(url.into(), MockResponse::Failure(reason.into()));
    }

    pub fn calls(&self, url: &str) -> usize {
        self.state().calls.get(url).copied().unwrap_or_default()
    }

    pub fn total_calls(&self) -> usize {
        self.state().requested.len()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.state().requested.clone()
    }
}

async fn yield_now() {
    let mut yielded = false;
    futures::future::poll_fn(|cx| {
        if yielded {
            Poll::Ready(())
        } else {
            yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    })
    .await
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl NetworkProvider for MockNetwork {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        let response = {
            let mut state = self.state();
            *state.calls.entry(url.to_string()).or_default() += 1;
            state.requested.push(url.to_string());
            state.responses.get(url).cloned()
        };
        for _ in 0..self.yields {
            yield_now().await;
        }
        match response {
            Some(MockResponse::Body(body)) => Ok(body),
            Some(MockResponse::Failure(reason)) => Err(SatIndexError::Network(reason)),
            None => Err(SatIndexError::Network(format!(
                "HTTP error: 404 Not Found from {url}"
            ))),
        }
    }
}
