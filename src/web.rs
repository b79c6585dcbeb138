//! Browser transport using the fetch API.
//!
//! [`WebNetwork`] implements [`NetworkProvider`] for wasm32 builds running in
//! a page. Requests are plain CORS `GET`s; the body is read back as an
//! `ArrayBuffer` so both the JSON index pages and binary metadata arrive
//! untouched.
//!
//! The type is neither `Send` nor `Sync`, which matches the `?Send` async
//! trait used on wasm32.

use crate::traits::NetworkProvider;
use crate::{Result, SatIndexError};
use async_trait::async_trait;
use js_sys::Uint8Array;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{window, Headers, Request, RequestInit, RequestMode, Response};

const USER_AGENT: &str = concat!("bitmap-sat-index-web/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct WebNetwork {
    /// Sent as `User-Agent` where the browser allows it
    user_agent: String,
}

impl Default for WebNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl WebNetwork {
    pub fn new() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
        }
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Issue a CORS `GET` through `window.fetch`.
    ///
    /// # Errors
    ///
    /// * [`SatIndexError::Network`] if there is no `window` (not a browser)
    /// * [`SatIndexError::Network`] if the request cannot be built or sent
    /// * [`SatIndexError::Network`] if the response status is not 2xx
    async fn fetch(&self, url: &str) -> Result<Response> {
        let window =
            window().ok_or_else(|| SatIndexError::Network("No window object available".to_string()))?;

        let opts = RequestInit::new();
        opts.set_method("GET");
        opts.set_mode(RequestMode::Cors);

        let headers = Headers::new()
            .map_err(|e| SatIndexError::Network(format!("Failed to create headers: {e:?}")))?;
        headers
            .set("User-Agent", &self.user_agent)
            .map_err(|e| SatIndexError::Network(format!("Failed to set User-Agent: {e:?}")))?;
        opts.set_headers(&headers);

        let request = Request::new_with_str_and_init(url, &opts)
            .map_err(|e| SatIndexError::Network(format!("Failed to create request: {e:?}")))?;

        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| SatIndexError::Network(format!("Fetch failed: {e:?}")))?;

        let resp: Response = resp_value
            .dyn_into()
            .map_err(|e| SatIndexError::Network(format!("Failed to cast response: {e:?}")))?;

        if !resp.ok() {
            return Err(SatIndexError::Network(format!(
                "HTTP error: {} {} from {url}",
                resp.status(),
                resp.status_text()
            )));
        }
        Ok(resp)
    }

    async fn body_bytes(response: Response) -> Result<Vec<u8>> {
        let promise = response
            .array_buffer()
            .map_err(|e| SatIndexError::Network(format!("Failed to get array buffer: {e:?}")))?;
        let array_buffer = JsFuture::from(promise)
            .await
            .map_err(|e| SatIndexError::Network(format!("Failed to read array buffer: {e:?}")))?;

        let uint8_array = Uint8Array::new(&array_buffer);
        let mut bytes = vec![0u8; uint8_array.length() as usize];
        uint8_array.copy_to(&mut bytes);
        Ok(bytes)
    }
}

#[async_trait(?Send)]
impl NetworkProvider for WebNetwork {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        log::debug!("fetch {url}");
        let response = self.fetch(url).await?;
        Self::body_bytes(response).await
    }
}
