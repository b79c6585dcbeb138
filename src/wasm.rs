//! JavaScript bindings for the browser console.
//
// Results cross the boundary as JSON strings; errors as their display text.

use crate::config::SatIndexConfig;
use crate::inscription_id::InscriptionId;
use crate::resolver::SatResolver;
use crate::web::WebNetwork;
use crate::SatIndexError;
use js_sys::Promise;
use serde::Serialize;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

fn to_js_error(e: impl ToString) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_js_json<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(value).map_err(to_js_error)?;
    Ok(JsValue::from_str(&json))
}

fn district_number(district: f64) -> Result<i64, SatIndexError> {
    if !district.is_finite() || district.fract() != 0.0 {
        return Err(SatIndexError::InvalidDistrict(district.to_string()));
    }
    Ok(district as i64)
}

#[wasm_bindgen]
pub struct BitmapResolver {
    inner: Rc<SatResolver<WebNetwork>>,
}

#[wasm_bindgen]
impl BitmapResolver {
    /// Build a resolver from an optional JSON config document.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<BitmapResolver, JsValue> {
        let config = match config_json {
            Some(text) => SatIndexConfig::from_json(&text).map_err(to_js_error)?,
            None => SatIndexConfig::default(),
        };
        let resolver = SatResolver::new(WebNetwork::new(), &config).map_err(to_js_error)?;
        Ok(Self {
            inner: Rc::new(resolver),
        })
    }

    #[wasm_bindgen(js_name = resolveDistrict)]
    pub fn resolve_district(&self, district: f64) -> Promise {
        let resolver = self.inner.clone();
        future_to_promise(async move {
            let district = district_number(district).map_err(to_js_error)?;
            let resolved = resolver
                .resolve_district(district)
                .await
                .map_err(to_js_error)?;
            to_js_json(&resolved)
        })
    }

    /// Resolves to the display text of the inscription's metadata.
    pub fn metadata(&self, inscription_id: String) -> Promise {
        let resolver = self.inner.clone();
        future_to_promise(async move {
            let id: InscriptionId = inscription_id.parse().map_err(to_js_error)?;
            let display = resolver.metadata(&id).await.map_err(to_js_error)?;
            Ok(JsValue::from_str(&display.to_string()))
        })
    }

    #[wasm_bindgen(js_name = pageStatus)]
    pub fn page_status(&self, page: usize) -> Result<JsValue, JsValue> {
        let status = self.inner.cache().page_status(page).map_err(to_js_error)?;
        to_js_json(&status)
    }

    #[wasm_bindgen(js_name = retryPage)]
    pub fn retry_page(&self, page: usize) -> Result<bool, JsValue> {
        self.inner.cache().retry_page(page).map_err(to_js_error)
    }
}
