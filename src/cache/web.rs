//! Cache API and `fetch` backends for the service worker

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Response, ResponseInit, ResponseType, ServiceWorkerGlobalScope};

use super::{
    CacheError, CacheStorage, CachedResponse, Network, OFFLINE_BODY, OFFLINE_STATUS,
    OFFLINE_STATUS_TEXT, ResponseKind,
};

fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

impl CachedResponse for Response {
    fn status(&self) -> u16 {
        Response::status(self)
    }

    fn kind(&self) -> ResponseKind {
        match self.type_() {
            ResponseType::Basic => ResponseKind::Basic,
            ResponseType::Cors => ResponseKind::Cors,
            ResponseType::Opaque => ResponseKind::Opaque,
            ResponseType::Opaqueredirect => ResponseKind::OpaqueRedirect,
            ResponseType::Error => ResponseKind::Error,
            _ => ResponseKind::Default,
        }
    }

    fn try_clone(&self) -> Result<Self, CacheError> {
        // Inherent `Response.clone()`, not `Clone::clone` (which only copies the handle)
        Response::clone(self).map_err(|e| CacheError::Response(js_message(&e)))
    }

    fn offline() -> Result<Self, CacheError> {
        let init = ResponseInit::new();
        init.set_status(OFFLINE_STATUS);
        init.set_status_text(OFFLINE_STATUS_TEXT);
        Response::new_with_opt_str_and_init(Some(OFFLINE_BODY), &init)
            .map_err(|e| CacheError::Response(js_message(&e)))
    }
}

/// `caches` of the worker global scope
pub struct WebCacheStorage {
    caches: web_sys::CacheStorage,
}

impl WebCacheStorage {
    pub fn new(caches: web_sys::CacheStorage) -> Self {
        Self { caches }
    }

    pub fn from_scope(scope: &ServiceWorkerGlobalScope) -> Result<Self, CacheError> {
        scope
            .caches()
            .map(Self::new)
            .map_err(|e| CacheError::Storage(js_message(&e)))
    }
}

async fn resolve(promise: js_sys::Promise) -> Result<JsValue, CacheError> {
    JsFuture::from(promise)
        .await
        .map_err(|e| CacheError::Storage(js_message(&e)))
}

impl CacheStorage for WebCacheStorage {
    type Response = Response;

    async fn bucket_names(&self) -> Result<Vec<String>, CacheError> {
        let keys = resolve(self.caches.keys()).await?;
        let keys: js_sys::Array = keys
            .dyn_into()
            .map_err(|_| CacheError::Storage("caches.keys() did not return an array".into()))?;
        Ok(keys.iter().filter_map(|k| k.as_string()).collect())
    }

    async fn delete_bucket(&self, name: &str) -> Result<bool, CacheError> {
        let deleted = resolve(self.caches.delete(name)).await?;
        Ok(deleted.as_bool().unwrap_or(false))
    }

    async fn lookup(&self, url: &str) -> Result<Option<Response>, CacheError> {
        let found = resolve(self.caches.match_with_str(url)).await?;
        if found.is_undefined() || found.is_null() {
            return Ok(None);
        }
        found
            .dyn_into::<Response>()
            .map(Some)
            .map_err(|_| CacheError::Storage(format!("cached entry for {url} is not a Response")))
    }

    async fn put(&self, bucket: &str, url: &str, response: Response) -> Result<(), CacheError> {
        let cache: web_sys::Cache = resolve(self.caches.open(bucket))
            .await?
            .dyn_into()
            .map_err(|_| CacheError::Storage(format!("caches.open({bucket}) returned no cache")))?;
        resolve(cache.put_with_str(url, &response)).await?;
        Ok(())
    }
}

/// `fetch` from the worker global scope
pub struct WebNetwork {
    scope: ServiceWorkerGlobalScope,
}

impl WebNetwork {
    pub fn new(scope: ServiceWorkerGlobalScope) -> Self {
        Self { scope }
    }
}

impl Network for WebNetwork {
    type Response = Response;

    async fn fetch(&self, url: &str) -> Result<Response, CacheError> {
        let value = JsFuture::from(self.scope.fetch_with_str(url))
            .await
            .map_err(|e| CacheError::Network(js_message(&e)))?;
        value
            .dyn_into::<Response>()
            .map_err(|_| CacheError::Network(format!("fetch({url}) did not return a Response")))
    }
}
