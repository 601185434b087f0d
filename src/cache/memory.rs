//! In-process cache storage and network
//!
//! Used by the native demo and tests; the browser uses the Cache API and
//! `fetch` instead.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

use super::{
    CacheError, CacheStorage, CachedResponse, Network, OFFLINE_BODY, OFFLINE_STATUS,
    OFFLINE_STATUS_TEXT, ResponseKind,
};

/// Plain owned HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub kind: ResponseKind,
    pub body: Vec<u8>,
}

impl Response {
    /// Same-origin response with the standard reason phrase
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            status_text: reason_phrase(status).to_string(),
            kind: ResponseKind::Basic,
            body: body.into(),
        }
    }

    pub fn with_kind(mut self, kind: ResponseKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        304 => "Not Modified",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => OFFLINE_STATUS_TEXT,
        _ => "",
    }
}

impl CachedResponse for Response {
    fn status(&self) -> u16 {
        self.status
    }

    fn kind(&self) -> ResponseKind {
        self.kind
    }

    fn try_clone(&self) -> Result<Self, CacheError> {
        Ok(self.clone())
    }

    fn offline() -> Result<Self, CacheError> {
        Ok(Response::new(OFFLINE_STATUS, OFFLINE_BODY).with_kind(ResponseKind::Default))
    }
}

/// Buckets kept in memory, in creation order
#[derive(Debug, Default)]
pub struct MemoryCache {
    buckets: RefCell<Vec<(String, BTreeMap<String, Response>)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty bucket if it does not exist
    pub fn open(&self, name: &str) {
        let mut buckets = self.buckets.borrow_mut();
        if !buckets.iter().any(|(n, _)| n == name) {
            buckets.push((name.to_string(), BTreeMap::new()));
        }
    }

    /// Entries in `bucket` (0 if missing)
    pub fn bucket_len(&self, bucket: &str) -> usize {
        self.buckets
            .borrow()
            .iter()
            .find(|(n, _)| n == bucket)
            .map(|(_, entries)| entries.len())
            .unwrap_or(0)
    }

    pub fn contains(&self, bucket: &str, url: &str) -> bool {
        self.buckets
            .borrow()
            .iter()
            .any(|(n, entries)| n == bucket && entries.contains_key(url))
    }
}

impl CacheStorage for MemoryCache {
    type Response = Response;

    async fn bucket_names(&self) -> Result<Vec<String>, CacheError> {
        Ok(self.buckets.borrow().iter().map(|(n, _)| n.clone()).collect())
    }

    async fn delete_bucket(&self, name: &str) -> Result<bool, CacheError> {
        let mut buckets = self.buckets.borrow_mut();
        let before = buckets.len();
        buckets.retain(|(n, _)| n != name);
        Ok(buckets.len() != before)
    }

    async fn lookup(&self, url: &str) -> Result<Option<Response>, CacheError> {
        Ok(self
            .buckets
            .borrow()
            .iter()
            .find_map(|(_, entries)| entries.get(url).cloned()))
    }

    async fn put(&self, bucket: &str, url: &str, response: Response) -> Result<(), CacheError> {
        self.open(bucket);
        let mut buckets = self.buckets.borrow_mut();
        if let Some((_, entries)) = buckets.iter_mut().find(|(n, _)| n == bucket) {
            entries.insert(url.to_string(), response);
        }
        Ok(())
    }
}

/// Fixed set of pages with an on/off switch
///
/// Unknown URLs answer 404 while online. Every fetch attempt is recorded.
#[derive(Debug)]
pub struct StaticNetwork {
    pages: HashMap<String, Response>,
    online: Cell<bool>,
    calls: RefCell<Vec<String>>,
}

impl Default for StaticNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticNetwork {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            online: Cell::new(true),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Serve `body` with 200 OK at `url`
    pub fn with_page(self, url: &str, body: &str) -> Self {
        self.with_response(url, Response::new(200, body))
    }

    pub fn with_response(mut self, url: &str, response: Response) -> Self {
        self.pages.insert(url.to_string(), response);
        self
    }

    pub fn set_online(&self, online: bool) {
        self.online.set(online);
    }

    /// URLs fetched so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl Network for StaticNetwork {
    type Response = Response;

    async fn fetch(&self, url: &str) -> Result<Response, CacheError> {
        self.calls.borrow_mut().push(url.to_string());
        if !self.online.get() {
            return Err(CacheError::Network(format!("offline fetching {url}")));
        }
        Ok(self
            .pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| Response::new(404, "Not Found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollster::block_on;

    #[test]
    fn test_lookup_searches_buckets_in_creation_order() {
        let cache = MemoryCache::new();
        block_on(cache.put("a", "/x", Response::new(200, "from a"))).unwrap();
        block_on(cache.put("b", "/x", Response::new(200, "from b"))).unwrap();

        let found = block_on(cache.lookup("/x")).unwrap().unwrap();
        assert_eq!(found.body_text(), "from a");
        assert!(block_on(cache.lookup("/y")).unwrap().is_none());
    }

    #[test]
    fn test_delete_bucket() {
        let cache = MemoryCache::new();
        cache.open("a");
        assert!(block_on(cache.delete_bucket("a")).unwrap());
        assert!(!block_on(cache.delete_bucket("a")).unwrap());
    }

    #[test]
    fn test_offline_response() {
        let response = Response::offline().unwrap();
        assert_eq!(response.status, 503);
        assert_eq!(response.status_text, "Service Unavailable");
        assert!(!response.ok());
    }

    #[test]
    fn test_static_network_unknown_is_404() {
        let network = StaticNetwork::new().with_page("/a", "a");
        assert_eq!(block_on(network.fetch("/b")).unwrap().status, 404);
        assert_eq!(network.calls(), vec!["/b".to_string()]);
    }
}
