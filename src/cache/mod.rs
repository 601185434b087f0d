//! Offline cache worker
//!
//! Cache-first policy for the service worker:
//! - `install`: pre-fetch a fixed URL list into the current bucket
//! - `fetch`: serve from cache, else from network (storing good basic
//!   200s), else a synthetic 503
//! - `activate`: delete every bucket not named after the current version
//!
//! Cached entries never expire on their own; bumping the bucket name in
//! the manifest is the only invalidation.

pub mod memory;
#[cfg(target_arch = "wasm32")]
pub mod web;

use std::fmt;

pub use memory::{MemoryCache, Response, StaticNetwork};

/// Current bucket name; bump on every deploy that changes cached files
pub const CACHE_NAME: &str = "him-wong-games-v1";

/// Body of the synthetic offline response
pub const OFFLINE_BODY: &str = "Offline";
pub const OFFLINE_STATUS: u16 = 503;
pub const OFFLINE_STATUS_TEXT: &str = "Service Unavailable";

/// Response type as reported by fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseKind {
    /// Same-origin
    #[default]
    Basic,
    Cors,
    Opaque,
    OpaqueRedirect,
    Error,
    /// Constructed locally (not from a fetch)
    Default,
}

/// Cache worker failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Fetch rejected (offline, DNS, CORS...)
    Network(String),
    /// Pre-cache fetch returned a non-OK status
    BadStatus { url: String, status: u16 },
    /// Cache API rejected an operation
    Storage(String),
    /// Response could not be cloned or constructed
    Response(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Network(msg) => write!(f, "network error: {msg}"),
            CacheError::BadStatus { url, status } => {
                write!(f, "unexpected status {status} for {url}")
            }
            CacheError::Storage(msg) => write!(f, "cache storage error: {msg}"),
            CacheError::Response(msg) => write!(f, "response error: {msg}"),
        }
    }
}

impl std::error::Error for CacheError {}

/// A response that can be inspected, duplicated and synthesized
pub trait CachedResponse: Sized {
    fn status(&self) -> u16;
    fn kind(&self) -> ResponseKind;
    /// Independent copy (response bodies can only be read once)
    fn try_clone(&self) -> Result<Self, CacheError>;
    /// The 503 served when neither cache nor network can answer
    fn offline() -> Result<Self, CacheError>;

    fn ok(&self) -> bool {
        (200..300).contains(&self.status())
    }
}

/// Named buckets of cached responses
#[allow(async_fn_in_trait)]
pub trait CacheStorage {
    type Response: CachedResponse;

    /// Bucket names, in creation order
    async fn bucket_names(&self) -> Result<Vec<String>, CacheError>;
    /// Delete a bucket; false if it did not exist
    async fn delete_bucket(&self, name: &str) -> Result<bool, CacheError>;
    /// Find `url` in any bucket
    async fn lookup(&self, url: &str) -> Result<Option<Self::Response>, CacheError>;
    /// Store `response` for `url` in `bucket`, creating the bucket if needed
    async fn put(
        &self,
        bucket: &str,
        url: &str,
        response: Self::Response,
    ) -> Result<(), CacheError>;
}

/// Network access
#[allow(async_fn_in_trait)]
pub trait Network {
    type Response: CachedResponse;

    async fn fetch(&self, url: &str) -> Result<Self::Response, CacheError>;
}

/// Bucket name plus the URLs to pre-cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheManifest {
    pub name: String,
    pub urls: Vec<String>,
}

impl Default for CacheManifest {
    fn default() -> Self {
        let mut urls = vec!["./".to_string(), "./index.html".to_string()];
        urls.extend((1..=11).map(|n| format!("./game{n}.html")));
        urls.push("./js/game-engine.js".to_string());
        urls.push("./manifest.json".to_string());
        Self {
            name: CACHE_NAME.to_string(),
            urls,
        }
    }
}

impl CacheManifest {
    pub fn new(name: impl Into<String>, urls: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            urls: urls.into_iter().map(Into::into).collect(),
        }
    }
}

/// Where a served response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Served from cache without touching the network
    Hit,
    /// Served from network; `cached` tells whether a copy was stored
    Fetched { cached: bool },
    /// Network failed and nothing was cached
    Offline,
}

/// A response plus how it was obtained
#[derive(Debug)]
pub struct Served<R> {
    pub response: R,
    pub outcome: CacheOutcome,
}

/// Cache-first request handler
pub struct CacheWorker<C, N> {
    manifest: CacheManifest,
    storage: C,
    network: N,
}

impl<C, N, R> CacheWorker<C, N>
where
    C: CacheStorage<Response = R>,
    N: Network<Response = R>,
    R: CachedResponse,
{
    pub fn new(manifest: CacheManifest, storage: C, network: N) -> Self {
        Self {
            manifest,
            storage,
            network,
        }
    }

    pub fn manifest(&self) -> &CacheManifest {
        &self.manifest
    }

    pub fn storage(&self) -> &C {
        &self.storage
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    /// Pre-cache every manifest URL
    ///
    /// All or nothing: if any fetch fails or is not OK, nothing is stored.
    pub async fn install(&self) -> Result<usize, CacheError> {
        let mut fetched = Vec::with_capacity(self.manifest.urls.len());
        for url in &self.manifest.urls {
            let response = self.network.fetch(url).await?;
            if !response.ok() {
                return Err(CacheError::BadStatus {
                    url: url.clone(),
                    status: response.status(),
                });
            }
            fetched.push((url, response));
        }

        let count = fetched.len();
        for (url, response) in fetched {
            self.storage.put(&self.manifest.name, url, response).await?;
        }
        log::info!("Pre-cached {} resources into {}", count, self.manifest.name);
        Ok(count)
    }

    /// Run [`install`](Self::install) for a worker lifecycle event
    ///
    /// A failed pre-cache is logged and reported as zero resources; the
    /// worker still installs and serves from the network.
    pub async fn precache(&self) -> usize {
        match self.install().await {
            Ok(count) => count,
            Err(e) => {
                log::warn!("Pre-cache of {} failed: {}", self.manifest.name, e);
                0
            }
        }
    }

    /// Answer a GET request for `url`
    ///
    /// Only fails if the synthetic offline response cannot be built.
    pub async fn handle_fetch(&self, url: &str) -> Result<Served<R>, CacheError> {
        match self.storage.lookup(url).await {
            Ok(Some(response)) => {
                log::debug!("cache hit: {}", url);
                return Ok(Served {
                    response,
                    outcome: CacheOutcome::Hit,
                });
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!("Cache lookup failed for {}: {}", url, e);
                return Self::offline();
            }
        }

        let response = match self.network.fetch(url).await {
            Ok(response) => response,
            Err(e) => {
                log::debug!("offline: {} ({})", url, e);
                return Self::offline();
            }
        };

        if response.status() != 200 || response.kind() != ResponseKind::Basic {
            log::debug!("not caching {} (status {})", url, response.status());
            return Ok(Served {
                response,
                outcome: CacheOutcome::Fetched { cached: false },
            });
        }

        let cached = match response.try_clone() {
            Ok(copy) => match self.storage.put(&self.manifest.name, url, copy).await {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("Failed to cache {}: {}", url, e);
                    false
                }
            },
            Err(e) => {
                log::warn!("Failed to clone response for {}: {}", url, e);
                false
            }
        };

        log::debug!("cache miss: {} (stored: {})", url, cached);
        Ok(Served {
            response,
            outcome: CacheOutcome::Fetched { cached },
        })
    }

    /// Delete every bucket except the current one, returning the deleted names
    pub async fn activate(&self) -> Result<Vec<String>, CacheError> {
        let mut deleted = Vec::new();
        for name in self.storage.bucket_names().await? {
            if name != self.manifest.name {
                log::info!("Deleting old cache: {}", name);
                if self.storage.delete_bucket(&name).await? {
                    deleted.push(name);
                }
            }
        }
        Ok(deleted)
    }

    fn offline() -> Result<Served<R>, CacheError> {
        Ok(Served {
            response: R::offline()?,
            outcome: CacheOutcome::Offline,
        })
    }
}
