// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use log::debug;

use super::{get_body, http_client};
use crate::error::NetworkError;
use crate::protocol::{decode_photos, PhotoLookup};

/// Photo search endpoint on planespotters.net.
pub const PLANESPOTTERS_URL: &str = "https://api.planespotters.net/pub/photos";

const CACHE_TTL: Duration = Duration::from_secs(3600 * 24);

struct CacheEntry {
    lookup: PhotoLookup,
    timestamp: Instant,
}

/// Aircraft photo lookups by ICAO hex code, cached in memory.
///
/// Clones share the cache.
#[derive(Clone)]
pub struct PhotoService {
    base_url: String,
    http: reqwest::Client,
    cache: Arc<Mutex<HashMap<String, CacheEntry>>>,
    cache_ttl: Duration,
}

impl PhotoService {
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(PLANESPOTTERS_URL, http_client())
    }

    /// Point the service at another photo API root.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            cache: Arc::new(Mutex::new(HashMap::new())),
            cache_ttl: CACHE_TTL,
        }
    }

    #[must_use]
    pub fn lookup_url(&self, icao: &str) -> String {
        format!("{}/hex/{}", self.base_url, icao.to_lowercase())
    }

    /// Look up a photo for `icao`.
    ///
    /// Answers from the API, including "no photo", are cached. Transport and
    /// HTTP failures are not, so the next selection retries.
    pub async fn lookup(&self, icao: &str) -> Result<PhotoLookup, NetworkError> {
        let key = icao.to_lowercase();
        if let Some(cached) = self.get_from_cache(&key) {
            debug!("Photo cache hit for {}", icao);
            return Ok(cached);
        }

        let url = self.lookup_url(icao);
        let (_, body) = get_body(&self.http, &url).await?;
        let lookup = decode_photos(&body).map_err(|source| NetworkError::Decode { url, source })?;

        self.cleanup_cache();
        self.store_in_cache(&key, lookup.clone());
        Ok(lookup)
    }

    fn get_from_cache(&self, key: &str) -> Option<PhotoLookup> {
        let cache = self.cache.lock().ok()?;
        cache
            .get(key)
            .filter(|entry| entry.timestamp.elapsed() < self.cache_ttl)
            .map(|entry| entry.lookup.clone())
    }

    fn store_in_cache(&self, key: &str, lookup: PhotoLookup) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(
                key.to_string(),
                CacheEntry {
                    lookup,
                    timestamp: Instant::now(),
                },
            );
        }
    }

    /// Drop expired cache entries. Runs before every new entry is stored.
    pub fn cleanup_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.retain(|_, entry| entry.timestamp.elapsed() < self.cache_ttl);
        }
    }

    #[must_use]
    pub fn cached_count(&self) -> usize {
        self.cache.lock().map_or(0, |cache| cache.len())
    }
}

impl Default for PhotoService {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PhotoService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoService")
            .field("base_url", &self.base_url)
            .field("cached", &self.cached_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubServer;

    const FOUND: &str = r#"{"photos":[{"id":"1474328",
        "thumbnail":{"src":"https://t.plnspttrs.net/small.jpg","size":{"width":200,"height":133}},
        "thumbnail_large":{"src":"https://t.plnspttrs.net/large.jpg","size":{"width":420,"height":280}},
        "link":"https://www.planespotters.net/photo/1474328","photographer":"Jane Doe"}]}"#;

    fn service(base: &str) -> PhotoService {
        PhotoService::with_base_url(base, http_client())
    }

    #[test]
    fn test_lookup_url_lowercases_icao() {
        let photos = PhotoService::new();
        assert_eq!(
            photos.lookup_url("45AC37"),
            "https://api.planespotters.net/pub/photos/hex/45ac37"
        );
    }

    #[tokio::test]
    async fn test_lookup_found_and_cached() {
        let server = StubServer::start(vec![("/hex/45ac37", 200, FOUND)]).await;
        let photos = service(&server.base_url());

        let first = photos.lookup("45AC37").await.unwrap();
        assert_eq!(first.photo().unwrap().photographer, "Jane Doe");

        let second = photos.lookup("45ac37").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(server.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_error_payload_is_unavailable() {
        let server = StubServer::start(vec![("/hex/8ba5", 200, r#"{"error":"Not found"}"#)]).await;
        let photos = service(&server.base_url());

        assert_eq!(photos.lookup("8BA5").await.unwrap(), PhotoLookup::Unavailable);
        assert_eq!(photos.cached_count(), 1);
    }

    #[tokio::test]
    async fn test_http_failure_is_not_cached() {
        let server = StubServer::start(vec![("/hex/8df8", 503, "unavailable")]).await;
        let photos = service(&server.base_url());

        assert!(photos.lookup("8DF8").await.is_err());
        assert_eq!(photos.cached_count(), 0);
    }

    #[test]
    fn test_cleanup_keeps_fresh_entries() {
        let photos = PhotoService::new();
        photos.store_in_cache("45ac37", PhotoLookup::Unavailable);
        photos.cleanup_cache();
        assert_eq!(photos.cached_count(), 1);
    }

    #[tokio::test]
    async fn test_expired_entries_evicted_on_store() {
        let server = StubServer::start(vec![
            ("/hex/8ba5", 200, r#"{"error":"Not found"}"#),
            ("/hex/45ac37", 200, FOUND),
        ])
        .await;
        let mut photos = service(&server.base_url());
        photos.cache_ttl = Duration::ZERO;

        photos.lookup("8BA5").await.unwrap();
        photos.lookup("45AC37").await.unwrap();
        // Only the entry just stored survives
        assert_eq!(photos.cached_count(), 1);
        assert!(photos.cache.lock().unwrap().contains_key("45ac37"));
    }
}
