// src/services/cache.rs
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use crate::error::Result;

/// Default entry lifetime. FRED publishes at most daily, so six hours keeps
/// repeated evaluations off the network without serving stale releases.
pub const DEFAULT_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// File-backed key/value cache with mtime-based expiry.
///
/// Each logical key maps to one file named by the hex SHA-256 digest of the
/// key, so arbitrary-length keys become fixed-length filenames. Entries are
/// overwritten in place and never explicitly deleted; expiry is the only
/// eviction. No locking is performed: concurrent writers to the same key
/// race and the last writer wins.
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileCache { dir: dir.into() }
    }

    /// Cache directory from `FRED_CACHE_DIR`, falling back to `./cache`.
    pub fn from_env() -> Self {
        let dir = std::env::var("FRED_CACHE_DIR").unwrap_or_else(|_| "cache".to_string());
        FileCache::new(dir)
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.dir.join(format!("{}.json", hex::encode(digest)))
    }

    /// Store `value` under `key`, creating the cache directory if needed.
    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.entry_path(key);
        let payload = serde_json::to_vec(value)?;
        fs::write(&path, payload)?;
        debug!("Cached entry for key '{}' at {:?}", key, path);
        Ok(())
    }

    /// Load the entry for `key` if it exists and its age is within `ttl`.
    ///
    /// Returns `None` for missing, expired, unreadable, and undecodable
    /// entries alike — callers cannot distinguish "never cached" from
    /// "expired" and must refetch in every case. A corrupt file behaves as a
    /// miss and is overwritten by the next `put`.
    pub fn get<T: DeserializeOwned>(&self, key: &str, ttl: Duration) -> Option<T> {
        let path = self.entry_path(key);
        let metadata = fs::metadata(&path).ok()?;
        let modified = metadata.modified().ok()?;
        // A marginally future mtime (filesystem clock granularity) counts as
        // age zero, not as expired.
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);
        if age >= ttl {
            debug!("Cache entry for key '{}' expired (age {:?})", key, age);
            return None;
        }
        let payload = fs::read(&path).ok()?;
        match serde_json::from_slice(&payload) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding undecodable cache entry for key '{}': {}", key, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DataSeries;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_series() -> DataSeries {
        DataSeries::new(vec![
            (NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 2.5),
            (NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(), 2.7),
        ])
    }

    #[test]
    fn put_then_get_round_trips_within_ttl() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path());
        let series = sample_series();

        cache.put("series_UNRATE", &series).unwrap();
        let first: DataSeries = cache.get("series_UNRATE", DEFAULT_TTL).unwrap();
        let second: DataSeries = cache.get("series_UNRATE", DEFAULT_TTL).unwrap();

        assert_eq!(first, series);
        assert_eq!(first, second);
    }

    #[test]
    fn missing_key_is_absent() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path());
        let got: Option<DataSeries> = cache.get("never_written", DEFAULT_TTL);
        assert!(got.is_none());
    }

    #[test]
    fn zero_ttl_expires_everything() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path());
        cache.put("key", &sample_series()).unwrap();

        std::thread::sleep(Duration::from_millis(20));
        let got: Option<DataSeries> = cache.get("key", Duration::ZERO);
        assert!(got.is_none());
    }

    #[test]
    fn entry_expires_once_its_age_exceeds_the_ttl() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path());
        cache.put("key", &sample_series()).unwrap();

        std::thread::sleep(Duration::from_millis(50));
        let expired: Option<DataSeries> = cache.get("key", Duration::from_millis(10));
        assert!(expired.is_none());

        // The same entry is still served under a longer ttl.
        let fresh: Option<DataSeries> = cache.get("key", Duration::from_secs(60));
        assert!(fresh.is_some());
    }

    #[test]
    fn put_overwrites_existing_entry() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path());

        cache.put("key", &sample_series()).unwrap();
        let replacement = DataSeries::new(vec![(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            3.1,
        )]);
        cache.put("key", &replacement).unwrap();

        let got: DataSeries = cache.get("key", DEFAULT_TTL).unwrap();
        assert_eq!(got, replacement);
    }

    #[test]
    fn corrupt_entry_behaves_as_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path());
        cache.put("key", &sample_series()).unwrap();

        let path = cache.entry_path("key");
        fs::write(&path, b"not json").unwrap();

        let got: Option<DataSeries> = cache.get("key", DEFAULT_TTL);
        assert!(got.is_none());
    }

    #[test]
    fn put_creates_the_cache_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("deep").join("cache");
        let cache = FileCache::new(&nested);

        cache.put("key", &sample_series()).unwrap();
        assert!(nested.exists());
    }
}
