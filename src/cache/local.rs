/*
 *
 *  *
 *  *      Copyright (c) 2018-2025, SnackCloud All rights reserved.
 *  *
 *  *   Redistribution and use in source and binary forms, with or without
 *  *   modification, are permitted provided that the following conditions are met:
 *  *
 *  *   Redistributions of source code must retain the above copyright notice,
 *  *   this list of conditions and the following disclaimer.
 *  *   Redistributions in binary form must reproduce the above copyright
 *  *   notice, this list of conditions and the following disclaimer in the
 *  *   documentation and/or other materials provided with the distribution.
 *  *   Neither the name of the www.snackcloud.cn developer nor the names of its
 *  *   contributors may be used to endorse or promote products derived from
 *  *   this software without specific prior written permission.
 *  *   Author: SnackCloud
 *  *
 *
 */
use lru::LruCache;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use crate::cache::{Cache, CacheStats};
use crate::codec;
use crate::errors::{CacheError, CacheResult};

/// In-process implementation of the cache operation set. Entries are stored
/// in wire form (JSON text or raw strings), so codec behavior, counter
/// arithmetic and set-if-absent gating match the remote path.
pub struct LocalCache {
    entries: RwLock<LruCache<String, CachedValue>>,
    stats: RwLock<CacheStats>,
}

struct CachedValue {
    raw: String,
    expires_at: Option<Instant>,
}

impl CachedValue {
    fn new(raw: String, ttl: Duration) -> Self {
        let expires_at = if ttl.is_zero() {
            None
        } else {
            Some(Instant::now() + ttl)
        };
        Self { raw, expires_at }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.map(|at| at <= Instant::now()).unwrap_or(false)
    }
}

impl LocalCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(NonZeroUsize::new(max_entries).unwrap())),
            stats: RwLock::new(CacheStats::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn get_stats(&self) -> CacheStats {
        self.stats.read().clone()
    }

    /// Drops every entry whose expiry has passed.
    pub fn purge_expired(&self) {
        let mut entries = self.entries.write();

        let expired_keys: Vec<String> = entries
            .iter()
            .filter(|(_, v)| v.is_expired())
            .map(|(k, _)| k.clone())
            .collect();

        let evicted = expired_keys.len();
        for key in expired_keys {
            entries.pop(&key);
        }

        if evicted > 0 {
            self.stats.write().record_eviction(evicted);
        }
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.write();

        if let Some(cached) = entries.get(key) {
            if !cached.is_expired() {
                self.stats.write().record_hit();
                return Some(cached.raw.clone());
            }
            entries.pop(key);
        }

        self.stats.write().record_miss();
        None
    }

    fn write_raw(&self, key: &str, raw: String, ttl: Duration) {
        self.entries.write().put(key.to_string(), CachedValue::new(raw, ttl));
    }

    /// Shared INCR/DECR path. Absent keys count from zero and expiry carries
    /// over; a non-integer payload is a protocol violation.
    fn add(&self, key: &str, delta: i64) -> CacheResult<i64> {
        let mut entries = self.entries.write();

        let (current, expires_at) = match entries.get(key) {
            Some(cached) if !cached.is_expired() => {
                let parsed = cached.raw.parse::<i64>().map_err(|_| {
                    CacheError::ProtocolError(format!("value at {} is not an integer", key))
                })?;
                (parsed, cached.expires_at)
            }
            _ => (0, None),
        };

        let count = current + delta;
        entries.put(
            key.to_string(),
            CachedValue {
                raw: count.to_string(),
                expires_at,
            },
        );

        Ok(count)
    }
}

impl Cache for LocalCache {
    fn get<V: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<V>> {
        match self.read_raw(key) {
            Some(raw) => Ok(Some(codec::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.read_raw(key))
    }

    fn set<V: Serialize>(&self, key: &str, value: &V, ttl: Duration) -> CacheResult<()> {
        let data = codec::serialize(value)?;
        self.write_raw(key, data, ttl);
        Ok(())
    }

    fn set_string(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.write_raw(key, value.to_string(), ttl);
        Ok(())
    }

    fn incr(&self, key: &str) -> CacheResult<i64> {
        self.add(key, 1)
    }

    fn decr(&self, key: &str) -> CacheResult<i64> {
        self.add(key, -1)
    }

    fn set_lock<V: Serialize>(&self, key: &str, value: &V) -> CacheResult<bool> {
        let data = codec::serialize(value)?;
        let mut entries = self.entries.write();

        if let Some(cached) = entries.peek(key) {
            if !cached.is_expired() {
                return Ok(false);
            }
        }

        entries.put(key.to_string(), CachedValue::new(data, Duration::ZERO));
        Ok(true)
    }

    fn is_exist(&self, key: &str) -> CacheResult<bool> {
        let entries = self.entries.read();
        Ok(entries.peek(key).map(|c| !c.is_expired()).unwrap_or(false))
    }

    fn delete(&self, key: &str) -> CacheResult<bool> {
        let mut entries = self.entries.write();
        Ok(entries.pop(key).map(|c| !c.is_expired()).unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::thread;

    #[test]
    fn test_string_round_trip() {
        let cache = LocalCache::new(16);

        cache.set_string("greeting", "hi", Duration::ZERO).unwrap();
        assert_eq!(cache.get_string("greeting").unwrap().as_deref(), Some("hi"));
    }

    #[test]
    fn test_value_round_trip() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Session {
            openid: String,
            expires_in: u64,
        }

        let cache = LocalCache::new(16);
        let session = Session {
            openid: "o6_bmjrPTlm6_2sgVt7hMZOPfL2M".to_string(),
            expires_in: 7200,
        };

        cache.set("session", &session, Duration::ZERO).unwrap();
        assert_eq!(cache.get::<Session>("session").unwrap(), Some(session));
    }

    #[test]
    fn test_absent_key_is_none_not_error() {
        let cache = LocalCache::new(16);
        assert_eq!(cache.get::<String>("absent").unwrap(), None);
        assert_eq!(cache.get_string("absent").unwrap(), None);
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = LocalCache::new(16);

        cache.set_string("temp", "x", Duration::from_millis(40)).unwrap();
        assert_eq!(cache.get_string("temp").unwrap().as_deref(), Some("x"));

        thread::sleep(Duration::from_millis(60));
        assert_eq!(cache.get_string("temp").unwrap(), None);
    }

    #[test]
    fn test_counter_monotonicity() {
        let cache = LocalCache::new(16);

        assert_eq!(cache.incr("ctr").unwrap(), 1);
        assert_eq!(cache.incr("ctr").unwrap(), 2);
        assert_eq!(cache.incr("ctr").unwrap(), 3);
        assert_eq!(cache.decr("ctr").unwrap(), 2);
    }

    #[test]
    fn test_counter_starts_from_stored_value() {
        let cache = LocalCache::new(16);

        cache.set_string("ctr", "7", Duration::ZERO).unwrap();
        assert_eq!(cache.incr("ctr").unwrap(), 8);
    }

    #[test]
    fn test_counter_on_non_integer_is_an_error() {
        let cache = LocalCache::new(16);

        cache.set_string("ctr", "not-a-number", Duration::ZERO).unwrap();
        assert!(matches!(cache.incr("ctr"), Err(CacheError::ProtocolError(_))));
    }

    #[test]
    fn test_lock_gate_first_writer_wins() {
        let cache = LocalCache::new(16);

        assert!(cache.set_lock("mutex", &"a").unwrap());
        assert!(!cache.set_lock("mutex", &"a").unwrap());

        // An explicit delete reopens the gate
        assert!(cache.delete("mutex").unwrap());
        assert!(cache.set_lock("mutex", &"b").unwrap());
    }

    #[test]
    fn test_existence_reflects_mutation() {
        let cache = LocalCache::new(16);

        assert!(!cache.is_exist("present").unwrap());

        cache.set_string("present", "v", Duration::ZERO).unwrap();
        assert!(cache.is_exist("present").unwrap());

        assert!(cache.delete("present").unwrap());
        assert!(!cache.is_exist("present").unwrap());
    }

    #[test]
    fn test_lru_bound_evicts_oldest() {
        let cache = LocalCache::new(2);

        cache.set_string("a", "1", Duration::ZERO).unwrap();
        cache.set_string("b", "2", Duration::ZERO).unwrap();
        cache.set_string("c", "3", Duration::ZERO).unwrap();

        assert_eq!(cache.len(), 2);
        assert!(!cache.is_exist("a").unwrap());
        assert!(cache.is_exist("c").unwrap());
    }

    #[test]
    fn test_purge_expired() {
        let cache = LocalCache::new(16);

        cache.set_string("stale", "x", Duration::from_millis(10)).unwrap();
        cache.set_string("fresh", "y", Duration::ZERO).unwrap();

        thread::sleep(Duration::from_millis(30));
        cache.purge_expired();

        assert_eq!(cache.len(), 1);
        assert!(cache.get_stats().total_evictions >= 1);
    }

    #[test]
    fn test_hit_miss_stats() {
        let cache = LocalCache::new(16);

        cache.set_string("k", "v", Duration::ZERO).unwrap();
        cache.get_string("k").unwrap();
        cache.get_string("missing").unwrap();

        let stats = cache.get_stats();
        assert_eq!(stats.total_hits, 1);
        assert_eq!(stats.total_misses, 1);
        assert!((stats.avg_hit_rate - 0.5).abs() < f64::EPSILON);
    }
}
