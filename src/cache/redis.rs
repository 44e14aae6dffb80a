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
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::Cache;
use crate::codec;
use crate::config::CacheConfig;
use crate::connection::SyncConnectionPool;
use crate::errors::CacheResult;

/// Cache over the remote store. Every operation leases one pooled connection,
/// issues one command, and releases the lease when the guard drops.
pub struct RedisCache {
    pool: Arc<SyncConnectionPool>,
}

impl RedisCache {
    pub fn new(config: &CacheConfig) -> CacheResult<Self> {
        let pool = Arc::new(SyncConnectionPool::new(config)?);
        Ok(Self::with_pool(pool))
    }

    /// Builds a cache over an existing pool. The handle is fixed for the
    /// lifetime of the cache.
    pub fn with_pool(pool: Arc<SyncConnectionPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Arc<SyncConnectionPool> {
        &self.pool
    }
}

impl Cache for RedisCache {
    fn get<V: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<V>> {
        let mut conn = self.pool.get_connection()?;
        let data: Option<String> = conn.execute_command(redis::cmd("GET").arg(key))?;

        match data {
            Some(raw) => Ok(Some(codec::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.pool.get_connection()?;
        let data: Option<String> = conn.execute_command(redis::cmd("GET").arg(key))?;
        Ok(data)
    }

    fn set<V: Serialize>(&self, key: &str, value: &V, ttl: Duration) -> CacheResult<()> {
        let data = codec::serialize(value)?;
        self.set_string(key, &data, ttl)
    }

    fn set_string(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.pool.get_connection()?;

        if ttl.is_zero() {
            conn.execute_command::<()>(redis::cmd("SET").arg(key).arg(value))?;
        } else {
            conn.execute_command::<()>(redis::cmd("SETEX").arg(key).arg(ttl.as_secs()).arg(value))?;
        }

        Ok(())
    }

    fn incr(&self, key: &str) -> CacheResult<i64> {
        let mut conn = self.pool.get_connection()?;
        let count: i64 = conn.execute_command(redis::cmd("INCR").arg(key))?;
        Ok(count)
    }

    fn decr(&self, key: &str) -> CacheResult<i64> {
        let mut conn = self.pool.get_connection()?;
        let count: i64 = conn.execute_command(redis::cmd("DECR").arg(key))?;
        Ok(count)
    }

    fn set_lock<V: Serialize>(&self, key: &str, value: &V) -> CacheResult<bool> {
        let data = codec::serialize(value)?;
        let mut conn = self.pool.get_connection()?;

        let created: i32 = conn.execute_command(redis::cmd("SETNX").arg(key).arg(&data))?;
        Ok(created == 1)
    }

    fn is_exist(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.pool.get_connection()?;
        let found: i32 = conn.execute_command(redis::cmd("EXISTS").arg(key))?;
        Ok(found > 0)
    }

    fn delete(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.pool.get_connection()?;
        let removed: i32 = conn.execute_command(redis::cmd("DEL").arg(key))?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::thread;

    fn create_test_cache() -> RedisCache {
        let config = CacheConfig::default().with_max_active(5);
        RedisCache::new(&config).unwrap()
    }

    fn fresh_key(cache: &RedisCache, name: &str) -> String {
        let key = format!("rediscache:test:{}", name);
        cache.delete(&key).unwrap();
        key
    }

    #[test]
    #[ignore = "requires a running redis-server on 127.0.0.1:6379"]
    fn test_string_round_trip() {
        let cache = create_test_cache();
        let key = fresh_key(&cache, "greeting");

        cache.set_string(&key, "hi", Duration::ZERO).unwrap();
        assert_eq!(cache.get_string(&key).unwrap().as_deref(), Some("hi"));

        cache.delete(&key).unwrap();
    }

    #[test]
    #[ignore = "requires a running redis-server on 127.0.0.1:6379"]
    fn test_value_round_trip() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Session {
            openid: String,
            expires_in: u64,
        }

        let cache = create_test_cache();
        let key = fresh_key(&cache, "session");
        let session = Session {
            openid: "o6_bmjrPTlm6_2sgVt7hMZOPfL2M".to_string(),
            expires_in: 7200,
        };

        cache.set(&key, &session, Duration::ZERO).unwrap();
        assert_eq!(cache.get::<Session>(&key).unwrap(), Some(session));

        cache.delete(&key).unwrap();
    }

    #[test]
    #[ignore = "requires a running redis-server on 127.0.0.1:6379"]
    fn test_ttl_expiry() {
        let cache = create_test_cache();
        let key = fresh_key(&cache, "temp");

        cache.set_string(&key, "x", Duration::from_secs(2)).unwrap();
        assert_eq!(cache.get_string(&key).unwrap().as_deref(), Some("x"));

        thread::sleep(Duration::from_secs(3));
        assert_eq!(cache.get_string(&key).unwrap(), None);
    }

    #[test]
    #[ignore = "requires a running redis-server on 127.0.0.1:6379"]
    fn test_lock_gate_first_writer_wins() {
        let cache = create_test_cache();
        let key = fresh_key(&cache, "mutex");

        assert!(cache.set_lock(&key, &"a").unwrap());
        assert!(!cache.set_lock(&key, &"a").unwrap());

        cache.delete(&key).unwrap();
    }

    #[test]
    #[ignore = "requires a running redis-server on 127.0.0.1:6379"]
    fn test_counter_monotonicity() {
        let cache = create_test_cache();
        let key = fresh_key(&cache, "ctr");

        assert_eq!(cache.incr(&key).unwrap(), 1);
        assert_eq!(cache.incr(&key).unwrap(), 2);
        assert_eq!(cache.incr(&key).unwrap(), 3);
        assert_eq!(cache.decr(&key).unwrap(), 2);

        cache.delete(&key).unwrap();
        assert!(!cache.is_exist(&key).unwrap());
    }

    #[test]
    #[ignore = "requires a running redis-server on 127.0.0.1:6379"]
    fn test_existence_reflects_mutation() {
        let cache = create_test_cache();
        let key = fresh_key(&cache, "present");

        assert!(!cache.is_exist(&key).unwrap());

        cache.set_string(&key, "v", Duration::ZERO).unwrap();
        assert!(cache.is_exist(&key).unwrap());

        assert!(cache.delete(&key).unwrap());
        assert!(!cache.is_exist(&key).unwrap());
    }

    #[test]
    #[ignore = "requires a running redis-server on 127.0.0.1:6379"]
    fn test_absent_key_is_none_not_error() {
        let cache = create_test_cache();
        let key = fresh_key(&cache, "absent");

        assert_eq!(cache.get::<String>(&key).unwrap(), None);
        assert_eq!(cache.get_string(&key).unwrap(), None);
    }
}
