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
mod local;
mod redis;

pub use local::*;
pub use redis::*;

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::CacheResult;

/// The cache operation set. `ttl` of zero means no expiry. Structured values
/// pass through the JSON codec; the `_string` variants move raw text.
pub trait Cache {
    fn get<V: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<V>>;

    fn get_string(&self, key: &str) -> CacheResult<Option<String>>;

    fn set<V: Serialize>(&self, key: &str, value: &V, ttl: Duration) -> CacheResult<()>;

    fn set_string(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Atomic increment; returns the new value.
    fn incr(&self, key: &str) -> CacheResult<i64>;

    /// Atomic decrement; returns the new value.
    fn decr(&self, key: &str) -> CacheResult<i64>;

    /// Atomic set-if-absent. `Ok(true)` only when this call created the key;
    /// a clash with an existing key is `Ok(false)`, not an error.
    fn set_lock<V: Serialize>(&self, key: &str, value: &V) -> CacheResult<bool>;

    fn is_exist(&self, key: &str) -> CacheResult<bool>;

    /// Unconditional deletion; reports whether a key was removed.
    fn delete(&self, key: &str) -> CacheResult<bool>;
}

#[derive(Clone, Debug)]
pub struct CacheStats {
    pub total_hits: u64,
    pub total_misses: u64,
    pub total_evictions: u64,
    pub avg_hit_rate: f64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self {
            total_hits: 0,
            total_misses: 0,
            total_evictions: 0,
            avg_hit_rate: 1.0,
        }
    }

    pub fn record_hit(&mut self) {
        self.total_hits += 1;
        self.update_hit_rate();
    }

    pub fn record_miss(&mut self) {
        self.total_misses += 1;
        self.update_hit_rate();
    }

    pub fn record_eviction(&mut self, count: usize) {
        self.total_evictions += count as u64;
    }

    fn update_hit_rate(&mut self) {
        let total = self.total_hits + self.total_misses;
        if total > 0 {
            self.avg_hit_rate = self.total_hits as f64 / total as f64;
        }
    }
}

impl Default for CacheStats {
    fn default() -> Self {
        Self::new()
    }
}
