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
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::cache::Cache;
use crate::errors::CacheResult;

/// A boolean gate over a cache key, not a mutual-exclusion lock.
///
/// The only guarantee is the absent→held transition: the store's atomic
/// set-if-absent lets exactly one caller observe `true` for a given key
/// while it is absent. The entry carries no expiry and no ownership token,
/// so the gate never releases itself and any caller may release it.
pub struct CacheLock<C> {
    cache: Arc<C>,
    key: String,
}

impl<C: Cache> CacheLock<C> {
    pub fn new(cache: Arc<C>, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Attempt the absent→held transition. `Ok(true)` only when this call
    /// created the key; a clash is `Ok(false)`, not an error.
    pub fn try_acquire<V: Serialize>(&self, value: &V) -> CacheResult<bool> {
        let acquired = self.cache.set_lock(&self.key, value)?;
        if acquired {
            debug!(key = %self.key, "gate acquired");
        }
        Ok(acquired)
    }

    pub fn is_held(&self) -> CacheResult<bool> {
        self.cache.is_exist(&self.key)
    }

    /// Deletes the gate key unconditionally. Named to advertise that the
    /// caller need not be the one who acquired it.
    pub fn force_release(&self) -> CacheResult<bool> {
        self.cache.delete(&self.key)
    }
}

impl<C> Clone for CacheLock<C> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            key: self.key.clone(),
        }
    }
}
