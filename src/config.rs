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
use serde::{Deserialize, Serialize};

use crate::errors::{CacheError, CacheResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// `host:port` address of the store; the port defaults to 6379 when omitted
    pub host: String,
    /// AUTH credential, applied on dial
    pub password: Option<String>,
    /// Database index selected on dial
    pub database: i64,
    /// Idle connections the pool keeps warm
    pub max_idle: u32,
    /// Upper bound on concurrently leased connections; 0 selects the built-in default
    pub max_active: u32,
    /// Seconds a pooled connection may sit idle before eviction; 0 disables eviction
    pub idle_timeout: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1:6379".to_string(),
            password: None,
            database: 0,
            max_idle: 5,
            max_active: 10,
            idle_timeout: 60,
        }
    }
}

impl CacheConfig {
    pub fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
            ..Default::default()
        }
    }

    pub fn with_host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    pub fn with_password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    pub fn with_database(mut self, db: i64) -> Self {
        self.database = db;
        self
    }

    pub fn with_max_idle(mut self, count: u32) -> Self {
        self.max_idle = count;
        self
    }

    pub fn with_max_active(mut self, count: u32) -> Self {
        self.max_active = count;
        self
    }

    pub fn with_idle_timeout(mut self, seconds: u64) -> Self {
        self.idle_timeout = seconds;
        self
    }

    pub fn validate(&self) -> CacheResult<()> {
        self.host_and_port().map(|_| ())
    }

    /// Splits `host` into an address/port pair for the dialer.
    pub fn host_and_port(&self) -> CacheResult<(String, u16)> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(CacheError::ConfigError("host must not be empty".to_string()));
        }

        match host.rsplit_once(':') {
            Some((addr, port)) => {
                if addr.is_empty() {
                    return Err(CacheError::ConfigError(format!("invalid host address: {}", host)));
                }
                let port = port.parse::<u16>().map_err(|_| {
                    CacheError::ConfigError(format!("invalid port in host address: {}", host))
                })?;
                Ok((addr.to_string(), port))
            }
            None => Ok((host.to_string(), 6379)),
        }
    }
}
