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
use parking_lot::RwLock;
use r2d2::{Pool, PooledConnection};
use redis::{Client, ConnectionAddr, ConnectionInfo, ConnectionLike, RedisConnectionInfo, RedisError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::CacheConfig;
use crate::errors::{CacheError, CacheResult};

/// Pool size used when the configuration leaves `max_active` at 0.
const DEFAULT_MAX_ACTIVE: u32 = 10;

/// Connections idle for less than this are handed out without a probe.
const PROBE_AFTER_IDLE: Duration = Duration::from_secs(60);

pub type PooledRedisConnection = PooledConnection<RedisConnectionManager>;

/// A leased connection to the store. Owned exclusively between acquire and
/// release; dropping the pool guard returns it on every exit path.
pub struct RedisConnection {
    conn: redis::Connection,
    last_used: Instant,
}

impl RedisConnection {
    pub fn execute_command<T: redis::FromRedisValue>(&mut self, cmd: &mut redis::Cmd) -> CacheResult<T> {
        let reply = cmd.query(&mut self.conn)?;
        self.last_used = Instant::now();
        Ok(reply)
    }
}

/// Dials authenticated connections and health-checks them on borrow.
pub struct RedisConnectionManager {
    client: Client,
}

impl RedisConnectionManager {
    pub fn new(config: &CacheConfig) -> CacheResult<Self> {
        let (addr, port) = config.host_and_port()?;

        let conn_info = ConnectionInfo {
            addr: ConnectionAddr::Tcp(addr, port),
            redis: RedisConnectionInfo {
                db: config.database,
                username: None,
                password: config.password.clone(),
                ..Default::default()
            },
        };

        let client = Client::open(conn_info).map_err(|e| CacheError::PoolError(e.to_string()))?;

        Ok(Self { client })
    }
}

impl r2d2::ManageConnection for RedisConnectionManager {
    type Connection = RedisConnection;
    type Error = RedisError;

    fn connect(&self) -> Result<RedisConnection, RedisError> {
        let conn = self.client.get_connection()?;
        Ok(RedisConnection {
            conn,
            last_used: Instant::now(),
        })
    }

    fn is_valid(&self, conn: &mut RedisConnection) -> Result<(), RedisError> {
        // Recently used connections are handed out untested; anything idle
        // past the threshold must answer a PING first.
        if conn.last_used.elapsed() < PROBE_AFTER_IDLE {
            return Ok(());
        }

        match redis::cmd("PING").query::<String>(&mut conn.conn) {
            Ok(_) => {
                conn.last_used = Instant::now();
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "idle connection failed PING probe, discarding");
                Err(err)
            }
        }
    }

    fn has_broken(&self, conn: &mut RedisConnection) -> bool {
        !conn.conn.is_open()
    }
}

/// Bounded pool of connections to the store. Construction is lazy: no
/// connection is dialed until the first acquisition.
pub struct SyncConnectionPool {
    pool: Pool<RedisConnectionManager>,
    stats: Arc<RwLock<ConnectionStats>>,
}

impl SyncConnectionPool {
    pub fn new(config: &CacheConfig) -> CacheResult<Self> {
        config.validate()?;

        let manager = RedisConnectionManager::new(config)?;

        let max_size = if config.max_active == 0 {
            DEFAULT_MAX_ACTIVE
        } else {
            config.max_active
        };
        let min_idle = config.max_idle.min(max_size);
        let idle_timeout = if config.idle_timeout > 0 {
            Some(Duration::from_secs(config.idle_timeout))
        } else {
            None
        };

        let pool = Pool::builder()
            .max_size(max_size)
            .min_idle(Some(min_idle))
            .idle_timeout(idle_timeout)
            .test_on_check_out(true)
            .build_unchecked(manager);

        debug!(host = %config.host, max_size, min_idle, "connection pool created");

        Ok(Self {
            pool,
            stats: Arc::new(RwLock::new(ConnectionStats::new())),
        })
    }

    pub fn get_connection(&self) -> CacheResult<PooledRedisConnection> {
        let start = Instant::now();

        match self.pool.get() {
            Ok(conn) => {
                self.stats.write().record_success(start.elapsed());
                Ok(conn)
            }
            Err(err) => {
                self.stats.write().record_failure(start.elapsed());
                Err(CacheError::PoolError(err.to_string()))
            }
        }
    }

    /// One PING round trip through the pool.
    pub fn ping(&self) -> CacheResult<()> {
        let mut conn = self.get_connection()?;
        let reply: String = conn.execute_command(&mut redis::cmd("PING"))?;

        if reply == "PONG" {
            Ok(())
        } else {
            Err(CacheError::ProtocolError(format!("unexpected PING reply: {}", reply)))
        }
    }

    pub fn health_check(&self) -> bool {
        self.ping().is_ok()
    }

    pub fn get_stats(&self) -> ConnectionStats {
        self.stats.read().clone()
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionStats {
    pub total_acquisitions: u64,
    pub failed_acquisitions: u64,
    pub total_wait_time_ms: f64,
    pub last_reset: Instant,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self {
            total_acquisitions: 0,
            failed_acquisitions: 0,
            total_wait_time_ms: 0.0,
            last_reset: Instant::now(),
        }
    }

    pub fn record_success(&mut self, elapsed: Duration) {
        self.total_acquisitions += 1;
        self.total_wait_time_ms += elapsed.as_millis() as f64;
    }

    pub fn record_failure(&mut self, elapsed: Duration) {
        self.total_acquisitions += 1;
        self.failed_acquisitions += 1;
        self.total_wait_time_ms += elapsed.as_millis() as f64;
    }

    pub fn avg_wait_time_ms(&self) -> f64 {
        if self.total_acquisitions > 0 {
            self.total_wait_time_ms / self.total_acquisitions as f64
        } else {
            0.0
        }
    }

    pub fn error_rate(&self) -> f64 {
        if self.total_acquisitions > 0 {
            self.failed_acquisitions as f64 / self.total_acquisitions as f64
        } else {
            0.0
        }
    }

    pub fn reset(&mut self) {
        self.total_acquisitions = 0;
        self.failed_acquisitions = 0;
        self.total_wait_time_ms = 0.0;
        self.last_reset = Instant::now();
    }
}

impl Default for ConnectionStats {
    fn default() -> Self {
        Self::new()
    }
}
