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
use rediscache::{Cache, CacheConfig, CacheLock, CacheResult, RedisCache};
use std::sync::Arc;
use std::time::Duration;

fn main() -> CacheResult<()> {
    // 1. Create configuration
    let config = CacheConfig::new("127.0.0.1:6379")
        .with_max_active(20)
        .with_idle_timeout(120);

    // 2. Create the cache client
    let cache = Arc::new(RedisCache::new(&config)?);

    // 3. Strings bypass the codec
    cache.set_string("greeting", "hi", Duration::ZERO)?;
    println!("greeting = {:?}", cache.get_string("greeting")?);

    // 4. Structured values go through JSON
    cache.set("answer", &42u32, Duration::from_secs(30))?;
    let answer: Option<u32> = cache.get("answer")?;
    println!("answer = {:?}", answer);

    // 5. Counters
    println!("visits = {}", cache.incr("visits")?);

    // 6. Boolean gate: first writer wins, anyone may release
    let gate = CacheLock::new(cache.clone(), "jobs:nightly");
    if gate.try_acquire(&"worker-1")? {
        println!("gate acquired");
        gate.force_release()?;
    }

    Ok(())
}
