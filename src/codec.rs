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

//! JSON value codec. String-typed reads and writes bypass this module
//! entirely; raw text goes over the wire untouched.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{CacheError, CacheResult};

pub fn serialize<T: Serialize>(value: &T) -> CacheResult<String> {
    serde_json::to_string(value).map_err(|e| CacheError::SerializationError(e.to_string()))
}

pub fn deserialize<T: DeserializeOwned>(data: &str) -> CacheResult<T> {
    serde_json::from_str(data).map_err(|e| CacheError::DeserializationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Session {
        openid: String,
        expires_in: u64,
    }

    #[test]
    fn test_round_trip() {
        let session = Session {
            openid: "o6_bmjrPTlm6_2sgVt7hMZOPfL2M".to_string(),
            expires_in: 7200,
        };

        let raw = serialize(&session).unwrap();
        let decoded: Session = deserialize(&raw).unwrap();
        assert_eq!(decoded, session);
    }

    #[test]
    fn test_malformed_input_is_an_error() {
        let result: CacheResult<Session> = deserialize("{not json");
        assert!(matches!(result, Err(CacheError::DeserializationError(_))));
    }

    #[test]
    fn test_type_mismatch_is_an_error() {
        let result: CacheResult<Session> = deserialize("[1, 2, 3]");
        assert!(matches!(result, Err(CacheError::DeserializationError(_))));
    }
}
