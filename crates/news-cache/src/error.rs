/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
  #[error("cache configuration error: {0}")]
  Config(String),

  #[error("cache connection error: {0}")]
  Connection(String),

  #[error("cache serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("redis error: {0}")]
  Redis(#[from] deadpool_redis::redis::RedisError),

  #[error("redis pool error: {0}")]
  Pool(#[from] deadpool_redis::PoolError),
}

pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_config_error_display() {
    let err = CacheError::Config("redis_url required".to_string());
    assert_eq!(err.to_string(), "cache configuration error: redis_url required");
  }

  #[test]
  fn test_connection_error_display() {
    let err = CacheError::Connection("connection refused".to_string());
    assert_eq!(err.to_string(), "cache connection error: connection refused");
  }

  #[test]
  fn test_serialization_from_serde_json() {
    let json_err = serde_json::from_str::<serde_json::Value>("{bad").unwrap_err();
    let err: CacheError = json_err.into();
    assert!(matches!(err, CacheError::Serialization(_)));
  }

  #[test]
  fn test_error_debug() {
    let err = CacheError::Config("test".to_string());
    let debug_str = format!("{err:?}");
    assert!(debug_str.contains("Config"));
  }
}
