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

//! An in-process stand-in for [`RedisCache`](crate::redis_cache::RedisCache), used by
//! tests that exercise cache-dependent call sites without a live Redis instance.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::redis_cache::ArticleCache;

#[derive(Default)]
pub struct InMemoryCache {
  store: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryCache {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl ArticleCache for InMemoryCache {
  async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
    Ok(self.store.lock().unwrap().get(key).cloned())
  }

  async fn put(&self, key: &str, value: Vec<u8>, _ttl: Option<Duration>) -> Result<()> {
    self.store.lock().unwrap().insert(key.to_string(), value);
    Ok(())
  }

  async fn delete(&self, key: &str) -> Result<bool> {
    Ok(self.store.lock().unwrap().remove(key).is_some())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_put_get_delete() {
    let cache = InMemoryCache::new();
    cache.put("k", b"v".to_vec(), None).await.unwrap();
    assert_eq!(cache.get("k").await.unwrap(), Some(b"v".to_vec()));
    assert!(cache.delete("k").await.unwrap());
    assert_eq!(cache.get("k").await.unwrap(), None);
  }

  #[tokio::test]
  async fn test_id_index_round_trip() {
    let cache = InMemoryCache::new();
    let ids = vec!["a".to_string(), "b".to_string()];
    cache.put_id_index(&ids, None).await.unwrap();
    assert_eq!(cache.get_id_index().await.unwrap(), ids);
  }
}
