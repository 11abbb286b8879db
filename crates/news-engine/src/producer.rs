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

//! The ingestion pipeline: fetches new articles from the configured provider,
//! early-exits on already-known ids, and keeps ARTICLE_DB and the published
//! `ID_INDEX` converged.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use news_cache::ArticleCache;
use news_core::Config;
use news_models::CanonicalArticle;
use news_providers::Provider;
use news_store::ArticleRepository;
use tracing::{info, instrument, warn};

use crate::error::Result;

/// Summary of one `runIngestionTick()` invocation, returned for logging and tests.
#[derive(Debug, Clone, Default)]
pub struct IngestionReport {
  pub pages_fetched: usize,
  pub new_articles: usize,
  pub early_exit: bool,
  pub trimmed: usize,
}

pub struct Producer {
  provider: Arc<dyn Provider>,
  store: Arc<dyn ArticleRepository>,
  cache: Arc<dyn ArticleCache>,
  config: Config,
}

impl Producer {
  pub fn new(provider: Arc<dyn Provider>, store: Arc<dyn ArticleRepository>, cache: Arc<dyn ArticleCache>, config: Config) -> Self {
    Producer { provider, store, cache, config }
  }

  #[instrument(skip(self), fields(provider = self.provider.name()))]
  pub async fn run_ingestion_tick(&self, now_ms: i64) -> Result<IngestionReport> {
    let mut known_ids: Vec<String> = self.cache.get_id_index().await?;
    known_ids.truncate(self.config.max_stored_articles);
    let mut known_set: HashSet<String> = known_ids.iter().cloned().collect();

    let mut new_articles: Vec<CanonicalArticle> = Vec::new();
    let mut page_token: Option<String> = None;
    let mut pages_fetched = 0usize;
    let mut early_exit = false;

    loop {
      if pages_fetched >= self.config.max_pages {
        break;
      }
      let page = self.provider.fetch_page(page_token.as_deref()).await?;
      pages_fetched += 1;

      if page.articles.is_empty() {
        break;
      }

      for raw in &page.articles {
        let Some(id) = raw.id() else {
          continue;
        };
        if known_set.contains(&id) {
          early_exit = true;
          continue;
        }
        if let Some(canonical) = raw.normalize(self.config.apitube_sentiment_threshold, now_ms) {
          known_set.insert(id);
          new_articles.push(canonical);
        }
      }

      if early_exit {
        break;
      }
      match page.next_token {
        Some(token) => page_token = Some(token),
        None => break,
      }
    }

    let new_count = new_articles.len();
    if !new_articles.is_empty() {
      let (inserted, skipped) = self.store.insert_batch(new_articles.clone()).await?;
      info!(inserted, skipped, "inserted new articles into article store");
    }

    let mut new_ids: Vec<String> = new_articles.iter().map(|a| a.id.clone()).collect();
    new_ids.extend(known_ids);
    new_ids.truncate(self.config.max_stored_articles);
    self
      .cache
      .put_id_index(&new_ids, Some(Duration::from_secs(self.config.id_index_ttl_secs)))
      .await?;

    let trimmed = if self.config.delete_old_articles {
      self.trim(&new_ids).await?
    } else {
      0
    };

    Ok(IngestionReport { pages_fetched, new_articles: new_count, early_exit, trimmed })
  }

  async fn trim(&self, id_index: &[String]) -> Result<usize> {
    let keep: HashSet<&String> = id_index.iter().collect();
    let all_ids = self.store.get_all_ids(self.config.max_stored_articles as i64 * 10).await?;
    let stale: Vec<String> = all_ids.into_iter().filter(|id| !keep.contains(id)).collect();
    if stale.is_empty() {
      return Ok(0);
    }
    let deleted = self.store.delete_by_ids(stale).await?;
    if deleted > 0 {
      warn!(deleted, "trimmed articles no longer in the published index");
    }
    Ok(deleted)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use async_trait::async_trait;
  use news_cache::InMemoryCache;
  use news_core::NewsProvider;
  use news_models::raw::NewsDataRawArticle;
  use news_providers::{FetchedPage, ProviderError, RawArticle};
  use news_store::ArticleUpdate;
  use std::sync::Mutex;

  struct StubProvider {
    pages: Mutex<Vec<FetchedPage>>,
  }

  #[async_trait]
  impl Provider for StubProvider {
    async fn fetch_page(&self, _page_token: Option<&str>) -> news_providers::Result<FetchedPage> {
      let mut pages = self.pages.lock().unwrap();
      if pages.is_empty() {
        return Ok(FetchedPage { articles: vec![], next_token: None, total: 0 });
      }
      Ok(pages.remove(0))
    }

    fn name(&self) -> &'static str {
      "stub"
    }
  }

  fn newsdata(id: &str, title: &str) -> RawArticle {
    RawArticle::NewsData(NewsDataRawArticle {
      article_id: Some(id.to_string()),
      id: None,
      title: Some(title.to_string()),
      description: None,
      link: Some(format!("https://example.com/{id}")),
      pub_date: Some("2024-01-01 00:00:00".to_string()),
      source_id: Some("example".to_string()),
      image_url: None,
    })
  }

  #[derive(Default)]
  struct StubStore {
    inserted: Mutex<Vec<CanonicalArticle>>,
  }

  #[async_trait]
  impl ArticleRepository for StubStore {
    async fn insert_batch(&self, rows: Vec<CanonicalArticle>) -> news_store::Result<(usize, usize)> {
      let n = rows.len();
      self.inserted.lock().unwrap().extend(rows);
      Ok((n, 0))
    }
    async fn update(&self, _id: String, _fields: ArticleUpdate) -> news_store::Result<()> {
      Ok(())
    }
    async fn get_by_id(&self, id: String) -> news_store::Result<Option<CanonicalArticle>> {
      Ok(self.inserted.lock().unwrap().iter().find(|a| a.id == id).cloned())
    }
    async fn get_pending(&self, _limit: i64) -> news_store::Result<Vec<CanonicalArticle>> {
      Ok(Vec::new())
    }
    async fn get_all_ids(&self, _limit: i64) -> news_store::Result<Vec<String>> {
      Ok(self.inserted.lock().unwrap().iter().map(|a| a.id.clone()).collect())
    }
    async fn delete_by_ids(&self, ids: Vec<String>) -> news_store::Result<usize> {
      let mut inserted = self.inserted.lock().unwrap();
      let before = inserted.len();
      inserted.retain(|a| !ids.contains(&a.id));
      Ok(before - inserted.len())
    }
    async fn update_checkpoint(&self, _current_article_id: Option<String>) -> news_store::Result<()> {
      Ok(())
    }
    async fn increment_checkpoint_count(&self) -> news_store::Result<()> {
      Ok(())
    }
  }
  fn cfg() -> Config {
    let mut c = Config::default_with_key(NewsProvider::NewsData, "key");
    c.max_pages = 5;
    c.max_stored_articles = 10;
    c
  }

  #[tokio::test]
  async fn test_fresh_site_one_new_article() {
    let provider = StubProvider {
      pages: Mutex::new(vec![FetchedPage { articles: vec![newsdata("a1", "Bitcoin surges")], next_token: None, total: 1 }]),
    };
    let store = Arc::new(StubStore::default());
    let cache = Arc::new(InMemoryCache::new());
    let producer = Producer::new(Arc::new(provider), store.clone(), cache.clone(), cfg());

    let report = producer.run_ingestion_tick(1000).await.unwrap();
    assert_eq!(report.new_articles, 1);
    assert!(!report.early_exit);
    let index = cache.get_id_index().await.unwrap();
    assert_eq!(index, vec!["a1".to_string()]);
  }

  #[tokio::test]
  async fn test_early_exit_stops_pagination() {
    let provider = StubProvider {
      pages: Mutex::new(vec![
        FetchedPage { articles: vec![newsdata("new1", "Fresh"), newsdata("known1", "Old")], next_token: Some("p2".to_string()), total: 2 },
        FetchedPage { articles: vec![newsdata("should-not-appear", "x")], next_token: None, total: 1 },
      ]),
    };
    let store = Arc::new(StubStore::default());
    let cache = Arc::new(InMemoryCache::new());
    cache.put_id_index(&["known1".to_string()], None).await.unwrap();

    let producer = Producer::new(Arc::new(provider), store, cache.clone(), cfg());
    let report = producer.run_ingestion_tick(1000).await.unwrap();

    assert!(report.early_exit);
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.new_articles, 1);
    let index = cache.get_id_index().await.unwrap();
    assert!(index.contains(&"new1".to_string()));
    assert!(!index.contains(&"should-not-appear".to_string()));
  }

  #[tokio::test]
  async fn test_trim_removes_ids_not_in_index() {
    let provider = StubProvider { pages: Mutex::new(vec![]) };
    let store = Arc::new(StubStore::default());
    store.inserted.lock().unwrap().push(CanonicalArticle {
      id: "stale".to_string(),
      title: "old".to_string(),
      description: None,
      link: None,
      pub_date: chrono::Utc::now(),
      source: None,
      image_url: None,
      sentiment: None,
      ai_summary: None,
      needs_sentiment: false,
      needs_summary: false,
      content_timeout: 0,
      summary_error: None,
      extracted_content: None,
      queued_at: 0,
      processed_at: None,
      created_at: 0,
      updated_at: 0,
    });
    let cache = Arc::new(InMemoryCache::new());
    let mut config = cfg();
    config.delete_old_articles = true;

    let producer = Producer::new(Arc::new(provider), store.clone(), cache, config);
    let report = producer.run_ingestion_tick(1000).await.unwrap();
    assert_eq!(report.trimmed, 1);
    assert!(store.inserted.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_provider_error_aborts_tick() {
    struct FailingProvider;
    #[async_trait]
    impl Provider for FailingProvider {
      async fn fetch_page(&self, _page_token: Option<&str>) -> news_providers::Result<FetchedPage> {
        Err(ProviderError::Status { status: 500, body: "boom".to_string() })
      }
      fn name(&self) -> &'static str {
        "failing"
      }
    }
    let store = Arc::new(StubStore::default());
    let cache = Arc::new(InMemoryCache::new());
    let producer = Producer::new(Arc::new(FailingProvider), store.clone(), cache, cfg());
    let result = producer.run_ingestion_tick(1000).await;
    assert!(result.is_err());
    assert!(store.inserted.lock().unwrap().is_empty());
  }
}
