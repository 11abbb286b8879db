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

//! The enrichment state machine: exactly one phase runs per pending article
//! per tick, in order Sentiment, then content scrape, then summarize.

use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;

use news_ai::{ChatMessage, InferenceClient, InferenceRequest};
use news_cache::ArticleCache;
use news_core::Config;
use news_extract::{ContentExtractor, ExtractError};
use news_models::{CanonicalArticle, Sentiment};
use news_store::{ArticleRepository, ArticleUpdate};
use regex::Regex;
use tracing::{instrument, warn};

use crate::error::Result;
use crate::html_entities;

const MIN_SUMMARIZABLE_CHARS: usize = 100;
const MIN_SUMMARY_CHARS: usize = 20;
const SENTIMENT_MAX_TOKENS: u32 = 10;
const SUMMARY_MAX_TOKENS: u32 = 512;

/// Summary of one `runProcessorTick()` invocation.
#[derive(Debug, Clone, Default)]
pub struct ProcessorReport {
  pub attempted: usize,
  pub published: usize,
}

enum Phase {
  Sentiment,
  ContentScrape,
  Summarize,
  NoLink,
  None,
}

fn next_phase(article: &CanonicalArticle, max_attempts: u32) -> Phase {
  if article.needs_sentiment {
    return Phase::Sentiment;
  }
  if article.missing_link() {
    return Phase::NoLink;
  }
  if article.ready_for_content_scrape(max_attempts) {
    return Phase::ContentScrape;
  }
  if article.ready_for_summarize() {
    return Phase::Summarize;
  }
  Phase::None
}

pub struct Processor {
  store: Arc<dyn ArticleRepository>,
  cache: Arc<dyn ArticleCache>,
  extractor: Arc<ContentExtractor>,
  inference: Arc<dyn InferenceClient>,
  config: Config,
}

impl Processor {
  pub fn new(
    store: Arc<dyn ArticleRepository>,
    cache: Arc<dyn ArticleCache>,
    extractor: Arc<ContentExtractor>,
    inference: Arc<dyn InferenceClient>,
    config: Config,
  ) -> Self {
    Processor { store, cache, extractor, inference, config }
  }

  #[instrument(skip(self))]
  pub async fn run_processor_tick(&self, now_ms: i64) -> Result<ProcessorReport> {
    let batch = self.store.get_pending(self.config.max_articles_per_run as i64).await?;
    let mut report = ProcessorReport::default();

    for article in batch {
      self.store.update_checkpoint(Some(article.id.clone())).await?;

      let mut update = self.run_phase(&article, now_ms).await;
      update.processed_at = Some(Some(now_ms));

      self.store.update(article.id.clone(), update.clone()).await?;
      self.store.increment_checkpoint_count().await?;
      self.store.update_checkpoint(None).await?;
      report.attempted += 1;

      let resulting = apply_update(&article, &update);
      if resulting.is_fully_processed() {
        self.cache.put_article(&resulting, Some(Duration::from_secs(self.config.id_index_ttl_secs))).await?;
        report.published += 1;
      }
    }

    Ok(report)
  }

  /// Runs exactly one phase for a single id, for the on-demand endpoint. Returns
  /// `None` if the id does not exist. An already fully-processed article simply
  /// falls through `next_phase`'s `Phase::None` arm and is returned unchanged.
  #[instrument(skip(self))]
  pub async fn run_single(&self, id: &str, now_ms: i64) -> Result<Option<CanonicalArticle>> {
    let Some(article) = self.store.get_by_id(id.to_string()).await? else {
      return Ok(None);
    };

    self.store.update_checkpoint(Some(article.id.clone())).await?;
    let mut update = self.run_phase(&article, now_ms).await;
    update.processed_at = Some(Some(now_ms));
    self.store.update(article.id.clone(), update.clone()).await?;
    self.store.update_checkpoint(None).await?;

    let resulting = apply_update(&article, &update);
    if resulting.is_fully_processed() {
      self.cache.put_article(&resulting, Some(Duration::from_secs(self.config.id_index_ttl_secs))).await?;
    }
    Ok(Some(resulting))
  }

  async fn run_phase(&self, article: &CanonicalArticle, now_ms: i64) -> ArticleUpdate {
    let _ = now_ms;
    match next_phase(article, self.config.max_content_fetch_attempts) {
      Phase::Sentiment => self.run_sentiment_phase(article).await,
      Phase::ContentScrape => self.run_content_scrape_phase(article).await,
      Phase::Summarize => self.run_summarize_phase(article).await,
      Phase::NoLink => ArticleUpdate {
        needs_summary: Some(false),
        summary_error: Some(Some("no_link".to_string())),
        ..Default::default()
      },
      Phase::None => ArticleUpdate::default(),
    }
  }

  #[instrument(skip(self, article))]
  async fn run_sentiment_phase(&self, article: &CanonicalArticle) -> ArticleUpdate {
    let prompt = format!(
      "Classify the overall sentiment of this Bitcoin news item toward Bitcoin as exactly one word: \
       positive, negative, or neutral.\n\n{}. {}",
      article.title,
      article.description.as_deref().unwrap_or_default()
    );
    let request = InferenceRequest {
      model: self.config.ai_model.clone(),
      messages: vec![ChatMessage::user(prompt)],
      max_tokens: SENTIMENT_MAX_TOKENS,
    };

    match self.inference.run(request).await {
      Ok(resp) => {
        let sentiment = Sentiment::from_model_output(&resp.response);
        ArticleUpdate { sentiment: Some(Some(sentiment)), needs_sentiment: Some(false), ..Default::default() }
      }
      Err(err) => {
        warn!(error = %err, id = %article.id, "sentiment phase failed, retrying next tick");
        ArticleUpdate { sentiment: Some(Some(Sentiment::Neutral)), ..Default::default() }
      }
    }
  }

  #[instrument(skip(self, article))]
  async fn run_content_scrape_phase(&self, article: &CanonicalArticle) -> ArticleUpdate {
    let link = article.link.as_deref().expect("ready_for_content_scrape guarantees a link");
    match self.extractor.fetch(link, false).await {
      Ok(text) => ArticleUpdate {
        extracted_content: Some(Some(text.unwrap_or_default())),
        summary_error: Some(Some(format!(
          "scraping_complete ({}/{})",
          article.content_timeout, self.config.max_content_fetch_attempts
        ))),
        ..Default::default()
      },
      Err(ExtractError::Status(_)) => self.content_scrape_failure(article, "fetch_failed".to_string()),
      Err(err) => self.content_scrape_failure(article, format!("fetch_error: {err}")),
    }
  }

  fn content_scrape_failure(&self, article: &CanonicalArticle, reason: String) -> ArticleUpdate {
    let attempts = article.content_timeout + 1;
    let max = self.config.max_content_fetch_attempts as i32;
    let message = format!("{reason} ({attempts}/{max})");
    if attempts >= max {
      ArticleUpdate {
        content_timeout: Some(0),
        needs_summary: Some(false),
        summary_error: Some(Some(message)),
        ..Default::default()
      }
    } else {
      ArticleUpdate { content_timeout: Some(attempts), summary_error: Some(Some(message)), ..Default::default() }
    }
  }

  #[instrument(skip(self, article))]
  async fn run_summarize_phase(&self, article: &CanonicalArticle) -> ArticleUpdate {
    let raw = article.extracted_content.as_deref().unwrap_or_default();
    let decoded = html_entities::decode_and_collapse(raw);
    if decoded.chars().count() < MIN_SUMMARIZABLE_CHARS {
      return mismatch_update();
    }

    let prompt = format!(
      "An article titled \"{}\" was scraped from the web. First decide whether the text below is \
       actually about that title; if not, or if the text is not a usable news article, respond with \
       exactly \"CONTENT_MISMATCH\". Otherwise respond with \"SUMMARY:\" followed by a two to three \
       sentence summary.\n\nText:\n{}",
      article.title, decoded
    );
    let request = InferenceRequest {
      model: self.config.ai_model.clone(),
      messages: vec![ChatMessage::user(prompt)],
      max_tokens: SUMMARY_MAX_TOKENS,
    };

    match self.inference.run(request).await {
      Ok(resp) => {
        let upper = resp.response.to_ascii_uppercase();
        if upper.contains("ERROR:") || upper.contains("CONTENT_MISMATCH") {
          return mismatch_update();
        }
        let summary = extract_summary(&resp.response);
        if summary.chars().count() <= MIN_SUMMARY_CHARS {
          return mismatch_update();
        }
        ArticleUpdate {
          ai_summary: Some(Some(summary)),
          needs_summary: Some(false),
          extracted_content: Some(None),
          content_timeout: Some(0),
          summary_error: Some(None),
          ..Default::default()
        }
      }
      Err(err) => self.summarize_failure(article, format!("ai_error: {err}")),
    }
  }

  fn summarize_failure(&self, article: &CanonicalArticle, reason: String) -> ArticleUpdate {
    let attempts = article.content_timeout + 1;
    let max = self.config.max_content_fetch_attempts as i32;
    let message = format!("{reason} ({attempts}/{max})");
    if attempts >= max {
      ArticleUpdate {
        needs_summary: Some(false),
        content_timeout: Some(0),
        summary_error: Some(Some(message)),
        extracted_content: Some(None),
        ..Default::default()
      }
    } else {
      ArticleUpdate { content_timeout: Some(attempts), summary_error: Some(Some(message)), ..Default::default() }
    }
  }
}

fn mismatch_update() -> ArticleUpdate {
  ArticleUpdate {
    needs_summary: Some(false),
    summary_error: Some(Some("content_mismatch".to_string())),
    extracted_content: Some(None),
    ..Default::default()
  }
}

fn extract_summary(raw: &str) -> String {
  let trimmed = raw.trim();
  let upper = trimmed.to_ascii_uppercase();
  if let Some(pos) = upper.find("SUMMARY:") {
    return trimmed[pos + "SUMMARY:".len()..].trim().to_string();
  }
  strip_confirmation_prefix(trimmed).trim().to_string()
}

fn confirmation_prefix_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r"(?i)^(here(?:'s| is) (?:a |the )?summary:?|summary:?|sure[,.]?\s*here(?:'s| is)[^:]*:)\s*").unwrap()
  })
}

fn strip_confirmation_prefix(text: &str) -> &str {
  match confirmation_prefix_pattern().find(text) {
    Some(m) => &text[m.end()..],
    None => text,
  }
}

/// Applies a repository-bound `ArticleUpdate` to an in-memory copy, mirroring
/// the column semantics `update()` uses against Postgres, so the processor can
/// decide whether the result is fully processed without a second round trip.
fn apply_update(article: &CanonicalArticle, update: &ArticleUpdate) -> CanonicalArticle {
  let mut next = article.clone();
  if let Some(v) = &update.sentiment {
    next.sentiment = *v;
  }
  if let Some(v) = &update.ai_summary {
    next.ai_summary = v.clone();
  }
  if let Some(v) = update.needs_sentiment {
    next.needs_sentiment = v;
  }
  if let Some(v) = update.needs_summary {
    next.needs_summary = v;
  }
  if let Some(v) = update.content_timeout {
    next.content_timeout = v;
  }
  if let Some(v) = &update.summary_error {
    next.summary_error = v.clone();
  }
  if let Some(v) = &update.extracted_content {
    next.extracted_content = v.clone();
  }
  if let Some(v) = update.processed_at {
    next.processed_at = v;
  }
  next
}

#[cfg(test)]
mod tests {
  use super::*;
  use async_trait::async_trait;
  use news_ai::InferenceResponse;
  use news_cache::InMemoryCache;
  use news_core::NewsProvider;
  use std::sync::Mutex;
  use wiremock::matchers::method;
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn cfg() -> Config {
    let mut c = Config::default_with_key(NewsProvider::NewsData, "key");
    c.max_articles_per_run = 5;
    c.max_content_fetch_attempts = 3;
    c
  }

  fn sample(id: &str) -> CanonicalArticle {
    CanonicalArticle {
      id: id.to_string(),
      title: "Bitcoin surges past resistance".to_string(),
      description: Some("A rally driven by institutional demand.".to_string()),
      link: Some("https://example.com/a".to_string()),
      pub_date: chrono::Utc::now(),
      source: Some("example".to_string()),
      image_url: None,
      sentiment: None,
      ai_summary: None,
      needs_sentiment: true,
      needs_summary: true,
      content_timeout: 0,
      summary_error: None,
      extracted_content: None,
      queued_at: 0,
      processed_at: None,
      created_at: 0,
      updated_at: 0,
    }
  }

  #[derive(Default)]
  struct StubStore {
    articles: Mutex<Vec<CanonicalArticle>>,
  }

  impl StubStore {
    fn seeded(article: CanonicalArticle) -> Self {
      StubStore { articles: Mutex::new(vec![article]) }
    }
  }

  #[async_trait]
  impl ArticleRepository for StubStore {
    async fn insert_batch(&self, rows: Vec<CanonicalArticle>) -> news_store::Result<(usize, usize)> {
      let n = rows.len();
      self.articles.lock().unwrap().extend(rows);
      Ok((n, 0))
    }
    async fn update(&self, id: String, fields: ArticleUpdate) -> news_store::Result<()> {
      let mut articles = self.articles.lock().unwrap();
      let article = articles.iter_mut().find(|a| a.id == id).expect("article exists");
      *article = apply_update(article, &fields);
      Ok(())
    }
    async fn get_by_id(&self, id: String) -> news_store::Result<Option<CanonicalArticle>> {
      Ok(self.articles.lock().unwrap().iter().find(|a| a.id == id).cloned())
    }
    async fn get_pending(&self, limit: i64) -> news_store::Result<Vec<CanonicalArticle>> {
      Ok(
        self
          .articles
          .lock()
          .unwrap()
          .iter()
          .filter(|a| a.needs_sentiment || a.needs_summary)
          .take(limit as usize)
          .cloned()
          .collect(),
      )
    }
    async fn get_all_ids(&self, _limit: i64) -> news_store::Result<Vec<String>> {
      Ok(self.articles.lock().unwrap().iter().map(|a| a.id.clone()).collect())
    }
    async fn delete_by_ids(&self, _ids: Vec<String>) -> news_store::Result<usize> {
      Ok(0)
    }
    async fn update_checkpoint(&self, _current_article_id: Option<String>) -> news_store::Result<()> {
      Ok(())
    }
    async fn increment_checkpoint_count(&self) -> news_store::Result<()> {
      Ok(())
    }
  }

  struct StubInference {
    response: Mutex<Vec<news_ai::Result<InferenceResponse>>>,
  }

  #[async_trait]
  impl InferenceClient for StubInference {
    async fn run(&self, _request: InferenceRequest) -> news_ai::Result<InferenceResponse> {
      self.response.lock().unwrap().remove(0)
    }
  }

  fn ok_response(text: &str) -> news_ai::Result<InferenceResponse> {
    Ok(InferenceResponse { response: text.to_string() })
  }

  #[tokio::test]
  async fn test_phase0_sets_sentiment_and_keeps_summary_pending() {
    let store = Arc::new(StubStore::seeded(sample("a1")));
    let cache = Arc::new(InMemoryCache::new());
    let extractor = Arc::new(ContentExtractor::new(1024));
    let inference = Arc::new(StubInference { response: Mutex::new(vec![ok_response("positive")]) });
    let processor = Processor::new(store.clone(), cache.clone(), extractor, inference, cfg());

    let report = processor.run_processor_tick(1000).await.unwrap();
    assert_eq!(report.attempted, 1);
    assert_eq!(report.published, 0);

    let article = store.get_by_id("a1".to_string()).await.unwrap().unwrap();
    assert_eq!(article.sentiment, Some(Sentiment::Positive));
    assert!(!article.needs_sentiment);
    assert!(article.needs_summary);
  }

  #[tokio::test]
  async fn test_phase0_failure_retries_next_tick() {
    let store = Arc::new(StubStore::seeded(sample("a1")));
    let cache = Arc::new(InMemoryCache::new());
    let extractor = Arc::new(ContentExtractor::new(1024));
    let inference =
      Arc::new(StubInference { response: Mutex::new(vec![Err(news_ai::InferenceError::EmptyResponse)]) });
    let processor = Processor::new(store.clone(), cache, extractor, inference, cfg());

    processor.run_processor_tick(1000).await.unwrap();
    let article = store.get_by_id("a1".to_string()).await.unwrap().unwrap();
    assert_eq!(article.sentiment, Some(Sentiment::Neutral));
    assert!(article.needs_sentiment);
  }

  #[tokio::test]
  async fn test_phases_1_and_2_happy_path_publishes_to_kv() {
    let mut article = sample("a1");
    article.needs_sentiment = false;
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200).set_body_string(
        "<html><body><nav>Home</nav><article><p>Bitcoin surged 5% today as institutional demand \
         accelerated buying across every major exchange and desk around the world this week.</p></article></body></html>",
      ))
      .mount(&server)
      .await;
    article.link = Some(server.uri());

    let store = Arc::new(StubStore::seeded(article));
    let cache = Arc::new(InMemoryCache::new());
    let extractor = Arc::new(ContentExtractor::new(1024));
    let inference = Arc::new(StubInference {
      response: Mutex::new(vec![ok_response("SUMMARY: Bitcoin rallied 5% on institutional buying pressure.")]),
    });
    let processor = Processor::new(store.clone(), cache.clone(), extractor, inference, cfg());

    processor.run_processor_tick(1000).await.unwrap();
    let after_scrape = store.get_by_id("a1".to_string()).await.unwrap().unwrap();
    assert!(after_scrape.extracted_content.as_deref().unwrap().contains("Bitcoin surged"));
    assert!(!after_scrape.extracted_content.as_deref().unwrap().contains("Home"));

    let report = processor.run_processor_tick(1001).await.unwrap();
    assert_eq!(report.published, 1);
    let done = store.get_by_id("a1".to_string()).await.unwrap().unwrap();
    assert!(!done.needs_summary);
    assert!(done.extracted_content.is_none());
    assert!(done.ai_summary.unwrap().contains("rallied"));
    assert!(cache.get_article("a1").await.unwrap().is_some());
  }

  #[tokio::test]
  async fn test_content_mismatch_is_terminal() {
    let mut article = sample("a1");
    article.needs_sentiment = false;
    article.extracted_content = Some("x".repeat(200));
    let store = Arc::new(StubStore::seeded(article));
    let cache = Arc::new(InMemoryCache::new());
    let extractor = Arc::new(ContentExtractor::new(1024));
    let inference = Arc::new(StubInference { response: Mutex::new(vec![ok_response("ERROR: CONTENT_MISMATCH")]) });
    let processor = Processor::new(store.clone(), cache.clone(), extractor, inference, cfg());

    let report = processor.run_processor_tick(1000).await.unwrap();
    assert_eq!(report.published, 0);
    let article = store.get_by_id("a1".to_string()).await.unwrap().unwrap();
    assert!(!article.needs_summary);
    assert_eq!(article.summary_error.as_deref(), Some("content_mismatch"));
    assert!(article.extracted_content.is_none());
    assert!(article.ai_summary.is_none());
  }

  #[tokio::test]
  async fn test_short_extracted_content_short_circuits_to_mismatch() {
    let mut article = sample("a1");
    article.needs_sentiment = false;
    article.extracted_content = Some("too short".to_string());
    let store = Arc::new(StubStore::seeded(article));
    let cache = Arc::new(InMemoryCache::new());
    let extractor = Arc::new(ContentExtractor::new(1024));
    let inference = Arc::new(StubInference { response: Mutex::new(vec![]) });
    let processor = Processor::new(store.clone(), cache, extractor, inference, cfg());

    processor.run_processor_tick(1000).await.unwrap();
    let article = store.get_by_id("a1".to_string()).await.unwrap().unwrap();
    assert!(!article.needs_summary);
    assert_eq!(article.summary_error.as_deref(), Some("content_mismatch"));
  }

  #[tokio::test]
  async fn test_no_link_short_circuits_immediately() {
    let mut article = sample("a1");
    article.needs_sentiment = false;
    article.link = None;
    let store = Arc::new(StubStore::seeded(article));
    let cache = Arc::new(InMemoryCache::new());
    let extractor = Arc::new(ContentExtractor::new(1024));
    let inference = Arc::new(StubInference { response: Mutex::new(vec![]) });
    let processor = Processor::new(store.clone(), cache, extractor, inference, cfg());

    processor.run_processor_tick(1000).await.unwrap();
    let article = store.get_by_id("a1".to_string()).await.unwrap().unwrap();
    assert!(!article.needs_summary);
    assert_eq!(article.summary_error.as_deref(), Some("no_link"));
  }

  #[tokio::test]
  async fn test_fetch_retry_exhaustion_gives_up() {
    let mut article = sample("a1");
    article.needs_sentiment = false;
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(503)).mount(&server).await;
    article.link = Some(server.uri());

    let store = Arc::new(StubStore::seeded(article));
    let cache = Arc::new(InMemoryCache::new());
    let extractor = Arc::new(ContentExtractor::new(1024));
    let inference = Arc::new(StubInference { response: Mutex::new(vec![]) });
    let processor = Processor::new(store.clone(), cache, extractor, inference, cfg());

    for _ in 0..3 {
      processor.run_processor_tick(1000).await.unwrap();
    }

    let article = store.get_by_id("a1".to_string()).await.unwrap().unwrap();
    assert!(!article.needs_summary);
    assert_eq!(article.content_timeout, 0);
    assert!(article.summary_error.as_deref().unwrap().starts_with("fetch_failed"));
  }

  #[test]
  fn test_extract_summary_prefers_marker() {
    assert_eq!(extract_summary("preamble SUMMARY: the actual summary text"), "the actual summary text");
  }

  #[test]
  fn test_extract_summary_strips_confirmation_prefix() {
    assert_eq!(extract_summary("Here's a summary: Bitcoin rose today."), "Bitcoin rose today.");
  }
}
