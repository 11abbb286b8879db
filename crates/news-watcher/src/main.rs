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

//! Boots the two periodic ticks and the on-demand HTTP endpoint, then runs them
//! concurrently until the process receives a shutdown signal.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use diesel_migrations::MigrationHarness;
use news_ai::AnthropicClient;
use news_cache::{ArticleCache, RedisCache};
use news_core::Config;
use news_engine::{Processor, Producer};
use news_extract::ContentExtractor;
use news_server::AppState;
use news_store::{ArticleRepository, DatabaseContext};
use tracing::{error, info};

/// Producer runs at a coarse cadence; exact schedule is deployment
/// configuration, out of scope here, so these are fixed.
const INGESTION_TICK: Duration = Duration::from_secs(60 * 60);
const PROCESSOR_TICK: Duration = Duration::from_secs(5 * 60);

#[tokio::main]
async fn main() -> Result<()> {
  dotenvy::dotenv().ok();
  tracing_subscriber::fmt().with_env_filter("info").init();

  let config = Config::from_env().context("loading configuration")?;
  info!(provider = ?config.provider, "starting news-watcher");

  run_migrations(&config.database_url).context("running database migrations")?;

  let provider = news_providers::build_provider(&config).context("building news provider")?;
  let store: Arc<dyn ArticleRepository> =
    Arc::new(DatabaseContext::new(&config.database_url).context("connecting to database")?);
  let cache: Arc<dyn ArticleCache> =
    Arc::new(RedisCache::new(&config.redis_url).await.context("connecting to redis")?);
  let extractor = Arc::new(ContentExtractor::new(config.max_content_chars));
  let inference = Arc::new(AnthropicClient::new(config.anthropic_api_key.clone()));

  let producer = Producer::new(provider, store.clone(), cache.clone(), config.clone());
  let processor =
    Arc::new(Processor::new(store.clone(), cache.clone(), extractor.clone(), inference, config.clone()));

  let ingestion_handle = tokio::spawn(run_ingestion_loop(producer));
  let processing_handle = tokio::spawn(run_processing_loop(processor.clone()));

  let state = AppState { store, extractor, processor };
  let addr = format!("{}:{}", config.server_host, config.server_port);
  let listener = tokio::net::TcpListener::bind(&addr).await.context("binding HTTP listener")?;
  info!(%addr, "on-demand endpoint listening");
  let app = news_server::build_router(state);

  tokio::select! {
    result = axum::serve(listener, app) => {
      result.context("HTTP server exited")?;
    }
    _ = tokio::signal::ctrl_c() => {
      info!("received shutdown signal");
    }
  }

  ingestion_handle.abort();
  processing_handle.abort();
  Ok(())
}

fn run_migrations(database_url: &str) -> Result<()> {
  let mut conn = news_store::connection::establish_connection(database_url)?;
  conn
    .run_pending_migrations(news_store::MIGRATIONS)
    .map_err(|e| anyhow::anyhow!("failed to run pending migrations: {e}"))?;
  Ok(())
}

async fn run_ingestion_loop(producer: Producer) {
  let mut timer = tokio::time::interval(INGESTION_TICK);
  timer.tick().await;
  loop {
    timer.tick().await;
    let now_ms = chrono::Utc::now().timestamp_millis();
    match producer.run_ingestion_tick(now_ms).await {
      Ok(report) => info!(?report, "ingestion tick complete"),
      Err(err) => error!(error = %err, "ingestion tick failed"),
    }
  }
}

async fn run_processing_loop(processor: Arc<Processor>) {
  let mut timer = tokio::time::interval(PROCESSOR_TICK);
  timer.tick().await;
  loop {
    timer.tick().await;
    let now_ms = chrono::Utc::now().timestamp_millis();
    match processor.run_processor_tick(now_ms).await {
      Ok(report) => info!(?report, "processor tick complete"),
      Err(err) => error!(error = %err, "processor tick failed"),
    }
  }
}
