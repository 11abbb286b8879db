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

use crate::Error;
use std::env;

/// Which upstream news provider the ingestion pipeline is wired against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsProvider {
  NewsData,
  ApiTube,
}

impl NewsProvider {
  fn parse(raw: &str) -> Result<Self, Error> {
    match raw.to_ascii_lowercase().as_str() {
      "newsdata" => Ok(Self::NewsData),
      "apitube" => Ok(Self::ApiTube),
      other => Err(Error::InvalidValue { key: "NEWS_PROVIDER".to_string(), value: other.to_string() }),
    }
  }
}

/// Process-wide configuration, loaded once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
  pub provider: NewsProvider,
  pub newsdata_api_key: Option<String>,
  pub apitube_api_key: Option<String>,

  pub database_url: String,
  pub redis_url: String,

  pub max_stored_articles: usize,
  pub max_pages: usize,
  pub id_index_ttl_secs: u64,

  pub max_articles_per_run: usize,
  pub max_content_chars: usize,
  pub max_content_fetch_attempts: u32,
  pub delete_old_articles: bool,

  /// Threshold applied to APITube's numeric `overall.score` when no textual
  /// polarity is present. Treated as configuration per the spec's open question.
  pub apitube_sentiment_threshold: f64,

  pub anthropic_api_key: String,
  pub ai_model: String,
  pub server_host: String,
  pub server_port: u16,
}

impl Config {
  /// Load configuration from the environment, reading a `.env` file first if present.
  pub fn from_env() -> Result<Self, Error> {
    dotenvy::dotenv().ok();

    let provider = NewsProvider::parse(
      &env::var("NEWS_PROVIDER").unwrap_or_else(|_| "newsdata".to_string()),
    )?;
    let newsdata_api_key = env::var("NEWSDATA_API_KEY").ok();
    let apitube_api_key = env::var("APITUBE_API_KEY").ok();

    match provider {
      NewsProvider::NewsData if newsdata_api_key.is_none() => {
        return Err(Error::ApiKey("newsdata".to_string()));
      }
      NewsProvider::ApiTube if apitube_api_key.is_none() => {
        return Err(Error::ApiKey("apitube".to_string()));
      }
      _ => {}
    }

    let database_url = env::var("DATABASE_URL")
      .map_err(|_| Error::MissingField("DATABASE_URL".to_string()))?;
    let redis_url = env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let anthropic_api_key = env::var("ANTHROPIC_API_KEY")
      .map_err(|_| Error::MissingField("ANTHROPIC_API_KEY".to_string()))?;

    Ok(Self {
      provider,
      newsdata_api_key,
      apitube_api_key,
      database_url,
      redis_url,
      max_stored_articles: parse_env("MAX_STORED_ARTICLES", 100)?,
      max_pages: parse_env("MAX_PAGES", 10)?,
      id_index_ttl_secs: parse_env("ID_INDEX_TTL", 2_592_000)?,
      max_articles_per_run: parse_env("MAX_ARTICLES_PER_RUN", 5)?,
      max_content_chars: parse_env("MAX_CONTENT_CHARS", 10_240)?,
      max_content_fetch_attempts: parse_env("MAX_CONTENT_FETCH_ATTEMPTS", 3)?,
      delete_old_articles: parse_env("DELETE_OLD_ARTICLES", false)?,
      apitube_sentiment_threshold: parse_env("APITUBE_SENTIMENT_THRESHOLD", 0.1)?,
      anthropic_api_key,
      ai_model: env::var("AI_MODEL").unwrap_or_else(|_| "claude-3-haiku-20240307".to_string()),
      server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
      server_port: parse_env("SERVER_PORT", 8787)?,
    })
  }

  /// Build a config with sane defaults for tests, without touching the environment.
  #[cfg(any(test, feature = "test-utils"))]
  pub fn default_with_key(provider: NewsProvider, key: &str) -> Self {
    Self {
      provider,
      newsdata_api_key: matches!(provider, NewsProvider::NewsData).then(|| key.to_string()),
      apitube_api_key: matches!(provider, NewsProvider::ApiTube).then(|| key.to_string()),
      database_url: "postgres://localhost/news_test".to_string(),
      redis_url: "redis://127.0.0.1:6379".to_string(),
      max_stored_articles: 100,
      max_pages: 10,
      id_index_ttl_secs: 2_592_000,
      max_articles_per_run: 5,
      max_content_chars: 10_240,
      max_content_fetch_attempts: 3,
      delete_old_articles: false,
      apitube_sentiment_threshold: 0.1,
      anthropic_api_key: "test-key".to_string(),
      ai_model: "claude-3-haiku-20240307".to_string(),
      server_host: "127.0.0.1".to_string(),
      server_port: 8787,
    }
  }
}

fn parse_env<T>(key: &str, default: T) -> Result<T, Error>
where
  T: std::str::FromStr,
{
  match env::var(key) {
    Ok(raw) => raw
      .parse()
      .map_err(|_| Error::InvalidValue { key: key.to_string(), value: raw }),
    Err(_) => Ok(default),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::env;
  use std::sync::Mutex;

  static ENV_LOCK: Mutex<()> = Mutex::new(());

  fn clear_env() {
    for key in [
      "NEWS_PROVIDER",
      "NEWSDATA_API_KEY",
      "APITUBE_API_KEY",
      "DATABASE_URL",
      "REDIS_URL",
      "MAX_STORED_ARTICLES",
      "MAX_PAGES",
      "ID_INDEX_TTL",
      "MAX_ARTICLES_PER_RUN",
      "MAX_CONTENT_CHARS",
      "MAX_CONTENT_FETCH_ATTEMPTS",
      "DELETE_OLD_ARTICLES",
      "APITUBE_SENTIMENT_THRESHOLD",
      "ANTHROPIC_API_KEY",
      "AI_MODEL",
      "SERVER_HOST",
      "SERVER_PORT",
    ] {
      env::remove_var(key);
    }
  }

  #[test]
  fn test_provider_parse() {
    assert_eq!(NewsProvider::parse("newsdata").unwrap(), NewsProvider::NewsData);
    assert_eq!(NewsProvider::parse("APITUBE").unwrap(), NewsProvider::ApiTube);
    assert!(NewsProvider::parse("bogus").is_err());
  }

  #[test]
  fn test_from_env_defaults_to_newsdata() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();
    env::set_var("NEWSDATA_API_KEY", "abc123");
    env::set_var("DATABASE_URL", "postgres://localhost/news");
    env::set_var("ANTHROPIC_API_KEY", "sk-ant-abc");
    let cfg = Config::from_env().unwrap();
    assert_eq!(cfg.provider, NewsProvider::NewsData);
    assert_eq!(cfg.max_stored_articles, 100);
    assert_eq!(cfg.max_pages, 10);
    clear_env();
  }

  #[test]
  fn test_from_env_missing_provider_key_errors() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();
    env::set_var("NEWS_PROVIDER", "apitube");
    env::set_var("DATABASE_URL", "postgres://localhost/news");
    let result = Config::from_env();
    assert!(matches!(result, Err(Error::ApiKey(_))));
    clear_env();
  }

  #[test]
  fn test_from_env_missing_database_url_errors() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();
    env::set_var("NEWSDATA_API_KEY", "abc123");
    let result = Config::from_env();
    assert!(matches!(result, Err(Error::MissingField(_))));
    clear_env();
  }

  #[test]
  fn test_from_env_missing_anthropic_key_errors() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();
    env::set_var("NEWSDATA_API_KEY", "abc123");
    env::set_var("DATABASE_URL", "postgres://localhost/news");
    let result = Config::from_env();
    assert!(matches!(result, Err(Error::MissingField(_))));
    clear_env();
  }

  #[test]
  fn test_from_env_invalid_numeric_override() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();
    env::set_var("NEWSDATA_API_KEY", "abc123");
    env::set_var("DATABASE_URL", "postgres://localhost/news");
    env::set_var("ANTHROPIC_API_KEY", "sk-ant-abc");
    env::set_var("MAX_PAGES", "not-a-number");
    let result = Config::from_env();
    assert!(matches!(result, Err(Error::InvalidValue { .. })));
    clear_env();
  }

  #[test]
  fn test_default_with_key() {
    let cfg = Config::default_with_key(NewsProvider::ApiTube, "key");
    assert_eq!(cfg.apitube_api_key.as_deref(), Some("key"));
    assert!(cfg.newsdata_api_key.is_none());
  }
}
