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

//! The id-before-normalize contract that lets the producer early-exit cheaply.

use chrono::{DateTime, Utc};
use news_models::article::{CanonicalArticle, Sentiment};
use news_models::raw::{ApiTubeRawArticle, ApiTubeSentimentValue, NewsDataRawArticle};

/// A not-yet-normalized article from either upstream, tagged by origin.
#[derive(Debug, Clone)]
pub enum RawArticle {
  NewsData(NewsDataRawArticle),
  ApiTube(ApiTubeRawArticle),
}

fn id_from_parts(article_id: Option<&str>, numeric_id: Option<&serde_json::Value>, link: Option<&str>) -> Option<String> {
  if let Some(a) = article_id {
    if !a.is_empty() {
      return Some(a.to_string());
    }
  }
  if let Some(n) = numeric_id {
    match n {
      serde_json::Value::Number(num) => return Some(num.to_string()),
      serde_json::Value::String(s) if !s.is_empty() => return Some(s.clone()),
      _ => {}
    }
  }
  link.filter(|l| !l.is_empty()).map(|l| l.to_string())
}

impl RawArticle {
  /// `id(raw)`: first present of `article_id`, numeric `id` stringified, then `link`.
  pub fn id(&self) -> Option<String> {
    match self {
      RawArticle::NewsData(a) => {
        id_from_parts(a.article_id.as_deref(), a.id.as_ref(), a.link.as_deref())
      }
      RawArticle::ApiTube(a) => id_from_parts(None, a.id.as_ref(), a.href.as_deref()),
    }
  }

  /// `normalize(raw) -> CanonicalArticle`, applying provider-specific field mapping.
  pub fn normalize(&self, sentiment_threshold: f64, now_ms: i64) -> Option<CanonicalArticle> {
    let id = self.id()?;
    match self {
      RawArticle::NewsData(a) => {
        let title = a.title.clone().filter(|t| !t.is_empty())?;
        let pub_date = a
          .pub_date
          .as_deref()
          .and_then(parse_newsdata_date)
          .unwrap_or_else(Utc::now);
        Some(CanonicalArticle {
          id,
          title,
          description: a.description.clone(),
          link: a.link.clone(),
          pub_date,
          source: a.source_id.clone(),
          image_url: a.image_url.clone(),
          sentiment: None,
          ai_summary: None,
          needs_sentiment: true,
          needs_summary: true,
          content_timeout: 0,
          summary_error: None,
          extracted_content: None,
          queued_at: now_ms,
          processed_at: None,
          created_at: now_ms,
          updated_at: now_ms,
        })
      }
      RawArticle::ApiTube(a) => {
        let title = a.title.clone().filter(|t| !t.is_empty())?;
        let pub_date = a
          .published_at
          .as_deref()
          .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
          .map(|dt| dt.with_timezone(&Utc))
          .unwrap_or_else(Utc::now);
        let source = a.source.as_ref().and_then(|s| s.uri.clone());
        let sentiment = a
          .sentiment
          .as_ref()
          .and_then(|s| s.overall.as_ref())
          .map(|overall| apitube_sentiment_to_label(overall, sentiment_threshold));
        Some(CanonicalArticle {
          id,
          title,
          description: a.description.clone(),
          link: a.href.clone(),
          pub_date,
          source,
          image_url: a.image.clone(),
          sentiment,
          ai_summary: None,
          needs_sentiment: false,
          needs_summary: true,
          content_timeout: 0,
          summary_error: None,
          extracted_content: None,
          queued_at: now_ms,
          processed_at: None,
          created_at: now_ms,
          updated_at: now_ms,
        })
      }
    }
  }
}

fn apitube_sentiment_to_label(value: &ApiTubeSentimentValue, threshold: f64) -> Sentiment {
  match value {
    ApiTubeSentimentValue::Polarity { polarity } => Sentiment::from_model_output(polarity),
    ApiTubeSentimentValue::Score { score } => Sentiment::from_score(*score, threshold),
    ApiTubeSentimentValue::Raw(raw) => raw
      .parse::<f64>()
      .map(|score| Sentiment::from_score(score, threshold))
      .unwrap_or_else(|_| Sentiment::from_model_output(raw)),
  }
}

fn parse_newsdata_date(raw: &str) -> Option<DateTime<Utc>> {
  chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
    .map(|naive| naive.and_utc())
    .ok()
    .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.with_timezone(&Utc)))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn newsdata(article_id: Option<&str>, id: Option<serde_json::Value>, link: Option<&str>) -> RawArticle {
    RawArticle::NewsData(NewsDataRawArticle {
      article_id: article_id.map(|s| s.to_string()),
      id,
      title: Some("Bitcoin rallies".to_string()),
      description: Some("desc".to_string()),
      link: link.map(|s| s.to_string()),
      pub_date: Some("2024-01-01 12:00:00".to_string()),
      source_id: Some("example".to_string()),
      image_url: None,
    })
  }

  #[test]
  fn test_id_prefers_article_id() {
    let raw = newsdata(Some("art-1"), Some(serde_json::json!(99)), Some("https://x"));
    assert_eq!(raw.id(), Some("art-1".to_string()));
  }

  #[test]
  fn test_id_falls_back_to_numeric_id() {
    let raw = newsdata(None, Some(serde_json::json!(42)), Some("https://x"));
    assert_eq!(raw.id(), Some("42".to_string()));
  }

  #[test]
  fn test_id_falls_back_to_link() {
    let raw = newsdata(None, None, Some("https://x"));
    assert_eq!(raw.id(), Some("https://x".to_string()));
  }

  #[test]
  fn test_id_none_when_nothing_present() {
    let raw = newsdata(None, None, None);
    assert_eq!(raw.id(), None);
  }

  #[test]
  fn test_normalize_newsdata_sets_both_flags() {
    let raw = newsdata(Some("art-1"), None, Some("https://x"));
    let article = raw.normalize(0.1, 1000).unwrap();
    assert!(article.needs_sentiment);
    assert!(article.needs_summary);
    assert!(article.sentiment.is_none());
  }

  #[test]
  fn test_normalize_newsdata_rejects_empty_title() {
    let mut raw = newsdata(Some("art-1"), None, Some("https://x"));
    if let RawArticle::NewsData(ref mut a) = raw {
      a.title = Some(String::new());
    }
    assert!(raw.normalize(0.1, 1000).is_none());
  }

  fn apitube(id: Option<serde_json::Value>, href: Option<&str>, sentiment: Option<ApiTubeSentimentValue>) -> RawArticle {
    use news_models::raw::{ApiTubeOverallSentiment, ApiTubeRawArticle};
    RawArticle::ApiTube(ApiTubeRawArticle {
      id,
      title: Some("Bitcoin drops".to_string()),
      description: Some("desc".to_string()),
      href: href.map(|s| s.to_string()),
      published_at: Some("2024-01-01T00:00:00Z".to_string()),
      source: None,
      categories: None,
      image: None,
      sentiment: sentiment.map(|overall| ApiTubeOverallSentiment { overall: Some(overall) }),
    })
  }

  #[test]
  fn test_normalize_apitube_sets_needs_sentiment_false() {
    let raw = apitube(Some(serde_json::json!(7)), Some("https://y"), Some(ApiTubeSentimentValue::Polarity { polarity: "negative".to_string() }));
    let article = raw.normalize(0.1, 1000).unwrap();
    assert!(!article.needs_sentiment);
    assert!(article.needs_summary);
    assert_eq!(article.sentiment, Some(Sentiment::Negative));
  }

  #[test]
  fn test_normalize_apitube_score_threshold() {
    let raw = apitube(Some(serde_json::json!(7)), Some("https://y"), Some(ApiTubeSentimentValue::Score { score: 0.05 }));
    let article = raw.normalize(0.1, 1000).unwrap();
    assert_eq!(article.sentiment, Some(Sentiment::Neutral));
  }

  #[test]
  fn test_round_trip_id_stable() {
    let raw = apitube(Some(serde_json::json!(7)), Some("https://y"), None);
    let id_before = raw.id().unwrap();
    let normalized = raw.normalize(0.1, 1000).unwrap();
    assert_eq!(id_before, normalized.id);
  }
}
