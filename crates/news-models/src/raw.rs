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

//! Raw wire shapes returned by the upstream providers, before normalization.

use serde::Deserialize;

/// A single article as returned by the NewsData.io `/news` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsDataRawArticle {
  pub article_id: Option<String>,
  pub id: Option<serde_json::Value>,
  pub title: Option<String>,
  pub description: Option<String>,
  pub link: Option<String>,
  pub pub_date: Option<String>,
  pub source_id: Option<String>,
  pub image_url: Option<String>,
}

/// One page of the NewsData.io `/news` response.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsDataPage {
  pub results: Vec<NewsDataRawArticle>,
  #[serde(rename = "nextPage")]
  pub next_page: Option<String>,
  #[serde(rename = "totalResults")]
  pub total_results: Option<i64>,
}

/// APITube's sentiment envelope, which may arrive as a textual polarity, a
/// numeric score, or (rarely) a raw string the upstream forgot to type.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiTubeSentimentValue {
  Polarity { polarity: String },
  Score { score: f64 },
  Raw(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiTubeOverallSentiment {
  pub overall: Option<ApiTubeSentimentValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiTubeSource {
  pub uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiTubeCategory {
  pub name: Option<String>,
}

/// A single article as returned by the APITube `/news/everything` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiTubeRawArticle {
  pub id: Option<serde_json::Value>,
  pub title: Option<String>,
  pub description: Option<String>,
  pub href: Option<String>,
  pub published_at: Option<String>,
  pub source: Option<ApiTubeSource>,
  pub categories: Option<Vec<ApiTubeCategory>>,
  pub image: Option<String>,
  pub sentiment: Option<ApiTubeOverallSentiment>,
}

/// One page of the APITube response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiTubePage {
  pub results: Vec<ApiTubeRawArticle>,
  pub next_page: Option<String>,
  pub total: Option<i64>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_deserialize_newsdata_page() {
    let json = r#"{
      "results": [{"article_id":"x1","title":"t","description":null,"link":"https://a","pub_date":"2024-01-01 00:00:00","source_id":"src","image_url":null}],
      "nextPage": "tok2",
      "totalResults": 1
    }"#;
    let page: NewsDataPage = serde_json::from_str(json).unwrap();
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.next_page.as_deref(), Some("tok2"));
  }

  #[test]
  fn test_deserialize_apitube_sentiment_polarity() {
    let json = r#"{"overall": {"polarity": "positive"}}"#;
    let s: ApiTubeOverallSentiment = serde_json::from_str(json).unwrap();
    assert!(matches!(s.overall, Some(ApiTubeSentimentValue::Polarity { .. })));
  }

  #[test]
  fn test_deserialize_apitube_sentiment_score() {
    let json = r#"{"overall": {"score": 0.42}}"#;
    let s: ApiTubeOverallSentiment = serde_json::from_str(json).unwrap();
    match s.overall {
      Some(ApiTubeSentimentValue::Score { score }) => assert!((score - 0.42).abs() < f64::EPSILON),
      other => panic!("unexpected: {other:?}"),
    }
  }

  #[test]
  fn test_deserialize_apitube_page() {
    let json = r#"{
      "results": [{"id":123,"title":"t","description":"d","href":"https://a","published_at":"2024-01-01T00:00:00Z","source":{"uri":"https://src"},"categories":[{"name":"markets"}],"image":null,"sentiment":{"overall":{"polarity":"negative"}}}],
      "next_page": null,
      "total": 1
    }"#;
    let page: ApiTubePage = serde_json::from_str(json).unwrap();
    assert_eq!(page.results.len(), 1);
    assert!(page.next_page.is_none());
  }
}
