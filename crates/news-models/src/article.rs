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

//! The canonical article record shared by every component downstream of a provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Three-way sentiment label, either supplied by a provider or derived in Phase 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
  Positive,
  Negative,
  Neutral,
}

impl std::fmt::Display for Sentiment {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let s = match self {
      Sentiment::Positive => "positive",
      Sentiment::Negative => "negative",
      Sentiment::Neutral => "neutral",
    };
    write!(f, "{s}")
  }
}

impl Sentiment {
  /// Maps free-form model output to a label by substring match, defaulting to neutral.
  pub fn from_model_output(raw: &str) -> Self {
    let lower = raw.to_ascii_lowercase();
    if lower.contains("positive") {
      Sentiment::Positive
    } else if lower.contains("negative") {
      Sentiment::Negative
    } else {
      Sentiment::Neutral
    }
  }

  /// Maps a numeric polarity score to a label using a configurable threshold.
  pub fn from_score(score: f64, threshold: f64) -> Self {
    if score > threshold {
      Sentiment::Positive
    } else if score < -threshold {
      Sentiment::Negative
    } else {
      Sentiment::Neutral
    }
  }
}

/// The authoritative per-article record stored in ARTICLE_DB and, once fully
/// processed, published to ARTICLE_KV under `article:<id>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalArticle {
  pub id: String,
  pub title: String,
  pub description: Option<String>,
  pub link: Option<String>,
  pub pub_date: DateTime<Utc>,
  pub source: Option<String>,
  pub image_url: Option<String>,
  pub sentiment: Option<Sentiment>,
  pub ai_summary: Option<String>,
  pub needs_sentiment: bool,
  pub needs_summary: bool,
  pub content_timeout: i32,
  pub summary_error: Option<String>,
  pub extracted_content: Option<String>,
  pub queued_at: i64,
  pub processed_at: Option<i64>,
  pub created_at: i64,
  pub updated_at: i64,
}

impl CanonicalArticle {
  /// An article is fully processed once both enrichment flags are cleared.
  pub fn is_fully_processed(&self) -> bool {
    !self.needs_sentiment && !self.needs_summary
  }

  /// Whether Phase 1 (content scrape) should run next.
  pub fn ready_for_content_scrape(&self, max_attempts: u32) -> bool {
    self.needs_summary
      && self.extracted_content.is_none()
      && self.link.is_some()
      && (self.content_timeout as u32) < max_attempts
  }

  /// Whether Phase 2 (summarize) should run next.
  pub fn ready_for_summarize(&self) -> bool {
    self.needs_summary && self.extracted_content.is_some()
  }

  /// Whether the no-link short-circuit applies.
  pub fn missing_link(&self) -> bool {
    self.needs_summary && self.extracted_content.is_none() && self.link.is_none()
  }
}
