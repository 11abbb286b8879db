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

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use news_models::{CanonicalArticle, Sentiment};

use crate::schema::articles;

/// Maps a [`Sentiment`] to the string stored in the `sentiment` column.
pub fn sentiment_to_str(s: Sentiment) -> &'static str {
  match s {
    Sentiment::Positive => "positive",
    Sentiment::Negative => "negative",
    Sentiment::Neutral => "neutral",
  }
}

/// Parses the `sentiment` column back into a [`Sentiment`]. Unrecognized
/// values fall back to `None` rather than erroring, since the column is
/// free-form text rather than a database enum.
pub fn sentiment_from_str(raw: &str) -> Option<Sentiment> {
  match raw {
    "positive" => Some(Sentiment::Positive),
    "negative" => Some(Sentiment::Negative),
    "neutral" => Some(Sentiment::Neutral),
    _ => None,
  }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = articles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ArticleRow {
  pub id: String,
  pub title: String,
  pub description: Option<String>,
  pub link: Option<String>,
  pub pub_date: DateTime<Utc>,
  pub source: Option<String>,
  pub image_url: Option<String>,
  pub sentiment: Option<String>,
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

impl From<ArticleRow> for CanonicalArticle {
  fn from(row: ArticleRow) -> Self {
    CanonicalArticle {
      id: row.id,
      title: row.title,
      description: row.description,
      link: row.link,
      pub_date: row.pub_date,
      source: row.source,
      image_url: row.image_url,
      sentiment: row.sentiment.as_deref().and_then(sentiment_from_str),
      ai_summary: row.ai_summary,
      needs_sentiment: row.needs_sentiment,
      needs_summary: row.needs_summary,
      content_timeout: row.content_timeout,
      summary_error: row.summary_error,
      extracted_content: row.extracted_content,
      queued_at: row.queued_at,
      processed_at: row.processed_at,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = articles)]
pub struct NewArticleRow {
  pub id: String,
  pub title: String,
  pub description: Option<String>,
  pub link: Option<String>,
  pub pub_date: DateTime<Utc>,
  pub source: Option<String>,
  pub image_url: Option<String>,
  pub sentiment: Option<String>,
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

impl From<&CanonicalArticle> for NewArticleRow {
  fn from(a: &CanonicalArticle) -> Self {
    NewArticleRow {
      id: a.id.clone(),
      title: a.title.clone(),
      description: a.description.clone(),
      link: a.link.clone(),
      pub_date: a.pub_date,
      source: a.source.clone(),
      image_url: a.image_url.clone(),
      sentiment: a.sentiment.map(sentiment_to_str).map(str::to_string),
      ai_summary: a.ai_summary.clone(),
      needs_sentiment: a.needs_sentiment,
      needs_summary: a.needs_summary,
      content_timeout: a.content_timeout,
      summary_error: a.summary_error.clone(),
      extracted_content: a.extracted_content.clone(),
      queued_at: a.queued_at,
      processed_at: a.processed_at,
      created_at: a.created_at,
      updated_at: a.updated_at,
    }
  }
}
