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

use std::sync::Arc;

use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_types::Bool;
use news_models::CanonicalArticle;
use tracing::{info, instrument, warn};

use crate::connection::establish_connection;
use crate::error::{RepositoryError, Result};
use crate::models::article::{sentiment_to_str, ArticleRow, NewArticleRow};
use crate::models::checkpoint::CheckpointRow;
use crate::schema::{articles, processing_checkpoint};

pub type DbPool = Pool<ConnectionManager<PgConnection>>;
pub type DbConnection = diesel::r2d2::PooledConnection<ConnectionManager<PgConnection>>;

const MAX_DELETE_BATCH: usize = 500;

/// Patch describing which columns of an article row to touch. `None` means
/// "leave the column alone"; for nullable columns, `Some(None)` clears it to
/// `NULL` and `Some(Some(v))` sets it, distinguishing "don't touch" from
/// "clear" the way the enrichment phases require.
#[derive(Debug, Clone, Default)]
pub struct ArticleUpdate {
  pub sentiment: Option<Option<news_models::Sentiment>>,
  pub ai_summary: Option<Option<String>>,
  pub needs_sentiment: Option<bool>,
  pub needs_summary: Option<bool>,
  pub content_timeout: Option<i32>,
  pub summary_error: Option<Option<String>>,
  pub extracted_content: Option<Option<String>>,
  pub processed_at: Option<Option<i64>>,
}

/// Owns the connection pool and exposes the fail-fast construction pattern:
/// a single connection is opened and validated before the pool itself is built,
/// so misconfiguration surfaces immediately at startup rather than on first use.
#[derive(Clone)]
pub struct DatabaseContext {
  pool: Arc<DbPool>,
}

impl DatabaseContext {
  pub fn new(database_url: &str) -> Result<Self> {
    establish_connection(database_url)?;
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder().max_size(10).build(manager)?;
    Ok(DatabaseContext { pool: Arc::new(pool) })
  }

  pub fn pool(&self) -> Arc<DbPool> {
    self.pool.clone()
  }

  fn conn(&self) -> Result<DbConnection> {
    Ok(self.pool.get()?)
  }
}

#[async_trait::async_trait]
pub trait ArticleRepository: Send + Sync {
  async fn insert_batch(&self, rows: Vec<CanonicalArticle>) -> Result<(usize, usize)>;
  async fn update(&self, id: String, fields: ArticleUpdate) -> Result<()>;
  async fn get_by_id(&self, id: String) -> Result<Option<CanonicalArticle>>;
  async fn get_pending(&self, limit: i64) -> Result<Vec<CanonicalArticle>>;
  async fn get_all_ids(&self, limit: i64) -> Result<Vec<String>>;
  async fn delete_by_ids(&self, ids: Vec<String>) -> Result<usize>;
  async fn update_checkpoint(&self, current_article_id: Option<String>) -> Result<()>;
  async fn increment_checkpoint_count(&self) -> Result<()>;
}

#[async_trait::async_trait]
impl ArticleRepository for DatabaseContext {
  #[instrument(skip(self, rows))]
  async fn insert_batch(&self, rows: Vec<CanonicalArticle>) -> Result<(usize, usize)> {
    let ctx = self.clone();
    tokio::task::spawn_blocking(move || {
      let mut conn = ctx.conn()?;
      let total = rows.len();
      let new_rows: Vec<NewArticleRow> = rows.iter().map(NewArticleRow::from).collect();
      let inserted = diesel::insert_into(articles::table)
        .values(&new_rows)
        .on_conflict(articles::id)
        .do_nothing()
        .execute(&mut conn)?;
      Ok((inserted, total - inserted))
    })
    .await?
  }

  #[instrument(skip(self, fields))]
  async fn update(&self, id: String, fields: ArticleUpdate) -> Result<()> {
    let ctx = self.clone();
    tokio::task::spawn_blocking(move || {
      let mut conn = ctx.conn()?;
      let now = chrono::Utc::now().timestamp_millis();

      let sentiment_val = fields.sentiment.map(|v| v.map(sentiment_to_str).map(str::to_string));
      let changeset = (
        sentiment_val.map(|v| articles::sentiment.eq(v)),
        fields.ai_summary.map(|v| articles::ai_summary.eq(v)),
        fields.needs_sentiment.map(|v| articles::needs_sentiment.eq(v)),
        fields.needs_summary.map(|v| articles::needs_summary.eq(v)),
        fields.content_timeout.map(|v| articles::content_timeout.eq(v)),
        fields.summary_error.map(|v| articles::summary_error.eq(v)),
        fields.extracted_content.map(|v| articles::extracted_content.eq(v)),
        fields.processed_at.map(|v| articles::processed_at.eq(v)),
        articles::updated_at.eq(now),
      );

      let affected = diesel::update(articles::table.filter(articles::id.eq(&id)))
        .set(changeset)
        .execute(&mut conn)?;
      if affected == 0 {
        return Err(RepositoryError::NotFound(id));
      }
      Ok(())
    })
    .await?
  }

  #[instrument(skip(self))]
  async fn get_by_id(&self, id: String) -> Result<Option<CanonicalArticle>> {
    let ctx = self.clone();
    tokio::task::spawn_blocking(move || {
      let mut conn = ctx.conn()?;
      let row = articles::table
        .filter(articles::id.eq(&id))
        .select(ArticleRow::as_select())
        .first::<ArticleRow>(&mut conn)
        .optional()?;
      Ok(row.map(CanonicalArticle::from))
    })
    .await?
  }

  #[instrument(skip(self))]
  async fn get_pending(&self, limit: i64) -> Result<Vec<CanonicalArticle>> {
    let ctx = self.clone();
    tokio::task::spawn_blocking(move || {
      let mut conn = ctx.conn()?;
      let fresh_tier = sql::<Bool>("content_timeout = 0");
      let ready_tier = sql::<Bool>("content_timeout != 0 AND extracted_content IS NOT NULL");
      let rows = articles::table
        .filter(articles::needs_sentiment.eq(true).or(articles::needs_summary.eq(true)))
        .order((fresh_tier.desc(), ready_tier.desc(), articles::pub_date.desc()))
        .limit(limit)
        .select(ArticleRow::as_select())
        .load::<ArticleRow>(&mut conn)?;
      Ok(rows.into_iter().map(CanonicalArticle::from).collect())
    })
    .await?
  }

  #[instrument(skip(self))]
  async fn get_all_ids(&self, limit: i64) -> Result<Vec<String>> {
    let ctx = self.clone();
    tokio::task::spawn_blocking(move || {
      let mut conn = ctx.conn()?;
      let ids = articles::table
        .order(articles::pub_date.desc())
        .limit(limit)
        .select(articles::id)
        .load::<String>(&mut conn)?;
      Ok(ids)
    })
    .await?
  }

  #[instrument(skip(self, ids))]
  async fn delete_by_ids(&self, ids: Vec<String>) -> Result<usize> {
    let ctx = self.clone();
    tokio::task::spawn_blocking(move || {
      let mut conn = ctx.conn()?;
      let mut total = 0usize;
      for chunk in ids.chunks(MAX_DELETE_BATCH) {
        total += diesel::delete(articles::table.filter(articles::id.eq_any(chunk))).execute(&mut conn)?;
      }
      if total > 0 {
        info!(deleted = total, "trimmed stale articles");
      }
      Ok(total)
    })
    .await?
  }

  #[instrument(skip(self))]
  async fn update_checkpoint(&self, current_article_id: Option<String>) -> Result<()> {
    let ctx = self.clone();
    tokio::task::spawn_blocking(move || {
      let mut conn = ctx.conn()?;
      diesel::update(processing_checkpoint::table.filter(processing_checkpoint::id.eq(1)))
        .set(processing_checkpoint::current_article_id.eq(current_article_id))
        .execute(&mut conn)?;
      Ok(())
    })
    .await?
  }

  #[instrument(skip(self))]
  async fn increment_checkpoint_count(&self) -> Result<()> {
    let ctx = self.clone();
    tokio::task::spawn_blocking(move || {
      let mut conn = ctx.conn()?;
      diesel::update(processing_checkpoint::table.filter(processing_checkpoint::id.eq(1)))
        .set(
          processing_checkpoint::articles_processed_count
            .eq(processing_checkpoint::articles_processed_count + 1),
        )
        .execute(&mut conn)?;
      Ok(())
    })
    .await?
  }
}

impl DatabaseContext {
  /// Reads the singleton checkpoint row, for crash-observability reporting.
  pub fn read_checkpoint(&self) -> Result<CheckpointRow> {
    let mut conn = self.conn()?;
    let row = processing_checkpoint::table
      .filter(processing_checkpoint::id.eq(1))
      .select(CheckpointRow::as_select())
      .first::<CheckpointRow>(&mut conn);
    match row {
      Ok(r) => Ok(r),
      Err(diesel::result::Error::NotFound) => {
        warn!("processing_checkpoint row missing, returning default");
        Ok(CheckpointRow::default())
      }
      Err(e) => Err(e.into()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_article_update_default_touches_nothing() {
    let u = ArticleUpdate::default();
    assert!(u.sentiment.is_none());
    assert!(u.needs_summary.is_none());
  }

  #[test]
  fn test_article_update_can_express_explicit_clear() {
    let u = ArticleUpdate { extracted_content: Some(None), ..Default::default() };
    assert_eq!(u.extracted_content, Some(None));
  }

  #[test]
  fn test_article_update_can_express_set() {
    let u = ArticleUpdate { extracted_content: Some(Some("text".to_string())), ..Default::default() };
    assert_eq!(u.extracted_content, Some(Some("text".to_string())));
  }
}
