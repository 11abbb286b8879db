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

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use news_engine::Processor;
use news_extract::ContentExtractor;
use news_store::ArticleRepository;
use serde::Deserialize;
use tracing::instrument;

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn ArticleRepository>,
  pub extractor: Arc<ContentExtractor>,
  pub processor: Arc<Processor>,
}

#[derive(Debug, Deserialize)]
pub struct ProcessQuery {
  #[serde(rename = "articleId")]
  pub article_id: Option<String>,
  pub force: Option<String>,
  pub text: Option<String>,
}

/// `GET /process?articleId=<id>[&force][&text[=debug]]`, the on-demand
/// single-article endpoint. Exactly one processor phase runs per call unless
/// `text` is present, in which case this only inspects the extractor's output.
#[instrument(skip(state))]
pub async fn process(State(state): State<AppState>, Query(query): Query<ProcessQuery>) -> impl IntoResponse {
  handle(state, query).await.into_response()
}

/// Fallback for any non-`GET` method on `/process`, so a 405 is still the
/// standard `{success:false,error:...}` JSON shape rather than axum's default
/// empty body.
pub async fn process_method_not_allowed() -> impl IntoResponse {
  ApiError::method_not_allowed().into_response()
}

async fn handle(state: AppState, query: ProcessQuery) -> Result<Json<serde_json::Value>, ApiError> {
  let Some(article_id) = query.article_id.filter(|s| !s.is_empty()) else {
    return Err(ApiError::missing_article_id());
  };

  if let Some(text_mode) = &query.text {
    let article = state
      .store
      .get_by_id(article_id.clone())
      .await?
      .ok_or_else(|| ApiError::NotFound(format!("Article not found: {article_id}")))?;
    let debug = text_mode.eq_ignore_ascii_case("debug");
    let content = match &article.link {
      Some(link) => state.extractor.fetch(link, debug).await?,
      None => None,
    };
    return Ok(Json(serde_json::json!({
      "success": true,
      "link": article.link,
      "content": content,
    })));
  }

  let article = state
    .store
    .get_by_id(article_id.clone())
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("Article not found: {article_id}")))?;

  if query.force.is_none() && article.is_fully_processed() {
    return Ok(Json(serde_json::json!({
      "success": true,
      "message": "Article already processed",
      "article": article,
    })));
  }

  let now_ms = chrono::Utc::now().timestamp_millis();
  let updated = state
    .processor
    .run_single(&article_id, now_ms)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("Article not found: {article_id}")))?;

  Ok(Json(serde_json::json!({ "success": true, "article": updated })))
}
