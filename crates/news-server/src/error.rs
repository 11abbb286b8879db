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

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Every on-demand endpoint response is `{success, ...}` JSON; errors carry `error`.
#[derive(Debug)]
pub enum ApiError {
  BadRequest(String),
  NotFound(String),
  MethodNotAllowed(String),
  Internal(String),
}

impl ApiError {
  pub fn missing_article_id() -> Self {
    ApiError::BadRequest("Missing articleId parameter".to_string())
  }

  pub fn method_not_allowed() -> Self {
    ApiError::MethodNotAllowed("Method not allowed".to_string())
  }
}

impl From<news_engine::EngineError> for ApiError {
  fn from(err: news_engine::EngineError) -> Self {
    ApiError::Internal(err.to_string())
  }
}

impl From<news_store::RepositoryError> for ApiError {
  fn from(err: news_store::RepositoryError) -> Self {
    ApiError::Internal(err.to_string())
  }
}

impl From<news_extract::ExtractError> for ApiError {
  fn from(err: news_extract::ExtractError) -> Self {
    ApiError::Internal(err.to_string())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
      ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
      ApiError::MethodNotAllowed(message) => (StatusCode::METHOD_NOT_ALLOWED, message),
      ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
    };
    (status, Json(serde_json::json!({ "success": false, "error": message }))).into_response()
  }
}
