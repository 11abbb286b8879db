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

//! A minimal client for the Anthropic Messages API, exposing the narrow
//! `run(model, messages, max_tokens)` contract the enrichment phases need.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{InferenceError, Result};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
  User,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
  pub role: Role,
  pub content: String,
}

impl ChatMessage {
  pub fn user(content: impl Into<String>) -> Self {
    ChatMessage { role: Role::User, content: content.into() }
  }
}

#[derive(Debug, Serialize)]
struct WireMessage {
  role: &'static str,
  content: String,
}

impl From<&ChatMessage> for WireMessage {
  fn from(m: &ChatMessage) -> Self {
    WireMessage { role: "user", content: m.content.clone() }
  }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
  model: String,
  max_tokens: u32,
  messages: Vec<WireMessage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
  text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
  content: Vec<ContentBlock>,
}

/// An inference call, specifying the model, conversation, and output cap.
pub struct InferenceRequest {
  pub model: String,
  pub messages: Vec<ChatMessage>,
  pub max_tokens: u32,
}

pub struct InferenceResponse {
  pub response: String,
}

#[async_trait]
pub trait InferenceClient: Send + Sync {
  async fn run(&self, request: InferenceRequest) -> Result<InferenceResponse>;
}

pub struct AnthropicClient {
  api_key: String,
  http: reqwest::Client,
  base_url: String,
}

impl AnthropicClient {
  pub fn new(api_key: impl Into<String>) -> Self {
    AnthropicClient { api_key: api_key.into(), http: reqwest::Client::new(), base_url: ANTHROPIC_API_URL.to_string() }
  }

  pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
    AnthropicClient { api_key: api_key.into(), http: reqwest::Client::new(), base_url: base_url.into() }
  }

  fn headers(&self) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);
    headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
  }
}

#[async_trait]
impl InferenceClient for AnthropicClient {
  async fn run(&self, request: InferenceRequest) -> Result<InferenceResponse> {
    let url = format!("{}/messages", self.base_url);
    let wire = ChatRequest {
      model: request.model.clone(),
      max_tokens: request.max_tokens,
      messages: request.messages.iter().map(WireMessage::from).collect(),
    };

    debug!(model = %request.model, max_tokens = request.max_tokens, "inference request");

    let response = self.http.post(&url).headers(self.headers()?).json(&wire).send().await?;
    if !response.status().is_success() {
      let status = response.status().as_u16();
      let body = response.text().await.unwrap_or_default();
      return Err(InferenceError::Api { status, body });
    }

    let parsed: ChatResponse = response.json().await?;
    let text = parsed.content.into_iter().find_map(|b| b.text).ok_or(InferenceError::EmptyResponse)?;
    Ok(InferenceResponse { response: text })
  }
}
