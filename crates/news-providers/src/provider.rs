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

use crate::error::{ProviderError, Result};
use crate::raw_article::RawArticle;
use async_trait::async_trait;
use news_models::raw::{ApiTubePage, NewsDataPage};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// One page of raw articles as returned by an upstream provider.
pub struct FetchedPage {
  pub articles: Vec<RawArticle>,
  pub next_token: Option<String>,
  pub total: i64,
}

/// A polymorphic upstream source of Bitcoin news articles.
#[async_trait]
pub trait Provider: Send + Sync {
  /// Fetches one page of raw, newest-first articles.
  async fn fetch_page(&self, page_token: Option<&str>) -> Result<FetchedPage>;

  /// Short name used in logs and the checkpoint record.
  fn name(&self) -> &'static str;
}

const MAX_RETRIES: u32 = 3;

async fn get_with_retry(client: &Client, url: reqwest::Url) -> Result<String> {
  let mut last_error = None;

  for attempt in 1..=MAX_RETRIES {
    match client.get(url.clone()).send().await {
      Ok(response) => {
        let status = response.status();
        if status.is_success() {
          return Ok(response.text().await?);
        }
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
          warn!(attempt, %status, "provider request failed, will retry");
          last_error = Some(ProviderError::Status { status: status.as_u16(), body });
        } else {
          return Err(ProviderError::Status { status: status.as_u16(), body });
        }
      }
      Err(e) => {
        warn!(attempt, error = %e, "provider transport error, will retry");
        last_error = Some(ProviderError::Request(e));
      }
    }

    if attempt < MAX_RETRIES {
      let delay = Duration::from_millis(500 * 2_u64.pow(attempt - 1));
      tokio::time::sleep(delay).await;
    }
  }

  Err(last_error.unwrap_or(ProviderError::Status { status: 0, body: "max retries exceeded".to_string() }))
}

/// NewsData.io adapter. Supplies no sentiment; every article needs both phases.
pub struct NewsDataProvider {
  client: Client,
  api_key: String,
  base_url: String,
}

impl NewsDataProvider {
  pub fn new(api_key: String) -> Self {
    Self::with_base_url(api_key, "https://newsdata.io/api/1/news".to_string())
  }

  pub fn with_base_url(api_key: String, base_url: String) -> Self {
    Self { client: Client::new(), api_key, base_url }
  }
}

#[async_trait]
impl Provider for NewsDataProvider {
  #[instrument(skip(self))]
  async fn fetch_page(&self, page_token: Option<&str>) -> Result<FetchedPage> {
    let mut url = reqwest::Url::parse(&self.base_url).expect("static base url is valid");
    {
      let mut qp = url.query_pairs_mut();
      qp.append_pair("apikey", &self.api_key);
      qp.append_pair("q", "bitcoin");
      qp.append_pair("language", "en");
      if let Some(token) = page_token {
        qp.append_pair("page", token);
      }
    }

    let body = get_with_retry(&self.client, url).await?;
    debug!(bytes = body.len(), "fetched newsdata page");
    let page: NewsDataPage = serde_json::from_str(&body)?;

    Ok(FetchedPage {
      articles: page.results.into_iter().map(RawArticle::NewsData).collect(),
      next_token: page.next_page,
      total: page.total_results.unwrap_or(0),
    })
  }

  fn name(&self) -> &'static str {
    "newsdata"
  }
}

/// APITube adapter. Supplies sentiment directly; only the summary phase remains.
pub struct ApiTubeProvider {
  client: Client,
  api_key: String,
  base_url: String,
}

impl ApiTubeProvider {
  pub fn new(api_key: String) -> Self {
    Self::with_base_url(api_key, "https://api.apitube.io/v1/news/everything".to_string())
  }

  pub fn with_base_url(api_key: String, base_url: String) -> Self {
    Self { client: Client::new(), api_key, base_url }
  }
}

#[async_trait]
impl Provider for ApiTubeProvider {
  #[instrument(skip(self))]
  async fn fetch_page(&self, page_token: Option<&str>) -> Result<FetchedPage> {
    let mut url = reqwest::Url::parse(&self.base_url).expect("static base url is valid");
    {
      let mut qp = url.query_pairs_mut();
      qp.append_pair("api_key", &self.api_key);
      qp.append_pair("topic.id", "bitcoin");
      qp.append_pair("sort.by", "published_at");
      qp.append_pair("sort.order", "desc");
      if let Some(token) = page_token {
        qp.append_pair("page", token);
      }
    }

    let body = get_with_retry(&self.client, url).await?;
    debug!(bytes = body.len(), "fetched apitube page");
    let page: ApiTubePage = serde_json::from_str(&body)?;

    Ok(FetchedPage {
      articles: page.results.into_iter().map(RawArticle::ApiTube).collect(),
      next_token: page.next_page,
      total: page.total.unwrap_or(0),
    })
  }

  fn name(&self) -> &'static str {
    "apitube"
  }
}
