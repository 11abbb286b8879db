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
use crate::provider::{ApiTubeProvider, NewsDataProvider, Provider};
use news_core::{Config, NewsProvider};
use std::sync::Arc;

/// Selects the configured provider adapter at startup.
pub fn build_provider(config: &Config) -> Result<Arc<dyn Provider>> {
  match config.provider {
    NewsProvider::NewsData => {
      let key = config.newsdata_api_key.clone().ok_or_else(|| ProviderError::MissingApiKey("newsdata".to_string()))?;
      Ok(Arc::new(NewsDataProvider::new(key)))
    }
    NewsProvider::ApiTube => {
      let key = config.apitube_api_key.clone().ok_or_else(|| ProviderError::MissingApiKey("apitube".to_string()))?;
      Ok(Arc::new(ApiTubeProvider::new(key)))
    }
  }
}
