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

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use tracing::{instrument, warn};

use crate::error::{ExtractError, Result};
use crate::extractor::{extract_text, DEFAULT_MAX_CONTENT_CHARS};

const USER_AGENT: &str =
  "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Caps raw bytes read off the wire to a generous multiple of the text budget,
/// since markup overhead means far more HTML bytes than output text bytes are
/// needed; reading stops (cancelling the stream) once this is reached.
const RAW_BYTE_MULTIPLIER: usize = 8;

pub struct ContentExtractor {
  client: Client,
  max_content_chars: usize,
}

impl ContentExtractor {
  pub fn new(max_content_chars: usize) -> Self {
    let client = Client::builder().timeout(FETCH_TIMEOUT).user_agent(USER_AGENT).build().expect("client builds");
    ContentExtractor { client, max_content_chars }
  }

  /// Streams `link`, collecting raw HTML up to a byte-budget multiple of
  /// `max_content_chars`, cancelling the underlying connection once that
  /// limit is hit, then extracts body text. Raw text is not HTML-decoded;
  /// that is the summarizer's responsibility.
  #[instrument(skip(self, debug))]
  pub async fn fetch(&self, link: &str, debug: bool) -> Result<Option<String>> {
    let response = self.client.get(link).send().await?;
    let status = response.status();
    if !status.is_success() {
      return Err(ExtractError::Status(status.as_u16()));
    }

    let raw_budget = self.max_content_chars.saturating_mul(RAW_BYTE_MULTIPLIER);
    let mut buf: Vec<u8> = Vec::with_capacity(raw_budget.min(1 << 20));
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
      let chunk = chunk?;
      buf.extend_from_slice(&chunk);
      if buf.len() >= raw_budget {
        warn!(link, budget = raw_budget, "raw byte budget reached, cancelling fetch");
        break;
      }
    }
    drop(stream);

    let html = String::from_utf8_lossy(&buf);
    Ok(extract_text(&html, self.max_content_chars, debug))
  }
}

impl Default for ContentExtractor {
  fn default() -> Self {
    Self::new(DEFAULT_MAX_CONTENT_CHARS)
  }
}
