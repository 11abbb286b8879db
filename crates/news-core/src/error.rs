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

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  #[error("Environment variable error: {0}")]
  EnvVar(#[from] std::env::VarError),

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Missing API key for provider: {0}")]
  ApiKey(String),

  #[error("Serialization error: {0}")]
  Serde(#[from] serde_json::Error),

  #[error("Date parse error: {0}")]
  ParseDate(#[from] chrono::ParseError),

  #[error("Missing required field: {0}")]
  MissingField(String),

  #[error("Invalid configuration value for {key}: {value}")]
  InvalidValue { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_display_config() {
    let err = Error::Config("missing NEWS_PROVIDER".to_string());
    assert_eq!(err.to_string(), "Configuration error: missing NEWS_PROVIDER");
  }

  #[test]
  fn test_error_display_api_key() {
    let err = Error::ApiKey("apitube".to_string());
    assert_eq!(err.to_string(), "Missing API key for provider: apitube");
  }

  #[test]
  fn test_error_display_missing_field() {
    let err = Error::MissingField("title".to_string());
    assert_eq!(err.to_string(), "Missing required field: title");
  }

  #[test]
  fn test_error_display_invalid_value() {
    let err = Error::InvalidValue { key: "MAX_PAGES".to_string(), value: "abc".to_string() };
    assert_eq!(err.to_string(), "Invalid configuration value for MAX_PAGES: abc");
  }

  #[test]
  fn test_error_from_serde_json() {
    let json_err = serde_json::from_str::<String>("not json").unwrap_err();
    let err: Error = json_err.into();
    assert!(matches!(err, Error::Serde(_)));
  }

  #[test]
  fn test_error_from_env_var() {
    let env_err = std::env::VarError::NotPresent;
    let err: Error = env_err.into();
    assert!(matches!(err, Error::EnvVar(_)));
  }

  #[test]
  fn test_error_from_parse_date() {
    let parse_err = "not a date".parse::<chrono::DateTime<chrono::Utc>>().unwrap_err();
    let err: Error = parse_err.into();
    assert!(matches!(err, Error::ParseDate(_)));
  }

  #[test]
  fn test_error_debug() {
    let err = Error::Config("test".to_string());
    let debug_str = format!("{:?}", err);
    assert!(debug_str.contains("Config"));
  }

  #[test]
  fn test_result_alias() {
    let ok: Result<i32> = Ok(42);
    assert!(ok.is_ok());
    let err: Result<i32> = Err(Error::MissingField("x".to_string()));
    assert!(err.is_err());
  }
}
