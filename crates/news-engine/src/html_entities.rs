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

//! Decodes the handful of HTML entities that survive the extractor's raw text
//! output. Phase 1 intentionally skips decoding so retries never double-decode;
//! this runs once, here, in Phase 2.

/// Decodes named and numeric HTML entities and collapses runs of whitespace
/// into single spaces, trimming the result.
pub fn decode_and_collapse(raw: &str) -> String {
  let decoded = decode_entities(raw);
  let collapsed: String = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
  collapsed
}

fn decode_entities(input: &str) -> String {
  let mut out = String::with_capacity(input.len());
  let mut chars = input.char_indices().peekable();
  let bytes = input.as_bytes();

  let mut i = 0;
  while i < bytes.len() {
    if bytes[i] == b'&' {
      if let Some(end) = input[i..].find(';').map(|p| i + p) {
        let entity = &input[i + 1..end];
        if let Some(resolved) = resolve_entity(entity) {
          out.push_str(&resolved);
          i = end + 1;
          continue;
        }
      }
    }
    let ch = input[i..].chars().next().unwrap();
    out.push(ch);
    i += ch.len_utf8();
  }
  let _ = chars.peek();
  out
}

fn resolve_entity(entity: &str) -> Option<String> {
  match entity {
    "amp" => return Some("&".to_string()),
    "lt" => return Some("<".to_string()),
    "gt" => return Some(">".to_string()),
    "quot" => return Some("\"".to_string()),
    "apos" | "#39" | "#x27" => return Some("'".to_string()),
    "nbsp" => return Some(" ".to_string()),
    "mdash" => return Some("—".to_string()),
    "ndash" => return Some("–".to_string()),
    "hellip" => return Some("…".to_string()),
    "rsquo" => return Some("\u{2019}".to_string()),
    "lsquo" => return Some("\u{2018}".to_string()),
    "rdquo" => return Some("\u{201d}".to_string()),
    "ldquo" => return Some("\u{201c}".to_string()),
    _ => {}
  }
  if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
    return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32).map(String::from);
  }
  if let Some(dec) = entity.strip_prefix('#') {
    return dec.parse::<u32>().ok().and_then(char::from_u32).map(String::from);
  }
  None
}
