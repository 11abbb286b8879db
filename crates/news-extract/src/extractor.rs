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

//! Walks a parsed HTML document collecting body text, suppressing navigation
//! chrome and other non-article content by tag name and by a class/id pattern.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node};

pub const DEFAULT_MAX_CONTENT_CHARS: usize = 10 * 1024;

const REMOVE_SUBTREE_TAGS: &[&str] =
  &["script", "style", "nav", "header", "footer", "aside", "menu", "form", "svg", "canvas", "iframe", "noscript", "title"];

const SUPPRESS_TEXT_TAGS: &[&str] = &["button", "input", "select", "textarea"];

fn skip_pattern() -> &'static Regex {
  static SKIP: OnceLock<Regex> = OnceLock::new();
  SKIP.get_or_init(|| {
    Regex::new(
      r"(?i)\b(nav|menu|menu-item|header|footer|sidebar|aside|advertisement|ad-|promo|banner|widget|share|social|comment|related|recommend)\b",
    )
    .expect("static skip pattern is valid")
  })
}

fn matches_skip_pattern(el: ElementRef) -> bool {
  let value = el.value();
  let class = value.attr("class").unwrap_or("");
  let id = value.attr("id").unwrap_or("");
  skip_pattern().is_match(class) || skip_pattern().is_match(id)
}

struct Walker {
  out: String,
  budget: usize,
  debug: bool,
  truncated: bool,
}

impl Walker {
  fn walk(&mut self, el: ElementRef, suppressed: bool) {
    if self.truncated {
      return;
    }
    let tag = el.value().name();
    if REMOVE_SUBTREE_TAGS.contains(&tag) {
      return;
    }

    let mut local_suppressed = suppressed || SUPPRESS_TEXT_TAGS.contains(&tag);
    if !local_suppressed && matches_skip_pattern(el) {
      local_suppressed = true;
    }

    if self.debug {
      self.out.push_str(&format!("[{tag}]"));
    }

    for child in el.children() {
      if self.truncated {
        break;
      }
      match child.value() {
        Node::Text(text) => {
          if local_suppressed {
            continue;
          }
          let trimmed = text.trim();
          if trimmed.is_empty() {
            continue;
          }
          if self.debug {
            self.out.push_str("(text)");
          }
          if !self.out.is_empty() && !self.out.ends_with(' ') {
            self.out.push(' ');
          }
          self.out.push_str(trimmed);
          if self.out.len() >= self.budget {
            let mut cut = self.budget.min(self.out.len());
            while cut > 0 && !self.out.is_char_boundary(cut) {
              cut -= 1;
            }
            self.out.truncate(cut);
            self.truncated = true;
          }
        }
        Node::Element(_) => {
          if let Some(child_el) = ElementRef::wrap(child) {
            self.walk(child_el, local_suppressed);
          }
        }
        _ => {}
      }
    }
  }
}

/// Extracts visible body text from `html`, stopping once `budget` bytes have
/// been collected. Returns `None` if nothing survived suppression.
///
/// When `debug` is set, element and text-owner markers (`[div]`, `(text)`)
/// are interleaved for human inspection; this output must never reach the
/// summarizer.
pub fn extract_text(html: &str, budget: usize, debug: bool) -> Option<String> {
  let document = Html::parse_document(html);
  let mut walker = Walker { out: String::new(), budget, debug, truncated: false };
  walker.walk(document.root_element(), false);
  let trimmed = walker.out.trim();
  if trimmed.is_empty() {
    None
  } else {
    Some(trimmed.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_removes_script_and_nav_subtrees() {
    let html = r#"
      <html><body>
        <nav>Home | About</nav>
        <script>alert('x')</script>
        <article><p>Bitcoin rallied today.</p></article>
        <footer>copyright 2026</footer>
      </body></html>
    "#;
    let text = extract_text(html, DEFAULT_MAX_CONTENT_CHARS, false).unwrap();
    assert_eq!(text, "Bitcoin rallied today.");
  }

  #[test]
  fn test_suppresses_by_class_pattern() {
    let html = r#"
      <html><body>
        <div class="social-share">Share this</div>
        <div class="related-posts">You might also like</div>
        <p>The main story text.</p>
      </body></html>
    "#;
    let text = extract_text(html, DEFAULT_MAX_CONTENT_CHARS, false).unwrap();
    assert_eq!(text, "The main story text.");
  }

  #[test]
  fn test_suppresses_form_controls() {
    let html = r#"<html><body><form><button>Subscribe now</button></form><p>Real text.</p></body></html>"#;
    let text = extract_text(html, DEFAULT_MAX_CONTENT_CHARS, false).unwrap();
    assert_eq!(text, "Real text.");
  }

  #[test]
  fn test_truncates_to_budget() {
    let html = format!("<html><body><p>{}</p></body></html>", "a ".repeat(1000));
    let text = extract_text(&html, 10, false).unwrap();
    assert!(text.len() <= 10);
  }

  #[test]
  fn test_truncates_on_multibyte_char_boundary_without_panicking() {
    let html = format!("<html><body><p>{}</p></body></html>", "Bitcoin surges\u{2014}again ".repeat(200));
    let text = extract_text(&html, 10, false).unwrap();
    assert!(text.len() <= 10);
    assert!(std::str::from_utf8(text.as_bytes()).is_ok());
  }

  #[test]
  fn test_none_when_nothing_collected() {
    let html = "<html><body><script>x()</script><nav>nav</nav></body></html>";
    assert!(extract_text(html, DEFAULT_MAX_CONTENT_CHARS, false).is_none());
  }

  #[test]
  fn test_debug_mode_interleaves_markers() {
    let html = "<html><body><p>hi</p></body></html>";
    let text = extract_text(html, DEFAULT_MAX_CONTENT_CHARS, true).unwrap();
    assert!(text.contains("[p]"));
    assert!(text.contains("(text)"));
  }
}
