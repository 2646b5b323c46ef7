//! Minifier boundary.
//!
//! A pure text transform over the serialized document, delegated to the
//! `minify-html` crate. [`MinifyOptions`] exposes the subset of its
//! configuration that makes sense for a generated document; absent options
//! on [`HtmlOptions`](crate::options::HtmlOptions) mean no minification
//! at all.

use serde::{Deserialize, Serialize};

/// HTML minification settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MinifyOptions {
    /// Minify embedded CSS (`<style>` contents and `style` attributes).
    pub minify_css: bool,
    /// Minify embedded JavaScript (`<script>` contents).
    pub minify_js: bool,
    /// Keep HTML comments instead of stripping them.
    pub keep_comments: bool,
    /// Keep optional closing tags (`</li>`, `</p>`, ...).
    pub keep_closing_tags: bool,
    /// Keep the `<html>` and `<head>` opening tags even when optional.
    pub keep_html_and_head_opening_tags: bool,
}

impl MinifyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    fn to_cfg(&self) -> minify_html::Cfg {
        minify_html::Cfg {
            minify_css: self.minify_css,
            minify_js: self.minify_js,
            keep_comments: self.keep_comments,
            keep_closing_tags: self.keep_closing_tags,
            keep_html_and_head_opening_tags: self.keep_html_and_head_opening_tags,
            ..minify_html::Cfg::default()
        }
    }
}

/// Minify a serialized HTML document.
pub fn minify(html: &str, options: &MinifyOptions) -> String {
    let out = minify_html::minify(html.as_bytes(), &options.to_cfg());
    // minify-html returns the input bytes reshuffled; valid UTF-8 in,
    // valid UTF-8 out.
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minify_collapses_whitespace() {
        let html = "<html><head>\n</head><body>\n  <p>hi</p>\n</body></html>";
        let out = minify(html, &MinifyOptions::new());
        assert!(out.len() < html.len());
        assert!(out.contains("<p>hi"));
    }

    #[test]
    fn comments_are_stripped_unless_kept() {
        let html = "<html><body><!-- note --><p>hi</p></body></html>";

        let stripped = minify(html, &MinifyOptions::new());
        assert!(!stripped.contains("note"));

        let kept = minify(
            html,
            &MinifyOptions {
                keep_comments: true,
                ..MinifyOptions::new()
            },
        );
        assert!(kept.contains("note"));
    }

    #[test]
    fn options_deserialize_from_camel_case() {
        let options: MinifyOptions =
            serde_json::from_str(r#"{"minifyCss": true, "keepComments": true}"#).unwrap();
        assert!(options.minify_css);
        assert!(options.keep_comments);
        assert!(!options.minify_js);
    }
}
