//! Tag inference and attribute rendering.
//!
//! Turns a [`TagSpec`] (plus the produced file path, for generated
//! entries) into a concrete element: the tag kind is inferred when not
//! explicit, `src`/`href` is derived from the file path, and a `.css`
//! link without `rel` gains `rel="stylesheet"`.

use std::path::Path;

use serde_json::Value;

use crate::dom::{AttrValue, Element, Node};
use crate::error::{Error, Result};
use crate::host::BuildHost;
use crate::options::{TagKind, TagSpec};

/// Render an attribute list as HTML attribute text.
///
/// Insertion order, boolean-true shorthand, JSON-encoded values, single
/// spaces, trailing space included.
pub fn render_attrs(attrs: &[(String, AttrValue)]) -> String {
    let mut out = String::new();
    for (key, value) in attrs {
        out.push_str(key);
        if let AttrValue::Json(v) = value {
            out.push('=');
            // Value-to-JSON never fails for the shapes stored here.
            out.push_str(&serde_json::to_string(v).unwrap_or_default());
        }
        out.push(' ');
    }
    out
}

/// Whether a produced path names a script (`*.js` / `*.mjs`,
/// case-insensitive, at least one character before the extension).
fn is_script_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    if let Some(stem) = lower.strip_suffix(".mjs") {
        return !stem.is_empty();
    }
    if let Some(stem) = lower.strip_suffix(".js") {
        return !stem.is_empty();
    }
    false
}

/// Build the element for one tag spec.
///
/// `file_path` is the public path of the produced file for generated
/// entries, `None` for externals (which were checked to carry an explicit
/// `tag` by the orchestrator).
pub fn build_tag(
    spec: &TagSpec,
    file_path: Option<&str>,
    host: &mut dyn BuildHost,
) -> Result<(TagKind, Element)> {
    let as_set = spec.as_.is_some();
    let kind = spec.tag.or_else(|| {
        if as_set || spec.rel.is_some() {
            Some(TagKind::Link)
        } else {
            file_path.map(|path| {
                if is_script_path(path) {
                    TagKind::Script
                } else {
                    TagKind::Link
                }
            })
        }
    });
    let kind = kind.ok_or(Error::ExternalTagRequired)?;
    let is_link = kind == TagKind::Link;

    if is_link && !as_set && spec.rel.as_deref() == Some("preload") {
        host.warn(
            "one or more entries or externals have the `rel` option set to \
             \"preload\" but no `as` option defined",
        );
    }

    let mut src = spec.src.clone();
    let mut href = spec.href.clone();
    match file_path {
        Some(path) => {
            if is_link {
                href = Some(path.to_string());
            } else {
                src = Some(path.to_string());
            }
        }
        None => {
            if src.is_none() && href.is_none() && spec.text.is_none() {
                return Err(Error::ExplicitSourceRequired);
            }
        }
    }

    let mut rel = spec.rel.clone();
    if is_link && rel.is_none() {
        let is_css = href
            .as_deref()
            .and_then(|h| Path::new(h).extension())
            .and_then(|ext| ext.to_str())
            == Some("css");
        if is_css {
            rel = Some("stylesheet".to_string());
        }
    }

    let mut attrs: Vec<(String, AttrValue)> = Vec::new();
    if let Some(rel) = rel {
        attrs.push(("rel".to_string(), AttrValue::str(rel)));
    }
    if let Some(as_) = &spec.as_ {
        attrs.push(("as".to_string(), AttrValue::str(as_.clone())));
    }
    if let Some(type_) = &spec.type_ {
        attrs.push(("type".to_string(), AttrValue::str(type_.clone())));
    }
    match spec.nomodule {
        Some(true) => attrs.push(("nomodule".to_string(), AttrValue::True)),
        Some(false) => attrs.push(("nomodule".to_string(), AttrValue::Json(Value::Bool(false)))),
        None => {}
    }
    for (key, value) in &spec.attrs {
        let value = match value {
            Value::Bool(true) => AttrValue::True,
            other => AttrValue::Json(other.clone()),
        };
        attrs.push((key.clone(), value));
    }
    if let Some(href) = href {
        attrs.push(("href".to_string(), AttrValue::str(href)));
    }
    if let Some(src) = src {
        attrs.push(("src".to_string(), AttrValue::str(src)));
    }

    let mut element = Element::with_attrs(kind.as_str(), attrs);
    if let Some(text) = &spec.text {
        element.children.push(Node::Text(text.clone()));
    }
    Ok((kind, element))
}
