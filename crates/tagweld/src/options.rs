//! Plugin configuration surface.
//!
//! [`HtmlOptions`] is the boundary type: deserializable from JSON config
//! (via [`HtmlOptions::from_json`]) or built in code with the builder-style
//! methods. It is deliberately permissive — shape problems (a bare-array
//! `externals`, a non-boolean `inject`, unknown keys) survive
//! deserialization and are reported by the configuration-time validation
//! pass with the proper diagnostics instead of an opaque serde error.
//!
//! The validated, immutable counterpart is [`Config`](crate::validate::Config).

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::minify::MinifyOptions;

/// Element kind of an injected tag.
///
/// Closed set: any other `tag` string is rejected at the serde boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    Link,
    Script,
    Style,
}

impl TagKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TagKind::Link => "link",
            TagKind::Script => "script",
            TagKind::Style => "style",
        }
    }
}

/// Per-tag options: either the overrides for one produced entry, or the
/// full description of an external tag.
///
/// Unrecognized keys become arbitrary attributes on the emitted element,
/// in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<TagKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
    #[serde(default, rename = "as", skip_serializing_if = "Option::is_none")]
    pub as_: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nomodule: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Inline element content; mutually exclusive with `src`/`href`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Arbitrary extra attributes, serialized in insertion order.
    #[serde(flatten)]
    pub attrs: IndexMap<String, Value>,
}

impl TagSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script() -> Self {
        Self {
            tag: Some(TagKind::Script),
            ..Self::default()
        }
    }

    pub fn link() -> Self {
        Self {
            tag: Some(TagKind::Link),
            ..Self::default()
        }
    }

    pub fn style() -> Self {
        Self {
            tag: Some(TagKind::Style),
            ..Self::default()
        }
    }

    pub fn tag(mut self, tag: TagKind) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn rel(mut self, rel: impl Into<String>) -> Self {
        self.rel = Some(rel.into());
        self
    }

    pub fn as_attr(mut self, as_: impl Into<String>) -> Self {
        self.as_ = Some(as_.into());
        self
    }

    pub fn type_attr(mut self, type_: impl Into<String>) -> Self {
        self.type_ = Some(type_.into());
        self
    }

    pub fn nomodule(mut self, nomodule: bool) -> Self {
        self.nomodule = Some(nomodule);
        self
    }

    pub fn src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    pub fn href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Whether this spec asks for an ECMAScript module tag.
    pub fn is_module(&self) -> bool {
        self.type_.as_deref() == Some("module")
    }
}

/// Raw `externals` value. A bare array stays representable so validation
/// can reject it with a dedicated message instead of an opaque
/// deserialization error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExternalsInput {
    Sections(Externals),
    /// A bare array — always a configuration error.
    Tags(Vec<TagSpec>),
}

/// Tags not tied to any produced file, injected at fixed positions
/// relative to the generated ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Externals {
    /// Injected before all generated entry tags.
    #[serde(default)]
    pub before: Vec<TagSpec>,
    /// Injected after all generated entry tags.
    #[serde(default)]
    pub after: Vec<TagSpec>,
}

impl Externals {
    pub fn before(mut self, spec: TagSpec) -> Self {
        self.before.push(spec);
        self
    }

    pub fn after(mut self, spec: TagSpec) -> Self {
        self.after.push(spec);
        self
    }

    /// All specs, before-section first.
    pub fn iter(&self) -> impl Iterator<Item = &TagSpec> {
        self.before.iter().chain(self.after.iter())
    }
}

/// Full plugin configuration as supplied by the user.
///
/// `template` is the only required option. Everything else defaults to
/// "do nothing": no entries, no exclusions, injection enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlOptions {
    /// Path to the HTML template file, or an inline HTML string (in which
    /// case `file_name` must be set).
    pub template: String,
    /// Per-entry tag overrides, keyed by logical entry name.
    #[serde(default)]
    pub entries: IndexMap<String, TagSpec>,
    /// Logical names of produced files that must not be injected.
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub externals: Option<ExternalsInput>,
    /// Path to a favicon file, emitted as an extra asset and linked from
    /// the document head.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<PathBuf>,
    /// Name of the emitted HTML asset. Derived from the output directory
    /// and the template base name when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Whether produced files are injected at all. Non-boolean values
    /// warn and coerce to `true` at validation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inject: Option<Value>,
    /// `<meta name=... content=...>` pairs merged into the head.
    #[serde(default)]
    pub meta: IndexMap<String, String>,
    /// Minification settings; absent means no minification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minify: Option<MinifyOptions>,
    /// Public URL prefix for injected paths, normalized to end with `/`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Anything else the user passed. Unknown keys warn; a fixed set of
    /// renamed options is fatal.
    #[serde(flatten)]
    pub rest: IndexMap<String, Value>,
}

impl HtmlOptions {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            entries: IndexMap::new(),
            exclude: Vec::new(),
            externals: None,
            favicon: None,
            file_name: None,
            inject: None,
            meta: IndexMap::new(),
            minify: None,
            online_path: None,
            title: None,
            rest: IndexMap::new(),
        }
    }

    /// Deserialize options from a JSON value, e.g. a config file section.
    pub fn from_json(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::InvalidOptions(e.to_string()))
    }

    pub fn entry(mut self, name: impl Into<String>, spec: TagSpec) -> Self {
        self.entries.insert(name.into(), spec);
        self
    }

    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.exclude.push(name.into());
        self
    }

    pub fn externals(mut self, externals: Externals) -> Self {
        self.externals = Some(ExternalsInput::Sections(externals));
        self
    }

    pub fn favicon(mut self, path: impl Into<PathBuf>) -> Self {
        self.favicon = Some(path.into());
        self
    }

    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn inject(mut self, inject: bool) -> Self {
        self.inject = Some(Value::Bool(inject));
        self
    }

    pub fn meta(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.meta.insert(name.into(), content.into());
        self
    }

    pub fn minify(mut self, options: MinifyOptions) -> Self {
        self.minify = Some(options);
        self
    }

    pub fn online_path(mut self, prefix: impl Into<String>) -> Self {
        self.online_path = Some(prefix.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tag_kind_rejects_unknown_values() {
        let result: std::result::Result<TagKind, _> = serde_json::from_value(json!("div"));
        assert!(result.is_err());
    }

    #[test]
    fn tag_spec_collects_extra_attributes_in_order() {
        let spec: TagSpec = serde_json::from_value(json!({
            "tag": "script",
            "defer": true,
            "data-x": "1"
        }))
        .unwrap();
        assert_eq!(spec.tag, Some(TagKind::Script));
        let keys: Vec<_> = spec.attrs.keys().cloned().collect();
        assert_eq!(keys, vec!["defer", "data-x"]);
    }

    #[test]
    fn externals_array_still_deserializes() {
        let input: ExternalsInput = serde_json::from_value(json!([{ "tag": "script" }])).unwrap();
        assert!(matches!(input, ExternalsInput::Tags(_)));
    }

    #[test]
    fn externals_object_deserializes_into_sections() {
        let input: ExternalsInput =
            serde_json::from_value(json!({ "before": [{ "tag": "script", "src": "x.js" }] }))
                .unwrap();
        match input {
            ExternalsInput::Sections(ext) => {
                assert_eq!(ext.before.len(), 1);
                assert!(ext.after.is_empty());
            }
            ExternalsInput::Tags(_) => panic!("expected sections"),
        }
    }

    #[test]
    fn options_capture_unknown_keys() {
        let options = HtmlOptions::from_json(json!({
            "template": "index.html",
            "preload": {},
            "bogus": 1
        }))
        .unwrap();
        assert!(options.rest.contains_key("preload"));
        assert!(options.rest.contains_key("bogus"));
    }

    #[test]
    fn invalid_tag_value_is_a_fatal_options_error() {
        let result = HtmlOptions::from_json(json!({
            "template": "index.html",
            "entries": { "main": { "tag": "div" } }
        }));
        assert!(matches!(result, Err(crate::error::Error::InvalidOptions(_))));
    }

    #[test]
    fn module_detection_reads_the_type_attribute() {
        assert!(TagSpec::script().type_attr("module").is_module());
        assert!(!TagSpec::script().type_attr("text/javascript").is_module());
        assert!(!TagSpec::script().is_module());
    }
}
