//! The generate-time driver.
//!
//! Runs once, after the full bundle file list is known. The step order is
//! the contract: meta merge, favicon passthrough markup, title, "before"
//! externals, generated entries, favicon link, "after" externals,
//! serialization with a literal doctype, optional minification, emission.
//! Validation already ran at both checkpoints; the only fatal condition
//! left here is a template without an `<html>` element.

use std::fs;

use crate::bundle::BundleFile;
use crate::dom::{AttrValue, Document, Element, Node, Placement};
use crate::error::{Error, Result};
use crate::host::{BuildHost, EmittedAsset};
use crate::minify;
use crate::options::{TagKind, TagSpec};
use crate::tag::build_tag;
use crate::validate::{Config, ResolvedOutput, TemplateSource};

/// Produce the final HTML document and hand it (plus the favicon bytes,
/// when configured) to the host's emission sink.
pub fn generate(
    config: &Config,
    resolved: &ResolvedOutput,
    bundle: &[BundleFile],
    favicon_markup: &[String],
    host: &mut dyn BuildHost,
) -> Result<()> {
    let text = match &config.template {
        TemplateSource::File(path) => fs::read_to_string(path)?,
        TemplateSource::Inline(inline) => inline.clone(),
    };

    let mut doc = Document::parse(&text);
    {
        let html = doc.find_element_mut("html").ok_or(Error::MissingHtmlRoot)?;
        html.ensure_child("head", Placement::Prepend);
        html.ensure_child("body", Placement::Append);

        {
            let head = html.ensure_child("head", Placement::Prepend);
            for (name, content) in &config.meta {
                let meta = Element::with_attrs(
                    "meta",
                    vec![
                        ("name".to_string(), AttrValue::str(name.clone())),
                        ("content".to_string(), AttrValue::str(content.clone())),
                    ],
                );
                let existing = head
                    .child_index(|el| el.tag == "meta" && el.attr("name") == Some(name.as_str()));
                match existing {
                    Some(index) => head.exchange_child(index, Node::Element(meta)),
                    None => head.append_with_newline(Node::Element(meta)),
                }
            }

            // Opaque markup from a collaborating favicon-generation step,
            // appended verbatim.
            for markup in favicon_markup {
                head.children.push(Node::Text(markup.clone()));
                head.children.push(Node::Text("\n".to_string()));
            }

            if let Some(title) = &config.title {
                match head.child_index(|el| el.tag == "title") {
                    Some(index) => {
                        if let Some(Node::Element(el)) = head.children.get_mut(index) {
                            el.set_text(title.clone());
                        }
                    }
                    None => {
                        let mut el = Element::new("title");
                        el.set_text(title.clone());
                        head.append_with_newline(Node::Element(el));
                    }
                }
            }
        }

        let prefix = match &config.online_path {
            None => String::new(),
            Some(path) if path.ends_with('/') => path.clone(),
            Some(path) => format!("{path}/"),
        };

        for spec in &config.externals.before {
            inject_external(html, spec, host)?;
        }

        if config.inject {
            let default_spec = TagSpec::default();
            for file in bundle {
                if let Some(name) = &file.name {
                    if config.exclude.contains(name) {
                        tracing::debug!(target: "tagweld", file = %file.file_name, "excluded from injection");
                        continue;
                    }
                }
                let options = file.name.as_deref().and_then(|name| config.entries.get(name));
                // Non-entry chunks without explicit options are internal
                // shared chunks and are never referenced directly.
                if options.is_none() && file.is_chunk() && !file.is_entry() {
                    continue;
                }
                let public_path = format!("{prefix}{}", file.file_name);
                let spec = options.unwrap_or(&default_spec);
                let (kind, element) = build_tag(spec, Some(&public_path), host)?;
                place(html, kind, element);
            }
        }

        if let Some(favicon) = &config.favicon {
            let rel = "shortcut icon";
            let base = favicon
                .file_name()
                .map(|base| base.to_string_lossy().into_owned())
                .unwrap_or_default();
            let link = Element::with_attrs(
                "link",
                vec![
                    ("rel".to_string(), AttrValue::str(rel)),
                    ("href".to_string(), AttrValue::str(format!("{prefix}{base}"))),
                ],
            );
            let head = html.ensure_child("head", Placement::Prepend);
            match head.child_index(|el| el.tag == "link" && el.attr("rel") == Some(rel)) {
                Some(index) => head.exchange_child(index, Node::Element(link)),
                None => head.append_with_newline(Node::Element(link)),
            }
            host.emit_asset(EmittedAsset::new(base, fs::read(favicon)?));
        }

        for spec in &config.externals.after {
            inject_external(html, spec, host)?;
        }
    }

    let mut source = format!("<!doctype html>\n{}", doc.to_html());
    if let Some(options) = &config.minify {
        source = minify::minify(&source, options);
    }

    tracing::debug!(target: "tagweld", file = %resolved.file_name, bytes = source.len(), "emitting document");
    host.emit_asset(EmittedAsset::new(
        resolved.file_name.clone(),
        source.into_bytes(),
    ));
    Ok(())
}

/// Externals carry no file path, so the tag must be explicit.
fn inject_external(html: &mut Element, spec: &TagSpec, host: &mut dyn BuildHost) -> Result<()> {
    if spec.tag.is_none() {
        return Err(Error::ExternalTagRequired);
    }
    let (kind, element) = build_tag(spec, None, host)?;
    place(html, kind, element);
    Ok(())
}

/// Scripts land at the end of the body, everything else in the head.
fn place(html: &mut Element, kind: TagKind, element: Element) {
    let parent = match kind {
        TagKind::Script => html.ensure_child("body", Placement::Append),
        _ => html.ensure_child("head", Placement::Prepend),
    };
    parent.append_with_newline(Node::Element(element));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use crate::options::Externals;
    use crate::validate::TemplateSource;
    use indexmap::IndexMap;
    use std::collections::HashSet;

    const TEMPLATE: &str = "<html><head></head><body></body></html>";

    fn config(template: &str) -> Config {
        Config {
            entries: IndexMap::new(),
            exclude: HashSet::new(),
            externals: Externals::default(),
            favicon: None,
            file_name: Some("index.html".to_string()),
            inject: true,
            meta: IndexMap::new(),
            minify: None,
            online_path: None,
            template: TemplateSource::Inline(template.to_string()),
            title: None,
        }
    }

    fn resolved() -> ResolvedOutput {
        ResolvedOutput {
            file_name: "index.html".to_string(),
            supports_modules: true,
        }
    }

    fn emitted_html(config: &Config, bundle: &[BundleFile]) -> (String, MemoryHost) {
        let mut host = MemoryHost::new();
        generate(config, &resolved(), bundle, &[], &mut host).unwrap();
        let html = host
            .asset("index.html")
            .and_then(|a| a.source_as_str())
            .unwrap()
            .to_string();
        (html, host)
    }

    #[test]
    fn injects_a_single_entry_chunk() {
        let bundle = [BundleFile::entry_chunk("main", "main.abc123.js")];
        let (html, _) = emitted_html(&config(TEMPLATE), &bundle);
        assert_eq!(
            html,
            "<!doctype html>\n<html><head></head><body>\n<script src=\"main.abc123.js\" ></script></body></html>"
        );
    }

    #[test]
    fn missing_html_root_is_fatal() {
        let mut host = MemoryHost::new();
        let err = generate(
            &config("<head></head>"),
            &resolved(),
            &[],
            &[],
            &mut host,
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingHtmlRoot));
    }

    #[test]
    fn creates_missing_head_and_body() {
        let (html, _) = emitted_html(
            &config("<html></html>"),
            &[BundleFile::entry_chunk("main", "m.js")],
        );
        assert_eq!(
            html,
            "<!doctype html>\n<html><head></head><body>\n<script src=\"m.js\" ></script></body></html>"
        );
    }

    #[test]
    fn excluded_names_are_skipped() {
        let mut cfg = config(TEMPLATE);
        cfg.exclude.insert("vendor".to_string());
        let bundle = [
            BundleFile::entry_chunk("vendor", "vendor.js"),
            BundleFile::entry_chunk("main", "main.js"),
        ];
        let (html, _) = emitted_html(&cfg, &bundle);
        assert!(!html.contains("vendor.js"));
        assert!(html.contains("main.js"));
    }

    #[test]
    fn non_entry_chunks_without_options_are_not_referenced() {
        let bundle = [
            BundleFile::chunk(Some("shared".to_string()), "shared.js"),
            BundleFile::entry_chunk("main", "main.js"),
            BundleFile::asset(None, "styles.css"),
        ];
        let (html, _) = emitted_html(&config(TEMPLATE), &bundle);
        assert!(!html.contains("shared.js"));
        assert!(html.contains("main.js"));
        assert!(html.contains("styles.css"));
    }

    #[test]
    fn entry_options_force_injection_of_shared_chunks() {
        let mut cfg = config(TEMPLATE);
        cfg.entries
            .insert("shared".to_string(), TagSpec::script().nomodule(true));
        let bundle = [BundleFile::chunk(Some("shared".to_string()), "shared.js")];
        let (html, _) = emitted_html(&cfg, &bundle);
        assert!(html.contains("<script nomodule src=\"shared.js\" >"));
    }

    #[test]
    fn inject_false_disables_generated_tags() {
        let mut cfg = config(TEMPLATE);
        cfg.inject = false;
        let bundle = [BundleFile::entry_chunk("main", "main.js")];
        let (html, _) = emitted_html(&cfg, &bundle);
        assert!(!html.contains("main.js"));
    }

    #[test]
    fn online_path_prefixes_public_paths() {
        let mut cfg = config(TEMPLATE);
        cfg.online_path = Some("https://cdn.example".to_string());
        let bundle = [BundleFile::entry_chunk("main", "main.js")];
        let (html, _) = emitted_html(&cfg, &bundle);
        assert!(html.contains("src=\"https://cdn.example/main.js\""));
    }

    #[test]
    fn meta_tags_replace_existing_ones_in_place() {
        let template = "<html><head><meta name=\"description\" content=\"old\" ><meta name=\"other\" content=\"keep\" ></head><body></body></html>";
        let mut cfg = config(template);
        cfg.meta
            .insert("description".to_string(), "new".to_string());
        let (html, _) = emitted_html(&cfg, &[]);
        assert_eq!(
            html,
            "<!doctype html>\n<html><head><meta name=\"description\" content=\"new\" ><meta name=\"other\" content=\"keep\" ></head><body></body></html>"
        );
    }

    #[test]
    fn meta_merge_is_idempotent() {
        let mut cfg = config(TEMPLATE);
        cfg.meta
            .insert("description".to_string(), "x".to_string());
        let (first, _) = emitted_html(&cfg, &[]);

        // Run again with the first output (minus doctype) as the template.
        let again = first.trim_start_matches("<!doctype html>\n");
        let mut cfg = config(again);
        cfg.meta
            .insert("description".to_string(), "x".to_string());
        let (second, _) = emitted_html(&cfg, &[]);
        assert_eq!(first, second);
    }

    #[test]
    fn title_replaces_existing_text_in_place() {
        let template = "<html><head><title>Old</title></head><body></body></html>";
        let mut cfg = config(template);
        cfg.title = Some("New".to_string());
        let (html, _) = emitted_html(&cfg, &[]);
        assert!(html.contains("<title>New</title>"));
        assert!(!html.contains("Old"));
    }

    #[test]
    fn title_is_created_when_absent() {
        let mut cfg = config(TEMPLATE);
        cfg.title = Some("App".to_string());
        let (html, _) = emitted_html(&cfg, &[]);
        assert!(html.contains("<title>App</title>"));
    }

    #[test]
    fn externals_surround_generated_tags() {
        let mut cfg = config(TEMPLATE);
        cfg.externals = Externals::default()
            .before(TagSpec::script().src("first.js"))
            .after(TagSpec::script().src("last.js"));
        let bundle = [BundleFile::entry_chunk("main", "main.js")];
        let (html, _) = emitted_html(&cfg, &bundle);

        let first = html.find("first.js").unwrap();
        let main = html.find("main.js").unwrap();
        let last = html.find("last.js").unwrap();
        assert!(first < main && main < last);
    }

    #[test]
    fn externals_without_a_tag_are_fatal() {
        let mut cfg = config(TEMPLATE);
        cfg.externals = Externals::default().before(TagSpec::new().src("x.js"));
        let mut host = MemoryHost::new();
        let err = generate(&cfg, &resolved(), &[], &[], &mut host).unwrap_err();
        assert!(matches!(err, Error::ExternalTagRequired));
    }

    #[test]
    fn non_script_externals_route_to_the_head() {
        let mut cfg = config(TEMPLATE);
        cfg.externals = Externals::default()
            .before(TagSpec::link().href("reset.css"))
            .before(TagSpec::script().src("app.js"));
        let (html, _) = emitted_html(&cfg, &[]);

        let head_end = html.find("</head>").unwrap();
        assert!(html.find("reset.css").unwrap() < head_end);
        assert!(html.find("app.js").unwrap() > head_end);
    }

    #[test]
    fn favicon_markup_is_appended_verbatim() {
        let mut host = MemoryHost::new();
        let markup = vec!["<link rel=\"apple-touch-icon\" href=\"i.png\">".to_string()];
        generate(&config(TEMPLATE), &resolved(), &[], &markup, &mut host).unwrap();
        let html = host.asset("index.html").unwrap().source_as_str().unwrap();
        assert!(html.contains("apple-touch-icon"));
    }

    #[test]
    fn minify_options_are_applied_to_the_emitted_document() {
        let mut cfg = config("<html><head>   </head><body>   </body></html>");
        cfg.minify = Some(crate::minify::MinifyOptions::new());
        let (html, _) = emitted_html(&cfg, &[]);
        assert!(!html.contains("   "));
    }
}
