//! The two-checkpoint validation pass.
//!
//! [`validate_config`] runs before any building begins and turns the
//! permissive [`HtmlOptions`] into an immutable [`Config`]; nothing in the
//! config is reassigned afterwards. [`validate_against_output`] runs once
//! the bundler's output directory/file and module format are known and
//! resolves the HTML output name. Both reject contradictory configurations
//! up front so the generate pass never has to unwind partial output.

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;

use crate::bundle::OutputShape;
use crate::error::{Error, Result};
use crate::host::BuildHost;
use crate::minify::MinifyOptions;
use crate::options::{Externals, ExternalsInput, HtmlOptions, TagKind, TagSpec};

/// Renamed or removed options; using one is fatal and names the
/// replacement.
const DEPRECATED_OPTIONS: &[(&str, &'static str)] = &[
    ("preload", "entries"),
    ("modules", "entries"),
    ("nomodule", "entries"),
];

/// Where the template HTML comes from. Decided exactly once, at
/// configuration time; the generate pass reads the same value.
#[derive(Debug, Clone)]
pub enum TemplateSource {
    /// An existing template file, registered with the host's watcher.
    File(PathBuf),
    /// Inline HTML passed directly in the options.
    Inline(String),
}

/// Validated, immutable plugin configuration.
///
/// Produced by [`validate_config`]; all the coercions (`inject`
/// normalization, `exclude` as a set, externals sections) happen there.
#[derive(Debug, Clone)]
pub struct Config {
    pub entries: IndexMap<String, TagSpec>,
    pub exclude: HashSet<String>,
    pub externals: Externals,
    pub favicon: Option<PathBuf>,
    pub file_name: Option<String>,
    pub inject: bool,
    pub meta: IndexMap<String, String>,
    pub minify: Option<MinifyOptions>,
    pub online_path: Option<String>,
    pub template: TemplateSource,
    pub title: Option<String>,
}

/// Output knowledge derived at the second checkpoint.
#[derive(Debug, Clone)]
pub struct ResolvedOutput {
    /// Base name of the emitted HTML asset.
    pub file_name: String,
    /// Whether `<script type="module">` tags are loadable with the
    /// configured output format.
    pub supports_modules: bool,
}

/// Phase A: configuration-time validation, before any building begins.
pub fn validate_config(options: &HtmlOptions, host: &mut dyn BuildHost) -> Result<Config> {
    for key in options.rest.keys() {
        match DEPRECATED_OPTIONS.iter().find(|(name, _)| *name == key.as_str()) {
            Some(&(name, replacement)) => {
                return Err(Error::DeprecatedOption {
                    option: name.to_string(),
                    replacement,
                });
            }
            None => host.warn(&format!("ignoring unknown option `{key}`")),
        }
    }

    let externals = match &options.externals {
        None => Externals::default(),
        Some(ExternalsInput::Tags(_)) => return Err(Error::ExternalsShape),
        Some(ExternalsInput::Sections(sections)) => sections.clone(),
    };

    let template_path = Path::new(&options.template);
    let template = if fs::metadata(template_path).map(|m| m.is_file()).unwrap_or(false) {
        host.add_watch_file(template_path);
        TemplateSource::File(template_path.to_path_buf())
    } else {
        if options.file_name.is_none() {
            return Err(Error::MissingFileName);
        }
        TemplateSource::Inline(options.template.clone())
    };

    if let Some(favicon) = &options.favicon {
        if !fs::metadata(favicon).map(|m| m.is_file()).unwrap_or(false) {
            return Err(Error::FaviconNotFound(favicon.clone()));
        }
    }

    let inject = match &options.inject {
        None => true,
        Some(serde_json::Value::Bool(value)) => *value,
        Some(_) => {
            host.warn("invalid `inject` option: must be `true`, `false` or absent");
            true
        }
    };

    let exclude: HashSet<String> = options.exclude.iter().cloned().collect();
    if inject {
        for name in &exclude {
            if options.entries.contains_key(name) {
                host.warn(&format!("excluding a configured entry \"{name}\""));
            }
        }
    }

    // Tag validity and `nomodule` types are enforced by the schema; the
    // one constraint it cannot express is that entries never inline
    // styles.
    for (name, spec) in &options.entries {
        if spec.tag == Some(TagKind::Style) {
            return Err(Error::EntryStyleTag(name.clone()));
        }
    }

    Ok(Config {
        entries: options.entries.clone(),
        exclude,
        externals,
        favicon: options.favicon.clone(),
        file_name: options.file_name.clone(),
        inject,
        meta: options.meta.clone(),
        minify: options.minify.clone(),
        online_path: options.online_path.clone(),
        template,
        title: options.title.clone(),
    })
}

/// Phase B: validation against the bundler's resolved output options.
pub fn validate_against_output(config: &Config, shape: &OutputShape) -> Result<ResolvedOutput> {
    let file_name = match &config.file_name {
        Some(name) => Path::new(name)
            .file_name()
            .map(|base| base.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.clone()),
        None => derive_file_name(config, shape)?,
    };

    let supports_modules = shape.format.supports_modules();
    for spec in config.entries.values().chain(config.externals.iter()) {
        if !spec.is_module() {
            continue;
        }
        if spec.tag == Some(TagKind::Script) && spec.nomodule == Some(true) {
            return Err(Error::NomoduleWithModuleType);
        }
        if !supports_modules {
            return Err(Error::ModulesUnsupported {
                format: shape.format,
            });
        }
    }

    Ok(ResolvedOutput {
        file_name,
        supports_modules,
    })
}

/// No explicit `fileName`: reuse the template's base name inside the
/// output directory, refusing to overwrite the template itself.
fn derive_file_name(config: &Config, shape: &OutputShape) -> Result<String> {
    // Phase A guarantees an inline template comes with an explicit name.
    let template = match &config.template {
        TemplateSource::File(path) => path,
        TemplateSource::Inline(_) => return Err(Error::MissingFileName),
    };

    let cwd = std::env::current_dir()?;
    let dist_dir = if let Some(dir) = &shape.dir {
        absolute(&cwd, dir)
    } else if let Some(file) = &shape.file {
        let parent = file.parent().unwrap_or(Path::new(""));
        absolute(&cwd, parent)
    } else {
        cwd.clone()
    };

    let base = template
        .file_name()
        .map(|base| base.to_string_lossy().into_owned())
        .unwrap_or_default();
    let html_path = normalize(&dist_dir.join(&base));
    if html_path == normalize(&absolute(&cwd, template)) {
        return Err(Error::OutputIsTemplate(html_path));
    }
    Ok(base)
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Lexical normalization: strips `.` components and folds `..` so the
/// template-overwrite comparison works without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
