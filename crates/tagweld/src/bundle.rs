//! Shapes handed over by the bundler: the finalized file list and the
//! output options the build was configured with.
//!
//! The plugin only ever reads these; they are created and owned by the
//! bundler driving the lifecycle.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A single produced build output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleFile {
    /// Logical entry name, if the file belongs to a named entry.
    #[serde(default)]
    pub name: Option<String>,
    /// Physical path relative to the output directory.
    pub file_name: String,
    #[serde(flatten)]
    pub kind: OutputKind,
}

impl BundleFile {
    /// An entry-point chunk with a logical name.
    pub fn entry_chunk(name: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            file_name: file_name.into(),
            kind: OutputKind::Chunk { is_entry: true },
        }
    }

    /// A shared (non-entry) chunk.
    pub fn chunk(name: Option<String>, file_name: impl Into<String>) -> Self {
        Self {
            name,
            file_name: file_name.into(),
            kind: OutputKind::Chunk { is_entry: false },
        }
    }

    /// A plain asset (images, stylesheets emitted by other plugins, ...).
    pub fn asset(name: Option<String>, file_name: impl Into<String>) -> Self {
        Self {
            name,
            file_name: file_name.into(),
            kind: OutputKind::Asset,
        }
    }

    pub fn is_chunk(&self) -> bool {
        matches!(self.kind, OutputKind::Chunk { .. })
    }

    pub fn is_entry(&self) -> bool {
        matches!(self.kind, OutputKind::Chunk { is_entry: true })
    }
}

/// Chunks carry executable code; assets are opaque bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputKind {
    Chunk {
        #[serde(default, rename = "isEntry")]
        is_entry: bool,
    },
    Asset,
}

/// Module format of the build output, as configured on the bundler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleFormat {
    /// ECMAScript modules (`es`/`esm`). The only format where
    /// `<script type="module">` tags make sense.
    #[serde(alias = "es")]
    Esm,
    Cjs,
    Iife,
    Umd,
}

impl ModuleFormat {
    /// Whether `type="module"` script tags are loadable with this format.
    pub fn supports_modules(self) -> bool {
        matches!(self, ModuleFormat::Esm)
    }
}

impl fmt::Display for ModuleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModuleFormat::Esm => "esm",
            ModuleFormat::Cjs => "cjs",
            ModuleFormat::Iife => "iife",
            ModuleFormat::Umd => "umd",
        };
        write!(f, "{name}")
    }
}

/// Output location and format, known once the bundler has resolved its
/// own output options.
#[derive(Debug, Clone)]
pub struct OutputShape {
    /// Output directory, if the build writes multiple files.
    pub dir: Option<PathBuf>,
    /// Single output file, if the build writes exactly one.
    pub file: Option<PathBuf>,
    pub format: ModuleFormat,
}

impl OutputShape {
    pub fn new(format: ModuleFormat) -> Self {
        Self {
            dir: None,
            file: None,
            format,
        }
    }

    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_chunks_are_chunks_and_entries() {
        let file = BundleFile::entry_chunk("main", "main.abc123.js");
        assert!(file.is_chunk());
        assert!(file.is_entry());
    }

    #[test]
    fn assets_are_not_chunks() {
        let file = BundleFile::asset(None, "styles.css");
        assert!(!file.is_chunk());
        assert!(!file.is_entry());
    }

    #[test]
    fn only_esm_supports_modules() {
        assert!(ModuleFormat::Esm.supports_modules());
        assert!(!ModuleFormat::Cjs.supports_modules());
        assert!(!ModuleFormat::Iife.supports_modules());
        assert!(!ModuleFormat::Umd.supports_modules());
    }

    #[test]
    fn format_parses_es_alias() {
        let format: ModuleFormat = serde_json::from_str("\"es\"").unwrap();
        assert_eq!(format, ModuleFormat::Esm);
        let format: ModuleFormat = serde_json::from_str("\"esm\"").unwrap();
        assert_eq!(format, ModuleFormat::Esm);
    }

    #[test]
    fn format_displays_lowercase_name() {
        assert_eq!(ModuleFormat::Cjs.to_string(), "cjs");
    }
}
