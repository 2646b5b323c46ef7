//! The bundler-lifecycle collaborator.
//!
//! Everything the plugin needs from its host build tool goes through
//! [`BuildHost`]: non-fatal diagnostics, asset emission and watch-file
//! registration. Fatal conditions are ordinary `Err` returns and abort the
//! build in the caller.

use std::path::Path;

/// An asset handed back to the bundler for persistence.
///
/// The plugin never writes to disk itself; the emitted HTML document (and
/// the favicon bytes, when configured) flow through this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedAsset {
    pub file_name: String,
    pub source: Vec<u8>,
}

impl EmittedAsset {
    pub fn new(file_name: impl Into<String>, source: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            source: source.into(),
        }
    }

    /// Asset contents as UTF-8 text, if they are text.
    pub fn source_as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.source).ok()
    }
}

/// Host side of the build lifecycle.
///
/// Implementations wrap whatever driver replaces the bundler's plugin
/// context. Warnings must not abort the build.
pub trait BuildHost {
    /// Report a non-fatal diagnostic.
    fn warn(&mut self, message: &str);

    /// Register a file in the build output set.
    fn emit_asset(&mut self, asset: EmittedAsset);

    /// Ask the host to watch a file for changes (e.g. the HTML template).
    /// Hosts without a watch mode can ignore this.
    fn add_watch_file(&mut self, _path: &Path) {}
}

/// In-memory [`BuildHost`] that records everything it is handed.
///
/// Useful for tests and for embedders that want to post-process the
/// emitted assets instead of writing them out.
#[derive(Debug, Default)]
pub struct MemoryHost {
    pub warnings: Vec<String>,
    pub assets: Vec<EmittedAsset>,
    pub watched: Vec<std::path::PathBuf>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// The emitted asset with the given file name, if any.
    pub fn asset(&self, file_name: &str) -> Option<&EmittedAsset> {
        self.assets.iter().find(|a| a.file_name == file_name)
    }
}

impl BuildHost for MemoryHost {
    fn warn(&mut self, message: &str) {
        tracing::warn!(target: "tagweld", "{message}");
        self.warnings.push(message.to_string());
    }

    fn emit_asset(&mut self, asset: EmittedAsset) {
        self.assets.push(asset);
    }

    fn add_watch_file(&mut self, path: &Path) {
        self.watched.push(path.to_path_buf());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_host_records_warnings_and_assets() {
        let mut host = MemoryHost::new();
        host.warn("something looks off");
        host.emit_asset(EmittedAsset::new("index.html", "<html></html>"));

        assert_eq!(host.warnings, vec!["something looks off"]);
        assert_eq!(
            host.asset("index.html").unwrap().source_as_str(),
            Some("<html></html>")
        );
        assert!(host.asset("missing.html").is_none());
    }
}
