//! The plugin lifecycle driver.
//!
//! [`HtmlPlugin`] glues the three checkpoints together for whatever build
//! tool hosts it: configuration-time validation when constructed, output
//! validation once the bundler has resolved its output options, and the
//! injection pass after the bundle is finalized.
//!
//! ```no_run
//! use tagweld::{HtmlPlugin, HtmlOptions, MemoryHost, ModuleFormat, OutputShape, BundleFile};
//!
//! # fn main() -> tagweld::Result<()> {
//! let mut host = MemoryHost::new();
//! let mut plugin = HtmlPlugin::from_options(
//!     HtmlOptions::new("src/index.html").title("My App"),
//!     &mut host,
//! )?;
//! plugin.bind_output(&OutputShape::new(ModuleFormat::Esm).dir("dist"))?;
//! plugin.generate(
//!     &[BundleFile::entry_chunk("main", "main.abc123.js")],
//!     &[],
//!     &mut host,
//! )?;
//! # Ok(())
//! # }
//! ```

use serde_json::Value;

use crate::bundle::{BundleFile, OutputShape};
use crate::error::{Error, Result};
use crate::host::BuildHost;
use crate::inject;
use crate::options::HtmlOptions;
use crate::validate::{validate_against_output, validate_config, Config, ResolvedOutput};

/// HTML injection plugin for a bundler build.
///
/// One instance per build: the validated configuration is immutable, and
/// the only state added later is the resolved output shape.
#[derive(Debug, Clone)]
pub struct HtmlPlugin {
    config: Config,
    resolved: Option<ResolvedOutput>,
}

impl HtmlPlugin {
    /// Plugin name for host diagnostics.
    pub fn name(&self) -> &'static str {
        "tagweld"
    }

    /// First checkpoint: validate options before the build starts.
    pub fn from_options(options: HtmlOptions, host: &mut dyn BuildHost) -> Result<Self> {
        let config = validate_config(&options, host)?;
        Ok(Self {
            config,
            resolved: None,
        })
    }

    /// Like [`from_options`](Self::from_options), for JSON configuration.
    pub fn from_json(value: Value, host: &mut dyn BuildHost) -> Result<Self> {
        Self::from_options(HtmlOptions::from_json(value)?, host)
    }

    /// Second checkpoint: validate against the resolved output options
    /// and fix the name of the emitted HTML asset.
    pub fn bind_output(&mut self, shape: &OutputShape) -> Result<()> {
        self.resolved = Some(validate_against_output(&self.config, shape)?);
        Ok(())
    }

    /// Generate and emit the final document. Runs once, after all bundle
    /// files are finalized.
    ///
    /// `favicon_markup` is opaque passthrough from a collaborating
    /// favicon-generation step, appended into `<head>` verbatim.
    pub fn generate(
        &self,
        bundle: &[BundleFile],
        favicon_markup: &[String],
        host: &mut dyn BuildHost,
    ) -> Result<()> {
        let resolved = self.resolved.as_ref().ok_or(Error::OutputNotResolved)?;
        inject::generate(&self.config, resolved, bundle, favicon_markup, host)
    }

    /// The validated configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::ModuleFormat;
    use crate::host::MemoryHost;

    #[test]
    fn generate_before_bind_output_is_an_error() {
        let mut host = MemoryHost::new();
        let options = HtmlOptions::new("<html></html>").file_name("index.html");
        let plugin = HtmlPlugin::from_options(options, &mut host).unwrap();
        let err = plugin.generate(&[], &[], &mut host).unwrap_err();
        assert!(matches!(err, Error::OutputNotResolved));
    }

    #[test]
    fn full_lifecycle_with_an_inline_template() {
        let mut host = MemoryHost::new();
        let options = HtmlOptions::new("<html><head></head><body></body></html>")
            .file_name("app.html");
        let mut plugin = HtmlPlugin::from_options(options, &mut host).unwrap();
        plugin
            .bind_output(&OutputShape::new(ModuleFormat::Esm).dir("dist"))
            .unwrap();
        plugin
            .generate(
                &[BundleFile::entry_chunk("main", "main.js")],
                &[],
                &mut host,
            )
            .unwrap();

        let html = host.asset("app.html").unwrap().source_as_str().unwrap();
        assert!(html.starts_with("<!doctype html>\n"));
        assert!(html.contains("main.js"));
    }

    #[test]
    fn plugin_reports_its_name() {
        let mut host = MemoryHost::new();
        let options = HtmlOptions::new("<html></html>").file_name("index.html");
        let plugin = HtmlPlugin::from_options(options, &mut host).unwrap();
        assert_eq!(plugin.name(), "tagweld");
    }
}
