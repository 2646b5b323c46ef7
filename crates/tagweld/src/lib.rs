//! # tagweld
//!
//! HTML-template injection for bundler pipelines. Given the finalized set
//! of produced files and an HTML template, tagweld emits the final
//! document: `<script>`/`<link>` tags for the bundle outputs, merged
//! `<title>`/`<meta>`/favicon metadata, externally supplied tags before
//! and after the generated ones, and optional minification.
//!
//! The work is split across three lifecycle checkpoints:
//!
//! 1. **Configuration time** — [`HtmlPlugin::from_options`] validates the
//!    options and freezes them into an immutable config.
//! 2. **Output shape known** — [`HtmlPlugin::bind_output`] checks the
//!    config against the bundler's output format and resolves the name of
//!    the emitted HTML asset.
//! 3. **Bundle finalized** — [`HtmlPlugin::generate`] mutates the parsed
//!    template in memory and hands the serialized document to the host.
//!
//! Fatal conditions are `Err` returns and abort the build; warnings go
//! through the [`BuildHost`] collaborator and never abort. tagweld emits
//! `tracing` events for debugging — install your own subscriber.
//!
//! ```no_run
//! use tagweld::{BundleFile, HtmlOptions, HtmlPlugin, MemoryHost, ModuleFormat, OutputShape};
//!
//! # fn main() -> tagweld::Result<()> {
//! let mut host = MemoryHost::new();
//! let mut plugin = HtmlPlugin::from_options(
//!     HtmlOptions::new("src/index.html")
//!         .title("My App")
//!         .meta("description", "an example"),
//!     &mut host,
//! )?;
//! plugin.bind_output(&OutputShape::new(ModuleFormat::Esm).dir("dist"))?;
//! plugin.generate(&[BundleFile::entry_chunk("main", "main.abc123.js")], &[], &mut host)?;
//!
//! assert!(host.asset("index.html").is_some());
//! # Ok(())
//! # }
//! ```

pub mod bundle;
pub mod dom;
pub mod error;
pub mod host;
pub mod inject;
pub mod minify;
pub mod options;
pub mod plugin;
pub mod tag;
pub mod validate;

// Re-export the main types
pub use bundle::{BundleFile, ModuleFormat, OutputKind, OutputShape};
pub use error::{Error, Result};
pub use host::{BuildHost, EmittedAsset, MemoryHost};
pub use minify::MinifyOptions;
pub use options::{Externals, HtmlOptions, TagKind, TagSpec};
pub use plugin::HtmlPlugin;
pub use validate::{validate_against_output, validate_config, Config, ResolvedOutput};
