//! Error types for configuration validation and HTML generation.

use std::path::PathBuf;

use thiserror::Error;

use crate::bundle::ModuleFormat;

pub type Result<T> = std::result::Result<T, Error>;

/// Fatal conditions. Every variant aborts the build; warnings never show up
/// here, they go through [`BuildHost::warn`](crate::host::BuildHost::warn).
#[derive(Debug, Error)]
pub enum Error {
    // Phase A (configuration-time) failures
    #[error("the `{option}` option is deprecated, use `{replacement}` instead")]
    DeprecatedOption {
        option: String,
        replacement: &'static str,
    },

    #[error("`externals` must be an object: `{{before: [], after: []}}`")]
    ExternalsShape,

    #[error("when `template` is an HTML string the `fileName` option must be defined")]
    MissingFileName,

    #[error("the provided favicon file doesn't exist: {0}")]
    FaviconNotFound(PathBuf),

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("the entry \"{0}\" cannot have a `tag` property set to \"style\"")]
    EntryStyleTag(String),

    // Phase B (output-shape) failures
    #[error(
        "can't write the generated HTML over the source template at {0}, \
         define one of the options: `fileName`, `output.file` or `output.dir`"
    )]
    OutputIsTemplate(PathBuf),

    #[error(
        "one or more entries or externals have the `nomodule` option enabled \
         and `type` set to \"module\""
    )]
    NomoduleWithModuleType,

    #[error(
        "one or more entries or externals have the `type` option set to \"module\" \
         but the output format is \"{format}\", consider using another format or \
         changing the `type`"
    )]
    ModulesUnsupported { format: ModuleFormat },

    // Generate-time failures
    #[error("the input template doesn't contain the `html` tag")]
    MissingHtmlRoot,

    #[error("`tag` property must be defined explicitly for `externals`")]
    ExternalTagRequired,

    #[error("one of `src`, `href`, or `text` must be defined explicitly for `externals`")]
    ExplicitSourceRequired,

    #[error("output shape is not resolved yet, call `bind_output` before `generate`")]
    OutputNotResolved,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
