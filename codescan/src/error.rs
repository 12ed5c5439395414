use std::path::PathBuf;

/// Failure to build or accept an image sample.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to load image `{path}`: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: imageproc::image::ImageError,
    },
}

impl DecodeError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        DecodeError::InvalidInput(msg.into())
    }
}

/// Failure to resolve a named decoder. Only surfaced by
/// [`DecoderRegistry::resolve`](crate::resolve::DecoderRegistry::resolve);
/// the capability path swallows it.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("no decoder registered under `{0}`")]
    Unknown(String),

    #[error("decoder `{name}` failed to initialize: {reason}")]
    Failed { name: String, reason: String },

    #[error("decoder `{0}` panicked during initialization")]
    Panicked(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("invalid QR code data: {0}")]
    Invalid(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write config `{path}`: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
