//! The seam a real decoding engine plugs into

use std::fmt;
use std::sync::Arc;

use crate::options::DecodeOptions;
use crate::result::DecodeResult;
use crate::sample::ImageSample;

/// A decoding engine. Implementations report "nothing found" as
/// [`DecodeResult::NotFound`]; the scanner passes their answer through
/// untouched.
pub trait CodeDecoder: Send + Sync {
    fn name(&self) -> &str;

    fn decode(&self, sample: &ImageSample, options: &DecodeOptions) -> DecodeResult;
}

/// Adapts a closure into a [`CodeDecoder`].
pub struct FnDecoder<F> {
    name: String,
    f: F,
}

impl<F> FnDecoder<F>
where
    F: Fn(&ImageSample, &DecodeOptions) -> DecodeResult + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> CodeDecoder for FnDecoder<F>
where
    F: Fn(&ImageSample, &DecodeOptions) -> DecodeResult + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn decode(&self, sample: &ImageSample, options: &DecodeOptions) -> DecodeResult {
        (self.f)(sample, options)
    }
}

/// Whether a real decoder is available.
#[derive(Clone, Default)]
pub enum DecoderCapability {
    Real(Arc<dyn CodeDecoder>),
    #[default]
    NoDecoder,
}

impl DecoderCapability {
    pub fn real(decoder: impl CodeDecoder + 'static) -> Self {
        DecoderCapability::Real(Arc::new(decoder))
    }

    pub fn is_available(&self) -> bool {
        matches!(self, DecoderCapability::Real(_))
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            DecoderCapability::Real(decoder) => Some(decoder.name()),
            DecoderCapability::NoDecoder => None,
        }
    }

    pub fn decode(&self, sample: &ImageSample, options: &DecodeOptions) -> DecodeResult {
        match self {
            DecoderCapability::Real(decoder) => decoder.decode(sample, options),
            DecoderCapability::NoDecoder => DecodeResult::NotFound,
        }
    }
}

impl fmt::Debug for DecoderCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecoderCapability::Real(decoder) => f.debug_tuple("Real").field(&decoder.name()).finish(),
            DecoderCapability::NoDecoder => f.write_str("NoDecoder"),
        }
    }
}

impl From<Arc<dyn CodeDecoder>> for DecoderCapability {
    fn from(decoder: Arc<dyn CodeDecoder>) -> Self {
        DecoderCapability::Real(decoder)
    }
}

impl From<Option<Arc<dyn CodeDecoder>>> for DecoderCapability {
    fn from(decoder: Option<Arc<dyn CodeDecoder>>) -> Self {
        decoder.map_or(DecoderCapability::NoDecoder, DecoderCapability::Real)
    }
}
