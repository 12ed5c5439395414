//! Stable scanning entry point
//!
//! Callers hand over a frame and get back either a decoded code or
//! [`DecodeResult::NotFound`]. Whether a real engine does the work is decided
//! by the [`DecoderSlot`] the scanner was built with.

use std::sync::Arc;

use crate::decoder::{CodeDecoder, DecoderCapability};
use crate::error::DecodeError;
use crate::options::DecodeOptions;
use crate::result::DecodeResult;
use crate::sample::ImageSample;
use crate::slot::DecoderSlot;

#[derive(Debug, Clone)]
pub struct Scanner {
    slot: Arc<DecoderSlot>,
    defaults: DecodeOptions,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(DecoderCapability::NoDecoder)
    }
}

impl Scanner {
    pub fn new(capability: DecoderCapability) -> Self {
        Self::with_slot(DecoderSlot::shared(capability))
    }

    pub fn with_decoder(decoder: Arc<dyn CodeDecoder>) -> Self {
        Self::new(DecoderCapability::Real(decoder))
    }

    /// Read the capability from a slot that someone else may install into.
    pub fn with_slot(slot: Arc<DecoderSlot>) -> Self {
        Self {
            slot,
            defaults: DecodeOptions::default(),
        }
    }

    /// Options applied to every call, underneath the per-call options.
    pub fn with_defaults(mut self, defaults: DecodeOptions) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn slot(&self) -> &Arc<DecoderSlot> {
        &self.slot
    }

    pub fn has_decoder(&self) -> bool {
        self.slot.is_installed()
    }

    pub fn decode(&self, sample: &ImageSample, options: Option<&DecodeOptions>) -> DecodeResult {
        let capability = self.slot.capability();
        let Some(name) = capability.name() else {
            log::trace!(
                "No decoder installed, skipping {}x{} sample",
                sample.width(),
                sample.height()
            );
            return DecodeResult::NotFound;
        };

        log::debug!(
            "Delegating {}x{} {:?} sample to `{}`",
            sample.width(),
            sample.height(),
            sample.channels(),
            name
        );

        match options {
            Some(options) if !self.defaults.is_empty() => {
                let mut merged = self.defaults.clone();
                merged.merge(options);
                capability.decode(sample, &merged)
            }
            Some(options) => capability.decode(sample, options),
            None => capability.decode(sample, &self.defaults),
        }
    }

    /// Decode from a bare buffer and dimensions; the channel layout is
    /// inferred from the buffer length.
    pub fn decode_raw(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        options: Option<&DecodeOptions>,
    ) -> Result<DecodeResult, DecodeError> {
        let sample = ImageSample::from_raw(data.to_vec(), width, height)?;
        Ok(self.decode(&sample, options))
    }
}
