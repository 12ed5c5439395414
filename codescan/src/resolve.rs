//! Startup-time resolution of an optional decoding engine

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::decoder::{CodeDecoder, DecoderCapability};
use crate::error::ResolveError;

type Factory = Box<dyn Fn() -> anyhow::Result<Arc<dyn CodeDecoder>> + Send + Sync>;

/// Named decoder factories, in registration order.
///
/// Resolution happens once, when the application starts; the result is a
/// [`DecoderCapability`] handed to the scanner. Nothing here runs per scan.
#[derive(Default)]
pub struct DecoderRegistry {
    factories: Vec<(String, Factory)>,
}

impl DecoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory. A later registration under the same name replaces
    /// the earlier one but keeps its position.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> anyhow::Result<Arc<dyn CodeDecoder>> + Send + Sync + 'static,
    {
        let name = name.into();
        let factory: Factory = Box::new(factory);

        match self.factories.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = factory,
            None => self.factories.push((name, factory)),
        }
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.iter().map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn CodeDecoder>, ResolveError> {
        let (_, factory) = self
            .factories
            .iter()
            .find(|(n, _)| n == name)
            .ok_or_else(|| ResolveError::Unknown(name.to_string()))?;

        match panic::catch_unwind(AssertUnwindSafe(factory)) {
            Ok(Ok(decoder)) => Ok(decoder),
            Ok(Err(e)) => Err(ResolveError::Failed {
                name: name.to_string(),
                reason: format!("{e:#}"),
            }),
            Err(_) => Err(ResolveError::Panicked(name.to_string())),
        }
    }

    /// Resolve a capability, treating every failure as "no decoder".
    ///
    /// With a preferred name only that decoder is tried. Without one, the
    /// first registered decoder that resolves is used.
    pub fn resolve_capability(&self, preferred: Option<&str>) -> DecoderCapability {
        let resolved = match preferred {
            Some(name) => self
                .resolve(name)
                .map_err(|e| log::debug!("Decoder unavailable: {}", e))
                .ok(),
            None => self.names().find_map(|name| {
                self.resolve(name)
                    .map_err(|e| log::debug!("Decoder unavailable: {}", e))
                    .ok()
            }),
        };

        match &resolved {
            Some(decoder) => log::info!("Using decoder `{}`", decoder.name()),
            None => log::info!("No decoder available, scans will report nothing found"),
        }

        resolved.into()
    }
}
