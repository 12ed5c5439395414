//! Shared slot a decoding engine installs itself into

use std::sync::Arc;

use parking_lot::RwLock;

use crate::decoder::{CodeDecoder, DecoderCapability};

/// Holds the current [`DecoderCapability`]. Writers swap the whole value and
/// readers take a cloned snapshot, so a reader sees either the old or the new
/// capability, never a mix.
#[derive(Debug, Default)]
pub struct DecoderSlot {
    current: RwLock<DecoderCapability>,
}

impl DecoderSlot {
    pub fn new(capability: DecoderCapability) -> Self {
        Self {
            current: RwLock::new(capability),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn shared(capability: DecoderCapability) -> Arc<Self> {
        Arc::new(Self::new(capability))
    }

    pub fn install(&self, decoder: Arc<dyn CodeDecoder>) -> DecoderCapability {
        log::info!("Installing decoder `{}`", decoder.name());
        self.set(DecoderCapability::Real(decoder))
    }

    /// Replace the capability, returning the previous one.
    pub fn set(&self, capability: DecoderCapability) -> DecoderCapability {
        std::mem::replace(&mut *self.current.write(), capability)
    }

    pub fn clear(&self) -> DecoderCapability {
        self.set(DecoderCapability::NoDecoder)
    }

    pub fn capability(&self) -> DecoderCapability {
        self.current.read().clone()
    }

    pub fn is_installed(&self) -> bool {
        self.current.read().is_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::FnDecoder;
    use crate::result::DecodeResult;

    fn nothing() -> Arc<dyn CodeDecoder> {
        Arc::new(FnDecoder::new("nothing", |_, _| DecodeResult::NotFound))
    }

    #[test]
    fn starts_empty() {
        let slot = DecoderSlot::empty();
        assert!(!slot.is_installed());
        assert!(slot.capability().name().is_none());
    }

    #[test]
    fn install_replaces_and_returns_previous() {
        let slot = DecoderSlot::empty();
        let previous = slot.install(nothing());
        assert!(!previous.is_available());
        assert_eq!(slot.capability().name(), Some("nothing"));

        let previous = slot.clear();
        assert_eq!(previous.name(), Some("nothing"));
        assert!(!slot.is_installed());
    }

    #[test]
    fn snapshot_survives_later_writes() {
        let slot = DecoderSlot::shared(DecoderCapability::Real(nothing()));
        let snapshot = slot.capability();
        slot.clear();
        assert!(snapshot.is_available());
    }

    #[test]
    fn concurrent_installs_leave_one_winner() {
        let slot = DecoderSlot::shared(DecoderCapability::NoDecoder);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let slot = Arc::clone(&slot);
                std::thread::spawn(move || {
                    let name = format!("decoder-{i}");
                    slot.install(Arc::new(FnDecoder::new(name, |_, _| DecodeResult::NotFound)));
                    slot.capability().is_available()
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        let name = slot.capability().name().map(str::to_owned).unwrap();
        assert!(name.starts_with("decoder-"));
    }
}
