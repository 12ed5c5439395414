pub mod config;
pub mod decoder;
pub mod error;
pub mod facade;
pub mod options;
pub mod payload;
pub mod resolve;
pub mod result;
pub mod sample;
pub mod slot;
pub mod toggle;

// Re-export commonly used types
pub use config::ScanConfig;
pub use decoder::{CodeDecoder, DecoderCapability, FnDecoder};
pub use error::{ConfigError, DecodeError, PayloadError, ResolveError};
pub use facade::Scanner;
pub use options::DecodeOptions;
pub use payload::ItemPayload;
pub use resolve::DecoderRegistry;
pub use result::{DecodeResult, DecodedCode, Location, Point};
pub use sample::{Channels, ImageSample};
pub use slot::DecoderSlot;
pub use toggle::{ToggleReactor, ToggleRegistry};
