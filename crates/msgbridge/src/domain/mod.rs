//! Domain layer for msgbridge.
//!
//! Pure types with no dependencies on I/O or the async runtime.
//!
//! # What belongs in the domain layer?
//!
//! - Runtime configuration ([`BridgeConfig`])
//! - The error taxonomy surfaced to callers and error listeners
//! - Event payload types shared by the application and infrastructure layers
//!
//! # What does NOT belong here?
//!
//! - `tokio` types, readers, writers, channels
//! - Reading configuration files (that is `infrastructure::config_file`)

pub mod config;
pub mod error;
pub mod events;

pub use config::BridgeConfig;
pub use error::{BridgeError, DecodeError, Direction, SinkError};
pub use events::{DecoderEvent, FlushOutcome, SinkFailure};
