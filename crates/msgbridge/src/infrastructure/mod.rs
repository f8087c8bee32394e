//! Infrastructure layer for msgbridge.
//!
//! The infrastructure layer handles all I/O: reading inbound bytes, writing
//! outbound lines, loading config files and installing the log subscriber.
//!
//! # Responsibilities
//!
//! - Splitting an `AsyncRead` into JSON frames without ever panicking
//! - Backing [`OutboundSink`](crate::application::OutboundSink) with a
//!   channel and a line-writer task
//! - Reading [`BridgeConfig`](crate::domain::BridgeConfig) from TOML
//! - `tracing-subscriber` setup for hosts that have none
//!
//! # What does NOT belong here?
//!
//! - Queueing, ordering and dispatch (that is the application layer)
//! - Error and config type definitions (that is the domain layer)

pub mod config_file;
pub mod decoder;
pub mod logging;
pub mod sink;

pub use config_file::ConfigError;
pub use decoder::SafeFramedDecoder;
pub use logging::init_tracing;
pub use sink::{channel_sink, spawn_line_writer, ChannelSink, SinkReceiver};
