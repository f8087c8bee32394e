//! msgbridge library crate.
//!
//! An ordered message delivery bridge.  Producers call
//! [`MessageBridge::send`](application::MessageBridge::send) with a name and a
//! payload whether or not an output stream exists yet; the bridge queues the
//! serialized frame and drains the queue, in order, as soon as a writable sink
//! is bound.  In the other direction it decodes a newline-delimited JSON
//! stream, checks every frame has the `[name, content]` shape, and republishes
//! it to listeners both as a generic message event and as an event scoped to
//! the message name.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! producers ── send(name, content) ──┐          ┌── on_message / on_scoped
//!                                     ▼          │
//! [msgbridge]                    MessageBridge ──┘
//!   ├── domain/          BridgeConfig, error taxonomy, event types
//!   ├── application/     MessageBridge, EventRegistry, sink/source ports
//!   └── infrastructure/
//!         ├── decoder    SafeFramedDecoder over any AsyncRead
//!         ├── sink       ChannelSink + line writer over any AsyncWrite
//!         ├── config_file  TOML loading for BridgeConfig
//!         └── logging    tracing-subscriber setup
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async runtime.
//! - `application` depends on `domain`, `msgbridge-core`, and the ports it
//!   defines.  `bind_inbound` is the one place it reaches into
//!   `infrastructure`, to wrap a raw reader in the safe decoder.
//! - `infrastructure` implements the ports with `tokio`.
//!
//! # Error listeners
//!
//! Runtime failures (malformed inbound frames, decoder errors, sink write
//! failures) are delivered as events, never returned.  Register
//! [`on_error`](application::MessageBridge::on_error); without one the bridge
//! can only log them at `error` level.

/// Domain layer: configuration, errors and event types (no I/O).
pub mod domain;

/// Application layer: the bridge, its listener registry and its ports.
pub mod application;

/// Infrastructure layer: tokio decoder, channel sink, config files, logging.
pub mod infrastructure;

pub use application::{FlushOutcome, FrameSource, ListenerId, MessageBridge, OutboundSink};
pub use domain::{BridgeConfig, BridgeError, DecodeError, Direction, SinkError, SinkFailure};
pub use msgbridge_core::{Presence, PresenceChange};
