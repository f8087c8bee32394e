//! Application layer for msgbridge.
//!
//! # Responsibilities
//!
//! - Serializing outbound messages and queueing them in send order
//! - Flushing the queue whenever a message is queued or a sink is bound
//! - Validating decoded inbound values and dispatching them to listeners
//! - Tracking presence through the composed availability state machine
//!
//! # What does NOT belong here?
//!
//! - Reading bytes or splitting lines (the decoder in `infrastructure`)
//! - Writing bytes to a file descriptor (the line writer in `infrastructure`)

pub mod bridge;
pub mod ports;
pub mod registry;

pub use crate::domain::FlushOutcome;
pub use bridge::MessageBridge;
pub use ports::{FrameSource, OutboundSink};
pub use registry::{EventKind, EventRegistry, ListenerId};
