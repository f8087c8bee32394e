//! # msgbridge-core
//!
//! Shared foundation for the msgbridge ordered message bridge.  Everything in
//! this crate is plain data and pure functions: no async runtime, no sockets,
//! no file handles.
//!
//! # Architecture overview (for beginners)
//!
//! A message bridge sits between code that wants to say "send message
//! `greet` with payload `{"who": "world"}`" and a pair of byte streams that
//! may or may not exist yet.  This crate defines the pieces that do not care
//! *how* those streams are driven:
//!
//! - **`protocol`** – What a message looks like on the wire.  Every frame is
//!   a two-element JSON array `[name, content]` terminated by a newline.  The
//!   codec turns messages into frames and splits a byte stream back into
//!   frames.
//!
//! - **`queue`** – The ordered (FIFO) buffer that holds serialized frames
//!   until a writable sink is attached.
//!
//! - **`domain`** – The availability (presence) state machine that tracks
//!   whether a bridge currently has a usable connection.

pub mod domain;
pub mod protocol;
pub mod queue;

// Re-export the most-used types at the crate root so callers can write
// `msgbridge_core::WireMessage` instead of the full module path.
pub use domain::availability::{Availability, AvailabilityError, Presence, PresenceChange};
pub use protocol::codec::{
    encode_frame, CodecError, FrameBuffer, DEFAULT_MAX_FRAME_BYTES, FRAME_DELIMITER,
};
pub use protocol::messages::{MalformedMessage, WireMessage};
pub use protocol::sequence::SequenceCounter;
pub use queue::{ItemAdded, OrderedQueue, QueueError};
