//! Protocol module containing the wire message type and the line-frame codec.

pub mod codec;
pub mod messages;
pub mod sequence;

pub use codec::{encode_frame, CodecError, FrameBuffer};
pub use messages::{MalformedMessage, WireMessage};
pub use sequence::SequenceCounter;
