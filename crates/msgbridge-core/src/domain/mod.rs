//! Domain layer for msgbridge-core.
//!
//! Pure state with no I/O.  Currently this is the availability (presence)
//! state machine that a bridge composes to report whether it has a usable
//! connection.

pub mod availability;

pub use availability::{Availability, AvailabilityError, Presence, PresenceChange};
