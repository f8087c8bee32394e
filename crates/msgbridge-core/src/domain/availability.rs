//! Availability (presence) state machine.
//!
//! ```text
//!            go_online()
//!   Init ───────────────▶ Online
//!     │                     │
//!     │ go_offline()        │ go_offline()
//!     ▼                     ▼
//!   Offline ◀───────────────┘
//! ```
//!
//! `Offline` is terminal: the transports a bridge binds are one-shot, so once
//! either side is gone the bridge never becomes usable again.
//!
//! The machine does not call anyone.  Each successful transition returns a
//! [`PresenceChange`] and the owner decides who to tell; this keeps the type
//! free of callbacks and lets the bridge notify listeners outside its lock.

use std::fmt;

use thiserror::Error;

/// Whether the owning bridge currently has a usable connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Presence {
    /// Constructed; not every direction has been bound yet.
    #[default]
    Init,
    /// Both directions bound and the sink has not reported itself closed.
    Online,
    /// A direction has ended; terminal.
    Offline,
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Presence::Init => "init",
            Presence::Online => "online",
            Presence::Offline => "offline",
        };
        f.write_str(label)
    }
}

/// Record of one successful transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceChange {
    pub from: Presence,
    pub to: Presence,
}

/// Errors returned for transitions the machine does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AvailabilityError {
    #[error("invalid presence transition: {from} -> {to}")]
    InvalidTransition { from: Presence, to: Presence },
}

/// The presence state machine.
#[derive(Debug, Default)]
pub struct Availability {
    state: Presence,
}

impl Availability {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current presence.
    pub fn presence(&self) -> Presence {
        self.state
    }

    /// `Init → Online`.
    ///
    /// # Errors
    ///
    /// [`AvailabilityError::InvalidTransition`] from `Online` or `Offline`.
    pub fn go_online(&mut self) -> Result<PresenceChange, AvailabilityError> {
        match self.state {
            Presence::Init => Ok(self.set(Presence::Online)),
            from => Err(AvailabilityError::InvalidTransition {
                from,
                to: Presence::Online,
            }),
        }
    }

    /// `Init | Online → Offline`.
    ///
    /// # Errors
    ///
    /// [`AvailabilityError::InvalidTransition`] if already `Offline`.
    pub fn go_offline(&mut self) -> Result<PresenceChange, AvailabilityError> {
        match self.state {
            Presence::Init | Presence::Online => Ok(self.set(Presence::Offline)),
            Presence::Offline => Err(AvailabilityError::InvalidTransition {
                from: Presence::Offline,
                to: Presence::Offline,
            }),
        }
    }

    fn set(&mut self, to: Presence) -> PresenceChange {
        let from = std::mem::replace(&mut self.state, to);
        PresenceChange { from, to }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
