//! Typed listener registry.
//!
//! Two tables:
//!
//! - `by_kind`: event kind → listeners, for the broad `message`, `error` and
//!   `presence` events;
//! - `scoped`: message name → listeners that only want that one message's
//!   content.
//!
//! Dispatch never happens while the registry is borrowed.  The bridge takes a
//! snapshot (cloned `Arc`s) under its lock and calls the listeners after
//! releasing it, so a listener may register listeners or send messages.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use msgbridge_core::{PresenceChange, SequenceCounter};
use serde_json::Value;

use crate::domain::BridgeError;

/// Called with the name and content of every valid inbound message.
pub type MessageListener = Arc<dyn Fn(&str, &Value) + Send + Sync>;
/// Called with the content of inbound messages carrying one specific name.
pub type ContentListener = Arc<dyn Fn(&Value) + Send + Sync>;
/// Called for every runtime error the bridge publishes.
pub type ErrorListener = Arc<dyn Fn(&BridgeError) + Send + Sync>;
/// Called once per presence transition.
pub type PresenceListener = Arc<dyn Fn(PresenceChange) + Send + Sync>;

/// Handle returned by every registration; pass it to `remove` to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// The broad (non-scoped) event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Every valid inbound message, whatever its name.
    Message,
    /// Malformed frames, decoder errors and transport failures.
    Error,
    /// `Init → Online`, `Init → Offline` and `Online → Offline`.
    Presence,
}

#[derive(Clone)]
enum Handler {
    Message(MessageListener),
    Error(ErrorListener),
    Presence(PresenceListener),
}

/// Listeners for one bridge.
///
/// Ids come from one counter shared by every kind, so a [`ListenerId`] alone
/// is enough to find and remove a registration.  Within each table listeners
/// are kept in registration order, which is the order they are called in.
pub struct EventRegistry {
    /// Source of listener ids, starting at 1.
    ids: SequenceCounter,
    /// Broad listeners, keyed by the event they want.
    by_kind: HashMap<EventKind, Vec<(ListenerId, Handler)>>,
    /// Content listeners, keyed by exact message name.
    scoped: HashMap<String, Vec<(ListenerId, ContentListener)>>,
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("listeners", &self.len())
            .field("scoped_names", &self.scoped.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl EventRegistry {
    /// Creates a registry with no listeners.
    pub fn new() -> Self {
        Self {
            ids: SequenceCounter::starting_at(1),
            by_kind: HashMap::new(),
            scoped: HashMap::new(),
        }
    }

    /// Registers a listener for every valid inbound message.
    ///
    /// Message listeners run before any listener scoped to the message name.
    pub fn add_message(&mut self, listener: MessageListener) -> ListenerId {
        self.add(EventKind::Message, Handler::Message(listener))
    }

    /// Registers a listener for runtime errors.
    ///
    /// While at least one is registered, errors go only to listeners and are
    /// not logged by the bridge.
    pub fn add_error(&mut self, listener: ErrorListener) -> ListenerId {
        self.add(EventKind::Error, Handler::Error(listener))
    }

    /// Registers a listener for presence transitions.
    pub fn add_presence(&mut self, listener: PresenceListener) -> ListenerId {
        self.add(EventKind::Presence, Handler::Presence(listener))
    }

    /// Registers a listener for messages named exactly `name`.
    pub fn add_scoped(&mut self, name: impl Into<String>, listener: ContentListener) -> ListenerId {
        let id = self.next_id();
        self.scoped.entry(name.into()).or_default().push((id, listener));
        id
    }

    /// Removes a listener of any kind.  Returns `false` if `id` is unknown.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        for handlers in self.by_kind.values_mut() {
            if let Some(pos) = handlers.iter().position(|(hid, _)| *hid == id) {
                handlers.remove(pos);
                return true;
            }
        }
        let mut emptied = None;
        let mut found = false;
        for (name, handlers) in self.scoped.iter_mut() {
            if let Some(pos) = handlers.iter().position(|(hid, _)| *hid == id) {
                handlers.remove(pos);
                found = true;
                if handlers.is_empty() {
                    emptied = Some(name.clone());
                }
                break;
            }
        }
        if let Some(name) = emptied {
            self.scoped.remove(&name);
        }
        found
    }

    /// Total number of registered listeners of every kind.
    pub fn len(&self) -> usize {
        self.by_kind.values().map(Vec::len).sum::<usize>()
            + self.scoped.values().map(Vec::len).sum::<usize>()
    }

    /// `true` when no listener of any kind is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of listeners registered for one broad kind.
    pub fn count(&self, kind: EventKind) -> usize {
        self.by_kind.get(&kind).map_or(0, Vec::len)
    }

    /// Generic listeners followed by the listeners scoped to `name`, in
    /// registration order.
    pub fn message_targets(&self, name: &str) -> (Vec<MessageListener>, Vec<ContentListener>) {
        let generic = self
            .handlers(EventKind::Message)
            .filter_map(|h| match h {
                Handler::Message(l) => Some(Arc::clone(l)),
                _ => None,
            })
            .collect();
        let scoped = self
            .scoped
            .get(name)
            .map(|v| v.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default();
        (generic, scoped)
    }

    /// Snapshot of the error listeners, in registration order.
    ///
    /// Empty means nobody is listening and the caller should log instead.
    pub fn error_targets(&self) -> Vec<ErrorListener> {
        self.handlers(EventKind::Error)
            .filter_map(|h| match h {
                Handler::Error(l) => Some(Arc::clone(l)),
                _ => None,
            })
            .collect()
    }

    /// Snapshot of the presence listeners, in registration order.
    pub fn presence_targets(&self) -> Vec<PresenceListener> {
        self.handlers(EventKind::Presence)
            .filter_map(|h| match h {
                Handler::Presence(l) => Some(Arc::clone(l)),
                _ => None,
            })
            .collect()
    }

    fn handlers(&self, kind: EventKind) -> impl Iterator<Item = &Handler> {
        self.by_kind.get(&kind).into_iter().flatten().map(|(_, h)| h)
    }

    fn add(&mut self, kind: EventKind, handler: Handler) -> ListenerId {
        let id = self.next_id();
        self.by_kind.entry(kind).or_default().push((id, handler));
        id
    }

    fn next_id(&self) -> ListenerId {
        ListenerId(self.ids.next())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
