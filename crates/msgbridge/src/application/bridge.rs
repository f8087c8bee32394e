//! The message bridge: ordered outbound delivery and validated inbound dispatch.
//!
//! # Outbound
//!
//! ```text
//! send(name, content)
//!   → encode_frame           ["name",content]
//!   → queue.enqueue          item-added notice
//!   → flush                  sink bound?  writable?  drain FIFO until empty
//! bind_outbound(sink)
//!   → flush                  frames queued before the sink existed go out now
//! ```
//!
//! # Inbound
//!
//! ```text
//! FrameSource::next_event
//!   Frame(value) → WireMessage::from_value
//!                   ok  → message listeners (name, content), then scoped[name] (content)
//!                   err → error listeners (Malformed)
//!   Error(e)     → error listeners (Decoder)
//!   None         → presence offline
//! ```
//!
//! # Locking
//!
//! Queue, sink and presence sit behind one `std::sync::Mutex`.  `send` holds
//! it across enqueue *and* flush, so two concurrent senders can neither
//! interleave a drain nor miss one.  Listeners are never called with the lock
//! held: every operation collects the events it produced and publishes them
//! after unlocking.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use msgbridge_core::{
    encode_frame, Availability, ItemAdded, OrderedQueue, Presence, PresenceChange,
    SequenceCounter, WireMessage,
};
use serde::Serialize;
use serde_json::Value;
use tokio::io::AsyncRead;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::application::ports::{FrameSource, OutboundSink};
use crate::application::registry::{EventKind, EventRegistry, ListenerId};
use crate::domain::{BridgeConfig, BridgeError, DecoderEvent, Direction, FlushOutcome};
use crate::infrastructure::decoder::SafeFramedDecoder;

/// An event produced while the state lock was held, published afterwards.
enum Pending {
    Error(BridgeError),
    Presence(PresenceChange),
}

struct BridgeState {
    queue: OrderedQueue<String>,
    sink: Option<Box<dyn OutboundSink>>,
    inbound_bound: bool,
    availability: Availability,
}

struct Inner {
    id: Uuid,
    config: BridgeConfig,
    state: Mutex<BridgeState>,
    listeners: Mutex<EventRegistry>,
    frames_out: SequenceCounter,
}

/// Ordered message delivery bridge.
///
/// Cloning is cheap and every clone drives the same bridge.
///
/// # Example
///
/// ```rust
/// use msgbridge::application::MessageBridge;
/// use msgbridge::domain::FlushOutcome;
///
/// let bridge = MessageBridge::default();
/// // No sink yet: the message waits in the queue.
/// let outcome = bridge.send("greet", &serde_json::json!({"who": "world"})).unwrap();
/// assert_eq!(outcome, FlushOutcome::SinkUnbound);
/// assert_eq!(bridge.pending(), 1);
/// ```
#[derive(Clone)]
pub struct MessageBridge {
    inner: Arc<Inner>,
}

impl Default for MessageBridge {
    fn default() -> Self {
        Self::new(BridgeConfig::default())
    }
}

impl std::fmt::Debug for MessageBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBridge")
            .field("id", &self.inner.id)
            .field("pending", &self.pending())
            .field("presence", &self.presence())
            .finish()
    }
}

impl MessageBridge {
    /// Creates an unbound bridge with an empty queue and presence `Init`.
    pub fn new(config: BridgeConfig) -> Self {
        let id = Uuid::new_v4();
        debug!(bridge_id = %id, ?config, "message bridge created");
        Self {
            inner: Arc::new(Inner {
                id,
                config,
                state: Mutex::new(BridgeState {
                    queue: OrderedQueue::new(),
                    sink: None,
                    inbound_bound: false,
                    availability: Availability::new(),
                }),
                listeners: Mutex::new(EventRegistry::new()),
                frames_out: SequenceCounter::starting_at(1),
            }),
        }
    }

    /// Random id for this bridge, attached to every log line it emits.
    ///
    /// Clones share the id.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// The configuration the bridge was created with.
    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }

    // ── Outbound ──────────────────────────────────────────────────────────────

    /// Serializes `[name, content]`, queues it and attempts a flush.
    ///
    /// Never blocks.  Transport trouble is not reported here: a missing or
    /// full sink leaves the frame queued, and a failed write is published to
    /// error listeners.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Serialization`] if `content` cannot be encoded
    /// as JSON.  Nothing is queued in that case.
    pub fn send<T>(&self, name: &str, content: &T) -> Result<FlushOutcome, BridgeError>
    where
        T: Serialize + ?Sized,
    {
        let frame = encode_frame(name, content).map_err(BridgeError::Serialization)?;

        let (outcome, events) = {
            let mut state = self.state();
            let ItemAdded { len } = state.queue.enqueue(frame);
            debug!(bridge_id = %self.inner.id, name, queued = len, "message queued");
            self.flush_locked(&mut state)
        };
        self.publish(events);
        Ok(outcome)
    }

    /// Binds the write side and immediately flushes anything already queued.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::AlreadyBound`] if a sink is already bound; the
    /// existing sink is kept.
    pub fn bind_outbound<S>(&self, sink: S) -> Result<FlushOutcome, BridgeError>
    where
        S: OutboundSink + 'static,
    {
        let (outcome, events) = {
            let mut state = self.state();
            if state.sink.is_some() {
                return Err(BridgeError::AlreadyBound(Direction::Outbound));
            }
            state.sink = Some(Box::new(sink));
            info!(bridge_id = %self.inner.id, queued = state.queue.len(), "outbound sink bound");

            let mut events = Vec::new();
            mark_online_if_ready(&mut state, &mut events);
            let (outcome, flushed) = self.flush_locked(&mut state);
            events.extend(flushed);
            (outcome, events)
        };
        self.publish(events);
        Ok(outcome)
    }

    /// Attempts a flush without queueing anything.
    ///
    /// Safe to call at any time: with no sink, or a sink that is not writable,
    /// it logs and leaves the queue exactly as it was.
    pub fn flush(&self) -> FlushOutcome {
        let (outcome, events) = {
            let mut state = self.state();
            self.flush_locked(&mut state)
        };
        self.publish(events);
        outcome
    }

    fn flush_locked(&self, state: &mut BridgeState) -> (FlushOutcome, Vec<Pending>) {
        let mut events = Vec::new();
        let bridge_id = self.inner.id;

        let Some(sink) = state.sink.as_mut() else {
            warn!(%bridge_id, queued = state.queue.len(), "message sink unavailable");
            return (FlushOutcome::SinkUnbound, events);
        };

        // A failure behind an earlier, already accepted write comes first:
        // its undelivered frames are older than anything still queued.
        if let Some(failure) = sink.take_failure() {
            let recovered = failure.unsent.len();
            for frame in failure.unsent.into_iter().rev() {
                state.queue.requeue_front(frame);
            }
            warn!(
                %bridge_id,
                error = %failure.error,
                recovered,
                queued = state.queue.len(),
                "message sink failed after accepting frames"
            );
            if sink.is_closed() {
                mark_offline(&mut state.availability, &mut events);
            }
            events.push(Pending::Error(BridgeError::Transport(failure.error)));
            return (FlushOutcome::Failed { written: 0 }, events);
        }

        if state.queue.is_empty() {
            return (FlushOutcome::Drained(0), events);
        }
        if !sink.is_writable() {
            warn!(%bridge_id, queued = state.queue.len(), "message sink not writable");
            if sink.is_closed() {
                mark_offline(&mut state.availability, &mut events);
            }
            return (FlushOutcome::SinkNotWritable, events);
        }

        // One writability check per flush, then the whole backlog.
        let mut written = 0;
        while let Ok(frame) = state.queue.dequeue() {
            if let Err(err) = sink.write(&frame) {
                state.queue.requeue_front(frame);
                warn!(%bridge_id, error = %err, queued = state.queue.len(), "frame write failed");
                if sink.is_closed() {
                    mark_offline(&mut state.availability, &mut events);
                }
                events.push(Pending::Error(BridgeError::Transport(err)));
                return (FlushOutcome::Failed { written }, events);
            }
            written += 1;
            let seq = self.inner.frames_out.next();
            if self.inner.config.log_frames {
                debug!(%bridge_id, seq, %frame, "frame written");
            }
        }
        (FlushOutcome::Drained(written), events)
    }

    // ── Inbound ───────────────────────────────────────────────────────────────

    /// Binds a raw reader as the read side.
    ///
    /// The reader is wrapped in a [`SafeFramedDecoder`] honouring
    /// `config.max_frame_bytes` and polled on a spawned tokio task.  The
    /// returned handle completes when the stream ends.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::AlreadyBound`] if a read side is already bound.
    /// - [`BridgeError::NoRuntime`] if called outside a tokio runtime.
    pub fn bind_inbound<R>(&self, reader: R) -> Result<JoinHandle<()>, BridgeError>
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let decoder = SafeFramedDecoder::new(reader, self.inner.config.max_frame_bytes);
        self.bind_source(decoder)
    }

    /// Binds an already-decoding frame source as the read side.
    ///
    /// Use this when the host has its own framing, or an object stream of
    /// JSON values.
    ///
    /// # Errors
    ///
    /// Same as [`bind_inbound`](Self::bind_inbound).
    pub fn bind_source<S>(&self, mut source: S) -> Result<JoinHandle<()>, BridgeError>
    where
        S: FrameSource + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| BridgeError::NoRuntime)?;

        let mut events = Vec::new();
        {
            let mut state = self.state();
            if state.inbound_bound {
                return Err(BridgeError::AlreadyBound(Direction::Inbound));
            }
            state.inbound_bound = true;
            mark_online_if_ready(&mut state, &mut events);
        }
        info!(bridge_id = %self.inner.id, "inbound stream bound");
        self.publish(events);

        let bridge = self.clone();
        let span = info_span!("inbound", bridge_id = %self.inner.id);
        Ok(runtime.spawn(
            async move {
                while let Some(event) = source.next_event().await {
                    match event {
                        DecoderEvent::Frame(value) => bridge.handle_frame(value),
                        DecoderEvent::Error(err) => bridge.emit_error(BridgeError::Decoder(err)),
                    }
                }
                bridge.inbound_ended();
            }
            .instrument(span),
        ))
    }

    /// Validates one decoded inbound value and dispatches it.
    ///
    /// A well-formed `[name, content]` goes to every message listener and then
    /// to the listeners scoped to `name`.  Anything else produces exactly one
    /// [`BridgeError::Malformed`] error event and is dropped.
    pub fn handle_frame(&self, value: Value) {
        let message = match WireMessage::from_value(value) {
            Ok(message) => message,
            Err(malformed) => {
                debug!(bridge_id = %self.inner.id, %malformed, "inbound frame rejected");
                self.emit_error(BridgeError::Malformed(malformed));
                return;
            }
        };

        let (name, content) = message.into_parts();
        if self.inner.config.log_frames {
            debug!(bridge_id = %self.inner.id, name, %content, "frame received");
        }
        let (generic, scoped) = self.listeners().message_targets(&name);
        for listener in generic {
            listener(&name, &content);
        }
        for listener in scoped {
            listener(&content);
        }
    }

    fn inbound_ended(&self) {
        info!(bridge_id = %self.inner.id, "inbound stream ended");
        let mut events = Vec::new();
        mark_offline(&mut self.state().availability, &mut events);
        self.publish(events);
    }

    // ── Listeners ─────────────────────────────────────────────────────────────

    /// Subscribes to every valid inbound message.
    pub fn on_message<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&str, &Value) + Send + Sync + 'static,
    {
        self.listeners().add_message(Arc::new(listener))
    }

    /// Subscribes to the content of inbound messages named exactly `name`.
    pub fn on_scoped<F>(&self, name: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.listeners().add_scoped(name, Arc::new(listener))
    }

    /// Subscribes to runtime errors (malformed frames, decoder and transport
    /// failures).
    pub fn on_error<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&BridgeError) + Send + Sync + 'static,
    {
        self.listeners().add_error(Arc::new(listener))
    }

    /// Subscribes to presence transitions.
    pub fn on_presence<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(PresenceChange) + Send + Sync + 'static,
    {
        self.listeners().add_presence(Arc::new(listener))
    }

    /// Unsubscribes a listener.  Returns `false` if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners().remove(id)
    }

    /// Total number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners().len()
    }

    fn emit_error(&self, err: BridgeError) {
        let targets = self.listeners().error_targets();
        if targets.is_empty() {
            error!(bridge_id = %self.inner.id, error = %err, "unhandled bridge error");
            return;
        }
        for listener in targets {
            listener(&err);
        }
    }

    fn publish(&self, events: Vec<Pending>) {
        for event in events {
            match event {
                Pending::Error(err) => self.emit_error(err),
                Pending::Presence(change) => {
                    info!(bridge_id = %self.inner.id, from = %change.from, to = %change.to, "presence changed");
                    let targets = self.listeners().presence_targets();
                    for listener in targets {
                        listener(change);
                    }
                }
            }
        }
    }

    // ── Introspection ─────────────────────────────────────────────────────────

    /// Number of frames waiting in the queue.
    pub fn pending(&self) -> usize {
        self.state().queue.len()
    }

    /// Current presence.  `Online` once both streams are bound, `Offline`
    /// once the inbound stream ends or the sink closes.
    pub fn presence(&self) -> Presence {
        self.state().availability.presence()
    }

    /// `true` once an inbound reader or source has been bound.  Stays `true`
    /// after the stream ends.
    pub fn is_inbound_bound(&self) -> bool {
        self.state().inbound_bound
    }

    /// `true` once an outbound sink has been bound.
    pub fn is_outbound_bound(&self) -> bool {
        self.state().sink.is_some()
    }

    /// Number of broad listeners of one kind (diagnostics).
    pub fn listener_count_for(&self, kind: EventKind) -> usize {
        self.listeners().count(kind)
    }

    fn state(&self) -> MutexGuard<'_, BridgeState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn listeners(&self) -> MutexGuard<'_, EventRegistry> {
        self.inner.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn mark_online_if_ready(state: &mut BridgeState, events: &mut Vec<Pending>) {
    if state.inbound_bound && state.sink.is_some() {
        if let Ok(change) = state.availability.go_online() {
            events.push(Pending::Presence(change));
        }
    }
}

fn mark_offline(availability: &mut Availability, events: &mut Vec<Pending>) {
    if let Ok(change) = availability.go_offline() {
        events.push(Pending::Presence(change));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
