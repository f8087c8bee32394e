//! Outbound sinks backed by a tokio channel.
//!
//! The bridge writes synchronously and must never block, so the sink it owns
//! is the sending half of an `mpsc` channel.  A separate task owns the real
//! writer and drains the channel:
//!
//! ```text
//! MessageBridge ── write(frame) ──▶ ChannelSink ──mpsc──▶ line writer task ──▶ AsyncWrite
//!                                   depth += 1             frame + "\n", flush, depth -= 1
//! ```
//!
//! # Backpressure
//!
//! The bridge checks writability once per flush and then hands over its whole
//! backlog, so the channel is unbounded and `write` never refuses for lack of
//! room.  The configured capacity is a *high-water mark* instead: while
//! `depth` (frames accepted but not yet written) is at or above it,
//! [`is_writable`](OutboundSink::is_writable) says no and the bridge keeps new
//! frames in its own queue until the next trigger.
//!
//! # Failures
//!
//! A frame accepted by the channel is not yet on the wire.  If the writer
//! later fails, the task closes the channel, collects the failed frame plus
//! everything still buffered, and parks them with the error in a shared
//! slot.  The bridge picks the slot up through
//! [`take_failure`](OutboundSink::take_failure) on its next flush, puts the
//! frames back at the head of its queue and publishes a transport error.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use msgbridge_core::FRAME_DELIMITER;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::application::ports::OutboundSink;
use crate::domain::{SinkError, SinkFailure};

/// State shared between a [`ChannelSink`] and the task draining its channel.
#[derive(Debug, Default)]
struct SinkShared {
    /// Frames accepted by the sink and not yet written by the task.
    depth: AtomicUsize,
    /// Set once by the task when its writer fails; taken once by the bridge.
    failure: Mutex<Option<SinkFailure>>,
}

/// [`OutboundSink`] over an `mpsc::UnboundedSender<String>`.
///
/// Clones share the channel, the depth counter and the failure slot.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<String>,
    shared: Arc<SinkShared>,
    /// At least 1.
    high_water: usize,
}

impl ChannelSink {
    /// Number of frames accepted but not yet written by the receiving side.
    pub fn depth(&self) -> usize {
        self.shared.depth.load(Ordering::Acquire)
    }

    /// Depth at which the sink stops reporting itself writable.
    pub fn high_water(&self) -> usize {
        self.high_water
    }
}

impl OutboundSink for ChannelSink {
    fn is_writable(&self) -> bool {
        !self.tx.is_closed() && self.depth() < self.high_water
    }

    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn write(&mut self, frame: &str) -> Result<(), SinkError> {
        self.shared.depth.fetch_add(1, Ordering::AcqRel);
        self.tx.send(frame.to_owned()).map_err(|_| {
            release_one(&self.shared.depth);
            SinkError::Closed
        })
    }

    fn take_failure(&mut self) -> Option<SinkFailure> {
        lock(&self.shared.failure).take()
    }
}

/// Receiving half of a [`ChannelSink`].
///
/// Whoever drains it must call [`frame_done`](Self::frame_done) after each
/// frame is really written, and [`fail`](Self::fail) if writing stops.
#[derive(Debug)]
pub struct SinkReceiver {
    rx: mpsc::UnboundedReceiver<String>,
    shared: Arc<SinkShared>,
}

impl SinkReceiver {
    /// Waits for the next frame.  `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Marks one received frame as written.
    pub fn frame_done(&self) {
        release_one(&self.shared.depth);
    }

    /// Closes the channel and parks `error` with `failed` and every frame
    /// still buffered, for the bridge to recover on its next flush.
    ///
    /// Returns the number of frames parked.
    pub fn fail(mut self, error: SinkError, failed: Option<String>) -> usize {
        // Holding the slot while closing keeps a concurrent `take_failure`
        // from seeing a closed channel with an empty slot.
        let mut slot = lock(&self.shared.failure);
        self.rx.close();
        let mut unsent: Vec<String> = failed.into_iter().collect();
        while let Ok(frame) = self.rx.try_recv() {
            unsent.push(frame);
        }
        self.shared.depth.store(0, Ordering::Release);
        let parked = unsent.len();
        *slot = Some(SinkFailure { error, unsent });
        parked
    }
}

/// Saturating decrement; `fail` may have reset the depth underneath.
fn release_one(depth: &AtomicUsize) {
    let _ = depth.fetch_update(Ordering::AcqRel, Ordering::Acquire, |d| Some(d.saturating_sub(1)));
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Creates a sink and the receiver its frames arrive on.
///
/// `high_water` is the depth at which the sink reports backpressure; zero is
/// raised to one.
pub fn channel_sink(high_water: usize) -> (ChannelSink, SinkReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let shared = Arc::new(SinkShared::default());
    let sink = ChannelSink {
        tx,
        shared: Arc::clone(&shared),
        high_water: high_water.max(1),
    };
    (sink, SinkReceiver { rx, shared })
}

/// Spawns a task that writes every frame, newline-terminated, to `writer`.
///
/// The task flushes after each frame and ends once every `ChannelSink` clone
/// has been dropped, returning the number of frames written.  A write error
/// ends the task early; the failed frame and everything still buffered are
/// handed back to the bridge through [`OutboundSink::take_failure`], and the
/// sink reports itself closed from then on.
///
/// Must be called from within a tokio runtime.
pub fn spawn_line_writer<W>(
    writer: W,
    high_water: usize,
) -> (ChannelSink, JoinHandle<std::io::Result<u64>>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (sink, rx) = channel_sink(high_water);
    let handle = tokio::spawn(write_lines(writer, rx));
    (sink, handle)
}

async fn write_lines<W>(mut writer: W, mut rx: SinkReceiver) -> std::io::Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0u64;
    while let Some(frame) = rx.recv().await {
        if let Err(e) = write_line(&mut writer, &frame).await {
            let reported = std::io::Error::new(e.kind(), e.to_string());
            let parked = rx.fail(SinkError::Io(reported), Some(frame));
            warn!(error = %e, written, parked, "line writer failed");
            return Err(e);
        }
        rx.frame_done();
        written += 1;
    }
    debug!(written, "line writer finished");
    Ok(written)
}

async fn write_line<W>(writer: &mut W, frame: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(frame.as_bytes()).await?;
    writer.write_all(&[FRAME_DELIMITER]).await?;
    writer.flush().await
}

// ── Tests ─────────────────────────────────────────────────────────────────────
