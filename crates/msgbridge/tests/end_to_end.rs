//! End-to-end tests for the message bridge over in-memory byte pipes.
//!
//! # Purpose
//!
//! These tests wire bridges to `tokio::io::duplex` pipes through the public
//! API only, the same way a host process wires stdin/stdout.  They verify:
//!
//! - Late binding: messages sent before any stream exists arrive, in order,
//!   once the line writer is bound.
//! - A backlog larger than the sink's high-water mark still drains in one go.
//! - A writer that fails after frames were accepted raises one transport
//!   error and the frames it lost are back in the queue.
//! - Request/response between two bridges connected back to back.
//! - Inbound robustness: malformed frames and undecodable lines become error
//!   events while the stream keeps going.
//!
//! ```text
//! bridge A ── ChannelSink ─▶ line writer ─▶ duplex ─▶ SafeFramedDecoder ─▶ bridge B
//!    ▲                                                                        │
//!    └──── SafeFramedDecoder ◀─ duplex ◀─ line writer ◀─ ChannelSink ─────────┘
//! ```

use std::time::Duration;

use msgbridge::infrastructure::spawn_line_writer;
use msgbridge::{BridgeConfig, BridgeError, FlushOutcome, MessageBridge, SinkError};
use msgbridge_core::Presence;
use serde_json::{json, Value};
use tokio::io::{duplex, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

// ── Outbound ──────────────────────────────────────────────────────────────────

/// Three sends with no sink, then a bind: the peer reads exactly three lines
/// in send order.
#[tokio::test]
async fn test_late_bound_writer_receives_backlog_in_order() -> anyhow::Result<()> {
    // Arrange
    let bridge = MessageBridge::new(BridgeConfig::default());
    for (i, name) in ["first", "second", "third"].iter().enumerate() {
        assert_eq!(bridge.send(name, &i)?, FlushOutcome::SinkUnbound);
    }
    let (ours, theirs) = duplex(4096);
    let (sink, _writer) = spawn_line_writer(ours, bridge.config().sink_capacity);

    // Act
    let outcome = bridge.bind_outbound(sink)?;

    // Assert
    assert_eq!(outcome, FlushOutcome::Drained(3));
    let mut lines = BufReader::new(theirs).lines();
    let mut received = Vec::new();
    for _ in 0..3 {
        let line = timeout(WAIT, lines.next_line()).await??;
        received.push(line.unwrap_or_default());
    }
    assert_eq!(
        received,
        vec![r#"["first",0]"#, r#"["second",1]"#, r#"["third",2]"#]
    );
    Ok(())
}

/// Five queued messages and a writer whose high-water mark is two: binding
/// delivers all five without any further send.
#[tokio::test]
async fn test_backlog_above_high_water_is_fully_delivered_on_bind() -> anyhow::Result<()> {
    // Arrange
    let bridge = MessageBridge::default();
    for i in 0..5 {
        bridge.send("n", &i)?;
    }
    let (ours, theirs) = duplex(4096);
    let (sink, _writer) = spawn_line_writer(ours, 2);

    // Act
    let outcome = bridge.bind_outbound(sink)?;

    // Assert
    assert_eq!(outcome, FlushOutcome::Drained(5));
    assert_eq!(bridge.pending(), 0);
    let mut lines = BufReader::new(theirs).lines();
    for i in 0..5 {
        let line = timeout(WAIT, lines.next_line()).await??;
        assert_eq!(line, Some(format!("[\"n\",{i}]")));
    }
    Ok(())
}

/// The writer dies on its first write.  The frame it took is not reported as
/// lost silently: the next send raises exactly one transport error and both
/// frames are queued again, oldest first.
#[tokio::test]
async fn test_failing_writer_raises_one_error_and_keeps_frames() -> anyhow::Result<()> {
    // Arrange
    let bridge = MessageBridge::default();
    let (err_tx, mut err_rx) = mpsc::unbounded_channel::<String>();
    bridge.on_error(move |err| {
        let kind = match err {
            BridgeError::Transport(SinkError::Io(_)) => "transport-io".to_string(),
            other => other.to_string(),
        };
        let _ = err_tx.send(kind);
    });
    let writer = tokio_test::io::Builder::new()
        .write_error(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"))
        .build();
    let (sink, writer_task) = spawn_line_writer(writer, 8);
    bridge.bind_outbound(sink)?;

    // Act
    assert_eq!(bridge.send("a", &1)?, FlushOutcome::Drained(1));
    assert!(timeout(WAIT, writer_task).await??.is_err());
    let second = bridge.send("b", &2)?;
    let third = bridge.flush();

    // Assert
    assert_eq!(second, FlushOutcome::Failed { written: 0 });
    assert_eq!(third, FlushOutcome::SinkNotWritable);
    assert_eq!(bridge.pending(), 2);
    assert_eq!(bridge.presence(), Presence::Offline);
    assert_eq!(err_rx.try_recv()?, "transport-io");
    assert!(err_rx.try_recv().is_err());
    Ok(())
}

// ── Round trip ────────────────────────────────────────────────────────────────

/// Bridge A pings bridge B before either is wired; B answers from a scoped
/// listener and A's scoped listener sees the pong.
#[tokio::test]
async fn test_ping_pong_between_two_bridges() -> anyhow::Result<()> {
    // Arrange
    let a = MessageBridge::default();
    let b = MessageBridge::default();

    let responder = b.clone();
    b.on_scoped("ping", move |content| {
        let _ = responder.send("pong", content);
    });
    let (pong_tx, mut pong_rx) = mpsc::unbounded_channel::<Value>();
    a.on_scoped("pong", move |content| {
        let _ = pong_tx.send(content.clone());
    });

    a.send("ping", &json!({"seq": 1}))?;

    // Act: wire A → B and B → A
    let (a_out, b_in) = duplex(4096);
    let (b_out, a_in) = duplex(4096);
    let (a_sink, _a_writer) = spawn_line_writer(a_out, 16);
    let (b_sink, _b_writer) = spawn_line_writer(b_out, 16);
    b.bind_inbound(b_in)?;
    b.bind_outbound(b_sink)?;
    a.bind_inbound(a_in)?;
    a.bind_outbound(a_sink)?;

    // Assert
    let pong = timeout(WAIT, pong_rx.recv()).await?;
    assert_eq!(pong, Some(json!({"seq": 1})));
    assert_eq!(a.presence(), Presence::Online);
    assert_eq!(b.presence(), Presence::Online);
    assert_eq!(a.pending(), 0);
    Ok(())
}

// ── Inbound robustness ────────────────────────────────────────────────────────

/// Every bad line yields one error event; the one good line still arrives and
/// the stream ends normally.
#[tokio::test]
async fn test_bad_frames_become_errors_and_stream_continues() -> anyhow::Result<()> {
    // Arrange
    let bridge = MessageBridge::default();
    let (err_tx, mut err_rx) = mpsc::unbounded_channel::<String>();
    bridge.on_error(move |err| {
        let kind = match err {
            BridgeError::Malformed(_) => "malformed",
            BridgeError::Decoder(_) => "decoder",
            _ => "other",
        };
        let _ = err_tx.send(kind.to_string());
    });
    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<(String, Value)>();
    bridge.on_message(move |name, content| {
        let _ = msg_tx.send((name.to_string(), content.clone()));
    });

    let (mut peer, ours) = duplex(4096);
    let inbound = bridge.bind_inbound(ours)?;

    // Act
    peer.write_all(b"\"hello\"\n[\"ok\"]\n[42,\"x\"]\n{not json\n\n[\"good\",1]\n")
        .await?;
    drop(peer);
    timeout(WAIT, inbound).await??;

    // Assert
    let mut errors = Vec::new();
    while let Ok(kind) = err_rx.try_recv() {
        errors.push(kind);
    }
    assert_eq!(errors, vec!["malformed", "malformed", "malformed", "decoder"]);
    assert_eq!(msg_rx.try_recv()?, ("good".to_string(), json!(1)));
    assert!(msg_rx.try_recv().is_err());
    assert_eq!(bridge.presence(), Presence::Offline);
    Ok(())
}

/// A line over the configured limit is reported and skipped.
#[tokio::test]
async fn test_oversized_inbound_line_is_skipped() -> anyhow::Result<()> {
    // Arrange
    let config = BridgeConfig {
        max_frame_bytes: 64,
        ..BridgeConfig::default()
    };
    let bridge = MessageBridge::new(config);
    let (err_tx, mut err_rx) = mpsc::unbounded_channel::<String>();
    bridge.on_error(move |err| {
        let _ = err_tx.send(err.to_string());
    });
    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<String>();
    bridge.on_scoped("small", move |content| {
        let _ = msg_tx.send(content.to_string());
    });

    let (mut peer, ours) = duplex(4096);
    let inbound = bridge.bind_inbound(ours)?;

    // Act
    let big = format!("[\"big\",\"{}\"]\n", "x".repeat(200));
    peer.write_all(big.as_bytes()).await?;
    peer.write_all(b"[\"small\",\"ok\"]\n").await?;
    drop(peer);
    timeout(WAIT, inbound).await??;

    // Assert
    assert!(err_rx.try_recv()?.contains("64"));
    assert!(err_rx.try_recv().is_err());
    assert_eq!(msg_rx.try_recv()?, "\"ok\"");
    Ok(())
}

/// Object-mode input: already-decoded values fed through a channel.
#[tokio::test]
async fn test_channel_source_dispatches_values() -> anyhow::Result<()> {
    let bridge = MessageBridge::default();
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel::<Value>();
    bridge.on_scoped("greet", move |content| {
        let _ = seen_tx.send(content.clone());
    });

    let (tx, rx) = mpsc::channel::<Value>(4);
    let inbound = bridge.bind_source(rx)?;
    tx.send(json!(["greet", {"who": "world"}])).await?;
    drop(tx);
    timeout(WAIT, inbound).await??;

    assert_eq!(seen_rx.try_recv()?, json!({"who": "world"}));
    Ok(())
}
