//! Criterion benchmarks for the msgbridge frame codec and ordered queue.
//!
//! Run with:
//! ```bash
//! cargo bench --package msgbridge-core --bench frame_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use msgbridge_core::{encode_frame, FrameBuffer, OrderedQueue, WireMessage, FRAME_DELIMITER};
use serde_json::{json, Value};

// ── Fixtures ──────────────────────────────────────────────────────────────────

fn small_payload() -> Value {
    json!({"who": "world"})
}

fn large_payload() -> Value {
    json!({
        "lines": (0..64).map(|i| format!("output line {i}")).collect::<Vec<_>>(),
        "status": {"code": 0, "elapsed_ms": 12.5},
    })
}

fn wire_of(count: usize, payload: &Value) -> Vec<u8> {
    let mut wire = Vec::new();
    for _ in 0..count {
        wire.extend_from_slice(encode_frame("data", payload).unwrap().as_bytes());
        wire.push(FRAME_DELIMITER);
    }
    wire
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_frame");
    for (label, payload) in [("small", small_payload()), ("large", large_payload())] {
        group.bench_with_input(BenchmarkId::from_parameter(label), &payload, |b, p| {
            b.iter(|| encode_frame(black_box("data"), black_box(p)).unwrap())
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_and_validate");
    for (label, payload) in [("small", small_payload()), ("large", large_payload())] {
        let wire = wire_of(100, &payload);
        group.bench_with_input(BenchmarkId::from_parameter(label), &wire, |b, w| {
            b.iter(|| {
                let mut buf = FrameBuffer::default();
                buf.extend(black_box(w));
                let mut n = 0usize;
                while let Some(Ok(value)) = buf.next_frame() {
                    if WireMessage::from_value(value).is_ok() {
                        n += 1;
                    }
                }
                n
            })
        });
    }
    group.finish();
}

fn bench_queue_drain(c: &mut Criterion) {
    c.bench_function("queue_enqueue_drain_1000", |b| {
        b.iter(|| {
            let mut queue = OrderedQueue::new();
            for i in 0..1000u32 {
                let _ = queue.enqueue(black_box(i));
            }
            let mut sum = 0u64;
            while let Ok(v) = queue.dequeue() {
                sum += u64::from(v);
            }
            sum
        })
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_queue_drain);
criterion_main!(benches);
