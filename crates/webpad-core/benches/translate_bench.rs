//! Criterion benchmarks for the input translator.
//!
//! Browsers send input at display refresh rate (60–120 messages per second per
//! player), so translation sits on the hot path of every frame.
//!
//! Run with:
//! ```bash
//! cargo bench --package webpad-core --bench translate_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::{json, Value};
use webpad_core::{translate, GamepadReport};

fn full_payload() -> Value {
    json!({
        "ls": {"x": 0.31, "y": -0.82},
        "rs": {"x": -0.05, "y": 0.4},
        "lt": 0.0,
        "rt": 0.9,
        "buttons": {
            "a": true, "b": false, "x": false, "y": false,
            "lb": false, "rb": true, "view": false, "menu": false, "home": false,
            "dpad-up": false, "dpad-down": false, "dpad-left": false, "dpad-right": false,
            "ls-click": false, "rs-click": false
        }
    })
}

fn bench_translate(c: &mut Criterion) {
    let full = full_payload();
    let sparse = json!({"ls": {"x": 0.5}});
    let junk = json!({"ls": "x", "lt": [1], "buttons": {"future-button": true}});

    let mut group = c.benchmark_group("translate");
    group.bench_function("full_payload", |b| b.iter(|| translate(black_box(&full))));
    group.bench_function("sparse_payload", |b| b.iter(|| translate(black_box(&sparse))));
    group.bench_function("malformed_payload", |b| b.iter(|| translate(black_box(&junk))));
    group.finish();
}

fn bench_translate_and_merge(c: &mut Criterion) {
    let full = full_payload();
    c.bench_function("translate_and_merge", |b| {
        let mut report = GamepadReport::default();
        b.iter(|| {
            let state = translate(black_box(&full));
            report.merge(&state);
            black_box(report.buttons)
        })
    });
}

criterion_group!(benches, bench_translate, bench_translate_and_merge);
criterion_main!(benches);
