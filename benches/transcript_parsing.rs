use std::hint::black_box;

use convo_viewer::classifier::Thread;
use convo_viewer::parsers::parse_transcript;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

/// Generate a transcript with N user/assistant exchanges, each with one tool call
fn generate_transcript(exchanges: usize) -> String {
    let mut lines = Vec::with_capacity(exchanges * 3);
    for i in 0..exchanges {
        lines.push(format!(
            r#"{{"type":"user","uuid":"u{i}","timestamp":"2025-01-15T10:30:00.000Z","isSidechain":false,"message":{{"role":"user","content":"Prompt number {i}"}}}}"#
        ));
        lines.push(format!(
            r#"{{"type":"assistant","uuid":"a{i}","timestamp":"2025-01-15T10:30:01.000Z","isSidechain":{},"message":{{"role":"assistant","model":"model-a","content":[{{"type":"text","text":"Running it"}},{{"type":"tool_use","id":"toolu_{i}","name":"Bash","input":{{"command":"ls"}}}}]}}}}"#,
            i % 5 == 0
        ));
        lines.push(format!(
            r#"{{"type":"user","uuid":"r{i}","timestamp":"2025-01-15T10:30:02.000Z","isSidechain":false,"message":{{"role":"user","content":[{{"type":"tool_result","tool_use_id":"toolu_{i}","content":"Cargo.toml\nsrc"}}]}}}}"#
        ));
        if i % 50 == 0 {
            lines.push("{\"type\":\"user\",\"message\":".to_string());
        }
    }
    lines.join("\n")
}

fn bench_parse_transcript(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_transcript");

    for size in [100, 1_000, 10_000].iter() {
        let text = generate_transcript(*size);

        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| parse_transcript(black_box(&text)));
        });
    }

    group.finish();
}

fn bench_thread_outlines(c: &mut Criterion) {
    let mut group = c.benchmark_group("thread_outlines");

    for size in [100, 1_000, 10_000].iter() {
        let thread = Thread::new(parse_transcript(&generate_transcript(*size)));

        group.throughput(Throughput::Elements(thread.records().len() as u64));
        group.bench_with_input(BenchmarkId::new("primary", size), size, |b, _| {
            b.iter(|| black_box(&thread).outlines(false));
        });
        group.bench_with_input(BenchmarkId::new("all", size), size, |b, _| {
            b.iter(|| black_box(&thread).outlines(true));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse_transcript, bench_thread_outlines);
criterion_main!(benches);
