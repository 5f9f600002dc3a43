//! Benchmarks for the transcript parser, search and message window.
//!
//! Run with: `cargo bench`

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::sync::Arc;

use chatlog_viewer::config::WindowConfig;
use chatlog_viewer::model::Message;
use chatlog_viewer::parser::{parse_chat, Inventory, TranscriptParser};
use chatlog_viewer::render::MemorySurface;
use chatlog_viewer::search::search;
use chatlog_viewer::window::WindowController;

/// Sample transcript for benchmarking.
fn generate_transcript(message_count: usize) -> (String, Vec<String>) {
    let mut lines = Vec::with_capacity(message_count);
    let mut files = Vec::new();

    for i in 0..message_count {
        let date = format!("{}/{}/23", i / 500 % 28 + 1, i / 14_000 % 12 + 1);
        let time = format!("{:02}:{:02}", i / 60 % 24, i % 60);
        let sender = if i % 3 == 0 { "John Doe" } else { "Alice" };

        if i % 25 == 0 {
            let name = format!("IMG-{i:06}.jpg");
            lines.push(format!("\u{200e}[{date}, {time}] {sender}: <attached: {name}> photo {i}"));
            files.push(name);
        } else if i % 9 == 0 {
            lines.push(format!("[{date}, {time}] {sender}: first line {i}\ncontinued {i}"));
        } else {
            lines.push(format!("[{date}, {time}] {sender}: Message number {i} with some text"));
        }
    }

    (lines.join("\n"), files)
}

fn bench_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    for size in [1_000, 10_000, 100_000] {
        let (raw, files) = generate_transcript(size);
        let inventory: Inventory = files.iter().cloned().collect();
        group.throughput(Throughput::Bytes(raw.len() as u64));

        group.bench_with_input(BenchmarkId::new("parse", size), &raw, |b, raw| {
            b.iter(|| {
                let mut parser = TranscriptParser::new();
                black_box(parser.parse(black_box(raw), "bench", &inventory))
            });
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let (raw, files) = generate_transcript(100_000);
    let doc = parse_chat(&raw, "bench", &files);
    let mut group = c.benchmark_group("search");

    group.bench_function("rare", |b| b.iter(|| black_box(search(&doc, "number 99999", 250))));
    group.bench_function("common_capped", |b| b.iter(|| black_box(search(&doc, "message", 250))));

    group.finish();
}

fn bench_window(c: &mut Criterion) {
    let (raw, files) = generate_transcript(100_000);
    let doc = Arc::new(parse_chat(&raw, "bench", &files));
    let mut group = c.benchmark_group("window");

    group.bench_function("open", |b| {
        b.iter(|| {
            let mut window = WindowController::new(WindowConfig::default());
            let mut surface: MemorySurface<Message> = MemorySurface::new(40, 800);
            window.open(Arc::clone(&doc), &mut surface);
            black_box(window.bounds())
        });
    });

    group.bench_function("scroll_up_20_chunks", |b| {
        b.iter(|| {
            let mut window = WindowController::new(WindowConfig::default());
            let mut surface: MemorySurface<Message> = MemorySurface::new(40, 800);
            window.open(Arc::clone(&doc), &mut surface);
            for _ in 0..20 {
                window.scroll_near_top(&mut surface);
            }
            black_box(window.bounds())
        });
    });

    group.bench_function("jump", |b| {
        let mut window = WindowController::new(WindowConfig::default());
        let mut surface: MemorySurface<Message> = MemorySurface::new(40, 800);
        window.open(Arc::clone(&doc), &mut surface);
        let mut target = 0;
        b.iter(|| {
            target = (target + 7_919) % 100_000;
            window.jump_to(target, &mut surface).ok();
            black_box(window.bounds())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_parser, bench_search, bench_window);
criterion_main!(benches);
