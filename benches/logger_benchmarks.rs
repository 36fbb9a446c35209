//! Criterion benchmarks for rust_hierarchical_logger

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rust_hierarchical_logger::core::log_context;
use rust_hierarchical_logger::prelude::*;
use rust_hierarchical_logger::{mdc, sprintf, DEFAULT_CONVERSION_PATTERN};
use std::sync::Arc;

struct NullAppender;

impl Appender for NullAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        black_box(entry);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}

// ============================================================================
// Threshold Benchmarks
// ============================================================================

fn bench_level_checks(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_checks");
    group.throughput(Throughput::Elements(1));

    let hierarchy = Arc::new(Hierarchy::new());
    hierarchy.set_level("app", LogLevel::Warn);
    let deep = hierarchy.get_logger("app.service.db.pool.conn");

    group.bench_function("disabled_deep_logger", |b| {
        b.iter(|| deep.debug(black_box("never formatted")));
    });

    group.bench_function("effective_level_memoized", |b| {
        b.iter(|| black_box(deep.effective_level()));
    });

    group.bench_function("context_effective_level", |b| {
        let _outer = LogContext::new("app").expect("valid name");
        let _inner = LogContext::new("service").expect("valid name");
        b.iter(|| black_box(log_context::effective_level_in(&hierarchy)));
    });

    group.finish();
}

// ============================================================================
// Dispatch Benchmarks
// ============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    let hierarchy = Arc::new(Hierarchy::new());
    hierarchy.add_appender("", Box::new(NullAppender));
    let logger = hierarchy.get_logger("bench");

    group.bench_function("enabled_null_appender", |b| {
        b.iter(|| logger.info(black_box("Info message")));
    });

    group.bench_function("enabled_with_mdc", |b| {
        mdc::put("request", 42);
        mdc::put("user", "alice");
        b.iter(|| logger.info(black_box("Info message")));
        mdc::clear();
    });

    group.bench_function("printf", |b| {
        b.iter(|| {
            logger.logf(
                LogLevel::Info,
                black_box("%s handled %d requests in %.2f ms"),
                &["worker".into(), 1024.into(), 3.14159.into()],
            )
        });
    });

    group.finish();
}

fn bench_file_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_dispatch");
    group.throughput(Throughput::Elements(1));

    let temp_dir = tempfile::TempDir::new().expect("temp dir");
    for immediate in [true, false] {
        let path = temp_dir.path().join(format!("bench_{}.log", immediate));
        let hierarchy = Arc::new(Hierarchy::new());
        let appender = FileAppender::new(path)
            .expect("open bench file")
            .with_layout(Layout::pattern(DEFAULT_CONVERSION_PATTERN).expect("valid pattern"))
            .with_immediate_flush(immediate);
        hierarchy.add_appender("", Box::new(appender));
        let logger = hierarchy.get_logger("bench.file");

        let label = if immediate { "immediate_flush" } else { "buffered" };
        group.bench_function(label, |b| {
            b.iter(|| logger.warn(black_box("file message")));
        });
    }

    group.finish();
}

// ============================================================================
// Formatting Benchmarks
// ============================================================================

fn bench_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatting");
    group.throughput(Throughput::Elements(1));

    let entry = LogEntry::new(LogLevel::Info, "app.service.db", "Connection established")
        .with_mdc(vec![("x".to_string(), "3".to_string())]);

    for (label, pattern) in [
        ("message_only", "%m%n"),
        ("default_conversion", DEFAULT_CONVERSION_PATTERN),
        ("padded_with_mdc", "%-5p %-20.20c{2} %X - %m%n"),
        ("iso_date", "%d{ISO8601} %p %c - %m%n"),
    ] {
        let layout = PatternLayout::parse(pattern).expect("valid pattern");
        group.bench_function(label, |b| b.iter(|| black_box(layout.format(&entry))));
    }

    group.bench_function("sprintf", |b| {
        b.iter(|| {
            sprintf(
                black_box("Format %d %g %s %5.1f%%"),
                &[3.into(), 2.71828.into(), "foo".into(), 93.25.into()],
            )
        })
    });

    group.bench_function("pattern_parse", |b| {
        b.iter(|| PatternLayout::parse(black_box(DEFAULT_CONVERSION_PATTERN)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_level_checks,
    bench_dispatch,
    bench_file_dispatch,
    bench_formatting
);
criterion_main!(benches);
