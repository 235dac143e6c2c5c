//! Tests for the Throughput Aggregator
//!
//! These tests verify:
//! - Counter drain semantics
//! - Rate computation and the reported line format
//! - No increments lost while drains race with workers

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use kvload::stats::{Aggregator, Counters};
use kvload::Shutdown;

#[test]
fn test_drain_returns_counts_and_resets() {
    let counters = Arc::new(Counters::new());
    let mut aggregator = Aggregator::new(Arc::clone(&counters), Duration::from_secs(5));

    for _ in 0..7 {
        counters.record_write();
    }
    for _ in 0..12 {
        counters.record_read();
    }

    let sample = aggregator.drain();
    assert_eq!(sample.writes, 7);
    assert_eq!(sample.reads, 12);

    let sample = aggregator.drain();
    assert_eq!(sample.writes, 0);
    assert_eq!(sample.reads, 0);

    assert_eq!(aggregator.totals().writes, 7);
    assert_eq!(aggregator.totals().intervals, 2);
}

#[test]
fn test_rate_and_line_format() {
    let counters = Arc::new(Counters::new());
    let mut aggregator = Aggregator::new(Arc::clone(&counters), Duration::from_secs(5));
    for _ in 0..500 {
        counters.record_write();
    }

    let sample = aggregator.drain();

    assert_eq!(sample.write_rate(), 100.0);
    assert_eq!(sample.read_rate(), 0.0);
    assert_eq!(sample.write_line().to_string(), "write 500 ops/5s (100 ops/s)");
    assert_eq!(sample.read_line().to_string(), "read 0 ops/5s (0 ops/s)");
}

#[test]
fn test_concurrent_increments_never_lost() {
    let counters = Arc::new(Counters::new());
    let mut aggregator = Aggregator::new(Arc::clone(&counters), Duration::from_millis(1));

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let counters = Arc::clone(&counters);
            thread::spawn(move || {
                for _ in 0..50_000 {
                    counters.record_write();
                    counters.record_read();
                }
            })
        })
        .collect();

    let mut writes = 0;
    let mut reads = 0;
    while workers.iter().any(|w| !w.is_finished()) {
        let sample = aggregator.drain();
        writes += sample.writes;
        reads += sample.reads;
    }
    for worker in workers {
        worker.join().unwrap();
    }
    let sample = aggregator.drain();
    writes += sample.writes;
    reads += sample.reads;

    assert_eq!(writes, 200_000);
    assert_eq!(reads, 200_000);
}

#[test]
fn test_run_stops_on_shutdown_and_keeps_tail_counts() {
    let counters = Arc::new(Counters::new());
    let aggregator = Aggregator::new(Arc::clone(&counters), Duration::from_secs(3600));
    let shutdown = Shutdown::new();

    let handle = {
        let shutdown = shutdown.clone();
        thread::spawn(move || aggregator.run(&shutdown))
    };

    counters.record_write();
    counters.record_read();
    counters.record_read();
    shutdown.trigger();

    let totals = handle.join().unwrap();
    assert_eq!(totals.writes, 1);
    assert_eq!(totals.reads, 2);
    assert_eq!(totals.intervals, 0);
}
