//! Tag reader worker against a scripted scanner, with real timers.
//!
//! Scan attempts are 250 ms apart, so expected attempt counts are checked
//! as ranges.

// Test files unwrap freely and compute expected timings inline.
#![allow(clippy::unwrap_used, clippy::panic, clippy::arithmetic_side_effects, clippy::indexing_slicing)]

use controls::{EventChannel, EventStream, TagReader};
use embassy_futures::join::join;
use embassy_time::{Duration, Instant, Timer};
use platform::mocks::MockTagScanner;
use platform::{InputDevice, InputEvent, TagId};

/// Route worker logs to the test harness; `RUST_LOG=debug` shows them.
fn logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn sleep_ms(ms: u64) {
    Timer::after(Duration::from_millis(ms)).await;
}

fn tag() -> TagId {
    TagId::from_bytes(&[0x04, 0xA1, 0xB2, 0xC3]).unwrap()
}

#[tokio::test]
async fn empty_field_is_scanned_at_backoff_interval_without_events() {
    logging();
    let reader = TagReader::new();
    let channel = EventChannel::new();
    let scanner = MockTagScanner::new();

    join(reader.run(scanner.clone(), channel.sender()), async {
        sleep_ms(20).await;
        assert_eq!(scanner.attempts(), 0, "no scan before resume");
        reader.resume_reading();
        sleep_ms(900).await;
        reader.shutdown().await;
    })
    .await;

    // Attempts at ~0, 260, 520, 780 ms.
    let attempts = scanner.attempts();
    assert!((3..=5).contains(&attempts), "attempts = {attempts}");
    assert!(EventStream::new(&channel).poll_event().is_none());
    assert_eq!(scanner.power_downs(), 1);
    assert_eq!(scanner.enabled_calls(), vec![true]);
}

#[tokio::test]
async fn found_tag_is_published_once_per_resume() {
    logging();
    let reader = TagReader::new();
    let channel = EventChannel::new();
    let scanner = MockTagScanner::new();
    scanner.absent();
    scanner.present(tag());

    join(reader.run(scanner.clone(), channel.sender()), async {
        reader.resume_reading();
        sleep_ms(600).await;
        let after_find = scanner.attempts();
        assert_eq!(after_find, 2);

        // Parked on the gate: no further scans until resumed.
        sleep_ms(600).await;
        assert_eq!(scanner.attempts(), after_find);

        scanner.present(tag());
        reader.resume_reading();
        sleep_ms(50).await;
        assert_eq!(scanner.attempts(), after_find + 1);
        reader.shutdown().await;
    })
    .await;

    let mut stream = EventStream::new(&channel);
    for _ in 0..2 {
        match stream.poll_event() {
            Some(InputEvent::TagRead(read)) => assert_eq!(read.hex().as_str(), "04A1B2C3"),
            other => panic!("expected tag read, got {other:?}"),
        }
    }
    assert!(stream.poll_event().is_none());
}

#[tokio::test]
async fn scan_errors_count_as_empty_field() {
    logging();
    let reader = TagReader::new();
    let channel = EventChannel::new();
    let scanner = MockTagScanner::new();
    scanner.fail();
    scanner.present(tag());

    join(reader.run(scanner.clone(), channel.sender()), async {
        reader.resume_reading();
        sleep_ms(400).await;
        reader.shutdown().await;
    })
    .await;

    assert_eq!(scanner.attempts(), 2);
    assert!(matches!(
        EventStream::new(&channel).poll_event(),
        Some(InputEvent::TagRead(_))
    ));
}

#[tokio::test]
async fn enabling_during_backoff_continues_the_cycle() {
    logging();
    let reader = TagReader::new();
    let channel = EventChannel::new();
    let scanner = MockTagScanner::new();
    reader.set_enabled(false);

    join(reader.run(scanner.clone(), channel.sender()), async {
        reader.resume_reading();
        sleep_ms(400).await;
        assert_eq!(scanner.attempts(), 0, "disabled reader must not scan");

        // Still inside the same cycle: enabling resumes scanning.
        scanner.present(tag());
        reader.set_enabled(true);
        sleep_ms(400).await;
        assert_eq!(scanner.attempts(), 1);
        reader.shutdown().await;
    })
    .await;

    assert_eq!(scanner.enabled_calls(), vec![false, true]);
    assert!(EventStream::new(&channel).poll_event().is_some());
}

#[tokio::test]
async fn disabling_mid_scan_parks_until_next_resume() {
    logging();
    let reader = TagReader::new();
    let channel = EventChannel::new();
    let scanner = MockTagScanner::new();

    join(reader.run(scanner.clone(), channel.sender()), async {
        reader.resume_reading();
        sleep_ms(300).await;
        reader.set_enabled(false);
        sleep_ms(400).await;
        let parked = scanner.attempts();

        // Re-enabling alone does not start a new cycle.
        reader.set_enabled(true);
        sleep_ms(400).await;
        assert_eq!(scanner.attempts(), parked);

        reader.resume_reading();
        sleep_ms(50).await;
        assert_eq!(scanner.attempts(), parked + 1);
        reader.shutdown().await;
    })
    .await;

    assert_eq!(scanner.enabled_calls(), vec![true, false, true]);
    assert!(EventStream::new(&channel).poll_event().is_none());
}

#[tokio::test]
async fn shutdown_during_disabled_backoff_is_prompt() {
    logging();
    let reader = TagReader::new();
    let channel = EventChannel::new();
    let scanner = MockTagScanner::new();
    reader.set_enabled(false);

    join(reader.run(scanner.clone(), channel.sender()), async {
        reader.resume_reading();
        sleep_ms(100).await;
        let started = Instant::now();
        reader.shutdown().await;
        // At most one backoff interval.
        assert!(started.elapsed() < Duration::from_millis(400));
    })
    .await;

    assert!(!reader.is_running());
    assert_eq!(scanner.power_downs(), 1);
}

#[tokio::test]
async fn shutdown_mid_scan_waits_for_power_down() {
    logging();
    let reader = TagReader::new();
    let channel = EventChannel::new();
    let scanner = MockTagScanner::new();

    join(reader.run(scanner.clone(), channel.sender()), async {
        reader.resume_reading();
        sleep_ms(100).await;
        reader.shutdown().await;
        // The worker released the scanner before shutdown returned.
        assert_eq!(scanner.power_downs(), 1);
        assert!(!reader.is_running());
    })
    .await;
}

#[tokio::test]
async fn field_change_while_parked_applies_on_next_resume() {
    logging();
    let reader = TagReader::new();
    let channel = EventChannel::new();
    let scanner = MockTagScanner::new();
    scanner.present(tag());

    join(reader.run(scanner.clone(), channel.sender()), async {
        reader.resume_reading();
        sleep_ms(50).await;
        assert_eq!(scanner.attempts(), 1);

        // Parked on the gate after the read: the field stays as it was.
        reader.set_enabled(false);
        sleep_ms(300).await;
        assert_eq!(scanner.enabled_calls(), vec![true]);

        // Leaving the gate switches the field off before anything else.
        reader.resume_reading();
        sleep_ms(50).await;
        assert_eq!(scanner.enabled_calls(), vec![true, false]);
        assert_eq!(scanner.attempts(), 1);
        reader.shutdown().await;
    })
    .await;
}
