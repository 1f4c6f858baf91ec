//! Blink scheduler timing against a recording output line.

// Test files unwrap freely and compute expected timings inline.
#![allow(clippy::unwrap_used, clippy::panic, clippy::arithmetic_side_effects, clippy::indexing_slicing)]

use controls::Led;
use embassy_futures::join::{join, join3};
use embassy_time::{Duration, Timer};
use platform::mocks::{MockOutputHandle, MockPinController};
use platform::{LedConfig, PinState};

async fn sleep_ms(ms: u64) {
    Timer::after(Duration::from_millis(ms)).await;
}

#[tokio::test]
async fn second_start_is_a_no_op() {
    let handle = MockOutputHandle::new();
    let led = Led::new(handle.line());

    let (first, (second, stop)) = join(led.start_blinking(), async {
        sleep_ms(20).await;
        // Returns at once without starting another cycle.
        let second = led.start_blinking().await;
        sleep_ms(1_000).await;
        (second, led.stop_blinking().await)
    })
    .await;
    first.unwrap();
    second.unwrap();
    stop.unwrap();

    // High at 0, low at 200, high at 700, low at 900, then stopped at ~1020
    // during the off phase, with the final forced low.
    let writes = handle.writes();
    assert_eq!(
        writes,
        vec![
            PinState::High,
            PinState::Low,
            PinState::High,
            PinState::Low,
            PinState::Low,
        ]
    );
    assert!(!led.is_blinking());
}

#[tokio::test]
async fn stop_then_restart_runs_a_fresh_cycle() {
    let handle = MockOutputHandle::new();
    let led = Led::new(handle.line());

    let (a, stop) = join(led.start_blinking(), async {
        sleep_ms(300).await;
        led.stop_blinking().await
    })
    .await;
    a.unwrap();
    stop.unwrap();
    handle.clear();

    let (b, stop) = join(led.start_blinking(), async {
        sleep_ms(100).await;
        assert!(led.is_blinking());
        led.stop_blinking().await
    })
    .await;
    b.unwrap();
    stop.unwrap();
    assert_eq!(handle.writes(), vec![PinState::High, PinState::Low]);
}

#[tokio::test]
async fn concurrent_stops_both_return() {
    let handle = MockOutputHandle::new();
    let led = Led::new(handle.line());

    let (cycle, s1, s2) = join3(
        led.start_blinking(),
        async {
            sleep_ms(50).await;
            led.stop_blinking().await
        },
        async {
            sleep_ms(50).await;
            led.stop_blinking().await
        },
    )
    .await;
    cycle.unwrap();
    s1.unwrap();
    s2.unwrap();
    assert_eq!(handle.level(), PinState::Low);
}

#[tokio::test]
async fn open_uses_configured_pin() {
    let config = LedConfig::default();
    let mut controller = MockPinController::new();
    let handle = controller.output(config.pin);
    let led = Led::open(&mut controller, &config).unwrap();

    led.blink_once().await.unwrap();
    assert_eq!(handle.writes(), vec![PinState::High, PinState::Low]);
    assert_eq!(controller.opened(), &[config.pin]);
}
