//! Host integration test for the half-bridge driver
//!
//! Runs the full commissioning sequence a power-stage application would use
//! against the mock timer peripheral. Enable with `--features mock`.

#![cfg(feature = "mock")]

use half_bridge_pwm::libraries::half_bridge::{HalfBridgeDriver, HalfBridgeError};
use half_bridge_pwm::platform::mock::MockPwmTimer;
use half_bridge_pwm::platform::traits::PwmTimerConfig;

fn assert_close(a: f32, b: f32) {
    assert!((a - b).abs() < 1e-6, "{} != {}", a, b);
}

#[test]
fn commissioning_sequence() {
    // 100 MHz timer clock, 100 kHz switching: 1000 counts per period
    let config = PwmTimerConfig {
        frequency_khz: 100,
        deadtime_ns: 300,
    };
    let mut bridge = HalfBridgeDriver::with_config(MockPwmTimer::new(), config).unwrap();

    // limit the duty range for a synchronous buck with a bootstrap supply
    bridge.duty_cycle_limits(0.1, 0.9).unwrap();
    bridge.lock_settings();

    // configuration is frozen from here on
    assert_eq!(
        bridge.set_frequency_khz(200).unwrap_err(),
        HalfBridgeError::SettingsLocked
    );

    // out-of-range start request lands on the upper limit
    bridge.start(1.5).unwrap();
    assert!(bridge.enabled());
    assert_close(bridge.get_duty_cycle(), 0.9);

    // control loop trims down in minimum steps
    bridge.duty_cycle_step(-5).unwrap();
    assert_close(bridge.get_duty_cycle(), 0.895);

    // shutdown leaves both switches off and the duty value readable
    bridge.stop();
    assert!(!bridge.enabled());
    assert_close(bridge.get_duty_cycle(), 0.895);

    let timer = bridge.free();
    assert!(!timer.outputs_enabled());
    assert_eq!(timer.deadtime(), 30);
}

#[test]
fn duty_limits_narrowed_while_running() {
    let mut bridge = HalfBridgeDriver::new(MockPwmTimer::new(), 100).unwrap();
    bridge.duty_cycle_limits(0.1, 0.9).unwrap();
    bridge.start(0.9).unwrap();

    // a protection layer tightens the ceiling mid-run
    bridge.duty_cycle_limits(0.1, 0.5).unwrap();
    assert_close(bridge.get_duty_cycle(), 0.5);
    assert_eq!(bridge.free().compare(), 500);
}

#[test]
fn restart_requires_explicit_duty() {
    let mut bridge = HalfBridgeDriver::new(MockPwmTimer::new(), 100).unwrap();

    bridge.start(0.3).unwrap();
    bridge.stop();

    // duty requested while stopped is stored but not programmed
    bridge.set_duty_cycle(0.7).unwrap();
    assert_close(bridge.get_duty_cycle(), 0.7);

    bridge.start(0.6).unwrap();
    assert_close(bridge.get_duty_cycle(), 0.6);
    assert_eq!(bridge.free().compare(), 600);
}
