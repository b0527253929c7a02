//! Mock platform implementation for testing
//!
//! This module provides a mock timer peripheral that can be used for unit
//! testing the driver without requiring actual hardware.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled

#![cfg(any(test, feature = "mock"))]

mod pwm;

pub use pwm::MockPwmTimer;
