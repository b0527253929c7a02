//! Half-bridge PWM driver
//!
//! This module generates the complementary gate signals for a half-bridge
//! power stage (high-side and low-side switch) from a requested duty cycle,
//! with the safety logic that keeps the stage alive:
//!
//! - Duty-cycle clamping to configurable `[min_duty, max_duty]` limits
//!   (e.g. a minimum duty for input-voltage limiting, a maximum duty for a
//!   bootstrap charge pump)
//! - Dead-time insertion between the two switch transitions to prevent
//!   shoot-through
//! - Atomic enable/disable of the output pair, so the bridge is never driven
//!   single-ended
//! - Glitch-free reconfiguration through the timer's shadow registers
//! - A settings lock that freezes frequency, dead-time and limits once the
//!   power stage is commissioned
//!
//! The driver owns its timer peripheral through the
//! [`PwmTimer`](crate::platform::traits::PwmTimer) capability trait and is
//! fully testable on the host against
//! [`MockPwmTimer`](crate::platform::mock::MockPwmTimer).
//!
//! ## Example
//!
//! ```ignore
//! use half_bridge_pwm::libraries::half_bridge::HalfBridgeDriver;
//! use half_bridge_pwm::platform::mock::MockPwmTimer;
//!
//! let mut bridge = HalfBridgeDriver::new(MockPwmTimer::new(), 100)?;
//! bridge.duty_cycle_limits(0.1, 0.9)?;
//! bridge.set_deadtime_ns(300)?;
//! bridge.lock_settings();
//!
//! bridge.start(0.5)?;            // outputs on at 50 %
//! bridge.duty_cycle_step(10)?;   // nudge up by 10 minimum steps
//! bridge.stop();                 // both switches safely off
//! ```

pub mod driver;

// Re-export main types
pub use driver::HalfBridgeDriver;

use crate::platform::PlatformError;

/// Half-bridge driver error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalfBridgeError {
    /// Frequency of zero or one that maps to an unusable resolution
    InvalidFrequency,
    /// Dead-time would consume half the switching period or more
    InvalidDeadtime,
    /// Duty-cycle limits outside [0.0, 1.0] or minimum above maximum
    InvalidLimits,
    /// Configuration change attempted after `lock_settings`
    SettingsLocked,
    /// Underlying timer peripheral rejected a register write
    Timer(PlatformError),
}

impl From<PlatformError> for HalfBridgeError {
    fn from(e: PlatformError) -> Self {
        HalfBridgeError::Timer(e)
    }
}

impl embedded_hal::pwm::Error for HalfBridgeError {
    fn kind(&self) -> embedded_hal::pwm::ErrorKind {
        embedded_hal::pwm::ErrorKind::Other
    }
}
