//! Complementary PWM timer interface trait
//!
//! This module defines the timer peripheral capability the half-bridge driver
//! is built on: one counter driving a pair of complementary outputs with
//! hardware dead-time insertion. Implementations wrap the advanced/motor
//! control timer of their MCU (STM32 TIM1, MCPWM operators, and similar).

use crate::platform::Result;

/// PWM timer configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmTimerConfig {
    /// Switching frequency in kHz
    pub frequency_khz: u32,
    /// Dead-time between the complementary edges in nanoseconds
    pub deadtime_ns: u32,
}

impl Default for PwmTimerConfig {
    fn default() -> Self {
        Self {
            frequency_khz: 70, // typical synchronous buck/boost power stage
            deadtime_ns: 300,
        }
    }
}

/// Complementary PWM timer interface trait
///
/// Timer peripheral implementations must provide this interface. All values
/// are in timer counts; the driver performs every unit conversion using
/// [`timer_clock_hz`](PwmTimer::timer_clock_hz).
///
/// # Safety Invariants
///
/// - The peripheral must be initialized for complementary output with
///   dead-time insertion before the driver takes ownership
/// - Only one owner per timer instance; no other code may write its registers
/// - `set_period_compare` must latch both registers through the peripheral's
///   shadow/preload mechanism so they take effect together at the next period
///   boundary (no torn update, no momentary 0 % or 100 % output)
/// - `set_compare` must be a single bounded register transaction, safe to
///   call from interrupt context
/// - `disable_outputs` must drive both switches to a defined off state, never
///   leave them floating and never both conducting
pub trait PwmTimer {
    /// Timer input clock in Hz, used to convert counts to real time
    fn timer_clock_hz(&self) -> u32;

    /// Counts per switching period currently programmed
    fn period(&self) -> u16;

    /// Reprogram period and compare value together
    ///
    /// Both registers are written to their shadow stage and latched at the
    /// next period boundary.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Pwm(PwmError::InvalidPeriod)` for a zero
    /// period and `PlatformError::Pwm(PwmError::InvalidCompare)` if the
    /// compare value exceeds the period.
    fn set_period_compare(&mut self, period: u16, compare: u16) -> Result<()>;

    /// Program the compare value for the high-side channel
    ///
    /// A single register write, latched at the next period boundary. The
    /// low-side channel is the hardware complement.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Pwm(PwmError::InvalidCompare)` if the compare
    /// value exceeds the programmed period.
    fn set_compare(&mut self, compare: u16) -> Result<()>;

    /// Program the dead-time generator, in counts off both edges
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Pwm(PwmError::InvalidDeadtime)` if the count
    /// exceeds the range of the dead-time generator.
    fn set_deadtime(&mut self, counts: u16) -> Result<()>;

    /// Enable both complementary outputs in one transaction
    fn enable_outputs(&mut self);

    /// Force both outputs into their safe off state
    fn disable_outputs(&mut self);

    /// Check if the output pair is enabled
    fn outputs_enabled(&self) -> bool;
}
