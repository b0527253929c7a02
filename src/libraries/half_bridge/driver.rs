//! Half-bridge driver implementation
//!
//! Translates duty-cycle requests into timer compare values, enforces the
//! dead-time and duty-limit invariants, and manages the enabled/disabled
//! state machine of the output pair.

use super::HalfBridgeError;
use crate::platform::traits::{PwmTimer, PwmTimerConfig};
use crate::{log_debug, log_error, log_info, log_warn};

/// Minimum usable counts per switching period
///
/// Below this the duty-cycle step size exceeds 1 %, too coarse for a power
/// stage control loop.
const MIN_PWM_RESOLUTION: u32 = 100;

const NS_PER_S: u64 = 1_000_000_000;

/// Half-bridge PWM driver
///
/// Owns one complementary PWM timer and all configuration state. Every duty
/// cycle that reaches hardware has passed the `[min_duty, max_duty]` clamp,
/// and the output pair is only ever switched on or off as a whole.
///
/// # Type Parameters
///
/// * `T` - Timer peripheral implementing [`PwmTimer`]
///
/// # Interrupt Safety
///
/// [`set_duty_cycle`](Self::set_duty_cycle) and
/// [`duty_cycle_step`](Self::duty_cycle_step) perform exactly one compare
/// register transaction per call, so they are suitable for periodic
/// control-loop ticks running in interrupt context.
#[derive(Debug)]
pub struct HalfBridgeDriver<T: PwmTimer> {
    timer: T,
    frequency_khz: u32,
    /// Counts per switching period
    resolution: u16,
    /// Minimum duty-cycle step, 1 / resolution
    pwm_delta: f32,
    min_duty: f32,
    max_duty: f32,
    /// Last programmed duty cycle (quantized to the resolution)
    duty_cycle: f32,
    deadtime_ns: u32,
    deadtime_counts: u16,
    enabled: bool,
    locked: bool,
}

impl<T: PwmTimer> HalfBridgeDriver<T> {
    /// Create a half-bridge driver and program the switching frequency
    ///
    /// Takes exclusive ownership of the timer, forces the outputs off and
    /// programs the period for `freq_khz`. Dead-time starts at zero counts;
    /// call [`set_deadtime_ns`](Self::set_deadtime_ns) before `start` when
    /// driving real switches.
    ///
    /// # Errors
    ///
    /// Returns `HalfBridgeError::InvalidFrequency` if `freq_khz` is zero or
    /// cannot be mapped to a resolution between `MIN_PWM_RESOLUTION` and the
    /// counter width with the timer's input clock.
    pub fn new(timer: T, freq_khz: u32) -> Result<Self, HalfBridgeError> {
        let resolution = Self::resolution_for(&timer, freq_khz)?;

        let mut driver = Self {
            timer,
            frequency_khz: freq_khz,
            resolution,
            pwm_delta: 1.0 / resolution as f32,
            min_duty: 0.0,
            max_duty: 1.0,
            duty_cycle: 0.0,
            deadtime_ns: 0,
            deadtime_counts: 0,
            enabled: false,
            locked: false,
        };

        driver.timer.disable_outputs();
        driver.timer.set_period_compare(resolution, 0)?;

        Ok(driver)
    }

    /// Create a driver and apply frequency and dead-time in one step
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new) plus `HalfBridgeError::InvalidDeadtime` if
    /// the configured dead-time reaches half the switching period.
    pub fn with_config(timer: T, config: PwmTimerConfig) -> Result<Self, HalfBridgeError> {
        let mut driver = Self::new(timer, config.frequency_khz)?;
        driver.set_deadtime_ns(config.deadtime_ns)?;
        Ok(driver)
    }

    /// Set the switching frequency in kHz
    ///
    /// Recomputes the resolution, re-quantizes the current duty cycle to the
    /// new step size and programs period and compare in a single
    /// shadow-latched transaction, so the running output never sees a torn
    /// period/compare pair.
    ///
    /// # Errors
    ///
    /// Returns `HalfBridgeError::SettingsLocked` after `lock_settings`,
    /// `HalfBridgeError::InvalidFrequency` for an unmappable frequency, and
    /// `HalfBridgeError::InvalidDeadtime` if the configured dead-time would
    /// reach half the new period. Nothing changes on any error.
    pub fn set_frequency_khz(&mut self, freq_khz: u32) -> Result<(), HalfBridgeError> {
        self.ensure_unlocked()?;
        let resolution = Self::resolution_for(&self.timer, freq_khz)?;

        // The dead-time is kept in counts; a shorter period can invalidate it.
        if self.deadtime_counts as u32 * 2 >= resolution as u32 {
            return Err(HalfBridgeError::InvalidDeadtime);
        }

        let compare = Self::compare_for(self.duty_cycle, resolution);
        self.timer.set_period_compare(resolution, compare)?;

        self.frequency_khz = freq_khz;
        self.resolution = resolution;
        self.pwm_delta = 1.0 / resolution as f32;
        self.duty_cycle = compare as f32 / resolution as f32;

        log_debug!("switching frequency set to {} kHz", freq_khz);
        Ok(())
    }

    /// Set the dead-time between switching the two devices, in nanoseconds
    ///
    /// # Errors
    ///
    /// Returns `HalfBridgeError::SettingsLocked` after `lock_settings` and
    /// `HalfBridgeError::InvalidDeadtime` if the value reaches half the
    /// switching period (which would leave no duty capability at all). The
    /// previous dead-time stays programmed on error.
    pub fn set_deadtime_ns(&mut self, deadtime_ns: u32) -> Result<(), HalfBridgeError> {
        self.ensure_unlocked()?;

        let counts =
            (deadtime_ns as u64 * self.timer.timer_clock_hz() as u64) / NS_PER_S;
        if counts * 2 >= self.resolution as u64 {
            log_error!("dead-time {} ns does not fit the switching period", deadtime_ns);
            return Err(HalfBridgeError::InvalidDeadtime);
        }

        self.timer.set_deadtime(counts as u16)?;
        self.deadtime_ns = deadtime_ns;
        self.deadtime_counts = counts as u16;

        log_debug!("dead-time set to {} counts", self.deadtime_counts);
        Ok(())
    }

    /// Lock frequency, dead-time and duty-limit settings
    ///
    /// After locking, `set_frequency_khz`, `set_deadtime_ns` and
    /// `duty_cycle_limits` return `HalfBridgeError::SettingsLocked` and leave
    /// the configuration untouched. Duty-cycle control stays available. The
    /// lock cannot be released.
    pub fn lock_settings(&mut self) {
        self.locked = true;
        log_info!("half bridge settings locked");
    }

    /// Start PWM generation
    ///
    /// Clamps `pwm_duty` to the configured limits, programs the compare value
    /// and enables both complementary outputs in one transaction. This is the
    /// only call that turns the output stage on.
    ///
    /// # Errors
    ///
    /// Returns `HalfBridgeError::Timer` if the peripheral rejects the compare
    /// write; the outputs stay off in that case.
    pub fn start(&mut self, pwm_duty: f32) -> Result<(), HalfBridgeError> {
        let duty = self.clamp(pwm_duty);
        let compare = Self::compare_for(duty, self.resolution);

        self.timer.set_compare(compare)?;
        self.timer.enable_outputs();
        self.enabled = true;
        self.duty_cycle = compare as f32 / self.resolution as f32;

        log_info!("half bridge started, duty {}", self.duty_cycle);
        Ok(())
    }

    /// Stop PWM generation
    ///
    /// Forces both switches into their safe off state. The duty-cycle value
    /// is retained for inspection; a subsequent [`start`](Self::start) takes
    /// its own duty argument.
    pub fn stop(&mut self) {
        self.timer.disable_outputs();
        self.enabled = false;
        log_info!("half bridge stopped");
    }

    /// Check if the PWM output stage is enabled
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Set the duty cycle, clamped to the configured limits
    ///
    /// While enabled this is a single compare-register write, latched at the
    /// next period boundary. While disabled the clamped value is only stored;
    /// the hardware is not touched until the next `start`.
    ///
    /// # Errors
    ///
    /// Returns `HalfBridgeError::Timer` if the peripheral rejects the write.
    /// Clamping is defined behavior, never an error.
    #[inline]
    pub fn set_duty_cycle(&mut self, duty: f32) -> Result<(), HalfBridgeError> {
        let duty = self.clamp(duty);
        let compare = Self::compare_for(duty, self.resolution);

        if self.enabled {
            self.timer.set_compare(compare)?;
        }
        self.duty_cycle = compare as f32 / self.resolution as f32;
        Ok(())
    }

    /// Adjust the duty cycle by `delta` minimum steps
    ///
    /// One step is [`pwm_delta`](Self::pwm_delta) = 1 / resolution. Large
    /// deltas saturate at the configured limits; `delta = 0` leaves the duty
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`set_duty_cycle`](Self::set_duty_cycle).
    #[inline]
    pub fn duty_cycle_step(&mut self, delta: i32) -> Result<(), HalfBridgeError> {
        self.set_duty_cycle(self.duty_cycle + delta as f32 * self.pwm_delta)
    }

    /// Read the last programmed duty cycle
    pub fn get_duty_cycle(&self) -> f32 {
        self.duty_cycle
    }

    /// Set duty-cycle limits to prevent hardware damage
    ///
    /// Typical uses: a minimum duty for input-voltage limiting of a buck
    /// converter, a maximum duty below 100 % to keep a bootstrap charge pump
    /// alive. If the current duty cycle falls outside the new range it is
    /// re-clamped immediately (and reprogrammed while enabled), so the limit
    /// invariant holds continuously.
    ///
    /// # Errors
    ///
    /// Returns `HalfBridgeError::SettingsLocked` after `lock_settings` and
    /// `HalfBridgeError::InvalidLimits` unless
    /// `0.0 <= min_duty <= max_duty <= 1.0`.
    pub fn duty_cycle_limits(&mut self, min_duty: f32, max_duty: f32) -> Result<(), HalfBridgeError> {
        self.ensure_unlocked()?;
        if !(0.0..=1.0).contains(&min_duty)
            || !(0.0..=1.0).contains(&max_duty)
            || min_duty > max_duty
        {
            return Err(HalfBridgeError::InvalidLimits);
        }

        self.min_duty = min_duty;
        self.max_duty = max_duty;

        if self.duty_cycle < min_duty || self.duty_cycle > max_duty {
            self.set_duty_cycle(self.duty_cycle)?;
        }
        Ok(())
    }

    /// Switching frequency in kHz
    pub fn frequency_khz(&self) -> u32 {
        self.frequency_khz
    }

    /// Counts per switching period
    pub fn pwm_resolution(&self) -> u16 {
        self.resolution
    }

    /// Minimum duty-cycle step size
    pub fn pwm_delta(&self) -> f32 {
        self.pwm_delta
    }

    /// Lower duty-cycle clamp bound
    pub fn min_duty(&self) -> f32 {
        self.min_duty
    }

    /// Upper duty-cycle clamp bound
    pub fn max_duty(&self) -> f32 {
        self.max_duty
    }

    /// Configured dead-time in nanoseconds
    pub fn deadtime_ns(&self) -> u32 {
        self.deadtime_ns
    }

    /// Check if the configuration is locked
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Release the timer peripheral, forcing the outputs off first
    pub fn free(mut self) -> T {
        self.timer.disable_outputs();
        self.timer
    }

    fn ensure_unlocked(&self) -> Result<(), HalfBridgeError> {
        if self.locked {
            log_warn!("configuration change refused, settings locked");
            return Err(HalfBridgeError::SettingsLocked);
        }
        Ok(())
    }

    fn resolution_for(timer: &T, freq_khz: u32) -> Result<u16, HalfBridgeError> {
        let freq_hz = freq_khz
            .checked_mul(1000)
            .filter(|hz| *hz > 0)
            .ok_or(HalfBridgeError::InvalidFrequency)?;

        let counts = timer.timer_clock_hz() / freq_hz;
        if counts < MIN_PWM_RESOLUTION || counts > u16::MAX as u32 {
            return Err(HalfBridgeError::InvalidFrequency);
        }
        Ok(counts as u16)
    }

    #[inline]
    fn clamp(&self, duty: f32) -> f32 {
        duty.min(self.max_duty).max(self.min_duty)
    }

    /// Compare value for a clamped duty, rounded to the nearest count
    #[inline]
    fn compare_for(duty: f32, resolution: u16) -> u16 {
        (duty * resolution as f32 + 0.5) as u16
    }
}

impl<T: PwmTimer> embedded_hal::pwm::ErrorType for HalfBridgeDriver<T> {
    type Error = HalfBridgeError;
}

impl<T: PwmTimer> embedded_hal::pwm::SetDutyCycle for HalfBridgeDriver<T> {
    fn max_duty_cycle(&self) -> u16 {
        self.resolution
    }

    /// Duty in counts, routed through the same clamp as the fractional API
    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        HalfBridgeDriver::set_duty_cycle(self, duty as f32 * self.pwm_delta)
    }
}
