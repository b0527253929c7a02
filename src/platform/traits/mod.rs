//! Platform abstraction traits
//!
//! This module defines the traits that timer peripheral implementations must
//! provide.

pub mod pwm;

// Re-export trait interfaces
pub use pwm::{PwmTimer, PwmTimerConfig};
