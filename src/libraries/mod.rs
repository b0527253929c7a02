//! Driver libraries
//!
//! Hardware-independent drivers built on top of the platform abstraction.

pub mod half_bridge;
