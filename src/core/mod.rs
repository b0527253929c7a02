//! Core infrastructure
//!
//! This module contains infrastructure shared by the driver libraries,
//! currently the logging macro layer.

pub mod logging;
