//! Utility functions shared by the command line front end and the runners.
//!
//! - [`app_data`] - User configuration (runner executable paths) and path helpers
//! - [`progress`] - Progress spinner that becomes a no-op without the `progress` feature

pub mod app_data;
pub mod progress;

pub use app_data::*;
