//! HTTP surface for the audioshelf organization engine.

pub mod api;
pub mod metrics;
pub mod state;
