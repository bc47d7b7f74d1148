//! Timer-driven polling of channel statistics.

pub mod poller;
pub mod tracker;

pub use poller::{Monitor, MonitorError, MonitorSettings};
