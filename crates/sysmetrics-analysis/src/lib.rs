//! Turns a batch of [`SystemEvent`](sysmetrics_events::SystemEvent)s into descriptive
//! statistics, frequency tables and a short narrative report.

pub use self::{analysis::*, config::*, report::*};

pub mod analysis;
pub mod config;
pub mod report;
