//! System events observed on the monitored services, and a seeded generator
//! producing synthetic batches of them.

pub use self::{event::*, generator::*};

pub mod event;
pub mod generator;
