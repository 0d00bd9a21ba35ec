//! Sliding-window object detection over frame streams.
//!
//! Domain logic lives under each bounded context's `domain` module;
//! I/O-bound implementations live under `infrastructure`.

pub mod capture;
pub mod detection;
pub mod pipeline;
pub mod report;
pub mod shared;
