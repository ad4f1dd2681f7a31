//! Services orchestrating data sources and the exploration model.

mod exploration;
mod steps;

pub use exploration::ExplorationService;
pub use steps::{ExplorationStep, FailedStep, RunResult};
