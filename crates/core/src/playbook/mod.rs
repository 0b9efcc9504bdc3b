//! Playbook assembly: fixed-template steps plus a length-based performance
//! heuristic.

pub mod estimator;
pub mod service;
pub mod steps;

pub use estimator::estimate_performance;
pub use service::PlaybookGenerator;
pub use steps::build_steps;
