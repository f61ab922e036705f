//! # Adapters Layer
//!
//! - `driver`: the single task that feeds stream events to the pipeline

pub mod driver;

pub use driver::PipelineDriver;
