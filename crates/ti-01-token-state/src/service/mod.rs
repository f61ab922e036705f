//! # Service Layer
//!
//! Orchestration of the domain state against the outbound ports.

pub mod pipeline;

pub use pipeline::TokenIndexingPipeline;
