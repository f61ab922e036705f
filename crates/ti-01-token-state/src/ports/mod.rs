//! # Ports Layer
//!
//! - **Driving Ports (Inbound)**: the pipeline API fed by the stream consumer
//! - **Driven Ports (Outbound)**: token validation and persistence SPIs

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
