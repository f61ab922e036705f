//! # Shared Types Crate
//!
//! Chain primitives consumed by the token indexer subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identifiers and transaction shapes are
//!   defined once here and reused by every pipeline stage.
//! - **Typed Identifiers**: transaction ids, token ids and output references
//!   are distinct types, never bare byte arrays or strings.
//! - **Canonical Text Form**: every identifier round-trips through its
//!   `Display`/`FromStr` hex form.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
