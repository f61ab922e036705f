//! # Domain Layer
//!
//! Pure in-memory state for the token indexer.
//!
//! - `recency`: bounded FIFO memory of processed transactions and blocks
//! - `ownership`: outpoint → token id registry and its shared handle
//! - `value_objects`: `StateConfig`
//! - `errors`: configuration and pipeline errors
//!
//! No I/O happens here. Collaborators are reached through `ports`.

pub mod errors;
pub mod ownership;
pub mod recency;
pub mod value_objects;

pub use errors::*;
pub use ownership::*;
pub use recency::*;
pub use value_objects::*;
