//! # Token State Subsystem (ti-01)
//!
//! The in-memory state layer of the token indexer. Every transaction
//! validation decision reads and writes the two structures defined here:
//!
//! - [`BoundedRecencySet`]: fixed-capacity FIFO memory of processed
//!   transaction ids and block hashes, so redelivered events are skipped.
//! - [`OwnershipRegistry`]: outpoint → token id map answering "does this
//!   input carry a token, and which one" without a store round trip.
//!
//! ## Pipeline
//!
//! ```text
//! Stream Consumer ──StreamEvent──→ PipelineDriver ──→ TokenIndexingPipeline
//!                                                          │
//!                       ┌──────────────────────────────────┼──────────────────┐
//!                       ↓                                  ↓                  ↓
//!              BoundedRecencySet                  OwnershipRegistry     TokenValidator
//!                                                                            │
//!                                                                            ↓
//!                                                                       RecordSink
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement | Location |
//! |-----------|-------------|----------|
//! | Recency window never exceeds capacity after a push | evict oldest on overflow | recency.rs |
//! | Eviction is FIFO by first insertion | re-push is a no-op | recency.rs |
//! | One token id per outpoint | `HashMap` keyed by outpoint | ownership.rs |
//! | One registry per pipeline | `OwnershipHandle` clones share state | ownership.rs |
//! | State only reflects persisted transactions | apply after sink write | pipeline.rs |
//!
//! ## Concurrency
//!
//! Neither structure synchronizes compound updates on its own. The
//! [`PipelineDriver`] serializes every mutation onto one task; callers that
//! bypass it must provide their own serialization.
//!
//! ## Hexagonal Architecture
//!
//! - **Domain Layer** (`domain/`): recency set, ownership registry, config, errors
//! - **Ports Layer** (`ports/`): pipeline API, validator and sink SPIs
//! - **Service Layer** (`service/`): `TokenIndexingPipeline`
//! - **Adapters Layer** (`adapters/`): `PipelineDriver`

pub mod adapters;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-export main types for convenience
pub use domain::{
    BoundedRecencySet, ConfigError, OwnershipHandle, OwnershipRegistry, PipelineError,
    StateConfig, ENV_RECENT_BLOCK_CAPACITY, ENV_RECENT_TX_CAPACITY,
};

pub use ports::{
    BlockOutcome, EventOutcome, IndexedTransaction, RecordSink, SinkError, TokenIndexingApi,
    TokenInput, TokenTxKind, TokenValidator, TokenVerdict, TxOutcome, ValidatorError,
};

pub use metrics::{PipelineMetrics, PipelineStats};
pub use service::TokenIndexingPipeline;
pub use adapters::PipelineDriver;
