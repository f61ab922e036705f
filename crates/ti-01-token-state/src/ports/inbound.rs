//! # Inbound Ports (Driving Ports)
//!
//! API the stream consumer drives.

use shared_types::{BlockNotification, OutPoint, StreamEvent, TokenId, Transaction, TxId};

use crate::domain::PipelineError;
use crate::metrics::PipelineStats;
use crate::ports::TokenVerdict;

/// Result of offering one transaction to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxOutcome {
    /// Already processed within the recency window; nothing changed.
    Duplicate,
    /// Processed and written to the record sink.
    Indexed { verdict: TokenVerdict },
}

/// Result of offering one block to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
    /// Block hash already processed within the recency window.
    Duplicate,
    Processed {
        height: u64,
        /// Transactions indexed by this block.
        indexed: usize,
        /// Transactions skipped because they were already seen.
        skipped: usize,
    },
}

/// Result of one stream event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Transaction(TxOutcome),
    Block(BlockOutcome),
}

/// Primary API of the token indexing pipeline.
pub trait TokenIndexingApi {
    /// Dispatch a stream event.
    fn handle_event(&mut self, event: StreamEvent) -> Result<EventOutcome, PipelineError>;

    /// Process a transaction, optionally confirmed at `block_height`.
    ///
    /// ## Returns
    ///
    /// - `Ok(TxOutcome::Duplicate)`: txid seen recently, no state change
    /// - `Ok(TxOutcome::Indexed)`: recorded and ownership updated
    /// - `Err(_)`: validator or sink failed, no state change
    fn process_transaction(
        &mut self,
        tx: &Transaction,
        block_height: Option<u64>,
    ) -> Result<TxOutcome, PipelineError>;

    /// Process every transaction of a block, then remember the block.
    fn process_block(&mut self, block: &BlockNotification) -> Result<BlockOutcome, PipelineError>;

    /// Token currently carried by `outpoint`.
    fn token_of(&self, outpoint: &OutPoint) -> Option<TokenId>;

    /// Whether `txid` was processed within the recency window.
    fn has_seen(&self, txid: &TxId) -> bool;

    fn stats(&self) -> PipelineStats;
}
