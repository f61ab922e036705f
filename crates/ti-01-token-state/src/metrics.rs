//! Pipeline counters
//!
//! The pipeline owns an `Arc<PipelineMetrics>`; clones can be handed to a
//! monitoring task and read while the pipeline keeps running.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for pipeline activity.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    /// Transactions written to the record sink
    pub transactions_indexed: AtomicU64,
    /// Transactions skipped by the recency window
    pub duplicates_skipped: AtomicU64,
    /// Outpoints added to the ownership registry
    pub token_outputs_added: AtomicU64,
    /// Outpoints removed from the ownership registry because they were spent
    pub token_outputs_spent: AtomicU64,
    /// Transactions the validator judged invalid
    pub invalid_token_txs: AtomicU64,
    /// Blocks fully processed
    pub blocks_processed: AtomicU64,
    /// Events that failed with a pipeline error
    pub errors: AtomicU64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_indexed(&self) {
        self.transactions_indexed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicates_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_outputs_added(&self, count: usize) {
        self.token_outputs_added
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_outputs_spent(&self, count: usize) {
        self.token_outputs_spent
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_invalid(&self) {
        self.invalid_token_txs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_block(&self) {
        self.blocks_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the counters. State sizes are left at zero; the pipeline fills
    /// them in.
    pub fn snapshot(&self) -> PipelineStats {
        PipelineStats {
            transactions_indexed: self.transactions_indexed.load(Ordering::Relaxed),
            duplicates_skipped: self.duplicates_skipped.load(Ordering::Relaxed),
            token_outputs_added: self.token_outputs_added.load(Ordering::Relaxed),
            token_outputs_spent: self.token_outputs_spent.load(Ordering::Relaxed),
            invalid_token_txs: self.invalid_token_txs.load(Ordering::Relaxed),
            blocks_processed: self.blocks_processed.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            ..PipelineStats::default()
        }
    }
}

/// Point-in-time view of the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub transactions_indexed: u64,
    pub duplicates_skipped: u64,
    pub token_outputs_added: u64,
    pub token_outputs_spent: u64,
    pub invalid_token_txs: u64,
    pub blocks_processed: u64,
    pub errors: u64,
    /// Outpoints currently in the ownership registry.
    pub tracked_outputs: usize,
    /// Entries in the transaction recency window.
    pub recent_txs: usize,
    /// Entries in the block recency window.
    pub recent_blocks: usize,
}
