//! # Token Indexing Pipeline
//!
//! Coordinator that owns the recency windows and the ownership registry and
//! applies each stream event to them in program order.
//!
//! ## Transaction Flow
//!
//! ```text
//! Transaction
//!     │
//!     ├─ recent_txs.has(txid)? ──yes──→ Duplicate
//!     │
//!     ├─ any output already tracked? ──yes──→ Duplicate (applied before)
//!     │
//!     ↓
//! resolve inputs against ownership registry → token_inputs
//!     │
//!     ↓
//! TokenValidator::classify(tx, token_inputs) → verdict
//!     │
//!     ↓
//! RecordSink::write(IndexedTransaction)
//!     │
//!     ↓
//! delete spent token inputs, set token outputs (Valid only), push txid
//! ```
//!
//! A validator or sink failure returns before the apply step, so the core
//! state only ever reflects transactions that reached persistence.

use std::sync::Arc;

use shared_types::{BlockNotification, Hash, OutPoint, StreamEvent, TokenId, Transaction, TxId};
use tracing::{debug, info, instrument, trace, warn};

use crate::domain::{BoundedRecencySet, ConfigError, OwnershipHandle, PipelineError, StateConfig};
use crate::metrics::{PipelineMetrics, PipelineStats};
use crate::ports::{
    BlockOutcome, EventOutcome, IndexedTransaction, RecordSink, TokenIndexingApi, TokenInput,
    TokenValidator, TokenVerdict, TxOutcome,
};

/// The validation pipeline's state coordinator.
pub struct TokenIndexingPipeline<V, S> {
    config: StateConfig,
    recent_txs: BoundedRecencySet<TxId>,
    recent_blocks: BoundedRecencySet<Hash>,
    ownership: OwnershipHandle,
    validator: V,
    sink: S,
    metrics: Arc<PipelineMetrics>,
}

impl<V, S> TokenIndexingPipeline<V, S>
where
    V: TokenValidator,
    S: RecordSink,
{
    /// Create a pipeline with a fresh ownership registry.
    pub fn new(config: StateConfig, validator: V, sink: S) -> Result<Self, ConfigError> {
        Self::with_ownership(config, validator, sink, OwnershipHandle::new())
    }

    /// Create a pipeline that shares an existing ownership registry.
    pub fn with_ownership(
        config: StateConfig,
        validator: V,
        sink: S,
        ownership: OwnershipHandle,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            recent_tx_capacity = config.recent_tx_capacity,
            recent_block_capacity = config.recent_block_capacity,
            tracked_outputs = ownership.len(),
            "Creating token indexing pipeline"
        );

        Ok(Self {
            recent_txs: BoundedRecencySet::new(config.recent_tx_capacity),
            recent_blocks: BoundedRecencySet::new(config.recent_block_capacity),
            config,
            ownership,
            validator,
            sink,
            metrics: Arc::new(PipelineMetrics::new()),
        })
    }

    /// Handle to the pipeline's ownership registry.
    pub fn ownership(&self) -> OwnershipHandle {
        self.ownership.clone()
    }

    pub fn metrics(&self) -> Arc<PipelineMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn config(&self) -> &StateConfig {
        &self.config
    }

    pub fn validator(&self) -> &V {
        &self.validator
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Forget recently processed transactions and blocks.
    ///
    /// Reconnected blocks are then processed again. The ownership registry
    /// is left untouched, so a replayed transaction whose token outputs are
    /// still tracked is recognised as already applied and not re-judged. A
    /// transaction whose token outputs have all been spent since cannot be
    /// recognised this way and is classified again.
    pub fn reset_recency(&mut self) {
        info!(
            recent_txs = self.recent_txs.len(),
            recent_blocks = self.recent_blocks.len(),
            "Resetting recency windows"
        );
        self.recent_txs.clear();
        self.recent_blocks.clear();
    }

    fn resolve_token_inputs(&self, tx: &Transaction) -> Vec<TokenInput> {
        self.ownership.with(|registry| {
            tx.inputs
                .iter()
                .enumerate()
                .filter_map(|(index, input)| {
                    registry.get(&input.prev_out).map(|token_id| TokenInput {
                        input_index: index,
                        outpoint: input.prev_out,
                        token_id,
                    })
                })
                .collect()
        })
    }

    /// Whether `tx` was applied before and has left its token outputs in
    /// the registry. Its spent inputs are gone by then, so classifying it
    /// again would produce a different verdict.
    fn already_applied(&self, tx: &Transaction) -> bool {
        let outputs = u32::try_from(tx.outputs.len()).unwrap_or(u32::MAX);
        self.ownership
            .with(|registry| (0..outputs).any(|vout| registry.contains(&tx.outpoint(vout))))
    }

    fn skip_duplicate(
        &mut self,
        tx: &Transaction,
        block_height: Option<u64>,
    ) -> Result<TxOutcome, PipelineError> {
        if let Some(height) = block_height {
            self.sink.confirm(&tx.txid, height)?;
        }
        self.metrics.record_duplicate();
        Ok(TxOutcome::Duplicate)
    }

    /// Update ownership for a persisted transaction. Returns the number of
    /// outputs added.
    fn apply_ownership(
        &self,
        tx: &Transaction,
        token_inputs: &[TokenInput],
        verdict: &TokenVerdict,
    ) -> usize {
        self.ownership.with(|registry| {
            // Spent outputs leave the registry whatever the verdict.
            for input in token_inputs {
                registry.delete(&input.outpoint);
            }

            let TokenVerdict::Valid {
                token_id,
                token_outputs,
                ..
            } = verdict
            else {
                return 0;
            };

            let mut added = 0;
            for &vout in token_outputs {
                if vout as usize >= tx.outputs.len() {
                    warn!(
                        txid = %tx.txid,
                        vout,
                        outputs = tx.outputs.len(),
                        "Validator reported token output beyond transaction outputs"
                    );
                    continue;
                }
                if registry.set(tx.outpoint(vout), *token_id).is_none() {
                    added += 1;
                }
            }
            added
        })
    }

    fn index_transaction(
        &mut self,
        tx: &Transaction,
        block_height: Option<u64>,
    ) -> Result<TxOutcome, PipelineError> {
        if self.recent_txs.has(&tx.txid) {
            trace!(txid = %tx.txid, "Skipping recently processed transaction");
            return self.skip_duplicate(tx, block_height);
        }

        if self.already_applied(tx) {
            debug!(
                txid = %tx.txid,
                "Skipping transaction whose token outputs are already tracked"
            );
            let outcome = self.skip_duplicate(tx, block_height)?;
            self.recent_txs.push(tx.txid);
            return Ok(outcome);
        }

        let token_inputs = self.resolve_token_inputs(tx);
        let verdict = self.validator.classify(tx, &token_inputs)?;

        self.sink.write(IndexedTransaction {
            txid: tx.txid,
            block_height,
            verdict: verdict.clone(),
            spent_token_inputs: token_inputs.clone(),
        })?;

        let added = self.apply_ownership(tx, &token_inputs, &verdict);
        self.recent_txs.push(tx.txid);

        self.metrics.record_indexed();
        self.metrics.record_outputs_added(added);
        self.metrics.record_outputs_spent(token_inputs.len());

        match &verdict {
            TokenVerdict::Invalid { token_id, reason } => {
                self.metrics.record_invalid();
                warn!(
                    txid = %tx.txid,
                    token_id = ?token_id,
                    burned_inputs = token_inputs.len(),
                    reason = %reason,
                    "Invalid token transaction"
                );
            }
            TokenVerdict::Valid { token_id, kind, .. } => {
                debug!(
                    txid = %tx.txid,
                    token_id = %token_id,
                    kind = ?kind,
                    outputs_added = added,
                    inputs_spent = token_inputs.len(),
                    "Indexed token transaction"
                );
            }
            TokenVerdict::NotToken if !token_inputs.is_empty() => {
                debug!(
                    txid = %tx.txid,
                    burned_inputs = token_inputs.len(),
                    "Non-token transaction burned token inputs"
                );
            }
            TokenVerdict::NotToken => {}
        }

        Ok(TxOutcome::Indexed { verdict })
    }
}

impl<V, S> TokenIndexingApi for TokenIndexingPipeline<V, S>
where
    V: TokenValidator,
    S: RecordSink,
{
    fn handle_event(&mut self, event: StreamEvent) -> Result<EventOutcome, PipelineError> {
        match event {
            StreamEvent::Mempool(tx) => self
                .process_transaction(&tx, None)
                .map(EventOutcome::Transaction),
            StreamEvent::Block(block) => self.process_block(&block).map(EventOutcome::Block),
        }
    }

    fn process_transaction(
        &mut self,
        tx: &Transaction,
        block_height: Option<u64>,
    ) -> Result<TxOutcome, PipelineError> {
        let result = self.index_transaction(tx, block_height);
        if let Err(err) = &result {
            self.metrics.record_error();
            debug!(txid = %tx.txid, error = %err, "Transaction processing failed");
        }
        result
    }

    #[instrument(skip_all, fields(height = block.height))]
    fn process_block(&mut self, block: &BlockNotification) -> Result<BlockOutcome, PipelineError> {
        if self.recent_blocks.has(&block.hash) {
            debug!(block = %hex::encode(&block.hash[..8]), "Skipping recently processed block");
            return Ok(BlockOutcome::Duplicate);
        }

        let mut indexed = 0;
        let mut skipped = 0;
        for tx in &block.transactions {
            match self.process_transaction(tx, Some(block.height))? {
                TxOutcome::Duplicate => skipped += 1,
                TxOutcome::Indexed { .. } => indexed += 1,
            }
        }

        self.recent_blocks.push(block.hash);
        self.metrics.record_block();
        info!(
            block = %hex::encode(&block.hash[..8]),
            indexed,
            skipped,
            tracked_outputs = self.ownership.len(),
            "Processed block"
        );

        Ok(BlockOutcome::Processed {
            height: block.height,
            indexed,
            skipped,
        })
    }

    fn token_of(&self, outpoint: &OutPoint) -> Option<TokenId> {
        self.ownership.get(outpoint)
    }

    fn has_seen(&self, txid: &TxId) -> bool {
        self.recent_txs.has(txid)
    }

    fn stats(&self) -> PipelineStats {
        PipelineStats {
            tracked_outputs: self.ownership.len(),
            recent_txs: self.recent_txs.len(),
            recent_blocks: self.recent_blocks.len(),
            ..self.metrics.snapshot()
        }
    }
}
