//! # Outbound Ports (Driven Ports)
//!
//! SPIs the pipeline depends on but does not implement:
//!
//! - `TokenValidator`: the token protocol rules (genesis/mint/send, DAG walk
//!   over parents). This crate only hands it the ownership facts it needs.
//! - `RecordSink`: the document store receiving indexed transactions.

use serde::{Deserialize, Serialize};
use shared_types::{OutPoint, TokenId, Transaction, TxId};
use thiserror::Error;

/// An input of the transaction under validation that spends a tracked
/// token output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInput {
    /// Position of the input in the transaction.
    pub input_index: usize,
    /// The token output being spent.
    pub outpoint: OutPoint,
    /// Token carried by that output.
    pub token_id: TokenId,
}

/// Token transaction type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenTxKind {
    Genesis,
    Mint,
    Send,
}

/// Validator decision for one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenVerdict {
    /// No token metadata; any token inputs are burned.
    NotToken,
    /// Valid token transaction. `token_outputs` are the output indices that
    /// now carry `token_id` (including a mint baton, if any).
    Valid {
        token_id: TokenId,
        kind: TokenTxKind,
        token_outputs: Vec<u32>,
    },
    /// Token metadata present but the transaction breaks protocol rules.
    Invalid {
        token_id: Option<TokenId>,
        reason: String,
    },
}

/// Token protocol validation.
pub trait TokenValidator: Send {
    /// Decide whether `tx` is a valid token transaction.
    ///
    /// `token_inputs` lists every input that spends a tracked token output,
    /// resolved from the ownership registry before the call.
    fn classify(
        &self,
        tx: &Transaction,
        token_inputs: &[TokenInput],
    ) -> Result<TokenVerdict, ValidatorError>;
}

/// Record handed to persistence for every processed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedTransaction {
    pub txid: TxId,
    /// `None` while the transaction is only in the mempool.
    pub block_height: Option<u64>,
    pub verdict: TokenVerdict,
    /// Token outputs this transaction consumed.
    pub spent_token_inputs: Vec<TokenInput>,
}

/// Persistence of indexed transactions.
pub trait RecordSink: Send {
    fn write(&mut self, record: IndexedTransaction) -> Result<(), SinkError>;

    /// Mark an already written transaction as confirmed at `block_height`.
    ///
    /// Called for block transactions the pipeline skipped because it had
    /// already indexed them from the mempool.
    fn confirm(&mut self, txid: &TxId, block_height: u64) -> Result<(), SinkError>;
}

/// Validator failures. Not a verdict: the transaction could not be judged.
#[derive(Debug, Clone, Error)]
pub enum ValidatorError {
    /// A parent transaction needed for the decision is unavailable.
    #[error("Missing parent transaction {0}")]
    MissingParent(TxId),

    #[error("Validator backend error: {0}")]
    Backend(String),
}

/// Persistence failures.
#[derive(Debug, Clone, Error)]
pub enum SinkError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Write rejected: {0}")]
    Rejected(String),
}
