//! # Core Domain Entities
//!
//! Chain entities as seen by the token indexer.
//!
//! ## Clusters
//!
//! - **Identifiers**: `TxId`, `TokenId`, `OutPoint`
//! - **Transactions**: `TxInput`, `TxOutput`, `Transaction`
//! - **Stream**: `BlockNotification`, `StreamEvent`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ParseError;

// =============================================================================
// CLUSTER A: IDENTIFIERS
// =============================================================================

/// A 32-byte hash.
pub type Hash = [u8; 32];

/// Implements hex `Display`, `Debug` and `FromStr` for a 32-byte newtype.
macro_rules! hash_newtype {
    ($name:ident) => {
        impl $name {
            /// Wrap raw bytes.
            pub const fn new(bytes: Hash) -> Self {
                Self(bytes)
            }

            /// Borrow the raw bytes.
            pub fn as_bytes(&self) -> &Hash {
                &self.0
            }
        }

        impl From<Hash> for $name {
            fn from(bytes: Hash) -> Self {
                Self(bytes)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), hex::encode(&self.0[..8]))
            }
        }

        impl FromStr for $name {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let bytes = hex::decode(s)?;
                let actual = bytes.len();
                let hash: Hash = bytes.try_into().map_err(|_| ParseError::InvalidLength {
                    expected: 32,
                    actual,
                })?;
                Ok(Self(hash))
            }
        }
    };
}

/// Transaction identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct TxId(pub Hash);

hash_newtype!(TxId);

/// Token identifier.
///
/// For a genesis transaction this is the genesis transaction's id; every
/// later output of the token carries the same value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct TokenId(pub Hash);

hash_newtype!(TokenId);

impl From<TxId> for TokenId {
    fn from(txid: TxId) -> Self {
        Self(txid.0)
    }
}

/// Reference to a transaction output: `(txid, vout)`.
///
/// Text form is `<txid hex>:<vout>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutPoint {
    /// Transaction that created the output.
    pub txid: TxId,
    /// Index of the output within that transaction.
    pub vout: u32,
}

impl OutPoint {
    pub const fn new(txid: TxId, vout: u32) -> Self {
        Self { txid, vout }
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

impl FromStr for OutPoint {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (txid, vout) = s
            .rsplit_once(':')
            .ok_or_else(|| ParseError::MalformedOutPoint(s.to_string()))?;
        let vout = vout
            .parse::<u32>()
            .map_err(|_| ParseError::InvalidOutputIndex(vout.to_string()))?;
        Ok(Self {
            txid: txid.parse()?,
            vout,
        })
    }
}

// =============================================================================
// CLUSTER B: TRANSACTIONS
// =============================================================================

/// A transaction input, spending a previous output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    /// The output being spent.
    pub prev_out: OutPoint,
}

/// A transaction output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    /// Base-currency value in the chain's smallest unit.
    pub value: u64,
    /// Decoded destination address, if the script has one.
    pub address: Option<String>,
}

/// A transaction as delivered by the node's notification stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub txid: TxId,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
}

impl Transaction {
    /// Reference to this transaction's output at `vout`.
    pub fn outpoint(&self, vout: u32) -> OutPoint {
        OutPoint::new(self.txid, vout)
    }

    /// Iterate over the outputs this transaction spends.
    pub fn spent_outpoints(&self) -> impl Iterator<Item = &OutPoint> + '_ {
        self.inputs.iter().map(|input| &input.prev_out)
    }
}

// =============================================================================
// CLUSTER C: STREAM
// =============================================================================

/// A block as announced by the node, with its full transaction list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockNotification {
    pub hash: Hash,
    pub height: u64,
    pub transactions: Vec<Transaction>,
}

/// One event from the node's notification stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamEvent {
    /// A transaction accepted into the node's mempool.
    Mempool(Transaction),
    /// A block connected to the best chain.
    Block(BlockNotification),
}
