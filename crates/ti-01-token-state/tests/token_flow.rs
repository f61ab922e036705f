//! # Token Flow Tests for Token State (ti-01)
//!
//! End-to-end runs of the pipeline against in-memory collaborators.
//!
//! ## Test Categories
//!
//! 1. **Recency Window** - capacity bound, FIFO eviction, duplicate pushes
//! 2. **Ownership Lifecycle** - genesis, send, mint baton, burn
//! 3. **Stream Replay** - mempool then block, redelivered blocks, reorg reset
//! 4. **Shared Registry** - several pipeline stages on one handle

use std::collections::{HashMap, HashSet};

use shared_types::{
    BlockNotification, OutPoint, StreamEvent, TokenId, Transaction, TxId, TxInput, TxOutput,
};
use ti_01_token_state::{
    BlockOutcome, BoundedRecencySet, EventOutcome, IndexedTransaction, OwnershipHandle,
    RecordSink, SinkError, StateConfig, TokenIndexingApi, TokenIndexingPipeline, TokenInput,
    TokenTxKind, TokenValidator, TokenVerdict, TxOutcome, ValidatorError,
};

// =============================================================================
// TEST HELPERS
// =============================================================================

fn txid(b: u8) -> TxId {
    let mut h = [0u8; 32];
    h[0] = b;
    TxId(h)
}

fn make_tx(id: u8, spends: &[OutPoint], outputs: usize) -> Transaction {
    Transaction {
        txid: txid(id),
        inputs: spends
            .iter()
            .map(|prev_out| TxInput {
                prev_out: *prev_out,
            })
            .collect(),
        outputs: (0..outputs)
            .map(|i| TxOutput {
                value: 546,
                address: Some(format!("addr-{id}-{i}")),
            })
            .collect(),
    }
}

/// Minimal stand-in for the token protocol rules: a scripted verdict per
/// txid. Sends are only valid if they spend at least one input of the token.
#[derive(Default)]
struct FakeValidator {
    genesis: HashMap<TxId, Vec<u32>>,
    sends: HashMap<TxId, (TokenId, Vec<u32>)>,
    mints: HashMap<TxId, (TokenId, Vec<u32>)>,
}

impl TokenValidator for FakeValidator {
    fn classify(
        &self,
        tx: &Transaction,
        token_inputs: &[TokenInput],
    ) -> Result<TokenVerdict, ValidatorError> {
        if let Some(outputs) = self.genesis.get(&tx.txid) {
            return Ok(TokenVerdict::Valid {
                token_id: TokenId::from(tx.txid),
                kind: TokenTxKind::Genesis,
                token_outputs: outputs.clone(),
            });
        }

        for (table, kind) in [(&self.sends, TokenTxKind::Send), (&self.mints, TokenTxKind::Mint)] {
            if let Some((token_id, outputs)) = table.get(&tx.txid) {
                if token_inputs.iter().any(|input| input.token_id == *token_id) {
                    return Ok(TokenVerdict::Valid {
                        token_id: *token_id,
                        kind,
                        token_outputs: outputs.clone(),
                    });
                }
                return Ok(TokenVerdict::Invalid {
                    token_id: Some(*token_id),
                    reason: "no inputs of this token".to_string(),
                });
            }
        }

        Ok(TokenVerdict::NotToken)
    }
}

#[derive(Default)]
struct MemoryStore {
    records: Vec<IndexedTransaction>,
    confirmed: HashMap<TxId, u64>,
}

impl MemoryStore {
    fn record(&self, id: TxId) -> Option<&IndexedTransaction> {
        self.records.iter().find(|r| r.txid == id)
    }
}

impl RecordSink for MemoryStore {
    fn write(&mut self, record: IndexedTransaction) -> Result<(), SinkError> {
        self.records.push(record);
        Ok(())
    }

    fn confirm(&mut self, txid: &TxId, block_height: u64) -> Result<(), SinkError> {
        self.confirmed.insert(*txid, block_height);
        Ok(())
    }
}

fn make_pipeline(validator: FakeValidator) -> TokenIndexingPipeline<FakeValidator, MemoryStore> {
    TokenIndexingPipeline::new(StateConfig::default(), validator, MemoryStore::default()).unwrap()
}

// =============================================================================
// CATEGORY 1: RECENCY WINDOW
// =============================================================================

#[test]
fn test_recency_capacity_two_scenario() {
    let mut seen = BoundedRecencySet::new(2);
    seen.push("a");
    seen.push("b");
    seen.push("c");

    assert!(!seen.has(&"a"));
    assert!(seen.has(&"b"));
    assert!(seen.has(&"c"));
}

#[test]
fn test_recency_duplicate_then_overflow_scenario() {
    let mut seen = BoundedRecencySet::new(2);
    seen.push("a");
    seen.push("a");
    seen.push("b");
    seen.push("c");

    let members: HashSet<&str> = seen.iter().copied().collect();
    assert_eq!(members, HashSet::from(["b", "c"]));
    assert_eq!(seen.len(), members.len());
}

#[test]
fn test_recency_survivors_are_last_max_size_distinct_keys() {
    let max_size = 8;
    let mut seen = BoundedRecencySet::new(max_size);
    let keys: Vec<TxId> = (0..50).map(txid).collect();
    for key in &keys {
        seen.push(*key);
    }

    for evicted in &keys[..keys.len() - max_size] {
        assert!(!seen.has(evicted));
    }
    for survivor in &keys[keys.len() - max_size..] {
        assert!(seen.has(survivor));
    }
}

#[test]
fn test_recency_shift_on_empty() {
    let mut seen: BoundedRecencySet<TxId> = BoundedRecencySet::new(3);
    assert_eq!(seen.shift(), None);
    assert_eq!(seen.shift(), None);
}

#[test]
fn test_small_window_forgets_old_transactions() {
    let config = StateConfig::default().with_recent_tx_capacity(2);
    let mut pipeline =
        TokenIndexingPipeline::new(config, FakeValidator::default(), MemoryStore::default())
            .unwrap();

    for id in 1..=3 {
        pipeline
            .process_transaction(&make_tx(id, &[], 1), None)
            .unwrap();
    }

    assert!(!pipeline.has_seen(&txid(1)));
    assert!(pipeline.has_seen(&txid(3)));
    // a plain transaction evicted from the window is indexed again
    assert!(matches!(
        pipeline.process_transaction(&make_tx(1, &[], 1), None).unwrap(),
        TxOutcome::Indexed { .. }
    ));
    assert_eq!(pipeline.stats().recent_txs, 2);
}

// =============================================================================
// CATEGORY 2: OWNERSHIP LIFECYCLE
// =============================================================================

#[test]
fn test_genesis_send_mint_lifecycle() {
    let token = TokenId::from(txid(1));
    let mut validator = FakeValidator::default();
    // genesis: output 0 tokens, output 1 mint baton
    validator.genesis.insert(txid(1), vec![0, 1]);
    validator.sends.insert(txid(2), (token, vec![0, 1]));
    validator.mints.insert(txid(3), (token, vec![0, 1]));
    let mut pipeline = make_pipeline(validator);

    let genesis = make_tx(1, &[], 2);
    let send = make_tx(2, &[genesis.outpoint(0)], 2);
    let mint = make_tx(3, &[genesis.outpoint(1)], 2);

    for tx in [&genesis, &send, &mint] {
        pipeline.process_transaction(tx, None).unwrap();
    }

    let ownership = pipeline.ownership();
    assert_eq!(ownership.get(&genesis.outpoint(0)), None);
    assert_eq!(ownership.get(&genesis.outpoint(1)), None);
    assert_eq!(ownership.get(&send.outpoint(0)), Some(token));
    assert_eq!(ownership.get(&send.outpoint(1)), Some(token));
    assert_eq!(ownership.get(&mint.outpoint(1)), Some(token));
    assert_eq!(ownership.len(), 4);

    let owned = ownership.with(|registry| registry.outputs_of(&token).count());
    assert_eq!(owned, 4);
}

#[test]
fn test_invalid_send_burns_inputs() {
    let token = TokenId::from(txid(1));
    let other = TokenId::from(txid(9));
    let mut validator = FakeValidator::default();
    validator.genesis.insert(txid(1), vec![0]);
    // claims to send a token it does not spend
    validator.sends.insert(txid(2), (other, vec![0]));
    let mut pipeline = make_pipeline(validator);

    let genesis = make_tx(1, &[], 1);
    let bad_send = make_tx(2, &[genesis.outpoint(0)], 1);
    pipeline.process_transaction(&genesis, None).unwrap();
    let outcome = pipeline.process_transaction(&bad_send, None).unwrap();

    assert!(matches!(
        outcome,
        TxOutcome::Indexed {
            verdict: TokenVerdict::Invalid { .. }
        }
    ));
    assert_eq!(pipeline.token_of(&genesis.outpoint(0)), None);
    assert_eq!(pipeline.token_of(&bad_send.outpoint(0)), None);

    let record = pipeline.sink().record(txid(2)).unwrap();
    assert_eq!(record.spent_token_inputs.len(), 1);
    assert_eq!(record.spent_token_inputs[0].token_id, token);
    assert_eq!(pipeline.stats().invalid_token_txs, 1);
}

#[test]
fn test_plain_transaction_leaves_registry_alone() {
    let mut validator = FakeValidator::default();
    validator.genesis.insert(txid(1), vec![0]);
    let mut pipeline = make_pipeline(validator);

    let genesis = make_tx(1, &[], 2);
    pipeline.process_transaction(&genesis, None).unwrap();
    // spends the non-token output only
    pipeline
        .process_transaction(&make_tx(2, &[genesis.outpoint(1)], 1), None)
        .unwrap();

    assert_eq!(
        pipeline.token_of(&genesis.outpoint(0)),
        Some(TokenId::from(txid(1)))
    );
    assert_eq!(pipeline.stats().token_outputs_spent, 0);
}

// =============================================================================
// CATEGORY 3: STREAM REPLAY
// =============================================================================

#[test]
fn test_mempool_then_block() {
    let mut validator = FakeValidator::default();
    validator.genesis.insert(txid(1), vec![0]);
    let mut pipeline = make_pipeline(validator);
    let genesis = make_tx(1, &[], 1);

    let first = pipeline
        .handle_event(StreamEvent::Mempool(genesis.clone()))
        .unwrap();
    assert!(matches!(
        first,
        EventOutcome::Transaction(TxOutcome::Indexed { .. })
    ));

    let block = BlockNotification {
        hash: [0xB0; 32],
        height: 100,
        transactions: vec![genesis.clone(), make_tx(2, &[], 1)],
    };
    let outcome = pipeline.handle_event(StreamEvent::Block(block)).unwrap();

    assert_eq!(
        outcome,
        EventOutcome::Block(BlockOutcome::Processed {
            height: 100,
            indexed: 1,
            skipped: 1
        })
    );
    let store = pipeline.sink();
    assert_eq!(store.records.len(), 2);
    assert_eq!(store.record(txid(1)).unwrap().block_height, None);
    assert_eq!(store.record(txid(2)).unwrap().block_height, Some(100));
    assert_eq!(store.confirmed.get(&txid(1)), Some(&100));
}

#[test]
fn test_redelivered_block_is_duplicate() {
    let mut pipeline = make_pipeline(FakeValidator::default());
    let block = BlockNotification {
        hash: [0xB1; 32],
        height: 101,
        transactions: vec![make_tx(1, &[], 1)],
    };

    pipeline.process_block(&block).unwrap();
    assert_eq!(
        pipeline.process_block(&block).unwrap(),
        BlockOutcome::Duplicate
    );
    assert_eq!(pipeline.sink().records.len(), 1);
    assert_eq!(pipeline.stats().blocks_processed, 1);
}

#[test]
fn test_reset_recency_replays_block_without_rejudging() {
    let token = TokenId::from(txid(1));
    let mut validator = FakeValidator::default();
    validator.genesis.insert(txid(1), vec![0]);
    validator.sends.insert(txid(2), (token, vec![0]));
    let mut pipeline = make_pipeline(validator);
    let genesis = make_tx(1, &[], 1);
    let send = make_tx(2, &[genesis.outpoint(0)], 1);
    pipeline.process_transaction(&genesis, None).unwrap();
    let block = BlockNotification {
        hash: [0xB2; 32],
        height: 102,
        transactions: vec![send.clone(), make_tx(3, &[], 1)],
    };

    pipeline.process_block(&block).unwrap();
    pipeline.reset_recency();

    assert_eq!(
        pipeline.process_block(&block).unwrap(),
        BlockOutcome::Processed {
            height: 102,
            indexed: 1,
            skipped: 1
        }
    );
    assert_eq!(pipeline.token_of(&send.outpoint(0)), Some(token));
    assert_eq!(pipeline.stats().tracked_outputs, 1);
    assert_eq!(pipeline.stats().invalid_token_txs, 0);
    let send_records = pipeline
        .sink()
        .records
        .iter()
        .filter(|r| r.txid == txid(2))
        .count();
    assert_eq!(send_records, 1);
}

#[test]
fn test_evicted_send_confirmed_without_rejudging() {
    let token = TokenId::from(txid(1));
    let mut validator = FakeValidator::default();
    validator.genesis.insert(txid(1), vec![0]);
    validator.sends.insert(txid(2), (token, vec![0]));
    let config = StateConfig::default().with_recent_tx_capacity(1);
    let mut pipeline =
        TokenIndexingPipeline::new(config, validator, MemoryStore::default()).unwrap();

    let genesis = make_tx(1, &[], 1);
    let send = make_tx(2, &[genesis.outpoint(0)], 1);
    pipeline.process_transaction(&genesis, None).unwrap();
    pipeline.process_transaction(&send, None).unwrap();
    // unrelated traffic pushes the send out of the window
    pipeline
        .process_transaction(&make_tx(3, &[], 1), None)
        .unwrap();
    assert!(!pipeline.has_seen(&txid(2)));

    let block = BlockNotification {
        hash: [0xB5; 32],
        height: 500,
        transactions: vec![send.clone()],
    };
    assert_eq!(
        pipeline.process_block(&block).unwrap(),
        BlockOutcome::Processed {
            height: 500,
            indexed: 0,
            skipped: 1
        }
    );

    let store = pipeline.sink();
    assert!(matches!(
        store.record(txid(2)).unwrap().verdict,
        TokenVerdict::Valid { .. }
    ));
    assert_eq!(store.records.iter().filter(|r| r.txid == txid(2)).count(), 1);
    assert_eq!(store.confirmed.get(&txid(2)), Some(&500));
    assert_eq!(pipeline.token_of(&send.outpoint(0)), Some(token));
    assert_eq!(pipeline.stats().invalid_token_txs, 0);
}

// =============================================================================
// CATEGORY 4: SHARED REGISTRY
// =============================================================================

#[test]
fn test_registry_handle_identity() {
    let coordinator = OwnershipHandle::new();
    let reader = coordinator.clone();
    let outpoint = OutPoint::new(txid(7), 3);
    let token = TokenId::from(txid(7));

    coordinator.set(outpoint, token);
    assert_eq!(reader.get(&outpoint), Some(token));

    reader.delete(&outpoint);
    assert_eq!(coordinator.get(&outpoint), None);
}

#[test]
fn test_pipelines_share_one_registry() {
    let shared = OwnershipHandle::new();
    let mut validator = FakeValidator::default();
    validator.genesis.insert(txid(1), vec![0]);

    let mut producer = TokenIndexingPipeline::with_ownership(
        StateConfig::default(),
        validator,
        MemoryStore::default(),
        shared.clone(),
    )
    .unwrap();
    let mut consumer = TokenIndexingPipeline::with_ownership(
        StateConfig::default(),
        FakeValidator::default(),
        MemoryStore::default(),
        shared.clone(),
    )
    .unwrap();

    let genesis = make_tx(1, &[], 1);
    producer.process_transaction(&genesis, None).unwrap();
    assert_eq!(
        consumer.token_of(&genesis.outpoint(0)),
        Some(TokenId::from(txid(1)))
    );

    // the second stage spends it and both views agree
    consumer
        .process_transaction(&make_tx(2, &[genesis.outpoint(0)], 1), None)
        .unwrap();
    assert_eq!(producer.token_of(&genesis.outpoint(0)), None);
    assert!(shared.is_empty());
}

#[test]
fn test_fresh_pipelines_are_isolated() {
    let mut validator = FakeValidator::default();
    validator.genesis.insert(txid(1), vec![0]);
    let mut first = make_pipeline(validator);
    let second = make_pipeline(FakeValidator::default());

    first
        .process_transaction(&make_tx(1, &[], 1), None)
        .unwrap();

    assert!(!first.ownership().same_as(&second.ownership()));
    assert_eq!(second.stats().tracked_outputs, 0);
}
