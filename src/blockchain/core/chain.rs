use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};
use tracing::{info, warn};

use crate::blockchain::core::state::AccountRecord;
use crate::config::{LedgerConfig, GENESIS_PREV_HASH};
use crate::crypto::seal_digest;
use crate::error::{ChainError, Result};
use crate::transaction::Transaction;
use crate::{now_millis, Timestamp};

/// Hex-encoded SHA-256 block hash.
pub type BlockHash = String;

/// Payload of the first block in every chain.
pub const GENESIS_MARKER: &str = "Genesis Block";

/// What a block seals: the genesis marker or a batch of records.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockPayload {
    Genesis,
    Records(Vec<Transaction>),
}

impl BlockPayload {
    /// Sealed records; empty for genesis.
    pub fn records(&self) -> &[Transaction] {
        match self {
            BlockPayload::Genesis => &[],
            BlockPayload::Records(records) => records,
        }
    }

    pub fn is_genesis(&self) -> bool {
        matches!(self, BlockPayload::Genesis)
    }

    pub fn to_canonical_value(&self) -> Value {
        match self {
            BlockPayload::Genesis => Value::from(GENESIS_MARKER),
            BlockPayload::Records(records) => {
                Value::Array(records.iter().map(Transaction::to_canonical_value).collect())
            }
        }
    }
}

impl Serialize for BlockPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            BlockPayload::Genesis => serializer.serialize_str(GENESIS_MARKER),
            BlockPayload::Records(records) => records.serialize(serializer),
        }
    }
}

/// A sealed unit of chain history. Fields are read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    transactions: BlockPayload,
    timestamp: Timestamp,
    seal_key: String,
    prev_hash: BlockHash,
    hash: BlockHash,
}

impl Block {
    pub fn new(
        transactions: BlockPayload,
        prev_hash: impl Into<BlockHash>,
        seal_key: impl Into<String>,
    ) -> Self {
        let mut block = Block {
            transactions,
            timestamp: now_millis(),
            seal_key: seal_key.into(),
            prev_hash: prev_hash.into(),
            hash: BlockHash::new(),
        };
        block.hash = block.compute_hash();
        block
    }

    pub fn genesis(seal_key: impl Into<String>) -> Self {
        Block::new(BlockPayload::Genesis, GENESIS_PREV_HASH, seal_key)
    }

    /// Reassemble a block from stored parts without recomputing its hash.
    ///
    /// Nothing is checked here; call [`Block::verify_integrity`] before
    /// trusting the result.
    pub fn from_parts(
        transactions: BlockPayload,
        timestamp: Timestamp,
        seal_key: impl Into<String>,
        prev_hash: impl Into<BlockHash>,
        hash: impl Into<BlockHash>,
    ) -> Self {
        Block {
            transactions,
            timestamp,
            seal_key: seal_key.into(),
            prev_hash: prev_hash.into(),
            hash: hash.into(),
        }
    }

    /// JSON of the hashed fields with keys in sorted order at every level.
    pub fn canonical_payload(&self) -> String {
        let mut payload = Map::new();
        payload.insert("prev_hash".to_string(), Value::from(self.prev_hash.as_str()));
        payload.insert("seal_key".to_string(), Value::from(self.seal_key.as_str()));
        payload.insert("timestamp".to_string(), Value::from(self.timestamp));
        payload.insert("transactions".to_string(), self.transactions.to_canonical_value());
        Value::Object(payload).to_string()
    }

    pub fn compute_hash(&self) -> BlockHash {
        seal_digest(&self.canonical_payload(), &self.seal_key)
    }

    /// True while the stored hash still matches the block's contents.
    pub fn verify_integrity(&self) -> bool {
        self.hash == self.compute_hash()
    }

    pub fn transactions(&self) -> &BlockPayload {
        &self.transactions
    }

    pub fn records(&self) -> &[Transaction] {
        self.transactions.records()
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn seal_key(&self) -> &str {
        &self.seal_key
    }

    pub fn prev_hash(&self) -> &str {
        &self.prev_hash
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }
}

#[cfg(test)]
impl Block {
    pub(crate) fn tamper_transactions(&mut self, transactions: BlockPayload) {
        self.transactions = transactions;
    }

    pub(crate) fn tamper_timestamp(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    pub(crate) fn tamper_seal_key(&mut self, seal_key: &str) {
        self.seal_key = seal_key.to_string();
    }

    pub(crate) fn tamper_prev_hash(&mut self, prev_hash: &str) {
        self.prev_hash = prev_hash.to_string();
    }

    pub(crate) fn tamper_hash(&mut self, hash: &str) {
        self.hash = hash.to_string();
    }
}

/// The chain engine: ordered blocks plus a mirror of account balances.
///
/// The mirror is bookkeeping only. Authoritative balances come from
/// [`Ledger::calculate_account_balance_from_history`].
#[derive(Debug, Clone)]
pub struct Ledger {
    pub(super) chain: Vec<Block>,
    pub(super) accounts: HashMap<String, AccountRecord>,
    pub(super) config: LedgerConfig,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Create a ledger with the default constants and its genesis block.
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    /// Create a ledger whose genesis block is sealed with `seal_key`.
    pub fn with_seal_key(seal_key: impl Into<String>) -> Self {
        Self::with_config(LedgerConfig {
            genesis_seal_key: seal_key.into(),
            ..LedgerConfig::default()
        })
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        let genesis_seal_key = config.genesis_seal_key.clone();
        let mut ledger = Ledger {
            chain: Vec::new(),
            accounts: HashMap::new(),
            config,
        };
        ledger.accounts.insert(
            ledger.config.levy_account.clone(),
            AccountRecord::new(0.0, genesis_seal_key.clone()),
        );
        ledger.create_genesis_block(&genesis_seal_key);
        ledger
    }

    fn create_genesis_block(&mut self, seal_key: &str) {
        if !self.chain.is_empty() {
            warn!("Genesis block can only be created on an empty chain");
            return;
        }
        self.chain.push(Block::genesis(seal_key));
    }

    /// Seal `batch` into a new block on top of the current tip.
    pub fn add_block(&mut self, batch: Vec<Transaction>, seal_key: &str) -> Result<&Block> {
        if batch.is_empty() && !self.config.allow_empty_blocks {
            return Err(ChainError::MiningFailure(
                "No pending transactions to mine".to_string(),
            ));
        }
        let tip_hash = self
            .latest_block()
            .map(|tip| tip.hash().to_string())
            .ok_or_else(|| ChainError::MiningFailure("The chain is empty".to_string()))?;

        let candidate = Block::new(BlockPayload::Records(batch), tip_hash, seal_key);
        self.append_block(candidate).map_err(|e| match e {
            ChainError::ChainIntegrityFailure(msg) => ChainError::MiningFailure(msg),
            other => other,
        })?;

        self.latest_block()
            .ok_or_else(|| ChainError::MiningFailure("The chain is empty".to_string()))
    }

    /// Append a pre-built block if it is intact and links to the tip.
    pub fn append_block(&mut self, block: Block) -> Result<()> {
        let tip = self.chain.last().ok_or_else(|| {
            ChainError::ChainIntegrityFailure("Cannot append to an empty chain".to_string())
        })?;

        if !block.verify_integrity() {
            warn!(hash = block.hash(), "Rejected block with stale hash");
            return Err(ChainError::ChainIntegrityFailure(format!(
                "Block hash {} does not match its contents",
                block.hash()
            )));
        }

        if block.prev_hash() != tip.hash() {
            warn!(prev_hash = block.prev_hash(), "Rejected block not linked to the tip");
            return Err(ChainError::ChainIntegrityFailure(format!(
                "Invalid previous block hash. Expected {}, but got {}.",
                tip.hash(),
                block.prev_hash()
            )));
        }

        self.update_accounts_from_block(&block);
        info!(
            index = self.chain.len(),
            hash = block.hash(),
            records = block.records().len(),
            seal_key = block.seal_key(),
            "Appended block"
        );
        self.chain.push(block);
        Ok(())
    }

    pub fn latest_block(&self) -> Option<&Block> {
        self.chain.last()
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.chain.get(index)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Every record across all blocks, in chain order.
    pub fn transaction_history(&self) -> Vec<&Transaction> {
        self.chain.iter().flat_map(Block::records).collect()
    }

    /// Distinct seal keys used anywhere in the chain.
    pub fn seal_keys(&self) -> BTreeSet<&str> {
        self.chain.iter().map(Block::seal_key).collect()
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }
}
