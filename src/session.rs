//! Application state driving a ledger
//!
//! A [`Session`] keeps its own working view of account balances, the queue of
//! records waiting to be mined and a human-readable history. Acceptance
//! decisions are delegated to the [`Ledger`], which stays the source of truth.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{info, warn};

use crate::blockchain::{AccountRecord, Block, Ledger};
use crate::config::{LedgerConfig, SessionAction};
use crate::error::{ChainError, Result};
use crate::levy::levy_for;
use crate::transaction::{Transaction, TransactionKind};
use crate::{now_millis, Amount, Timestamp};

/// One line of the session's transaction history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub timestamp: Timestamp,
    pub sender: String,
    pub receiver: String,
    pub amount: Amount,
    pub zakat_amount: Amount,
    pub total_cost: Amount,
    pub sender_remaining_balance: Amount,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    pub amount: Amount,
    pub zakat_amount: Amount,
    pub total_cost: Amount,
    pub sender_remaining_balance: Amount,
}

impl fmt::Display for TransferReceipt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Transaction successful! Transfer: ${:.2}, Zakat: ${:.2}",
            self.amount, self.zakat_amount
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MinedBlock {
    pub index: usize,
    pub hash: String,
    pub seal_key: String,
    pub records: usize,
}

impl fmt::Display for MinedBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Block #{} mined with seal key {} ({} records)",
            self.index, self.seal_key, self.records
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditReport {
    pub blocks: usize,
    pub failure: Option<String>,
}

impl AuditReport {
    pub fn is_valid(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Transferred(TransferReceipt),
    Mined(MinedBlock),
    Audited(AuditReport),
}

/// Serializable view of a session, used for JSON dumps.
#[derive(Debug, Serialize)]
pub struct SessionSnapshot<'a> {
    pub chain: &'a [Block],
    pub accounts: &'a BTreeMap<String, AccountRecord>,
    pub pending: &'a [Transaction],
    pub history: &'a [HistoryEntry],
}

pub struct Session {
    ledger: Ledger,
    accounts: BTreeMap<String, AccountRecord>,
    pending: Vec<Transaction>,
    history: Vec<HistoryEntry>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_ledger(Ledger::new())
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        Self::with_ledger(Ledger::with_config(config))
    }

    pub fn with_ledger(ledger: Ledger) -> Self {
        let config = ledger.config();
        let mut accounts = BTreeMap::new();
        accounts.insert(
            config.levy_account.clone(),
            AccountRecord::new(0.0, config.genesis_seal_key.clone()),
        );
        Session {
            ledger,
            accounts,
            pending: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn create_account(&mut self, name: &str, balance: Amount, seal_key: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ChainError::EmptyIdentifier);
        }
        if self.accounts.contains_key(name) {
            return Err(ChainError::DuplicateAccount(name.to_string()));
        }
        if !(balance >= 0.0) {
            return Err(ChainError::InvalidInput("Balance cannot be negative".to_string()));
        }
        let seal_key = seal_key.trim();
        if seal_key.is_empty() {
            return Err(ChainError::InvalidInput("Seal key cannot be empty".to_string()));
        }

        if self.ledger.account(name).is_none() {
            self.ledger.register_account(name, seal_key)?;
        }
        self.accounts
            .insert(name.to_string(), AccountRecord::opened_now(balance, seal_key));
        info!(account = name, balance, seal_key, "Created account");
        Ok(())
    }

    /// Validate a transfer against the ledger, apply it and its levy to the
    /// working balances, and queue both records for mining.
    pub fn perform_transfer(
        &mut self,
        sender: &str,
        receiver: &str,
        amount: Amount,
    ) -> Result<TransferReceipt> {
        for party in [sender, receiver] {
            if !self.accounts.contains_key(party) {
                return Err(ChainError::UnknownAccount(party.to_string()));
            }
        }

        let transfer = Transaction::transfer(sender, receiver, amount);
        transfer.validate()?;
        self.ledger
            .validate_transaction_against_blockchain(sender, receiver, amount)?;

        let zakat_amount = self.levy_for(amount);
        let total_cost = amount + zakat_amount;
        let levy_account = self.ledger.config().levy_account.clone();
        let levy = Transaction::levy(sender, levy_account, zakat_amount);

        let mut working: HashMap<String, Amount> = self
            .accounts
            .iter()
            .map(|(name, account)| (name.clone(), account.balance))
            .collect();
        transfer.apply(&mut working)?;
        if zakat_amount > 0.0 {
            levy.apply(&mut working)?;
        }

        let sender_remaining_balance = working
            .get(sender)
            .copied()
            .ok_or_else(|| ChainError::UnknownAccount(sender.to_string()))?;
        for (name, balance) in working {
            if let Some(account) = self.accounts.get_mut(&name) {
                account.balance = balance;
            }
        }

        let timestamp = now_millis();
        self.history.push(HistoryEntry {
            timestamp,
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            amount,
            zakat_amount,
            total_cost,
            sender_remaining_balance,
            kind: TransactionKind::Transfer,
        });
        self.pending.push(transfer);
        if zakat_amount > 0.0 {
            self.history.push(HistoryEntry {
                timestamp,
                sender: sender.to_string(),
                receiver: levy.receiver().to_string(),
                amount: zakat_amount,
                zakat_amount: 0.0,
                total_cost: zakat_amount,
                sender_remaining_balance,
                kind: TransactionKind::Zakat,
            });
            self.pending.push(levy);
        }

        info!(sender, receiver, amount, zakat_amount, "Queued transfer");
        Ok(TransferReceipt {
            amount,
            zakat_amount,
            total_cost,
            sender_remaining_balance,
        })
    }

    /// Seal every pending record into a new block.
    ///
    /// The block is sealed with the seal key of the first pending record's
    /// sender, falling back to the genesis seal key.
    pub fn mine(&mut self) -> Result<MinedBlock> {
        let first = self
            .pending
            .first()
            .ok_or_else(|| ChainError::MiningFailure("No pending transactions to mine".to_string()))?;
        let seal_key = self
            .accounts
            .get(first.sender())
            .map(|account| account.seal_key.clone())
            .unwrap_or_else(|| self.ledger.config().genesis_seal_key.clone());

        let (hash, records) = {
            let block = self.ledger.add_block(self.pending.clone(), &seal_key)?;
            (block.hash().to_string(), block.records().len())
        };
        self.pending.clear();

        Ok(MinedBlock {
            index: self.ledger.len() - 1,
            hash,
            seal_key,
            records,
        })
    }

    pub fn audit(&self) -> AuditReport {
        AuditReport {
            blocks: self.ledger.len(),
            failure: self.ledger.validate_chain().err().map(|e| e.to_string()),
        }
    }

    pub fn run_action(&mut self, action: &SessionAction) -> Result<ActionOutcome> {
        let outcome = match action {
            SessionAction::Transfer {
                sender,
                receiver,
                amount,
            } => self
                .perform_transfer(sender, receiver, *amount)
                .map(ActionOutcome::Transferred),
            SessionAction::Mine => self.mine().map(ActionOutcome::Mined),
            SessionAction::Audit => Ok(ActionOutcome::Audited(self.audit())),
        };
        if let Err(e) = &outcome {
            warn!(?action, "Action failed: {}", e);
        }
        outcome
    }

    pub fn levy_for(&self, amount: Amount) -> Amount {
        levy_for(amount, self.ledger.config().levy_rate)
    }

    /// Balance in the session's working view.
    pub fn balance(&self, name: &str) -> Option<Amount> {
        self.accounts.get(name).map(|account| account.balance)
    }

    /// Balance replayed from the ledger.
    pub fn authoritative_balance(&self, name: &str) -> Amount {
        self.ledger.calculate_account_balance_from_history(name)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn accounts(&self) -> &BTreeMap<String, AccountRecord> {
        &self.accounts
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        SessionSnapshot {
            chain: self.ledger.blocks(),
            accounts: &self.accounts,
            pending: &self.pending,
            history: &self.history,
        }
    }
}
