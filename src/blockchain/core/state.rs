use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::error::{ChainError, Result};
use crate::levy::total_cost;
use crate::{now_millis, Amount, Timestamp};

use super::chain::{Block, Ledger};

/// One account as tracked by the ledger mirror or a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountRecord {
    pub balance: Amount,
    pub seal_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl AccountRecord {
    pub fn new(balance: Amount, seal_key: impl Into<String>) -> Self {
        AccountRecord {
            balance,
            seal_key: seal_key.into(),
            created_at: None,
        }
    }

    /// A record stamped with the current time.
    pub fn opened_now(balance: Amount, seal_key: impl Into<String>) -> Self {
        AccountRecord {
            created_at: Some(now_millis()),
            ..Self::new(balance, seal_key)
        }
    }
}

impl Ledger {
    /// Balance an account holds before any chain activity.
    pub fn starting_balance(&self, account: &str) -> Amount {
        if account == self.config.levy_account {
            0.0
        } else {
            self.config.default_balance
        }
    }

    /// Authoritative balance, replayed from the whole chain.
    ///
    /// A transfer costs its sender the amount plus the levy recomputed at the
    /// configured rate. Levy records are already paid for by that
    /// recomputation, so they only credit their receiver.
    pub fn calculate_account_balance_from_history(&self, account: &str) -> Amount {
        let rate = self.config.levy_rate;
        let mut balance = self.starting_balance(account);

        for record in self.chain.iter().flat_map(Block::records) {
            if record.sender() == account && record.is_transfer() {
                balance -= total_cost(record.amount(), rate);
            }
            if record.receiver() == account {
                balance += record.amount();
            }
        }

        debug!(account, balance, blocks = self.chain.len(), "Replayed balance");
        balance
    }

    /// Fold a block's records into the account mirror.
    pub(crate) fn update_accounts_from_block(&mut self, block: &Block) {
        for record in block.records() {
            let (sender, receiver, amount) = (record.sender(), record.receiver(), record.amount());
            if sender.is_empty() || receiver.is_empty() || !(amount > 0.0) {
                debug!(sender, receiver, amount, "Skipping malformed record");
                continue;
            }

            self.ensure_account(sender);
            self.ensure_account(receiver);

            if let Some(account) = self.accounts.get_mut(sender) {
                account.balance -= amount;
            }
            if let Some(account) = self.accounts.get_mut(receiver) {
                account.balance += amount;
            }
        }
    }

    fn ensure_account(&mut self, name: &str) {
        if !self.accounts.contains_key(name) {
            let record = AccountRecord::new(
                self.starting_balance(name),
                self.config.genesis_seal_key.clone(),
            );
            self.accounts.insert(name.to_string(), record);
        }
    }

    /// Add an account to the mirror at its starting balance.
    pub fn register_account(&mut self, name: &str, seal_key: &str) -> Result<&AccountRecord> {
        if name.trim().is_empty() {
            return Err(ChainError::EmptyIdentifier);
        }
        if self.accounts.contains_key(name) {
            return Err(ChainError::DuplicateAccount(name.to_string()));
        }
        let record = AccountRecord::opened_now(self.starting_balance(name), seal_key);
        Ok(self.accounts.entry(name.to_string()).or_insert(record))
    }

    pub fn account(&self, name: &str) -> Option<&AccountRecord> {
        self.accounts.get(name)
    }

    pub fn accounts(&self) -> &HashMap<String, AccountRecord> {
        &self.accounts
    }
}
