/// Validation logic for transactions separated from type definitions
use std::collections::HashMap;

use crate::blockchain::Ledger;
use crate::error::{ChainError, Result};
use crate::transaction::types::Transaction;
use crate::Amount;

impl Transaction {
    /// Stateless validation: identifiers present, distinct parties, positive amount.
    pub fn validate(&self) -> Result<()> {
        if self.sender().trim().is_empty() || self.receiver().trim().is_empty() {
            return Err(ChainError::EmptyIdentifier);
        }
        if self.sender() == self.receiver() {
            return Err(ChainError::SelfTransfer);
        }
        // NaN falls through the comparison and is rejected too
        if !(self.amount() > 0.0) {
            return Err(ChainError::NonPositiveAmount);
        }
        Ok(())
    }

    /// Move `amount` from sender to receiver in a plain balance view.
    ///
    /// No levy is charged here; the caller applies the levy record as a
    /// second transaction. On error the map is left untouched.
    pub fn apply(&self, balances: &mut HashMap<String, Amount>) -> Result<()> {
        let sender_balance = *balances
            .get(self.sender())
            .ok_or_else(|| ChainError::UnknownAccount(self.sender().to_string()))?;
        if !balances.contains_key(self.receiver()) {
            return Err(ChainError::UnknownAccount(self.receiver().to_string()));
        }
        if !(self.amount() > 0.0) {
            return Err(ChainError::NonPositiveAmount);
        }
        if sender_balance < self.amount() {
            return Err(ChainError::InsufficientFunds {
                account: self.sender().to_string(),
                available: sender_balance,
                required: self.amount(),
            });
        }

        if let Some(balance) = balances.get_mut(self.sender()) {
            *balance -= self.amount();
        }
        if let Some(balance) = balances.get_mut(self.receiver()) {
            *balance += self.amount();
        }
        Ok(())
    }

    /// Validate against balances replayed from the ledger's full history.
    pub fn validate_against_history(&self, ledger: &Ledger) -> Result<()> {
        let sender_balance = ledger.calculate_account_balance_from_history(self.sender());
        if sender_balance < self.amount() {
            return Err(ChainError::InsufficientFunds {
                account: self.sender().to_string(),
                available: sender_balance,
                required: self.amount(),
            });
        }

        for party in [self.sender(), self.receiver()] {
            if ledger.account(party).is_none() {
                return Err(ChainError::UnknownAccount(party.to_string()));
            }
        }

        if !(self.amount() > 0.0) {
            return Err(ChainError::NonPositiveAmount);
        }
        if self.sender() == self.receiver() {
            return Err(ChainError::SelfTransfer);
        }
        Ok(())
    }
}
