use tracing::warn;

use crate::error::{ChainError, Result};
use crate::levy::total_cost;
use crate::Amount;

use super::chain::{Block, Ledger};

/// Check every block's hash and every link to its predecessor.
pub fn validate_links(blocks: &[Block]) -> Result<()> {
    if blocks.is_empty() {
        return Err(ChainError::ChainIntegrityFailure(
            "The chain has no genesis block".to_string(),
        ));
    }

    for (index, block) in blocks.iter().enumerate() {
        if !block.verify_integrity() {
            return Err(ChainError::ChainIntegrityFailure(format!(
                "Block {} hash {} does not match its contents",
                index,
                block.hash()
            )));
        }

        if index > 0 {
            let previous = &blocks[index - 1];
            if block.prev_hash() != previous.hash() {
                return Err(ChainError::ChainIntegrityFailure(format!(
                    "Block {} links to {}, but block {} has hash {}",
                    index,
                    block.prev_hash(),
                    index - 1,
                    previous.hash()
                )));
            }
        }
    }
    Ok(())
}

impl Ledger {
    pub fn validate_chain(&self) -> Result<()> {
        validate_links(&self.chain)
    }

    pub fn is_valid(&self) -> bool {
        match self.validate_chain() {
            Ok(()) => true,
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }

    /// Integrity of a single block; false when `index` is out of range.
    pub fn verify_block_integrity(&self, index: usize) -> bool {
        self.chain.get(index).is_some_and(Block::verify_integrity)
    }

    /// Can `sender` cover `amount` plus its levy, going by replayed history?
    ///
    /// Account existence and self-transfers are the caller's concern.
    pub fn validate_transaction_against_blockchain(
        &self,
        sender: &str,
        _receiver: &str,
        amount: Amount,
    ) -> Result<()> {
        let sender_balance = self.calculate_account_balance_from_history(sender);
        let required = total_cost(amount, self.config.levy_rate);
        if sender_balance < required {
            return Err(ChainError::InsufficientFunds {
                account: sender.to_string(),
                available: sender_balance,
                required,
            });
        }
        Ok(())
    }
}
