//! Transaction module split into types and validation for better modularity

pub mod types;
pub mod validation;

pub use types::*;
// validation module kept internal; only types are re-exported publicly

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::Ledger;
    use crate::error::ChainError;
    use std::collections::HashMap;

    fn balances(entries: &[(&str, f64)]) -> HashMap<String, f64> {
        entries
            .iter()
            .map(|(name, balance)| (name.to_string(), *balance))
            .collect()
    }

    #[test]
    fn test_tx_validation_success() {
        let tx = Transaction::transfer("Alice", "Bob", 50.0);
        assert!(tx.validate().is_ok());
        assert_eq!(tx.kind(), TransactionKind::Transfer);
    }

    #[test]
    fn test_blank_identifier_rejected() {
        assert_eq!(
            Transaction::transfer("", "Bob", 1.0).validate(),
            Err(ChainError::EmptyIdentifier)
        );
        assert_eq!(
            Transaction::transfer("Alice", "   ", 1.0).validate(),
            Err(ChainError::EmptyIdentifier)
        );
    }

    #[test]
    fn test_self_transfer_rejected() {
        assert_eq!(
            Transaction::transfer("Alice", "Alice", 1.0).validate(),
            Err(ChainError::SelfTransfer)
        );
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        for amount in [0.0, -5.0, f64::NAN] {
            assert_eq!(
                Transaction::transfer("Alice", "Bob", amount).validate(),
                Err(ChainError::NonPositiveAmount)
            );
        }
    }

    #[test]
    fn test_levy_record_is_valid() {
        let tx = Transaction::levy("Alice", "Zakat_Account", 1.25);
        assert!(tx.validate().is_ok());
        assert_eq!(tx.kind(), TransactionKind::Zakat);
        assert!(!tx.is_transfer());
    }

    #[test]
    fn test_apply_moves_amount() {
        let mut map = balances(&[("Alice", 200.0), ("Bob", 200.0)]);
        Transaction::transfer("Alice", "Bob", 50.0).apply(&mut map).unwrap();
        assert_eq!(map["Alice"], 150.0);
        assert_eq!(map["Bob"], 250.0);
    }

    #[test]
    fn test_apply_unknown_account() {
        let mut map = balances(&[("Alice", 200.0)]);
        let result = Transaction::transfer("Alice", "Bob", 10.0).apply(&mut map);
        assert_eq!(result, Err(ChainError::UnknownAccount("Bob".to_string())));

        let result = Transaction::transfer("Carol", "Alice", 10.0).apply(&mut map);
        assert_eq!(result, Err(ChainError::UnknownAccount("Carol".to_string())));
        assert_eq!(map["Alice"], 200.0);
    }

    #[test]
    fn test_apply_insufficient_leaves_map_untouched() {
        let mut map = balances(&[("Alice", 20.0), ("Bob", 0.0)]);
        let result = Transaction::transfer("Alice", "Bob", 20.5).apply(&mut map);
        assert!(matches!(result, Err(ChainError::InsufficientFunds { .. })));
        assert_eq!(map["Alice"], 20.0);
        assert_eq!(map["Bob"], 0.0);
    }

    #[test]
    fn test_apply_non_positive() {
        let mut map = balances(&[("Alice", 20.0), ("Bob", 0.0)]);
        let result = Transaction::transfer("Alice", "Bob", 0.0).apply(&mut map);
        assert_eq!(result, Err(ChainError::NonPositiveAmount));
    }

    #[test]
    fn test_validate_against_history_requires_mirror_accounts() {
        let mut ledger = Ledger::new();
        let tx = Transaction::transfer("Alice", "Bob", 10.0);
        assert_eq!(
            tx.validate_against_history(&ledger),
            Err(ChainError::UnknownAccount("Alice".to_string()))
        );

        ledger.register_account("Alice", "r1").unwrap();
        ledger.register_account("Bob", "r2").unwrap();
        assert!(tx.validate_against_history(&ledger).is_ok());
    }

    #[test]
    fn test_validate_against_history_uses_replayed_balance() {
        let mut ledger = Ledger::new();
        ledger.register_account("Alice", "r1").unwrap();
        ledger.register_account("Bob", "r2").unwrap();

        let tx = Transaction::transfer("Alice", "Bob", 200.5);
        assert!(matches!(
            tx.validate_against_history(&ledger),
            Err(ChainError::InsufficientFunds { available, .. }) if available == 200.0
        ));

        let tx = Transaction::transfer("Alice", "Alice", 1.0);
        assert_eq!(tx.validate_against_history(&ledger), Err(ChainError::SelfTransfer));
    }

    #[test]
    fn test_validate_against_history_requires_known_receiver() {
        let mut ledger = Ledger::new();
        ledger.register_account("Alice", "r1").unwrap();

        let tx = Transaction::transfer("Alice", "Bob", 10.0);
        assert_eq!(
            tx.validate_against_history(&ledger),
            Err(ChainError::UnknownAccount("Bob".to_string()))
        );
    }

    #[test]
    fn test_validate_against_history_rejects_non_positive_amount() {
        let mut ledger = Ledger::new();
        ledger.register_account("Alice", "r1").unwrap();
        ledger.register_account("Bob", "r2").unwrap();

        for amount in [0.0, -5.0] {
            let tx = Transaction::transfer("Alice", "Bob", amount);
            assert_eq!(
                tx.validate_against_history(&ledger),
                Err(ChainError::NonPositiveAmount)
            );
        }
    }

    #[test]
    fn test_canonical_value_has_sorted_keys() {
        let tx = Transaction::from_parts("Alice", "Bob", 50.0, TransactionKind::Transfer, 1_000);
        assert_eq!(
            tx.to_canonical_value().to_string(),
            r#"{"amount":50.0,"receiver":"Bob","sender":"Alice","timestamp":1000,"type":"transfer"}"#
        );
    }

    #[test]
    fn test_record_serializes_type_tag() {
        let tx = Transaction::from_parts("Alice", "Zakat_Account", 1.25, TransactionKind::Zakat, 7);
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "zakat");
        assert_eq!(json["receiver"], "Zakat_Account");
    }
}
