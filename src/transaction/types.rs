/// Transaction types for ZakatChain
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::{now_millis, Amount, Timestamp};

/// Distinguishes an ordinary transfer from the levy record derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Transfer,
    Zakat,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Transfer => "transfer",
            TransactionKind::Zakat => "zakat",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transfer request, or the levy record paired with one.
///
/// This is also the record shape sealed into blocks:
/// `{sender, receiver, amount, type, timestamp}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    sender: String,
    receiver: String,
    amount: Amount,
    #[serde(rename = "type")]
    kind: TransactionKind,
    timestamp: Timestamp,
}

impl Transaction {
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: Amount,
        kind: TransactionKind,
    ) -> Self {
        Self::from_parts(sender, receiver, amount, kind, now_millis())
    }

    /// Rebuild a record with an explicit timestamp.
    pub fn from_parts(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: Amount,
        kind: TransactionKind,
        timestamp: Timestamp,
    ) -> Self {
        Transaction {
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
            kind,
            timestamp,
        }
    }

    pub fn transfer(sender: impl Into<String>, receiver: impl Into<String>, amount: Amount) -> Self {
        Self::new(sender, receiver, amount, TransactionKind::Transfer)
    }

    /// Levy record moving `amount` from `sender` to the levy account.
    pub fn levy(sender: impl Into<String>, levy_account: impl Into<String>, amount: Amount) -> Self {
        Self::new(sender, levy_account, amount, TransactionKind::Zakat)
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn is_transfer(&self) -> bool {
        self.kind == TransactionKind::Transfer
    }

    /// JSON object with keys in sorted order, used for block hashing.
    pub fn to_canonical_value(&self) -> Value {
        let mut record = Map::new();
        record.insert("amount".to_string(), Value::from(self.amount));
        record.insert("receiver".to_string(), Value::from(self.receiver.as_str()));
        record.insert("sender".to_string(), Value::from(self.sender.as_str()));
        record.insert("timestamp".to_string(), Value::from(self.timestamp));
        record.insert("type".to_string(), Value::from(self.kind.as_str()));
        Value::Object(record)
    }
}
