//! ZakatChain - a single-writer ledger that levies zakat on every transfer
//!
//! # Architecture
//!
//! ## Core Ledger
//! - [`blockchain`] - Blocks, the chain engine, account replay and chain validation
//! - [`transaction`] - Transfer and levy records and their validation
//! - [`levy`] - Levy arithmetic
//!
//! ## Cryptography
//! - [`crypto`] - Block sealing digests (SHA-256)
//!
//! ## Application State
//! - [`session`] - Accounts, pending queue and history driving a ledger
//!
//! ## Configuration & Utilities
//! - [`config`] - Ledger constants and TOML session scripts
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod levy;
pub mod transaction;

// ============================================================================
// Cryptography
// ============================================================================
pub mod crypto;

// ============================================================================
// Application State
// ============================================================================
pub mod session;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;

pub use blockchain::{AccountRecord, Block, BlockPayload, Ledger};
pub use error::{ChainError, Result};
pub use session::Session;
pub use transaction::{Transaction, TransactionKind};

/// Quantity of the ledger's base unit.
pub type Amount = f64;

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

pub(crate) fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}
