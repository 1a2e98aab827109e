// Thin re-export module: implementation is in `blockchain/core.rs`, split by
// responsibility (blocks and chain, account state, chain validation).

pub mod core;
pub use self::core::*;
