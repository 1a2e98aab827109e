//! Configuration management for ZakatChain
//!
//! Ledger constants are fixed at construction time through [`LedgerConfig`].
//! The CLI additionally reads a TOML script describing accounts to open and
//! actions to run against a fresh session.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ChainError, Result};
use crate::Amount;

/// Fraction of every transfer charged as zakat.
pub const LEVY_RATE: Amount = 0.025;

/// Starting balance of every ordinary account.
pub const DEFAULT_BALANCE: Amount = 200.0;

/// Reserved account that receives every levy.
pub const LEVY_ACCOUNT: &str = "Zakat_Account";

/// Seal key of the genesis block and of lazily created accounts.
pub const GENESIS_SEAL_KEY: &str = "0000";

/// `prev_hash` sentinel carried by the genesis block.
pub const GENESIS_PREV_HASH: &str = "0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_levy_rate")]
    pub levy_rate: Amount,
    #[serde(default = "default_balance")]
    pub default_balance: Amount,
    #[serde(default = "default_levy_account")]
    pub levy_account: String,
    #[serde(default = "default_genesis_seal_key")]
    pub genesis_seal_key: String,
    /// Whether `add_block` accepts an empty batch.
    #[serde(default)]
    pub allow_empty_blocks: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            levy_rate: default_levy_rate(),
            default_balance: default_balance(),
            levy_account: default_levy_account(),
            genesis_seal_key: default_genesis_seal_key(),
            allow_empty_blocks: false,
        }
    }
}

impl LedgerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.levy_rate) {
            return Err(ChainError::ConfigError(format!(
                "ledger.levy_rate must be in [0, 1), got {}",
                self.levy_rate
            )));
        }
        if !(self.default_balance >= 0.0) {
            return Err(ChainError::ConfigError(format!(
                "ledger.default_balance cannot be negative, got {}",
                self.default_balance
            )));
        }
        if self.levy_account.trim().is_empty() {
            return Err(ChainError::ConfigError(
                "ledger.levy_account must be set".to_string(),
            ));
        }
        if self.genesis_seal_key.trim().is_empty() {
            return Err(ChainError::ConfigError(
                "ledger.genesis_seal_key must be set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Top-level configuration / session script.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Ledger constants; `None` when the file has no `[ledger]` table.
    #[serde(default)]
    pub ledger: Option<LedgerConfig>,
    #[serde(default)]
    pub accounts: Vec<AccountSeed>,
    #[serde(default)]
    pub actions: Vec<SessionAction>,
}

impl Config {
    /// The ledger constants to build with, defaulting when unset.
    pub fn ledger_config(&self) -> LedgerConfig {
        self.ledger.clone().unwrap_or_default()
    }

    /// Take `base`'s ledger constants when this config sets none.
    pub fn with_fallback(mut self, base: &Config) -> Config {
        if self.ledger.is_none() {
            self.ledger = base.ledger.clone();
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountSeed {
    pub name: String,
    #[serde(default = "default_balance")]
    pub balance: Amount,
    pub seal_key: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SessionAction {
    Transfer {
        sender: String,
        receiver: String,
        amount: Amount,
    },
    Mine,
    Audit,
}

/// Parse a configuration from TOML text and validate it.
pub fn parse_config(config_str: &str) -> Result<Config> {
    let config: Config = toml::from_str(config_str)?;
    if let Some(ledger) = &config.ledger {
        ledger.validate()?;
    }
    Ok(config)
}

/// Load a configuration file. An absent file yields the defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!("No config at {}; using defaults", path.display());
        return Ok(Config::default());
    }
    let config_str = fs::read_to_string(path)?;
    parse_config(&config_str)
}

fn default_levy_rate() -> Amount {
    LEVY_RATE
}

fn default_balance() -> Amount {
    DEFAULT_BALANCE
}

fn default_levy_account() -> String {
    LEVY_ACCOUNT.to_string()
}

fn default_genesis_seal_key() -> String {
    GENESIS_SEAL_KEY.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_constants() {
        let config = LedgerConfig::default();
        assert_eq!(config.levy_rate, 0.025);
        assert_eq!(config.default_balance, 200.0);
        assert_eq!(config.levy_account, "Zakat_Account");
        assert_eq!(config.genesis_seal_key, "0000");
        assert!(!config.allow_empty_blocks);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_script() {
        let config = parse_config(
            r#"
            [ledger]
            levy_rate = 0.05

            [[accounts]]
            name = "Alice"
            seal_key = "r1"

            [[accounts]]
            name = "Bob"
            balance = 75.5
            seal_key = "r2"

            [[actions]]
            action = "transfer"
            sender = "Alice"
            receiver = "Bob"
            amount = 10.0

            [[actions]]
            action = "mine"
            "#,
        )
        .unwrap();

        let ledger = config.ledger_config();
        assert_eq!(ledger.levy_rate, 0.05);
        assert_eq!(ledger.default_balance, 200.0);
        assert_eq!(config.accounts.len(), 2);
        assert_eq!(config.accounts[0].balance, 200.0);
        assert_eq!(config.accounts[1].balance, 75.5);
        assert_eq!(
            config.actions,
            vec![
                SessionAction::Transfer {
                    sender: "Alice".to_string(),
                    receiver: "Bob".to_string(),
                    amount: 10.0,
                },
                SessionAction::Mine,
            ]
        );
    }

    #[test]
    fn test_invalid_levy_rate_rejected() {
        let result = parse_config("[ledger]\nlevy_rate = 1.5\n");
        assert!(matches!(result, Err(ChainError::ConfigError(_))));
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let result = parse_config("[ledger\nlevy_rate = ");
        assert!(matches!(result, Err(ChainError::ConfigError(_))));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert!(config.ledger.is_none());
        assert_eq!(config.ledger_config(), LedgerConfig::default());
        assert!(config.accounts.is_empty());
        assert!(config.actions.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[ledger]\nallow_empty_blocks = true").unwrap();
        let config = load_config(file.path()).unwrap();
        assert!(config.ledger_config().allow_empty_blocks);
    }

    #[test]
    fn test_script_without_ledger_falls_back_to_base() {
        let base = parse_config("[ledger]\nlevy_rate = 0.1\nlevy_account = \"Treasury\"\n").unwrap();
        let script = parse_config("[[actions]]\naction = \"mine\"\n").unwrap();
        assert!(script.ledger.is_none());

        let merged = script.with_fallback(&base);
        assert_eq!(merged.ledger_config().levy_rate, 0.1);
        assert_eq!(merged.ledger_config().levy_account, "Treasury");
        assert_eq!(merged.actions, vec![SessionAction::Mine]);
    }

    #[test]
    fn test_script_ledger_wins_over_base() {
        let base = parse_config("[ledger]\nlevy_rate = 0.1\n").unwrap();
        let script = parse_config("[ledger]\nlevy_rate = 0.05\n").unwrap();
        assert_eq!(script.with_fallback(&base).ledger_config().levy_rate, 0.05);

        let bare = Config::default().with_fallback(&Config::default());
        assert_eq!(bare.ledger_config(), LedgerConfig::default());
    }
}
