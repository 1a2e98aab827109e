#![forbid(unsafe_code)]
//! Replay a scripted zakat session and render the resulting chain

use clap::{Parser, Subcommand};
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Color as TableColor;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use zakatchain::config::{load_config, AccountSeed, Config, SessionAction};
use zakatchain::session::{ActionOutcome, AuditReport};
use zakatchain::{ChainError, Session};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file whose [ledger] table applies when a script has none
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the final session state as JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs a session script (TOML) on a fresh ledger
    Run {
        /// Path to the script
        script: PathBuf,
    },
    /// Runs the built-in two-account demo
    Demo,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let base = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    let config = match &cli.command {
        Commands::Run { script } => load_script(script)?,
        Commands::Demo => demo_config(),
    }
    .with_fallback(&base);

    let session = run_session(&config, !cli.json);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
        return Ok(());
    }

    print_chain(&session);
    print_balances(&session);
    print_audit(&session.audit());

    Ok(())
}

fn load_script(path: &Path) -> Result<Config, ChainError> {
    if !path.exists() {
        return Err(ChainError::ConfigError(format!(
            "Script not found: {}",
            path.display()
        )));
    }
    load_config(path)
}

fn demo_config() -> Config {
    Config {
        ledger: None,
        accounts: vec![
            AccountSeed {
                name: "Alice".to_string(),
                balance: 200.0,
                seal_key: "r1".to_string(),
            },
            AccountSeed {
                name: "Bob".to_string(),
                balance: 200.0,
                seal_key: "r2".to_string(),
            },
        ],
        actions: vec![
            SessionAction::Transfer {
                sender: "Alice".to_string(),
                receiver: "Bob".to_string(),
                amount: 50.0,
            },
            SessionAction::Mine,
        ],
    }
}

fn run_session(config: &Config, verbose: bool) -> Session {
    let mut session = Session::with_config(config.ledger_config());

    if !verbose {
        for seed in &config.accounts {
            if let Err(e) = session.create_account(&seed.name, seed.balance, &seed.seal_key) {
                tracing::warn!(account = %seed.name, "Account not created: {}", e);
            }
        }
        // Failed actions are already logged by the session
        for action in &config.actions {
            let _ = session.run_action(action);
        }
        return session;
    }

    println!("{}", "👥 Accounts".bright_cyan().bold());
    for seed in &config.accounts {
        match session.create_account(&seed.name, seed.balance, &seed.seal_key) {
            Ok(()) => println!(
                "  {} {} (${:.2}, seal key {})",
                "✓".green(),
                seed.name.bright_white(),
                seed.balance,
                seed.seal_key
            ),
            Err(e) => println!("  {} {}: {}", "✗".red(), seed.name, e),
        }
    }
    println!();

    println!("{}", "📜 Actions".bright_cyan().bold());
    for (step, action) in config.actions.iter().enumerate() {
        match session.run_action(action) {
            Ok(ActionOutcome::Transferred(receipt)) => {
                println!("  {:>2}. {} {}", step + 1, "✓".green(), receipt)
            }
            Ok(ActionOutcome::Mined(block)) => {
                println!("  {:>2}. {} {}", step + 1, "⛏".yellow(), block)
            }
            Ok(ActionOutcome::Audited(report)) => {
                println!("  {:>2}. {} {}", step + 1, "🔍".cyan(), audit_line(&report))
            }
            Err(e) => println!("  {:>2}. {} {}", step + 1, "✗".red(), e.to_string().red()),
        }
    }
    if !session.pending().is_empty() {
        println!(
            "  {}",
            format!("{} records still pending", session.pending().len()).yellow()
        );
    }
    println!();

    session
}

fn header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| {
            Cell::new(label)
                .fg(TableColor::Cyan)
                .add_attribute(Attribute::Bold)
        })
        .collect()
}

fn print_chain(session: &Session) {
    let ledger = session.ledger();
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(&["Block", "Seal Key", "Records", "Hash", "Prev Hash", "Date"]));

    for (index, block) in ledger.blocks().iter().enumerate() {
        let records = if block.transactions().is_genesis() {
            "Genesis Block".to_string()
        } else {
            block
                .records()
                .iter()
                .map(|tx| format!("{}: {} → {} ${:.2}", tx.kind(), tx.sender(), tx.receiver(), tx.amount()))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let hash_color = if block.verify_integrity() {
            TableColor::Green
        } else {
            TableColor::Red
        };
        table.add_row(vec![
            Cell::new(format!("#{}", index)).fg(TableColor::White),
            Cell::new(block.seal_key()).fg(TableColor::Magenta),
            Cell::new(records).fg(TableColor::White),
            Cell::new(short_hash(block.hash())).fg(hash_color),
            Cell::new(short_hash(block.prev_hash())).fg(TableColor::Grey),
            Cell::new(format_timestamp(block.timestamp())).fg(TableColor::Grey),
        ]);
    }

    println!("{}", "⛓️  Chain".bright_cyan().bold());
    println!("{}", table);
    println!();
}

fn print_balances(session: &Session) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(&["Account", "Seal Key", "Working", "Replayed"]));

    for (name, account) in session.accounts() {
        let replayed = session.authoritative_balance(name);
        let agrees = (replayed - account.balance).abs() < 1e-9;
        table.add_row(vec![
            Cell::new(name).fg(TableColor::White),
            Cell::new(&account.seal_key).fg(TableColor::Magenta),
            Cell::new(format!("${:.2}", account.balance)).fg(TableColor::White),
            Cell::new(format!("${:.2}", replayed)).fg(if agrees {
                TableColor::Green
            } else {
                TableColor::Yellow
            }),
        ]);
    }

    println!("{}", "💰 Balances".bright_cyan().bold());
    println!("{}", table);
    println!();
}

fn print_audit(report: &AuditReport) {
    println!("{}", audit_line(report));
}

fn audit_line(report: &AuditReport) -> String {
    match &report.failure {
        None => format!("✅ Chain valid ({} blocks)", report.blocks)
            .green()
            .to_string(),
        Some(reason) => format!("❌ Chain invalid: {}", reason).red().to_string(),
    }
}

fn short_hash(hash: &str) -> String {
    if hash.len() > 16 {
        format!("{}…", &hash[..16])
    } else {
        hash.to_string()
    }
}

fn format_timestamp(timestamp_ms: i64) -> String {
    use chrono::DateTime;

    if let Some(dt) = DateTime::from_timestamp_millis(timestamp_ms) {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        "Invalid".to_string()
    }
}
