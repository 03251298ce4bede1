//! CariHesap CLI
//!
//! Keeps personal receivable/payable accounts on local storage.

use std::path::PathBuf;

use anyhow::bail;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod output;
mod report;
mod runner;
mod scenario;

use carihesap_ledger::LedgerStore;
use carihesap_store::StoreBackend;
use commands::{AddTransaction, CreateAccount, ListFilter};
use config::CliConfig;
use output::Format;
use runner::ScenarioRunner;
use scenario::Scenario;

/// CariHesap CLI
#[derive(Parser, Debug)]
#[command(name = "cari")]
#[command(about = "Track what you paid, received, owe and are owed")]
struct Args {
    /// Data directory (overrides CARI_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage accounts
    #[command(subcommand)]
    Account(AccountCommand),
    /// Manage transactions
    #[command(subcommand)]
    Tx(TxCommand),
    /// Check every balance against its transaction history
    Verify,
    /// Run a scripted scenario against an in-memory store
    Scenario(ScenarioArgs),
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    /// Create an account
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Opening balance, may be negative
        #[arg(long, allow_hyphen_values = true)]
        balance: Option<String>,
    },
    /// List all accounts
    List,
    /// Show one account with its transactions
    Show { email: String },
    /// Delete an account and its transactions
    Delete { email: String },
}

#[derive(Subcommand, Debug)]
enum TxCommand {
    /// Add a transaction
    Add {
        email: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        amount: String,
        /// paid, received, payable or receivable
        #[arg(long = "type")]
        kind: String,
        /// Transaction date, defaults to now
        #[arg(long)]
        date: Option<String>,
    },
    /// Remove a transaction by id
    Remove { email: String, id: String },
    /// List transactions, optionally filtered
    List {
        email: String,
        #[arg(long = "type")]
        kind: Option<String>,
        /// First day of the range
        #[arg(long)]
        from: Option<String>,
        /// Last day of the range
        #[arg(long)]
        to: Option<String>,
    },
}

#[derive(ClapArgs, Debug)]
struct ScenarioArgs {
    /// Built-in scenario name
    #[arg(required_unless_present = "file")]
    name: Option<String>,
    /// Load the scenario from a JSON file instead
    #[arg(long, conflicts_with = "name")]
    file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = CliConfig::from_env();
    if let Some(dir) = &args.data_dir {
        config.store.backend = StoreBackend::File;
        config.store.data_dir = dir.clone();
    }
    if let Err(e) = config.validate() {
        bail!("Invalid configuration: {}", e);
    }

    init_logging(&config);
    debug!(?config, "Configuration loaded");

    let format = if args.json { Format::Json } else { Format::Text };
    let out = run(args.command, &config, format)?;
    println!("{}", out);

    Ok(())
}

fn init_logging(config: &CliConfig) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
    );
    let registry = tracing_subscriber::registry().with(filter);

    if config.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn run(command: Command, config: &CliConfig, format: Format) -> anyhow::Result<String> {
    let command = match command {
        Command::Scenario(args) => return run_scenario(args, config, format),
        other => other,
    };

    let mut ledger = LedgerStore::open(config.store.open(), config.ledger.clone())?;

    match command {
        Command::Account(AccountCommand::Create {
            name,
            email,
            balance,
        }) => commands::create_account(
            &mut ledger,
            &CreateAccount {
                name,
                email,
                balance,
            },
            format,
        ),
        Command::Account(AccountCommand::List) => commands::list_accounts(&ledger, format),
        Command::Account(AccountCommand::Show { email }) => {
            commands::show_account(&ledger, &email, format)
        }
        Command::Account(AccountCommand::Delete { email }) => {
            commands::delete_account(&mut ledger, &email, format)
        }
        Command::Tx(TxCommand::Add {
            email,
            description,
            amount,
            kind,
            date,
        }) => commands::add_transaction(
            &mut ledger,
            &AddTransaction {
                email,
                description,
                amount,
                kind,
                date,
            },
            format,
        ),
        Command::Tx(TxCommand::Remove { email, id }) => {
            commands::remove_transaction(&mut ledger, &email, &id, format)
        }
        Command::Tx(TxCommand::List {
            email,
            kind,
            from,
            to,
        }) => commands::list_transactions(
            &ledger,
            &email,
            &ListFilter { kind, from, to },
            format,
        ),
        Command::Verify => commands::verify(&ledger),
        Command::Scenario(args) => run_scenario(args, config, format),
    }
}

fn run_scenario(args: ScenarioArgs, config: &CliConfig, format: Format) -> anyhow::Result<String> {
    let scenario = match (&args.file, &args.name) {
        (Some(path), _) => Scenario::from_file(path)?,
        (None, Some(name)) => Scenario::load(name)?,
        (None, None) => bail!("Give a scenario name or --file"),
    };

    let mut runner = ScenarioRunner::new(config.ledger.clone())?;
    let report = runner.run(&scenario)?;
    info!(
        scenario = %report.scenario,
        passed = report.assertions_passed,
        failed = report.assertions_failed,
        "Scenario complete"
    );

    let rendered = match format {
        Format::Json => serde_json::to_string_pretty(&report)?,
        Format::Text => report.render(),
    };
    if !report.passed() {
        bail!("{}", rendered);
    }
    Ok(rendered)
}
