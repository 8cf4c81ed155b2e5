use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commchain_core::{balance, balance_unhashed, is_chain_valid, reconcile, Balance, BlockLog};
use commchain_rpc::config::ServerConfig;

#[derive(Parser)]
#[command(name = "commchain")]
#[command(about = "Commchain ledger CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service.
    Serve,
    /// Re-hash a legacy-format block log into the canonical format.
    Migrate {
        /// Path to the block log to migrate.
        #[arg(long, default_value = "data/blockchain.json")]
        block_log: String,
    },
    /// Verify every block's hash and link to its predecessor.
    ValidateChain,
    /// Reconcile the transactions file against the block log.
    ValidateTransactions {
        #[arg(long)]
        repair: bool,
        #[arg(long)]
        force: bool,
    },
    /// Look up a user's balance.
    Balance {
        #[arg(long, conflicts_with = "user_unhashed")]
        user: Option<String>,
        #[arg(long)]
        user_unhashed: Option<String>,
    },
}

fn open_blocklog(config: &ServerConfig) -> commchain_core::Result<BlockLog> {
    BlockLog::new(
        &config.ledger.block_log_path,
        &config.ledger.transactions_log_path,
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(config.log_filter.clone()))
        .init();

    match cli.command {
        Commands::Serve => {
            let runtime = tokio::runtime::Runtime::new().expect("failed to start tokio runtime");
            if let Err(err) = runtime.block_on(commchain_rpc::run(config)) {
                eprintln!("server exited with an error: {err}");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Commands::Migrate { block_log } => match commchain_core::migrate(&block_log) {
            Ok(old_path) => {
                println!("Migrated {block_log}; previous file backed up to {}", old_path.display());
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("migration failed: {err}");
                ExitCode::FAILURE
            }
        },
        Commands::ValidateChain => {
            let blocklog = match open_blocklog(&config) {
                Ok(log) => log,
                Err(err) => {
                    eprintln!("failed to open block log: {err}");
                    return ExitCode::FAILURE;
                }
            };
            match is_chain_valid(&blocklog) {
                Ok(true) => {
                    println!("The blockchain is valid.");
                    ExitCode::SUCCESS
                }
                Ok(false) => {
                    println!("The blockchain is not valid.");
                    ExitCode::FAILURE
                }
                Err(err) => {
                    eprintln!("validation failed: {err}");
                    ExitCode::FAILURE
                }
            }
        }
        Commands::ValidateTransactions { repair, force } => {
            let blocklog = match open_blocklog(&config) {
                Ok(log) => log,
                Err(err) => {
                    eprintln!("failed to open block log: {err}");
                    return ExitCode::FAILURE;
                }
            };
            match reconcile(&blocklog, blocklog.tx_log(), repair, force) {
                Ok(report) => {
                    println!("{}", report.message);
                    if report.valid {
                        ExitCode::SUCCESS
                    } else {
                        ExitCode::FAILURE
                    }
                }
                Err(err) => {
                    eprintln!("reconciliation failed: {err}");
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Balance { user, user_unhashed } => {
            let blocklog = match open_blocklog(&config) {
                Ok(log) => log,
                Err(err) => {
                    eprintln!("failed to open block log: {err}");
                    return ExitCode::FAILURE;
                }
            };
            let result = match (user, user_unhashed) {
                (Some(user), None) => balance(blocklog.tx_log(), &user),
                (None, Some(user_unhashed)) => balance_unhashed(blocklog.tx_log(), &user_unhashed),
                _ => {
                    eprintln!("exactly one of --user or --user-unhashed is required");
                    return ExitCode::FAILURE;
                }
            };
            match result {
                Ok(Balance::Found(amount)) => {
                    println!("{amount}");
                    ExitCode::SUCCESS
                }
                Ok(Balance::NotFound) => {
                    eprintln!("user not found in the transactions file");
                    ExitCode::FAILURE
                }
                Err(err) => {
                    eprintln!("balance lookup failed: {err}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
