use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{BalanceDrift, Engine, Money, WalletCmd, WalletKind};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "folio_admin")]
#[command(about = "Admin utilities for folio (ledger checks, bootstrap wallets)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./folio.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Ledger(Ledger),
    Wallet(WalletArgs),
}

#[derive(Args, Debug)]
struct Ledger {
    #[command(subcommand)]
    command: LedgerCommand,
}

#[derive(Subcommand, Debug)]
enum LedgerCommand {
    /// Compare stored wallet balances with the sum of their legs.
    Verify,
    /// Rewrite stored wallet balances from the legs.
    Recompute,
}

#[derive(Args, Debug)]
struct WalletArgs {
    #[command(subcommand)]
    command: WalletCommand,
}

#[derive(Subcommand, Debug)]
enum WalletCommand {
    Create(WalletCreateArgs),
}

#[derive(Args, Debug)]
struct WalletCreateArgs {
    #[arg(long)]
    name: String,
    /// Wallet type, e.g. "Cash", "Bank" or "Mobile Wallet".
    #[arg(long = "type", default_value = "Cash")]
    kind: String,
    /// Defaults to the engine currency.
    #[arg(long)]
    currency: Option<String>,
    /// Make this the default wallet.
    #[arg(long)]
    default: bool,
}

fn print_drift(drift: &[BalanceDrift]) {
    for d in drift {
        println!(
            "{} ({}): stored {} ledger {} diff {}",
            d.name,
            d.wallet_id,
            Money::new(d.stored_minor),
            Money::new(d.ledger_minor),
            Money::new(d.difference())
        );
    }
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Ledger(Ledger {
            command: LedgerCommand::Verify,
        }) => {
            let drift = engine.verify_balances().await?;
            if drift.is_empty() {
                println!("ledger consistent");
            } else {
                print_drift(&drift);
                std::process::exit(1);
            }
        }
        Command::Ledger(Ledger {
            command: LedgerCommand::Recompute,
        }) => {
            let corrected = engine.recompute_balances().await?;
            print_drift(&corrected);
            println!("corrected {} wallet(s)", corrected.len());
        }
        Command::Wallet(WalletArgs {
            command: WalletCommand::Create(args),
        }) => {
            let kind = match WalletKind::try_from(args.kind.as_str()) {
                Ok(v) => v,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };
            let mut cmd = WalletCmd::new(&args.name, kind);
            if let Some(currency) = args.currency {
                cmd = cmd.currency(currency);
            }
            if args.default {
                cmd = cmd.default_wallet();
            }
            let wallet = engine.create_wallet(cmd).await?;
            println!("created wallet: {} ({})", wallet.name, wallet.id);
        }
    }

    Ok(())
}
