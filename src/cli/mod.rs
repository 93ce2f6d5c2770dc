use clap::{Parser, Subcommand};

pub mod config;
pub mod init_config;
pub mod logging;
pub mod query;
pub mod version;

use query::QueryArgs;

#[derive(Parser)]
#[command(name = "ballot-ledger")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Read proposals, the declared winner and voting power from a ballot contract", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every proposal with its vote count, plus the current winner
    Proposals {
        /// Ballot contract address (0x followed by 40 hex characters)
        contract: String,

        /// JSON-RPC endpoint (overrides [rpc] endpoint from the config file)
        #[arg(long)]
        rpc_url: Option<String>,

        /// Path to config file (default: ~/.config/ballot-ledger/config.toml)
        #[arg(long)]
        config: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Print vote weights as raw integers instead of token units
        #[arg(long, conflicts_with = "json")]
        raw: bool,
    },

    /// Show the winning proposal declared by the contract
    Winner {
        /// Ballot contract address (0x followed by 40 hex characters)
        contract: String,

        /// JSON-RPC endpoint (overrides [rpc] endpoint from the config file)
        #[arg(long)]
        rpc_url: Option<String>,

        /// Path to config file (default: ~/.config/ballot-ledger/config.toml)
        #[arg(long)]
        config: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Print vote weights as raw integers instead of token units
        #[arg(long, conflicts_with = "json")]
        raw: bool,
    },

    /// Show the unspent voting power of an account
    VotingPower {
        /// Ballot contract address (0x followed by 40 hex characters)
        contract: String,

        /// Account to look up
        account: String,

        /// JSON-RPC endpoint (overrides [rpc] endpoint from the config file)
        #[arg(long)]
        rpc_url: Option<String>,

        /// Path to config file (default: ~/.config/ballot-ledger/config.toml)
        #[arg(long)]
        config: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Print the raw integer instead of token units
        #[arg(long, conflicts_with = "json")]
        raw: bool,
    },

    /// Write a commented default config file
    InitConfig {
        /// Where to write the file (default: ~/.config/ballot-ledger/config.toml)
        #[arg(long)]
        path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display version information
    Version,
}

pub async fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Proposals {
            contract,
            rpc_url,
            config,
            json,
            raw,
        } => {
            query::proposals(QueryArgs {
                contract,
                rpc_url,
                config,
                json,
                raw,
            })
            .await
        }
        Commands::Winner {
            contract,
            rpc_url,
            config,
            json,
            raw,
        } => {
            query::winner(QueryArgs {
                contract,
                rpc_url,
                config,
                json,
                raw,
            })
            .await
        }
        Commands::VotingPower {
            contract,
            account,
            rpc_url,
            config,
            json,
            raw,
        } => {
            query::voting_power(
                QueryArgs {
                    contract,
                    rpc_url,
                    config,
                    json,
                    raw,
                },
                account,
            )
            .await
        }
        Commands::InitConfig { path, force } => init_config::execute(path, force),
        Commands::Version => {
            version::execute();
            Ok(())
        }
    }
}
