use super::config::LedgerConfig;
use super::logging;
use ballot_ledger::ledger::{Address, BallotAccessor, ProposalLedgerReader};
use ballot_ledger::report;
use ballot_ledger::rpc::JsonRpcBallot;
use std::path::PathBuf;
use tracing::info;

/// Shared flags of the query commands
pub struct QueryArgs {
    pub contract: String,
    pub rpc_url: Option<String>,
    pub config: Option<String>,
    pub json: bool,
    pub raw: bool,
}

/// How a query prints its result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Json,
    /// Text with vote weights at this many decimals
    Text { decimals: u8 },
}

struct Session {
    reader: ProposalLedgerReader<JsonRpcBallot>,
    contract: Address,
    output: Output,
}

/// List every proposal and the current winner
pub async fn proposals(args: QueryArgs) -> Result<(), Box<dyn std::error::Error>> {
    let session = connect(args)?;
    print!(
        "{}",
        render_proposals(&session.reader, session.contract, session.output).await?
    );
    Ok(())
}

/// Show the contract-declared winner
pub async fn winner(args: QueryArgs) -> Result<(), Box<dyn std::error::Error>> {
    let session = connect(args)?;
    print!("{}", render_winner(&session.reader, session.output).await?);
    Ok(())
}

/// Show the unspent voting power of `account`
pub async fn voting_power(
    args: QueryArgs,
    account: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let account: Address = account.parse()?;
    let session = connect(args)?;
    print!(
        "{}",
        render_voting_power(&session.reader, account, session.output).await?
    );
    Ok(())
}

fn connect(args: QueryArgs) -> Result<Session, Box<dyn std::error::Error>> {
    let contract: Address = args.contract.parse()?;

    let config_path = args.config.map(PathBuf::from);
    let config = LedgerConfig::resolve(config_path.as_deref())?;
    logging::init(&config.logging.level);

    let endpoint = args
        .rpc_url
        .or_else(|| config.rpc.endpoint.clone())
        .ok_or("No RPC endpoint configured: pass --rpc-url or set [rpc] endpoint in the config file")?;

    info!(contract = %contract, endpoint = %endpoint, "querying ballot contract");

    let output = if args.json {
        Output::Json
    } else {
        Output::Text {
            decimals: config.display_decimals(args.raw),
        }
    };

    let accessor = JsonRpcBallot::new(endpoint, contract, config.rpc_timeout())?;
    Ok(Session {
        reader: ProposalLedgerReader::with_options(accessor, config.reader_options()),
        contract,
        output,
    })
}

/// Render the `proposals` output for any accessor
pub async fn render_proposals<A: BallotAccessor>(
    reader: &ProposalLedgerReader<A>,
    contract: Address,
    output: Output,
) -> Result<String, Box<dyn std::error::Error>> {
    let snapshot = reader.snapshot(contract).await?;

    match output {
        Output::Json => Ok(format!("{}\n", serde_json::to_string_pretty(&snapshot)?)),
        Output::Text { decimals } => Ok(report::render_snapshot(&snapshot, decimals)),
    }
}

/// Render the `winner` output for any accessor
pub async fn render_winner<A: BallotAccessor>(
    reader: &ProposalLedgerReader<A>,
    output: Output,
) -> Result<String, Box<dyn std::error::Error>> {
    let proposals = reader.enumerate_proposals().await?;
    if proposals.is_empty() {
        return Ok(match output {
            Output::Json => "null\n".to_string(),
            Output::Text { .. } => "No proposals found in the ballot.\n".to_string(),
        });
    }

    let winner = reader.resolve_winner(&proposals).await?;
    match output {
        Output::Json => Ok(format!("{}\n", serde_json::to_string_pretty(&winner)?)),
        Output::Text { decimals } => Ok(format!("{}\n", report::format_winner(&winner, decimals))),
    }
}

/// Render the `voting-power` output for any accessor
pub async fn render_voting_power<A: BallotAccessor>(
    reader: &ProposalLedgerReader<A>,
    account: Address,
    output: Output,
) -> Result<String, Box<dyn std::error::Error>> {
    let power = reader.voting_power(account).await?;

    match output {
        Output::Json => Ok(format!("{}\n", serde_json::to_string_pretty(&power)?)),
        Output::Text { decimals } => Ok(format!(
            "{}\n",
            report::format_voting_power(&power, decimals)
        )),
    }
}
