use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use alloy_primitives::{Address, U256};
use anyhow::{anyhow, Context, Result};
use carbon_retirement::{
    executor::{EthersReader, EthersSigner},
    resolver::{self, Amount},
    types::{NetworkProfile, SwapRequest, TransactionRecord},
    utils::{address::parse_address, units},
    AllowanceManager, ChainSigner, NetworkRegistry, NetworksConfig, OrchestrationError,
    OrchestratorConfig, RetirementOrchestrator, SwapOrchestrator,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod records;

use records::{append_records, RunRecords};

/// Retire tokenized carbon credits of specific projects.
///
/// Approves the retirement helper for exactly the pool tokens needed (only when the current
/// allowance falls short), then calls `retireSpecificProject` once the approval is mined.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// JSON file with the per-network address map. The built-in Celo profile is used otherwise.
    #[arg(long, env = "RETIRE_CONFIG")]
    config: Option<PathBuf>,

    /// Network name (eg, celo) or chain id.
    #[arg(long, env = "NETWORK", default_value = "celo")]
    network: String,

    /// RPC URL; falls back to the network profile's `rpc_url`.
    #[arg(long, env = "RPC_URL")]
    rpc_url: Option<String>,

    /// Path to a file containing the signer private key.
    #[arg(long, env = "PRIV_KEY_PATH", conflicts_with = "private_key")]
    private_key_path: Option<PathBuf>,

    /// Private key (hex string, 0x...).
    #[arg(
        long,
        env = "PRIVATE_KEY",
        hide_env_values = true,
        conflicts_with = "private_key_path"
    )]
    private_key: Option<String>,

    /// Seconds to wait for each transaction to be mined before reporting a timeout.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Blocks to wait after inclusion.
    #[arg(long)]
    confirmations: Option<usize>,

    /// Receipt polling interval in milliseconds.
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Path of the JSON ledger every transaction record is appended to.
    #[arg(long, default_value = "retirements.json")]
    records_path: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Retire credits: `--project <label|0x..>=<amount>`, repeatable for a batch.
    Retire {
        #[arg(long = "project", value_name = "PROJECT=AMOUNT", required = true)]
        projects: Vec<String>,

        /// Amounts are already in the pool token's smallest unit.
        #[arg(long)]
        raw: bool,

        /// Gas ceiling for the retirement transaction.
        #[arg(long)]
        gas_limit: Option<u64>,
    },
    /// Acquire pool tokens by swapping an ERC-20 through the network's swap helper.
    Swap {
        #[arg(long)]
        token_in: String,

        #[arg(long)]
        amount: String,

        #[arg(long)]
        raw: bool,

        #[arg(long)]
        gas_limit: Option<u64>,
    },
    /// Show the pool-token allowance the retirement helper holds.
    Allowance {
        /// Query for this owner with a read-only provider instead of the signer's address.
        #[arg(long)]
        owner: Option<String>,
    },
    /// List configured networks.
    Networks,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing()?;
    let cli = Cli::parse();

    let registry = load_registry(cli.config.as_deref())?;
    if let Command::Networks = cli.command {
        for name in registry.names() {
            let profile = registry.profile(name)?;
            println!(
                "{name}\tchain {}\tpool {}\thelper {}",
                profile.chain_id, profile.pool, profile.helper
            );
        }
        return Ok(());
    }

    let network = registry.profile(&cli.network)?.clone();
    let rpc_url = cli
        .rpc_url
        .clone()
        .or_else(|| network.rpc_url.clone())
        .ok_or_else(|| {
            anyhow!("missing rpc url: provide --rpc-url (or set RPC_URL) or configure rpc_url for `{}`", network.name)
        })?;
    let mut config = OrchestratorConfig::default();
    if let Some(secs) = cli.timeout_secs {
        config.confirmation_timeout_secs = secs;
    }
    if let Some(confirmations) = cli.confirmations {
        config.confirmations = confirmations;
    }

    match &cli.command {
        Command::Allowance { owner: Some(owner) } => {
            let owner = parse_address(owner).ok_or_else(|| anyhow!("invalid owner address `{owner}`"))?;
            let reader = EthersReader::connect(&rpc_url)?;
            print_allowance(&reader, owner, &network).await
        }
        Command::Allowance { owner: None } => {
            let signer = connect_signer(&cli, &rpc_url, &config).await?;
            print_allowance(signer.as_ref(), signer.address(), &network).await
        }
        Command::Retire {
            projects,
            raw,
            gas_limit,
        } => {
            if let Some(gas_limit) = gas_limit {
                config.retirement_gas_limit = *gas_limit;
            }
            let (labels, amounts) = parse_project_args(projects, *raw)?;
            let signer = connect_signer(&cli, &rpc_url, &config).await?;
            let (network, request) = registry
                .resolve(signer.as_ref(), &cli.network, &labels, &amounts)
                .await?;

            let orchestrator = RetirementOrchestrator::new(signer.clone(), config);
            let mut run = RunRecords::default();
            let outcome = orchestrator
                .retire_observed(&request, &network, &mut |record: &TransactionRecord| {
                    run.observe(record)
                })
                .await;
            finish(&cli.records_path, &network, signer.address(), &run, outcome, "Retired")
        }
        Command::Swap {
            token_in,
            amount,
            raw,
            gas_limit,
        } => {
            if let Some(gas_limit) = gas_limit {
                config.swap_gas_limit = *gas_limit;
            }
            let token_in = parse_address(token_in)
                .ok_or_else(|| anyhow!("invalid token address `{token_in}`"))?;
            let signer = connect_signer(&cli, &rpc_url, &config).await?;
            let amount_in = if *raw {
                U256::from_str_radix(amount.trim(), 10)
                    .with_context(|| format!("invalid raw amount `{amount}`"))?
            } else {
                let decimals = resolver::token_decimals(signer.as_ref(), token_in).await?;
                units::parse_units(amount, decimals)?
            };
            let request = SwapRequest::new(token_in, amount_in)?;

            let orchestrator = SwapOrchestrator::new(signer.clone(), config);
            let mut run = RunRecords::default();
            let outcome = orchestrator
                .swap_observed(&request, &network, &mut |record: &TransactionRecord| {
                    run.observe(record)
                })
                .await;
            finish(&cli.records_path, &network, signer.address(), &run, outcome, "Swapped")
        }
        Command::Networks => Ok(()),
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize tracing subscriber: {e}"))
}

fn load_registry(path: Option<&Path>) -> Result<NetworkRegistry> {
    let config = match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed reading {}", path.display()))?;
            NetworksConfig::from_json(&json)
                .with_context(|| format!("failed parsing JSON in {}", path.display()))?
        }
        None => NetworksConfig::builtin(),
    };
    Ok(NetworkRegistry::from_config(&config)?)
}

async fn connect_signer(
    cli: &Cli,
    rpc_url: &str,
    config: &OrchestratorConfig,
) -> Result<Arc<dyn ChainSigner>> {
    let key = if let Some(ref path) = cli.private_key_path {
        fs::read_to_string(path)
            .with_context(|| format!("failed reading private key from {}", path.display()))?
    } else if let Some(ref key) = cli.private_key {
        key.clone()
    } else {
        return Err(anyhow!(
            "missing signer key: provide --private-key-path or --private-key (or set PRIV_KEY_PATH/PRIVATE_KEY)"
        ));
    };

    let poll_interval = cli.poll_interval_ms.map(Duration::from_millis);
    let signer = EthersSigner::connect(rpc_url, &key, config.confirmations, poll_interval)
        .await
        .context("failed to connect signer")?;
    tracing::info!(target: "retirement", signer = %signer.address(), rpc_url, "signer_connected");
    Ok(Arc::new(signer))
}

/// `key=amount` pairs into positionally correlated lists.
fn parse_project_args(args: &[String], raw: bool) -> Result<(Vec<String>, Vec<Amount>)> {
    let mut labels = Vec::with_capacity(args.len());
    let mut amounts = Vec::with_capacity(args.len());
    for arg in args {
        let (project, amount) = arg
            .rsplit_once('=')
            .ok_or_else(|| anyhow!("expected PROJECT=AMOUNT, got `{arg}`"))?;
        labels.push(project.trim().to_string());
        amounts.push(Amount::parse(amount, raw)?);
    }
    Ok((labels, amounts))
}

async fn print_allowance<R: carbon_retirement::ChainReader + ?Sized>(
    reader: &R,
    owner: Address,
    network: &NetworkProfile,
) -> Result<()> {
    let allowance =
        AllowanceManager::current_allowance(reader, owner, network.helper, network.allowance_token)
            .await
            .context("failed to read allowance")?;
    let decimals = resolver::token_decimals(reader, network.allowance_token).await?;
    println!(
        "owner {} allows helper {} to spend {} pool tokens ({} raw)",
        owner,
        network.helper,
        units::format_units(allowance.amount, decimals),
        allowance.amount
    );
    Ok(())
}

/// Persist the run's records whatever the outcome, then report it.
fn finish(
    records_path: &Path,
    network: &NetworkProfile,
    signer: Address,
    run: &RunRecords,
    outcome: Result<TransactionRecord, OrchestrationError>,
    verb: &str,
) -> Result<()> {
    if !run.is_empty() {
        append_records(records_path, network, signer, run)?;
    }
    match outcome {
        Ok(record) => {
            println!("{verb} on {}: transaction {}", network.name, record.hash);
            Ok(())
        }
        Err(err) => {
            if let Some(timeout) = err.timeout() {
                eprintln!(
                    "transaction {} is still pending; check its status before retrying",
                    timeout.hash
                );
            }
            Err(err.into())
        }
    }
}
