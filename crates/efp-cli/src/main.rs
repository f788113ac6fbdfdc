// ============================================================================
// efp-settings — plan and rehearse EFP list settings transactions
// ============================================================================
// Usage:
//   efp-settings plan --settings edit.json [--fetch-list-state]
//   efp-settings run --settings edit.json --account 0x.. [--wallet-chain 8453]
//   efp-settings common-followers --user 0x.. --target 0x..
//
// `edit.json` holds the list settings session: selected list, fetched values,
// edited values and which fields changed. `run` drives the whole queue
// against a dry-run wallet that logs calldata instead of signing.
// ============================================================================

mod dry_run;

use alloy_primitives::Address;
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use efp_core::social::summarize_common_followers;
use efp_core::{
    require_address, ActionKind, EfpApiClient, EfpConfig, NoopCart, NoopRefresher, SaveListSettings,
    SaveListSettingsParams, SettingsCallbacks, StepOutcome,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dry_run::DryRunWallet;

/// Safety net for a queue that keeps asking for network switches
const MAX_STEPS: usize = 10_000;

/// Plan and rehearse EFP list settings transactions
#[derive(Parser)]
#[command(name = "efp-settings", version, about = "Plan and rehearse EFP list settings transactions")]
struct Cli {
    /// Path to the config file (default: ~/.efp/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the ordered actions a settings edit needs
    Plan {
        /// JSON file with the list settings session
        #[arg(long)]
        settings: PathBuf,

        /// Load the list's following state from the EFP API
        #[arg(long)]
        fetch_list_state: bool,
    },

    /// Run every action against a dry-run wallet
    Run {
        #[arg(long)]
        settings: PathBuf,

        /// Connected account used as sender
        #[arg(long)]
        account: String,

        /// Chain the wallet starts on (default: the registry chain)
        #[arg(long)]
        wallet_chain: Option<u64>,

        #[arg(long)]
        fetch_list_state: bool,
    },

    /// Describe who you know among an account's followers
    CommonFollowers {
        #[arg(long)]
        user: String,

        #[arg(long)]
        target: String,
    },
}

fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".efp").join("config.json"))
}

fn load_config(path: Option<&Path>) -> Result<EfpConfig> {
    let config = match path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(p) if p.exists() => EfpConfig::load(&p)?,
        Some(p) if path.is_some() => {
            return Err(anyhow!("Config file not found: {}", p.display()));
        }
        _ => EfpConfig::default(),
    };
    Ok(config.with_env_overrides()?)
}

fn parse_account(value: &str) -> Result<Address> {
    Ok(require_address(value)?)
}

fn load_params(path: &Path) -> Result<SaveListSettingsParams> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

async fn prepare_params(
    config: &EfpConfig,
    path: &Path,
    fetch_list_state: bool,
) -> Result<SaveListSettingsParams> {
    let mut params = load_params(path)?;
    if fetch_list_state && params.changed_values.chain {
        let api = EfpApiClient::from_config(config);
        params.list_state = Some(api.fetch_list_state(params.selected_list).await?);
    }
    Ok(params)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Plan {
            settings,
            fetch_list_state,
        } => cmd_plan(&config, &settings, fetch_list_state).await,
        Commands::Run {
            settings,
            account,
            wallet_chain,
            fetch_list_state,
        } => cmd_run(&config, &settings, &account, wallet_chain, fetch_list_state).await,
        Commands::CommonFollowers { user, target } => {
            cmd_common_followers(&config, &user, &target).await
        }
    }
}

async fn cmd_plan(config: &EfpConfig, settings: &Path, fetch_list_state: bool) -> Result<()> {
    let params = prepare_params(config, settings, fetch_list_state).await?;
    let wallet = Arc::new(DryRunWallet::new(None, config.default_chain_id));
    let session = SaveListSettings::new(
        params,
        config.clone(),
        wallet,
        Arc::new(NoopRefresher),
        Arc::new(NoopCart),
        SettingsCallbacks::default(),
    );

    let actions = session.actions();
    println!("=== List {} settings plan ===", session.params().selected_list);
    if actions.is_empty() {
        println!("Nothing to do.");
        return Ok(());
    }
    for (i, action) in actions.iter().enumerate() {
        let detail = match &action.kind {
            ActionKind::UpdateList { ops, .. } => format!(" ({} list ops)", ops.len()),
            _ => String::new(),
        };
        println!(
            "{:>3}. [chain {:>6}] {:<28} {}{}",
            i + 1,
            action.chain_id,
            action.id,
            action.label,
            detail
        );
    }

    Ok(())
}

async fn cmd_run(
    config: &EfpConfig,
    settings: &Path,
    account: &str,
    wallet_chain: Option<u64>,
    fetch_list_state: bool,
) -> Result<()> {
    let account = parse_account(account)?;
    let params = prepare_params(config, settings, fetch_list_state).await?;
    let wallet = Arc::new(DryRunWallet::new(
        Some(account),
        wallet_chain.unwrap_or(config.default_chain_id),
    ));

    let mut session = SaveListSettings::new(
        params,
        config.clone(),
        wallet.clone(),
        Arc::new(NoopRefresher),
        Arc::new(NoopCart),
        SettingsCallbacks {
            on_cancel: Box::new(|| {}),
            on_close: Box::new(|| info!("Settings session closed")),
        },
    );

    if session.actions().is_empty() {
        println!("Nothing to do.");
        return Ok(());
    }

    let mut outcome = session.initiate().await?;
    for _ in 0..MAX_STEPS {
        outcome = match outcome {
            StepOutcome::NetworkSwitched { .. } => session.initiate().await?,
            StepOutcome::Executed { index, hash } => {
                if hash.is_none() {
                    warn!("Action {} was skipped (missing inputs)", index + 1);
                }
                session.advance().await?
            }
            StepOutcome::Exhausted | StepOutcome::Idle => break,
        };
    }
    if !matches!(outcome, StepOutcome::Exhausted | StepOutcome::Idle) {
        anyhow::bail!("Queue did not finish within {} steps", MAX_STEPS);
    }

    let statuses: Vec<_> = session
        .actions()
        .iter()
        .map(|a| (a.id.clone(), a.status.clone()))
        .collect();
    session.finish().await;

    println!("=== Dry run ===");
    for (id, status) in statuses {
        println!("{:<28} {:?}", id, status);
    }
    for (chain, call) in wallet.calls() {
        println!(
            "chain {:>6} {} {} 0x{}",
            chain,
            call.address(),
            call.function_name(),
            hex::encode(call.calldata())
        );
    }

    Ok(())
}

async fn cmd_common_followers(config: &EfpConfig, user: &str, target: &str) -> Result<()> {
    let user = parse_account(user)?;
    let target = parse_account(target)?;
    let api = EfpApiClient::from_config(config);

    let response = api.fetch_common_followers(&user, &target).await?;
    match summarize_common_followers(&response) {
        Some(summary) => println!("{}", summary),
        None => println!("No common followers."),
    }
    Ok(())
}
