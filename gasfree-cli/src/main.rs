//! `gasfree` command-line client.
//!
//! # Usage
//!
//! ```bash
//! # Proxy account address for the key in PRIVATE_KEY
//! gasfree derive
//!
//! # Relay configuration
//! gasfree --network nile tokens
//! gasfree providers
//!
//! # Sign offline, submit later
//! gasfree sign --receiver T... --value 1.5 --provider T... --nonce 3 > transfer.json
//! gasfree submit --file transfer.json
//!
//! # Sign with the relay's current nonce and fees, submit and poll
//! gasfree transfer --receiver T... --value 1.5
//! gasfree status <trace-id>
//!
//! # Fund and activate the proxy account
//! gasfree activate --value 0.5
//! ```
//!
//! # Environment Variables
//!
//! A `.env` file in the working directory is loaded first.
//!
//! - `GASFREE_NETWORK` - `nile` (default) or `tron`
//! - `GASFREE_RELAY_URL` - Relay base URL override
//! - `API_KEY` / `API_SECRET` - Relay credentials
//! - `PRIVATE_KEY` - Hex key of the user account
//! - `TRONGRID_API_KEY` - TronGrid key used by `activate`
//! - `RUST_LOG` - Log level filter (default: `info`)

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use gasfree::fees::FeeSchedule;
use gasfree::proto::SubmitRequest;
use gasfree::relay::RelayApi;
use gasfree::{NetworkConfig, TokenAmount, TransferAuthorization, TronAddress, UnixTimestamp};
use gasfree_http::{
    Activation, ApiKeyAuth, GasFreeFlow, HttpRelayClient, RelayConfig, TransferReport,
    TransferRequest, TronGridClient,
};
use gasfree_tron::{AuthorizationSigner, proxy_address, raw_hash_for_external_signer};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

const USDT_DECIMALS: u32 = 6;

/// Gas-free TRC-20 transfers on TRON.
#[derive(Parser)]
#[command(name = "gasfree", version, about, long_about = None)]
struct Cli {
    /// Gas-free deployment to use (`nile` or `tron`).
    #[arg(long, env = "GASFREE_NETWORK", default_value = "nile", value_parser = NetworkConfig::by_name, global = true)]
    network: NetworkConfig,

    /// Relay base URL; defaults to the network's public relay.
    #[arg(long, env = "GASFREE_RELAY_URL", global = true)]
    relay_url: Option<String>,

    /// Relay API key.
    #[arg(long, env = "API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Relay API secret.
    #[arg(long, env = "API_SECRET", hide_env_values = true, global = true)]
    api_secret: Option<String>,

    /// Hex private key of the user account.
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true, global = true)]
    private_key: Option<String>,

    /// TronGrid API key.
    #[arg(long, env = "TRONGRID_API_KEY", hide_env_values = true, global = true)]
    trongrid_api_key: Option<String>,

    /// HTTP timeout in seconds.
    #[arg(long, default_value_t = 30, global = true)]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a user's address and its proxy account address.
    Derive {
        /// User address; defaults to the address of PRIVATE_KEY.
        #[arg(long)]
        user: Option<TronAddress>,
    },
    /// Generate a fresh random account.
    NewAccount,
    /// Sign an authorization offline and print the submit request.
    Sign(OfflineArgs),
    /// Print the digests an external signer needs.
    RawHash {
        #[command(flatten)]
        transfer: OfflineArgs,
        /// Authorizing user; defaults to the address of PRIVATE_KEY.
        #[arg(long)]
        user: Option<TronAddress>,
    },
    /// List the tokens the relay accepts.
    Tokens,
    /// List the active service providers.
    Providers,
    /// Show the proxy account state of a user.
    Account {
        /// User address; defaults to the address of PRIVATE_KEY.
        #[arg(long)]
        user: Option<TronAddress>,
    },
    /// Submit a request previously printed by `sign`.
    Submit {
        /// JSON file holding the signed request.
        #[arg(long)]
        file: PathBuf,
    },
    /// Show the status of a submitted transfer.
    Status {
        /// Trace id returned by `submit`.
        trace_id: String,
    },
    /// Sign and submit a transfer, then poll it until it resolves.
    Transfer {
        #[command(flatten)]
        transfer: OnlineArgs,
        /// Print the trace id right after submission instead of polling.
        #[arg(long)]
        no_wait: bool,
    },
    /// Fund the proxy account if needed and activate it with a self-transfer.
    Activate {
        /// Self-transfer amount in token units.
        #[arg(long, default_value = "0.5")]
        value: String,
    },
}

/// A transfer whose provider, fee and nonce are chosen by the relay state.
#[derive(Args, Debug)]
struct OnlineArgs {
    /// Destination address.
    #[arg(long)]
    receiver: TronAddress,
    /// Amount in token units (e.g. `1.5`).
    #[arg(long)]
    value: String,
    /// Token contract; defaults to the network's USDT.
    #[arg(long)]
    token: Option<TronAddress>,
    /// Token decimals used to read `--value`.
    #[arg(long, default_value_t = 6)]
    decimals: u32,
    /// Service provider; defaults to the first one listed.
    #[arg(long)]
    provider: Option<TronAddress>,
    /// Deadline offset in seconds; defaults to the provider's.
    #[arg(long)]
    deadline_secs: Option<u64>,
}

/// A fully specified authorization for offline signing.
#[derive(Args, Debug)]
struct OfflineArgs {
    /// Destination address.
    #[arg(long)]
    receiver: TronAddress,
    /// Amount in token units (e.g. `1.5`).
    #[arg(long)]
    value: String,
    /// Token contract; defaults to the network's USDT.
    #[arg(long)]
    token: Option<TronAddress>,
    /// Token decimals used to read amounts.
    #[arg(long, default_value_t = 6)]
    decimals: u32,
    /// Service provider address.
    #[arg(long)]
    provider: TronAddress,
    /// Maximum fee in token units; defaults to the fallback fee schedule.
    #[arg(long)]
    max_fee: Option<String>,
    /// Whether the proxy account is already active (affects the default fee).
    #[arg(long)]
    active: bool,
    /// Deadline offset in seconds.
    #[arg(long, default_value_t = 180)]
    deadline_secs: u64,
    /// Proxy account nonce.
    #[arg(long, default_value_t = 0)]
    nonce: u64,
}

impl OfflineArgs {
    fn authorization(
        &self,
        network: &NetworkConfig,
        user: TronAddress,
    ) -> Result<TransferAuthorization, Box<dyn Error>> {
        let max_fee = match &self.max_fee {
            Some(text) => TokenAmount::from_human(text, self.decimals)?,
            None => FeeSchedule::default().max_fee(self.active)?,
        };
        Ok(TransferAuthorization::new(
            self.token.unwrap_or(network.usdt),
            self.provider,
            user,
            self.receiver,
            TokenAmount::from_human(&self.value, self.decimals)?,
        )
        .with_max_fee(max_fee)
        .with_deadline(UnixTimestamp::in_secs(self.deadline_secs))
        .with_nonce(self.nonce))
    }
}

impl OnlineArgs {
    fn request(&self) -> Result<TransferRequest, Box<dyn Error>> {
        let mut request = TransferRequest::new(
            self.receiver,
            TokenAmount::from_human(&self.value, self.decimals)?,
        );
        if let Some(token) = self.token {
            request = request.with_token(token);
        }
        if let Some(provider) = self.provider {
            request = request.with_provider(provider);
        }
        Ok(request)
    }
}

impl Cli {
    fn signer(&self) -> Result<AuthorizationSigner, Box<dyn Error>> {
        let key = self
            .private_key
            .as_deref()
            .ok_or("PRIVATE_KEY is not set")?;
        Ok(AuthorizationSigner::from_hex(key)?)
    }

    fn user_or_signer(&self, user: Option<TronAddress>) -> Result<TronAddress, Box<dyn Error>> {
        match user {
            Some(user) => Ok(user),
            None => Ok(self.signer()?.address()),
        }
    }

    fn relay(&self) -> Result<HttpRelayClient, Box<dyn Error>> {
        let mut config = match &self.relay_url {
            Some(url) => RelayConfig::new(url.as_str(), self.network.name),
            None => RelayConfig::for_network(&self.network),
        }
        .with_timeout(Duration::from_secs(self.timeout));
        match (&self.api_key, &self.api_secret) {
            (Some(key), Some(secret)) => {
                config = config.with_auth(ApiKeyAuth::new(key.as_str(), secret.as_str()));
            }
            _ => tracing::warn!("API_KEY or API_SECRET missing, relay requests are unauthenticated"),
        }
        Ok(HttpRelayClient::new(config)?)
    }

    fn flow(&self) -> Result<GasFreeFlow<HttpRelayClient>, Box<dyn Error>> {
        Ok(GasFreeFlow::new(
            self.relay()?,
            self.network.clone(),
            self.signer()?,
        ))
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        tracing::error!("gasfree failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let network = &cli.network;
    match &cli.command {
        Command::Derive { user } => {
            let user = cli.user_or_signer(*user)?;
            emit(&json!({
                "network": network.name,
                "user": user,
                "gasFreeAddress": proxy_address(network, &user),
            }))
        }
        Command::NewAccount => {
            let signer = AuthorizationSigner::random();
            let address = signer.address();
            emit(&json!({
                "address": address,
                "privateKey": signer.private_key_hex(),
                "gasFreeAddress": proxy_address(network, &address),
            }))
        }
        Command::Sign(args) => {
            let signer = cli.signer()?;
            let authorization = args.authorization(network, signer.address())?;
            let signature = signer.sign(&authorization, &network.signing_domain())?;
            emit(&SubmitRequest::new(authorization, signature.to_hex()))
        }
        Command::RawHash { transfer, user } => {
            let user = cli.user_or_signer(*user)?;
            let authorization = transfer.authorization(network, user)?;
            let hashes = raw_hash_for_external_signer(&authorization, &network.signing_domain())?;
            emit(&json!({ "authorization": authorization, "hashes": hashes }))
        }
        Command::Tokens => emit(&cli.relay()?.tokens().await?),
        Command::Providers => emit(&cli.relay()?.providers().await?),
        Command::Account { user } => {
            let user = cli.user_or_signer(*user)?;
            let snapshot = cli.relay()?.account(&user).await?;
            let derived = proxy_address(network, &user);
            if snapshot.gas_free_address != derived {
                tracing::warn!(
                    relay = %snapshot.gas_free_address,
                    %derived,
                    "relay reports a different proxy address"
                );
            }
            emit(&snapshot)
        }
        Command::Submit { file } => {
            let request: SubmitRequest = serde_json::from_str(&std::fs::read_to_string(file)?)?;
            let receipt = cli.relay()?.submit(&request).await?;
            emit(&json!({ "traceId": receipt.id, "requestId": request.request_id }))
        }
        Command::Status { trace_id } => match cli.relay()?.transfer_status(trace_id).await? {
            Some(status) => emit(&status),
            None => emit(&json!({ "id": trace_id, "state": null })),
        },
        Command::Transfer { transfer, no_wait } => {
            let mut flow = cli.flow()?;
            if let Some(secs) = transfer.deadline_secs {
                flow = flow.with_deadline_secs(secs);
            }
            let request = transfer.request()?;
            if *no_wait {
                let submitted = flow.transfer(&request).await?;
                return emit(&json!({
                    "traceId": submitted.trace_id,
                    "request": submitted.request,
                }));
            }
            emit_report(&flow.transfer_and_wait(&request).await?)
        }
        Command::Activate { value } => {
            let flow = cli.flow()?;
            let mut ledger = TronGridClient::for_network(network)?.with_signer(cli.signer()?);
            if let Some(key) = &cli.trongrid_api_key {
                ledger = ledger.with_api_key(key.as_str());
            }
            let value = TokenAmount::from_human(value, USDT_DECIMALS)?;
            match flow.activate(&ledger, value).await? {
                Activation::AlreadyActive(snapshot) => {
                    tracing::info!(proxy = %snapshot.gas_free_address, "proxy account already active");
                    emit(&snapshot)
                }
                Activation::Activated { funding_tx, report } => {
                    if let Some(tx) = &funding_tx {
                        tracing::info!(tx_id = %tx, "proxy account funded");
                    }
                    emit_report(&report)
                }
            }
        }
    }
}

fn emit_report(report: &TransferReport) -> Result<(), Box<dyn Error>> {
    emit(&json!({
        "traceId": report.trace_id,
        "state": format!("{:?}", report.state),
        "attempts": report.attempts,
        "status": report.status,
    }))
}

#[allow(clippy::print_stdout)]
fn emit<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
