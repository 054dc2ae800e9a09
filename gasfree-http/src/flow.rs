//! End-to-end transfer and activation flows.
//!
//! [`GasFreeFlow`] ties the relay, a local signing key and (for activation)
//! a ledger client together:
//!
//! ```text
//! transfer:   providers + tokens -> fresh account snapshot -> maxFee -> sign -> submit
//! activate:   snapshot -> check proxy address -> fund proxy via ledger if short
//!             -> wait for inclusion -> self-transfer through the relay -> poll
//! ```
//!
//! The account snapshot is always fetched right before signing so the nonce
//! is as fresh as the relay can make it. A [`GasFreeError::StaleNonce`]
//! rejection is returned to the caller, who decides whether to rebuild.

use std::time::Duration;

use gasfree::fees::FeeSchedule;
use gasfree::ledger::{LedgerClient, TxOutcome};
use gasfree::proto::{AccountSnapshot, SUCCESS_CODE, ServiceProvider, SubmitReceipt, SubmitRequest};
use gasfree::relay::RelayApi;
use gasfree::{
    GasFreeError, NetworkConfig, TokenAmount, TransferAuthorization, TronAddress, UnixTimestamp,
};
use gasfree_tron::{AuthorizationSigner, proxy_address};

use crate::error::RelayError;
use crate::poll::{PollPolicy, TransferReport, poll_transfer, wait_for_ledger_tx};

/// Deadline offset used when no provider limits are known.
pub const DEFAULT_DEADLINE_SECS: u64 = 180;

/// Pause after funding a proxy account so the relay observes the new balance.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(5);

/// What to transfer through the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// Destination account.
    pub receiver: TronAddress,
    /// Amount in base units.
    pub value: TokenAmount,
    /// Token contract; the network's USDT when `None`.
    pub token: Option<TronAddress>,
    /// Service provider; the first one the relay lists when `None`.
    pub provider: Option<TronAddress>,
}

impl TransferRequest {
    /// Transfers `value` of the network's USDT to `receiver`.
    #[must_use]
    pub const fn new(receiver: TronAddress, value: TokenAmount) -> Self {
        Self {
            receiver,
            value,
            token: None,
            provider: None,
        }
    }

    /// Selects another token.
    #[must_use]
    pub const fn with_token(mut self, token: TronAddress) -> Self {
        self.token = Some(token);
        self
    }

    /// Pins the service provider.
    #[must_use]
    pub const fn with_provider(mut self, provider: TronAddress) -> Self {
        self.provider = Some(provider);
        self
    }
}

/// A signed submission, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTransfer {
    /// The request body, including signature and request id.
    pub request: SubmitRequest,
    /// The account snapshot the nonce was taken from.
    pub snapshot: AccountSnapshot,
    /// The fee schedule `maxFee` was computed from.
    pub fees: FeeSchedule,
}

/// A submission accepted by the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTransfer {
    /// What was submitted.
    pub request: SubmitRequest,
    /// Trace id assigned by the relay.
    pub trace_id: String,
}

/// Result of [`GasFreeFlow::activate`].
#[derive(Debug, Clone, PartialEq)]
pub enum Activation {
    /// The proxy account was already active; nothing was sent.
    AlreadyActive(AccountSnapshot),
    /// The activating transfer was submitted and resolved.
    Activated {
        /// Ledger transaction that topped up the proxy account, if one was needed.
        funding_tx: Option<String>,
        /// Outcome of the activating self-transfer.
        report: TransferReport,
    },
}

/// Transfer and activation flows for one user on one network.
pub struct GasFreeFlow<R> {
    relay: R,
    network: NetworkConfig,
    signer: AuthorizationSigner,
    deadline_secs: Option<u64>,
    poll: PollPolicy,
    ledger_poll: PollPolicy,
    settle_delay: Duration,
}

impl<R> std::fmt::Debug for GasFreeFlow<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GasFreeFlow")
            .field("network", &self.network.name)
            .field("user", &self.signer.address())
            .field("deadline_secs", &self.deadline_secs)
            .field("poll", &self.poll)
            .finish_non_exhaustive()
    }
}

impl<R> GasFreeFlow<R>
where
    R: RelayApi<Error = RelayError>,
{
    /// Creates flows for the account controlled by `signer`.
    #[must_use]
    pub fn new(relay: R, network: NetworkConfig, signer: AuthorizationSigner) -> Self {
        Self {
            relay,
            network,
            signer,
            deadline_secs: None,
            poll: PollPolicy::default(),
            ledger_poll: PollPolicy::ledger(),
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Requests a fixed deadline offset instead of the provider's default.
    ///
    /// The offset is still clamped into the provider's accepted window.
    #[must_use]
    pub const fn with_deadline_secs(mut self, secs: u64) -> Self {
        self.deadline_secs = Some(secs);
        self
    }

    /// Sets the relay polling policy.
    #[must_use]
    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll = policy;
        self
    }

    /// Sets the ledger confirmation policy.
    #[must_use]
    pub fn with_ledger_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.ledger_poll = policy;
        self
    }

    /// Sets the pause between funding a proxy account and submitting through it.
    #[must_use]
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Returns the relay client.
    pub const fn relay(&self) -> &R {
        &self.relay
    }

    /// Returns the user's address.
    #[must_use]
    pub fn user(&self) -> TronAddress {
        self.signer.address()
    }

    /// Returns the user's proxy account address, derived locally.
    #[must_use]
    pub fn proxy_address(&self) -> TronAddress {
        proxy_address(&self.network, &self.user())
    }

    /// Resolves the provider address and, when the relay lists it, its limits.
    async fn pick_provider(
        &self,
        wanted: Option<TronAddress>,
    ) -> Result<(TronAddress, Option<ServiceProvider>), RelayError> {
        let providers = self.relay.providers().await?;
        if let Some(address) = wanted {
            let known = providers.into_iter().find(|p| p.address == address);
            return Ok((address, known));
        }
        providers
            .into_iter()
            .next()
            .map(|p| (p.address, Some(p)))
            .ok_or_else(|| {
                GasFreeError::RelayRejected {
                    code: SUCCESS_CODE,
                    message: "relay lists no service providers".to_owned(),
                }
                .into()
            })
    }

    /// Fees for `token`, preferring the account's own asset entry over the
    /// relay's token list.
    async fn fee_schedule(
        &self,
        token: &TronAddress,
        snapshot: &AccountSnapshot,
    ) -> Result<FeeSchedule, RelayError> {
        let tokens = self.relay.tokens().await?;
        let config = tokens.iter().find(|t| &t.token_address == token);
        let asset = snapshot.asset(token, config.map(|c| c.symbol.as_str()));
        Ok(FeeSchedule::resolve(asset, config))
    }

    /// Builds and signs a submission for `request`.
    ///
    /// # Errors
    ///
    /// Returns relay errors, [`GasFreeError::RelayRejected`] if the relay
    /// lists no providers or does not accept submissions for the account,
    /// and signing errors.
    pub async fn prepare_transfer(
        &self,
        request: &TransferRequest,
    ) -> Result<PreparedTransfer, RelayError> {
        let user = self.user();
        let token = request.token.unwrap_or(self.network.usdt);
        let (provider_address, provider) = self.pick_provider(request.provider).await?;

        let snapshot = self.relay.account(&user).await?;
        if !snapshot.allow_submit {
            return Err(GasFreeError::RelayRejected {
                code: SUCCESS_CODE,
                message: format!("relay does not accept submissions for {user} (allowSubmit=false)"),
            }
            .into());
        }
        let fees = self.fee_schedule(&token, &snapshot).await?;
        let max_fee = fees.max_fee_for(&snapshot)?;

        let requested = self.deadline_secs.or_else(|| {
            provider
                .as_ref()
                .map(|p| p.config.default_deadline_duration)
        });
        let deadline_secs = match &provider {
            Some(p) => p
                .config
                .clamp_deadline(requested.unwrap_or(DEFAULT_DEADLINE_SECS)),
            None => requested.unwrap_or(DEFAULT_DEADLINE_SECS),
        };

        let authorization =
            TransferAuthorization::new(token, provider_address, user, request.receiver, request.value)
                .with_max_fee(max_fee)
                .with_deadline(UnixTimestamp::in_secs(deadline_secs))
                .with_nonce(snapshot.nonce);
        let signature = self
            .signer
            .sign(&authorization, &self.network.signing_domain())?;

        #[cfg(feature = "telemetry")]
        tracing::info!(
            %user,
            receiver = %request.receiver,
            value = %request.value,
            max_fee = %max_fee,
            nonce = snapshot.nonce,
            active = snapshot.active,
            "prepared gas-free transfer"
        );

        Ok(PreparedTransfer {
            request: SubmitRequest::new(authorization, signature.to_hex()),
            snapshot,
            fees,
        })
    }

    /// Submits a prepared transfer.
    ///
    /// # Errors
    ///
    /// Returns relay errors, including [`GasFreeError::StaleNonce`].
    pub async fn submit(&self, request: &SubmitRequest) -> Result<SubmitReceipt, RelayError> {
        let receipt = self.relay.submit(request).await?;
        #[cfg(feature = "telemetry")]
        tracing::info!(
            trace_id = %receipt.id,
            request_id = %request.request_id,
            nonce = request.authorization.nonce,
            "submitted gas-free transfer"
        );
        Ok(receipt)
    }

    /// Prepares and submits a transfer.
    ///
    /// # Errors
    ///
    /// See [`Self::prepare_transfer`] and [`Self::submit`].
    pub async fn transfer(&self, request: &TransferRequest) -> Result<SubmittedTransfer, RelayError> {
        let prepared = self.prepare_transfer(request).await?;
        let receipt = self.submit(&prepared.request).await?;
        Ok(SubmittedTransfer {
            request: prepared.request,
            trace_id: receipt.id,
        })
    }

    /// Submits a transfer and polls it to a terminal state.
    ///
    /// # Errors
    ///
    /// See [`Self::transfer`]; also [`GasFreeError::Timeout`] if polling
    /// runs out of attempts.
    pub async fn transfer_and_wait(
        &self,
        request: &TransferRequest,
    ) -> Result<TransferReport, RelayError> {
        let submitted = self.transfer(request).await?;
        poll_transfer(&self.relay, &submitted.trace_id, &self.poll).await
    }

    /// Activates the user's proxy account with a self-transfer of `value`.
    ///
    /// If the proxy holds less than `value` plus activation and transfer
    /// fees, the shortfall is first sent from the user's own account through
    /// `ledger`, whose signer must control the same key.
    ///
    /// # Errors
    ///
    /// Returns [`GasFreeError::InvalidAddress`] if the relay reports a proxy
    /// address other than the derived one, [`RelayError::Ledger`] if the
    /// user's balance cannot cover the shortfall or the funding transfer
    /// fails, and any error of [`Self::transfer_and_wait`].
    pub async fn activate<L>(
        &self,
        ledger: &L,
        value: TokenAmount,
    ) -> Result<Activation, RelayError>
    where
        L: LedgerClient<Error = RelayError> + ?Sized,
    {
        const CONTEXT: &str = "fund proxy account";
        let user = self.user();
        let token = self.network.usdt;

        let snapshot = self.relay.account(&user).await?;
        if snapshot.active {
            return Ok(Activation::AlreadyActive(snapshot));
        }
        let derived = self.proxy_address();
        if snapshot.gas_free_address != derived {
            return Err(GasFreeError::InvalidAddress(format!(
                "relay reports proxy {} but {derived} was derived",
                snapshot.gas_free_address
            ))
            .into());
        }

        let fees = self.fee_schedule(&token, &snapshot).await?;
        let required = fees.required_balance(value, false)?;
        let balance = ledger.token_balance(&token, &derived).await?;

        let funding_tx = if balance < required {
            let shortfall = required.saturating_sub(balance);
            let own = ledger.token_balance(&token, &user).await?;
            if own < shortfall {
                return Err(RelayError::ledger(
                    CONTEXT,
                    format!("{user} holds {own}, needs {shortfall}"),
                ));
            }
            #[cfg(feature = "telemetry")]
            tracing::info!(%user, proxy = %derived, %shortfall, "funding proxy account");
            let tx_id = ledger.transfer_token(&token, &derived, shortfall).await?;
            match wait_for_ledger_tx(ledger, &tx_id, &self.ledger_poll).await? {
                TxOutcome::Success => {}
                TxOutcome::Failed(result) => {
                    return Err(RelayError::ledger(
                        CONTEXT,
                        format!("transaction {tx_id} failed: {result}"),
                    ));
                }
            }
            tokio::time::sleep(self.settle_delay).await;
            Some(tx_id)
        } else {
            None
        };

        let report = self
            .transfer_and_wait(&TransferRequest::new(user, value).with_token(token))
            .await?;
        Ok(Activation::Activated { funding_tx, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gasfree::proto::{
        AssetBalance, ProviderLimits, StateTag, TokenConfig, TransferStatus,
    };
    use gasfree::relay::BoxFuture;
    use gasfree_tron::signer::{TransferSignature, recover_authorizer};
    use std::collections::HashMap;
    use std::sync::Mutex;

    const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    const PROVIDER: &str = "TKtWbdzEq5ss9vTS9kwRhBp5mXmBfBns3E";

    fn signer() -> AuthorizationSigner {
        AuthorizationSigner::from_hex(KEY).unwrap()
    }

    struct FakeRelay {
        snapshot: Mutex<AccountSnapshot>,
        providers: Vec<ServiceProvider>,
        submitted: Mutex<Vec<SubmitRequest>>,
    }

    impl FakeRelay {
        fn new(active: bool, nonce: u64) -> Self {
            let user = signer().address();
            Self {
                snapshot: Mutex::new(AccountSnapshot {
                    account_address: user,
                    gas_free_address: proxy_address(&NetworkConfig::nile(), &user),
                    active,
                    nonce,
                    allow_submit: true,
                    assets: vec![],
                }),
                providers: vec![ServiceProvider {
                    name: "Provider-1".to_owned(),
                    address: PROVIDER.parse().unwrap(),
                    website: None,
                    config: ProviderLimits {
                        min_deadline_duration: 60,
                        max_deadline_duration: 600,
                        default_deadline_duration: 180,
                        max_pending_transfer: 1,
                    },
                }],
                submitted: Mutex::new(vec![]),
            }
        }
    }

    impl RelayApi for FakeRelay {
        type Error = RelayError;

        fn tokens(&self) -> BoxFuture<'_, Result<Vec<TokenConfig>, RelayError>> {
            Box::pin(async {
                Ok(vec![TokenConfig {
                    symbol: "USDT".to_owned(),
                    token_address: NetworkConfig::nile().usdt,
                    decimal: 6,
                    activate_fee: TokenAmount::from(1_000_000u64),
                    transfer_fee: TokenAmount::from(10_000u64),
                    min_transfer: None,
                    max_transfer: None,
                }])
            })
        }

        fn providers(&self) -> BoxFuture<'_, Result<Vec<ServiceProvider>, RelayError>> {
            Box::pin(async move { Ok(self.providers.clone()) })
        }

        fn account<'a>(
            &'a self,
            _user: &'a TronAddress,
        ) -> BoxFuture<'a, Result<AccountSnapshot, RelayError>> {
            Box::pin(async move { Ok(self.snapshot.lock().unwrap().clone()) })
        }

        fn submit<'a>(
            &'a self,
            request: &'a SubmitRequest,
        ) -> BoxFuture<'a, Result<SubmitReceipt, RelayError>> {
            Box::pin(async move {
                let mut submitted = self.submitted.lock().unwrap();
                submitted.push(request.clone());
                Ok(SubmitReceipt {
                    id: format!("trace-{}", submitted.len()),
                })
            })
        }

        fn transfer_status<'a>(
            &'a self,
            trace_id: &'a str,
        ) -> BoxFuture<'a, Result<Option<TransferStatus>, RelayError>> {
            Box::pin(async move {
                Ok(Some(TransferStatus {
                    id: trace_id.to_owned(),
                    state: StateTag::from("SUCCEED"),
                    account_address: None,
                    target_address: None,
                    txn_amount: None,
                    amount: None,
                    nonce: None,
                    created_at: None,
                    txn_activate_fee: None,
                    txn_transfer_fee: None,
                    txn_total_fee: None,
                    txn_hash: Some("ab".repeat(32)),
                }))
            })
        }
    }

    #[derive(Default)]
    struct FakeLedger {
        balances: Mutex<HashMap<TronAddress, TokenAmount>>,
        transfers: Mutex<Vec<(TronAddress, TokenAmount)>>,
    }

    impl FakeLedger {
        fn with_balance(self, owner: TronAddress, amount: u64) -> Self {
            self.balances
                .lock()
                .unwrap()
                .insert(owner, TokenAmount::from(amount));
            self
        }
    }

    #[async_trait::async_trait]
    impl LedgerClient for FakeLedger {
        type Error = RelayError;

        async fn token_balance(
            &self,
            _token: &TronAddress,
            owner: &TronAddress,
        ) -> Result<TokenAmount, RelayError> {
            Ok(self
                .balances
                .lock()
                .unwrap()
                .get(owner)
                .copied()
                .unwrap_or_default())
        }

        async fn transfer_token(
            &self,
            _token: &TronAddress,
            to: &TronAddress,
            amount: TokenAmount,
        ) -> Result<String, RelayError> {
            self.transfers.lock().unwrap().push((*to, amount));
            Ok("f0".repeat(32))
        }

        async fn transaction_outcome(&self, _tx_id: &str) -> Result<Option<TxOutcome>, RelayError> {
            Ok(Some(TxOutcome::Success))
        }
    }

    fn flow(relay: FakeRelay) -> GasFreeFlow<FakeRelay> {
        let instant = PollPolicy::default().with_interval(Duration::ZERO);
        GasFreeFlow::new(relay, NetworkConfig::nile(), signer())
            .with_poll_policy(instant.clone())
            .with_ledger_poll_policy(instant)
            .with_settle_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn prepared_transfer_uses_fresh_nonce_and_activation_fee() {
        let flow = flow(FakeRelay::new(false, 0));
        let receiver: TronAddress = "TJM1BE5wq1VdHh3gwjUeyaVkvZp9DVYCfC".parse().unwrap();
        let before = UnixTimestamp::now();
        let prepared = flow
            .prepare_transfer(&TransferRequest::new(receiver, TokenAmount::from(500_000u64)))
            .await
            .unwrap();

        let auth = &prepared.request.authorization;
        assert_eq!(auth.nonce, 0);
        assert_eq!(auth.max_fee, TokenAmount::from(1_010_000u64));
        assert_eq!(auth.service_provider.to_base58(), PROVIDER);
        assert_eq!(auth.token, NetworkConfig::nile().usdt);
        assert!(auth.deadline >= before + 180);

        let signature = TransferSignature::from_hex(&prepared.request.sig).unwrap();
        let domain = NetworkConfig::nile().signing_domain();
        assert_eq!(recover_authorizer(&signature, auth, &domain).unwrap(), flow.user());

        flow.relay().snapshot.lock().unwrap().active = true;
        flow.relay().snapshot.lock().unwrap().nonce = 1;
        let next = flow
            .prepare_transfer(&TransferRequest::new(receiver, TokenAmount::from(500_000u64)))
            .await
            .unwrap();
        assert_eq!(next.request.authorization.nonce, 1);
        assert_eq!(next.request.authorization.max_fee, TokenAmount::from(10_000u64));
        assert_ne!(next.request.sig, prepared.request.sig);
    }

    #[tokio::test]
    async fn account_asset_fees_take_precedence() {
        let relay = FakeRelay::new(true, 4);
        relay.snapshot.lock().unwrap().assets.push(AssetBalance {
            token_symbol: "USDT".to_owned(),
            token_address: None,
            available: TokenAmount::from(10_000_000u64),
            frozen: TokenAmount::ZERO,
            activate_fee: TokenAmount::from(2_000_000u64),
            transfer_fee: TokenAmount::from(50_000u64),
        });
        let flow = flow(relay).with_deadline_secs(10_000);
        let prepared = flow
            .prepare_transfer(&TransferRequest::new(flow.user(), TokenAmount::from(1u64)))
            .await
            .unwrap();
        assert_eq!(prepared.fees.transfer_fee, TokenAmount::from(50_000u64));
        assert_eq!(prepared.request.authorization.max_fee, TokenAmount::from(50_000u64));
        assert!(prepared.request.authorization.deadline <= UnixTimestamp::now() + 600);
    }

    #[tokio::test]
    async fn closed_account_is_rejected_before_signing() {
        let relay = FakeRelay::new(true, 2);
        relay.snapshot.lock().unwrap().allow_submit = false;
        let flow = flow(relay);
        let err = flow
            .transfer(&TransferRequest::new(flow.user(), TokenAmount::from(1u64)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RelayError::GasFree(GasFreeError::RelayRejected { .. })
        ));
        assert!(flow.relay().submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn transfer_and_wait_reports_success() {
        let flow = flow(FakeRelay::new(true, 9));
        let report = flow
            .transfer_and_wait(&TransferRequest::new(flow.user(), TokenAmount::from(5u64)))
            .await
            .unwrap();
        assert!(report.succeeded());
        assert_eq!(report.trace_id, "trace-1");
        assert_eq!(report.attempts, 1);
    }

    #[tokio::test]
    async fn activation_funds_shortfall_then_self_transfers() {
        let flow = flow(FakeRelay::new(false, 0));
        let proxy = flow.proxy_address();
        let ledger = FakeLedger::default()
            .with_balance(proxy, 300_000)
            .with_balance(flow.user(), 5_000_000);

        let activation = flow
            .activate(&ledger, TokenAmount::from(500_000u64))
            .await
            .unwrap();
        match activation {
            Activation::Activated { funding_tx, report } => {
                assert_eq!(funding_tx, Some("f0".repeat(32)));
                assert!(report.succeeded());
            }
            other => panic!("unexpected activation result: {other:?}"),
        }

        // 500_000 + 1_000_000 + 10_000 required, 300_000 present
        assert_eq!(
            *ledger.transfers.lock().unwrap(),
            vec![(proxy, TokenAmount::from(1_210_000u64))]
        );
        let submitted = flow.relay().submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].authorization.receiver, flow.user());
        assert_eq!(submitted[0].authorization.max_fee, TokenAmount::from(1_010_000u64));
    }

    #[tokio::test]
    async fn activation_funding_and_signed_fee_share_asset_fees() {
        let relay = FakeRelay::new(false, 0);
        relay.snapshot.lock().unwrap().assets.push(AssetBalance {
            token_symbol: "USDT".to_owned(),
            token_address: None,
            available: TokenAmount::ZERO,
            frozen: TokenAmount::ZERO,
            activate_fee: TokenAmount::from(2_000_000u64),
            transfer_fee: TokenAmount::from(50_000u64),
        });
        let flow = flow(relay);
        let proxy = flow.proxy_address();
        let ledger = FakeLedger::default()
            .with_balance(proxy, 300_000)
            .with_balance(flow.user(), 5_000_000);

        flow.activate(&ledger, TokenAmount::from(500_000u64))
            .await
            .unwrap();

        // 500_000 + 2_000_000 + 50_000 required, 300_000 present
        assert_eq!(
            *ledger.transfers.lock().unwrap(),
            vec![(proxy, TokenAmount::from(2_250_000u64))]
        );
        let submitted = flow.relay().submitted.lock().unwrap();
        assert_eq!(submitted[0].authorization.max_fee, TokenAmount::from(2_050_000u64));
    }

    #[tokio::test]
    async fn activation_skips_funding_when_proxy_is_covered() {
        let flow = flow(FakeRelay::new(false, 0));
        let ledger = FakeLedger::default().with_balance(flow.proxy_address(), 3_000_000);
        let activation = flow
            .activate(&ledger, TokenAmount::from(500_000u64))
            .await
            .unwrap();
        assert!(matches!(
            activation,
            Activation::Activated {
                funding_tx: None,
                ..
            }
        ));
        assert!(ledger.transfers.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn active_account_is_left_alone() {
        let flow = flow(FakeRelay::new(true, 3));
        let ledger = FakeLedger::default();
        let activation = flow
            .activate(&ledger, TokenAmount::from(500_000u64))
            .await
            .unwrap();
        assert!(matches!(activation, Activation::AlreadyActive(_)));
        assert!(flow.relay().submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn activation_refuses_unexpected_proxy_address() {
        let relay = FakeRelay::new(false, 0);
        relay.snapshot.lock().unwrap().gas_free_address =
            "TJM1BE5wq1VdHh3gwjUeyaVkvZp9DVYCfC".parse().unwrap();
        let flow = flow(relay);
        let ledger = FakeLedger::default().with_balance(flow.user(), 5_000_000);
        let err = flow
            .activate(&ledger, TokenAmount::from(500_000u64))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RelayError::GasFree(GasFreeError::InvalidAddress(_))
        ));
        assert!(ledger.transfers.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn activation_stops_when_user_cannot_cover_shortfall() {
        let flow = flow(FakeRelay::new(false, 0));
        let ledger = FakeLedger::default().with_balance(flow.user(), 1_000);
        let err = flow
            .activate(&ledger, TokenAmount::from(500_000u64))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Ledger { .. }));
        assert!(flow.relay().submitted.lock().unwrap().is_empty());
    }
}
