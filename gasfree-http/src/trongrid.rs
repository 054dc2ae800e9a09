//! A [`LedgerClient`] backed by a TronGrid full-node HTTP API.
//!
//! Only the calls activation needs are covered:
//!
//! - `POST /wallet/triggerconstantcontract` to read `balanceOf(address)`
//! - `POST /wallet/triggersmartcontract` to build `transfer(address,uint256)`,
//!   followed by signing the transaction id locally and
//!   `POST /wallet/broadcasttransaction`
//! - `POST /wallet/gettransactioninfobyid` to check inclusion
//!
//! All requests use `visible: true`, so addresses travel in Base58Check form.

use alloy_primitives::{B256, U256, hex};
use gasfree::ledger::{LedgerClient, TxOutcome};
use gasfree::{NetworkConfig, TokenAmount, TronAddress};
use gasfree_tron::AuthorizationSigner;
use gasfree_tron::hash::{address_word, uint_word};
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use url::Url;

use crate::error::RelayError;

/// Header carrying the optional TronGrid API key.
pub const API_KEY_HEADER: &str = "TRON-PRO-API-KEY";

/// Energy budget attached to token transfers, in sun (100 TRX).
pub const DEFAULT_FEE_LIMIT: u64 = 100_000_000;

const BALANCE_OF: &str = "balanceOf(address)";
const TRANSFER: &str = "transfer(address,uint256)";

/// `result` object of contract trigger responses.
#[derive(Debug, Default, serde::Deserialize)]
struct CallResult {
    #[serde(default)]
    result: bool,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl CallResult {
    fn describe(&self) -> String {
        let message = self.message.as_deref().map(decode_node_message);
        match (self.code.as_deref(), message) {
            (Some(code), Some(message)) => format!("{code}: {message}"),
            (Some(code), None) => code.to_owned(),
            (None, Some(message)) => message,
            (None, None) => "node returned no result".to_owned(),
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct ConstantCallResponse {
    #[serde(default)]
    result: CallResult,
    #[serde(default)]
    constant_result: Vec<String>,
}

#[derive(Debug, serde::Deserialize)]
struct TriggerResponse {
    #[serde(default)]
    result: CallResult,
    #[serde(default)]
    transaction: Option<Value>,
}

#[derive(Debug, serde::Deserialize)]
struct BroadcastResponse {
    #[serde(default)]
    result: bool,
    #[serde(default)]
    txid: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct TransactionInfo {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    receipt: Option<Receipt>,
    #[serde(default)]
    result: Option<String>,
    #[serde(default, rename = "resMessage")]
    res_message: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct Receipt {
    #[serde(default)]
    result: Option<String>,
}

/// TronGrid messages are usually hex-encoded UTF-8; anything else is passed through.
fn decode_node_message(message: &str) -> String {
    hex::decode(message)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| message.to_owned())
}

/// Async TronGrid client.
///
/// Reads need no credentials. [`LedgerClient::transfer_token`] signs with
/// the key set through [`Self::with_signer`].
pub struct TronGridClient {
    base_url: Url,
    client: Client,
    api_key: Option<String>,
    signer: Option<AuthorizationSigner>,
    fee_limit: u64,
}

impl TronGridClient {
    /// Creates a client for the node at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::UrlParse`] for an invalid URL.
    pub fn new(base_url: &str) -> Result<Self, RelayError> {
        let mut normalized = base_url.trim_end_matches('/').to_owned();
        normalized.push('/');
        let base_url = Url::parse(&normalized).map_err(|source| RelayError::UrlParse {
            context: "Failed to parse ledger base url",
            source,
        })?;
        Ok(Self {
            base_url,
            client: Client::new(),
            api_key: None,
            signer: None,
            fee_limit: DEFAULT_FEE_LIMIT,
        })
    }

    /// Creates a client for the public TronGrid node of a built-in deployment.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::UrlParse`] if the built-in URL does not parse.
    pub fn for_network(network: &NetworkConfig) -> Result<Self, RelayError> {
        Self::new(network.ledger_base_url)
    }

    /// Sends `TRON-PRO-API-KEY` with every request.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the key that signs outgoing transfers.
    #[must_use]
    pub fn with_signer(mut self, signer: AuthorizationSigner) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Sets a pre-configured reqwest client.
    #[must_use]
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Overrides the energy fee limit of outgoing transfers, in sun.
    #[must_use]
    pub const fn with_fee_limit(mut self, fee_limit: u64) -> Self {
        self.fee_limit = fee_limit;
        self
    }

    /// Returns the address that sends transfers, if a signer is configured.
    #[must_use]
    pub fn sender(&self) -> Option<TronAddress> {
        self.signer.as_ref().map(AuthorizationSigner::address)
    }

    /// Generic POST helper that handles JSON serialization and error mapping.
    ///
    /// `context` is a human-readable identifier used in tracing and error messages
    /// (e.g. `"POST /wallet/gettransactioninfobyid"`).
    async fn post_json<T, R>(
        &self,
        path: &str,
        context: &'static str,
        payload: &T,
    ) -> Result<R, RelayError>
    where
        T: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let url = self
            .base_url
            .join(path)
            .map_err(|source| RelayError::UrlParse { context, source })?;
        let mut req = self.client.post(url).json(payload);
        if let Some(api_key) = &self.api_key {
            req = req.header(API_KEY_HEADER, api_key);
        }
        let http_response = req
            .send()
            .await
            .map_err(|source| RelayError::Http { context, source })?;

        let status = http_response.status();
        let body = http_response
            .text()
            .await
            .map_err(|source| RelayError::ResponseBodyRead { context, source })?;
        if !status.is_success() {
            return Err(RelayError::HttpStatus {
                context,
                status,
                body,
            });
        }
        serde_json::from_str(&body)
            .map_err(|source| RelayError::JsonDeserialization { context, source })
    }

    /// Signs a node-built transaction after checking that its id hashes its raw data.
    fn sign_transaction(
        signer: &AuthorizationSigner,
        mut transaction: Value,
    ) -> Result<(B256, Value), RelayError> {
        const CONTEXT: &str = "sign transaction";
        let tx_id = transaction
            .get("txID")
            .and_then(Value::as_str)
            .ok_or_else(|| RelayError::ledger(CONTEXT, "transaction has no txID"))?
            .parse::<B256>()
            .map_err(|e| RelayError::ledger(CONTEXT, format!("malformed txID: {e}")))?;
        let raw_data = transaction
            .get("raw_data_hex")
            .and_then(Value::as_str)
            .ok_or_else(|| RelayError::ledger(CONTEXT, "transaction has no raw_data_hex"))?;
        let raw_data = hex::decode(raw_data)
            .map_err(|e| RelayError::ledger(CONTEXT, format!("malformed raw_data_hex: {e}")))?;
        if B256::from_slice(&Sha256::digest(&raw_data)) != tx_id {
            return Err(RelayError::ledger(
                CONTEXT,
                "txID does not match the hash of raw_data_hex",
            ));
        }

        let signature = signer.sign_digest(&tx_id)?;
        match transaction.as_object_mut() {
            Some(object) => {
                object.insert("signature".to_owned(), json!([signature.to_hex()]));
                Ok((tx_id, transaction))
            }
            None => Err(RelayError::ledger(CONTEXT, "transaction is not an object")),
        }
    }
}

impl std::fmt::Debug for TronGridClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TronGridClient")
            .field("base_url", &self.base_url.as_str())
            .field("has_api_key", &self.api_key.is_some())
            .field("sender", &self.sender())
            .field("fee_limit", &self.fee_limit)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl LedgerClient for TronGridClient {
    type Error = RelayError;

    async fn token_balance(
        &self,
        token: &TronAddress,
        owner: &TronAddress,
    ) -> Result<TokenAmount, RelayError> {
        const CONTEXT: &str = "POST /wallet/triggerconstantcontract";
        let body = json!({
            "owner_address": owner.to_base58(),
            "contract_address": token.to_base58(),
            "function_selector": BALANCE_OF,
            "parameter": hex::encode(address_word(owner)),
            "visible": true,
        });
        let response: ConstantCallResponse = self
            .post_json("wallet/triggerconstantcontract", CONTEXT, &body)
            .await?;
        let word = response
            .constant_result
            .first()
            .ok_or_else(|| RelayError::ledger(CONTEXT, response.result.describe()))?;
        let bytes = hex::decode(word)
            .map_err(|e| RelayError::ledger(CONTEXT, format!("malformed constant_result: {e}")))?;
        if bytes.len() != 32 {
            return Err(RelayError::ledger(
                CONTEXT,
                format!("expected a 32-byte word, got {} bytes", bytes.len()),
            ));
        }
        Ok(TokenAmount::new(U256::from_be_slice(&bytes)))
    }

    async fn transfer_token(
        &self,
        token: &TronAddress,
        to: &TronAddress,
        amount: TokenAmount,
    ) -> Result<String, RelayError> {
        const CONTEXT: &str = "POST /wallet/triggersmartcontract";
        const BROADCAST: &str = "POST /wallet/broadcasttransaction";
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| RelayError::ledger(CONTEXT, "no signing key configured"))?;

        let mut parameter = hex::encode(address_word(to));
        parameter.push_str(&hex::encode(uint_word(amount.as_u256())));
        let body = json!({
            "owner_address": signer.address().to_base58(),
            "contract_address": token.to_base58(),
            "function_selector": TRANSFER,
            "parameter": parameter,
            "fee_limit": self.fee_limit,
            "call_value": 0,
            "visible": true,
        });
        let response: TriggerResponse = self
            .post_json("wallet/triggersmartcontract", CONTEXT, &body)
            .await?;
        let transaction = match response.transaction {
            Some(transaction) if response.result.result => transaction,
            _ => return Err(RelayError::ledger(CONTEXT, response.result.describe())),
        };

        let (tx_id, signed) = Self::sign_transaction(signer, transaction)?;
        #[cfg(feature = "telemetry")]
        tracing::info!(
            from = %signer.address(),
            to = %to,
            %amount,
            tx_id = %hex::encode(tx_id),
            "broadcasting token transfer"
        );

        let broadcast: BroadcastResponse = self
            .post_json("wallet/broadcasttransaction", BROADCAST, &signed)
            .await?;
        if !broadcast.result {
            let code = broadcast.code.unwrap_or_else(|| "UNKNOWN".to_owned());
            let message = broadcast
                .message
                .as_deref()
                .map(decode_node_message)
                .unwrap_or_default();
            return Err(RelayError::ledger(BROADCAST, format!("{code}: {message}")));
        }
        Ok(broadcast.txid.unwrap_or_else(|| hex::encode(tx_id)))
    }

    async fn transaction_outcome(&self, tx_id: &str) -> Result<Option<TxOutcome>, RelayError> {
        const CONTEXT: &str = "POST /wallet/gettransactioninfobyid";
        let info: TransactionInfo = self
            .post_json(
                "wallet/gettransactioninfobyid",
                CONTEXT,
                &json!({ "value": tx_id }),
            )
            .await?;
        if info.id.is_none() {
            return Ok(None);
        }
        let outcome = match (info.receipt, info.result.as_deref()) {
            (_, Some("FAILED")) => Some(TxOutcome::Failed(
                info.res_message
                    .as_deref()
                    .map_or_else(|| "FAILED".to_owned(), decode_node_message),
            )),
            (Some(Receipt { result: Some(result) }), _) if result == "SUCCESS" => {
                Some(TxOutcome::Success)
            }
            (Some(Receipt { result: Some(result) }), _) => Some(TxOutcome::Failed(result)),
            (Some(Receipt { result: None }), _) => {
                Some(TxOutcome::Failed("UNKNOWN".to_owned()))
            }
            (None, _) => None,
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gasfree_tron::TransferSignature;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    const RAW_DATA_HEX: &str = "0a02abcd2208d1e0bd3b5e3f7c2c40b0f5e6c3c6325a";
    const TX_ID: &str = "27f348de3dda0b73d90930df6e1f4bfd1071100301cc8e4a5354bbaa35c42585";

    fn user() -> TronAddress {
        "TE2H9hWjzYdwzDFRJfx9BFhr4MmjH1CHaz".parse().unwrap()
    }

    fn ledger(server: &MockServer) -> TronGridClient {
        TronGridClient::new(&server.uri())
            .unwrap()
            .with_signer(AuthorizationSigner::from_hex(KEY).unwrap())
    }

    #[tokio::test]
    async fn balance_is_read_from_constant_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wallet/triggerconstantcontract"))
            .and(header(API_KEY_HEADER, "grid-key"))
            .and(body_partial_json(json!({
                "owner_address": "TE2H9hWjzYdwzDFRJfx9BFhr4MmjH1CHaz",
                "function_selector": "balanceOf(address)",
                "parameter": "0000000000000000000000002c7536e3605d9c16a7a3d7b1898e529396a65c23",
                "visible": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": { "result": true },
                "energy_used": 935,
                "constant_result": [
                    "00000000000000000000000000000000000000000000000000000000002dc6c0"
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ledger(&server).with_api_key("grid-key");
        let balance = client
            .token_balance(&NetworkConfig::nile().usdt, &user())
            .await
            .unwrap();
        assert_eq!(balance, TokenAmount::from(3_000_000u64));
    }

    #[tokio::test]
    async fn failed_constant_call_surfaces_node_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wallet/triggerconstantcontract"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {
                    "code": "CONTRACT_EXE_ERROR",
                    "message": "524556455254206f70636f6465206578656375746564"
                }
            })))
            .mount(&server)
            .await;

        let err = ledger(&server)
            .token_balance(&NetworkConfig::nile().usdt, &user())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Ledger error: POST /wallet/triggerconstantcontract: CONTRACT_EXE_ERROR: REVERT opcode executed"
        );
    }

    #[tokio::test]
    async fn transfer_signs_txid_and_broadcasts() {
        let server = MockServer::start().await;
        let to: TronAddress = "TJv3Y5oXxMjtWqmTWwWLHqbpAj63s52417".parse().unwrap();
        let amount = TokenAmount::from(2_550_000u64);
        let parameter = format!(
            "{}{}",
            hex::encode(to.into_word()),
            hex::encode(uint_word(amount.as_u256()))
        );

        Mock::given(method("POST"))
            .and(path("/wallet/triggersmartcontract"))
            .and(body_partial_json(json!({
                "owner_address": "TE2H9hWjzYdwzDFRJfx9BFhr4MmjH1CHaz",
                "function_selector": "transfer(address,uint256)",
                "parameter": parameter,
                "fee_limit": 100_000_000,
                "call_value": 0
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": { "result": true },
                "transaction": {
                    "visible": true,
                    "txID": TX_ID,
                    "raw_data": { "ref_block_bytes": "abcd" },
                    "raw_data_hex": RAW_DATA_HEX
                }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/wallet/broadcasttransaction"))
            .and(body_partial_json(json!({
                "txID": TX_ID,
                "raw_data": { "ref_block_bytes": "abcd" }
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "result": true, "txid": TX_ID })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = ledger(&server);
        let tx_id = client
            .transfer_token(&NetworkConfig::nile().usdt, &to, amount)
            .await
            .unwrap();
        assert_eq!(tx_id, TX_ID);

        let requests = server.received_requests().await.unwrap();
        let broadcast: Value = serde_json::from_slice(&requests[1].body).unwrap();
        let signature = TransferSignature::from_hex(broadcast["signature"][0].as_str().unwrap())
            .unwrap();
        let digest: B256 = TX_ID.parse().unwrap();
        assert_eq!(signature.recover(&digest).unwrap(), user());
    }

    #[tokio::test]
    async fn mismatched_txid_is_never_broadcast() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wallet/triggersmartcontract"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": { "result": true },
                "transaction": {
                    "txID": "00".repeat(32),
                    "raw_data": {},
                    "raw_data_hex": RAW_DATA_HEX
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/wallet/broadcasttransaction"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = ledger(&server)
            .transfer_token(&NetworkConfig::nile().usdt, &user(), TokenAmount::from(1u64))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Ledger { .. }));
    }

    #[tokio::test]
    async fn transfer_without_signer_fails_before_any_request() {
        let server = MockServer::start().await;
        let client = TronGridClient::new(&server.uri()).unwrap();
        let err = client
            .transfer_token(&NetworkConfig::nile().usdt, &user(), TokenAmount::from(1u64))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Ledger { .. }));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejected_broadcast_reports_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wallet/triggersmartcontract"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": { "result": true },
                "transaction": { "txID": TX_ID, "raw_data": {}, "raw_data_hex": RAW_DATA_HEX }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/wallet/broadcasttransaction"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": "SIGERROR",
                "txid": TX_ID,
                "message": "7369676e6174757265206572726f72"
            })))
            .mount(&server)
            .await;

        let err = ledger(&server)
            .transfer_token(&NetworkConfig::nile().usdt, &user(), TokenAmount::from(1u64))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Ledger error: POST /wallet/broadcasttransaction: SIGERROR: signature error"
        );
    }

    #[tokio::test]
    async fn transaction_outcomes() {
        let server = MockServer::start().await;
        for (id, body) in [
            ("pending", json!({})),
            ("ok", json!({ "id": "ok", "receipt": { "result": "SUCCESS" } })),
            ("reverted", json!({ "id": "reverted", "receipt": { "result": "REVERT" } })),
        ] {
            Mock::given(method("POST"))
                .and(path("/wallet/gettransactioninfobyid"))
                .and(body_partial_json(json!({ "value": id })))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .mount(&server)
                .await;
        }

        let client = ledger(&server);
        assert_eq!(client.transaction_outcome("pending").await.unwrap(), None);
        assert_eq!(
            client.transaction_outcome("ok").await.unwrap(),
            Some(TxOutcome::Success)
        );
        assert_eq!(
            client.transaction_outcome("reverted").await.unwrap(),
            Some(TxOutcome::Failed("REVERT".to_owned()))
        );
    }
}
