//! # Kraken REST API Client
//!
//! Public market data and private account calls over one signed-request pipeline:
//! build (and sign) the request, send it through the retry executor, then decode
//! the `{error, result}` envelope into the method's result type.
//!
//! ## References
//!
//! - API Documentation: https://docs.kraken.com/rest/
//! - Authentication: https://docs.kraken.com/api/docs/guides/spot-rest-auth

use crate::config::{load_dotenv, ClientConfig, MinimumOrderSizes};
use crate::domain::entities::account::{
    BalanceResponse, LedgersResponse, QueryLedgersResponse, TradeBalanceResponse,
    TradeVolumeResponse,
};
use crate::domain::entities::funding::{
    DepositAddressesResponse, DepositMethodsResponse, TransferStatusResponse,
    WebSocketsTokenResponse, WithdrawInfoResponse, WithdrawResponse,
};
use crate::domain::entities::history::{OhlcResponse, SpreadResponse, TradesResponse};
use crate::domain::entities::market::{
    AssetPairsResponse, AssetsResponse, DepthResponse, OrderBook, TickerResponse, TimeResponse,
};
use crate::domain::entities::orders::{
    AddOrderResponse, CancelOrderResponse, ClosedOrdersResponse, OpenOrdersResponse,
    OpenPositionsResponse, QueryOrdersResponse, QueryTradesResponse, TradesHistoryResponse,
};
use crate::domain::entities::query::QueryResult;
use crate::domain::errors::{DecodeError, KrakenError, KrakenResult};
use crate::domain::methods::{self, MethodRegistry, Visibility};
use crate::domain::repositories::http_transport::HttpTransport;
use crate::domain::services::envelope::decode_payload;
use crate::domain::services::nonce::NonceGenerator;
use crate::domain::value_objects::order::{Direction, OrderType};
use crate::domain::value_objects::params::{prepare_params, Params};
use crate::infrastructure::request_builder::RequestBuilder;
use crate::infrastructure::reqwest_transport::ReqwestTransport;
use crate::infrastructure::retry_executor::RetryExecutor;
use crate::secrets::Credentials;
use bigdecimal::BigDecimal;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Optional arguments for a typed operation, by caller-facing name
pub type Args = HashMap<String, String>;

/// Kraken REST client
///
/// `Send + Sync`; share one instance behind an `Arc` to keep nonces ordered
/// across concurrent private calls.
pub struct KrakenClient {
    config: ClientConfig,
    credentials: Option<Credentials>,
    registry: MethodRegistry,
    builder: RequestBuilder,
    nonces: NonceGenerator,
    executor: RetryExecutor,
    minimums: MinimumOrderSizes,
}

impl std::fmt::Debug for KrakenClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KrakenClient")
            .field("config", &self.config)
            .field("credentials", &self.credentials)
            .field("nonces", &self.nonces)
            .finish()
    }
}

impl KrakenClient {
    /// Client for private and public calls against the production endpoint
    pub fn new(api_key: impl Into<String>, secret: &str) -> KrakenResult<Self> {
        Self::new_with_config(ClientConfig::default(), Some(Credentials::new(api_key, secret)))
    }

    /// Client for public market data only
    pub fn new_public() -> KrakenResult<Self> {
        Self::new_with_config(ClientConfig::default(), None)
    }

    /// Configuration and, when both variables are set, credentials from the environment
    ///
    /// A `.env` file in the working directory is loaded first.
    pub fn from_env() -> KrakenResult<Self> {
        if let Err(e) = load_dotenv() {
            warn!("Ignoring unreadable .env file: {}", e);
        }
        let config = ClientConfig::from_env();
        let credentials = match Credentials::from_env() {
            Ok(credentials) => Some(credentials),
            Err(e) => {
                info!("No Kraken credentials loaded ({}), private methods disabled", e);
                None
            }
        };
        Self::new_with_config(config, credentials)
    }

    pub fn new_with_config(config: ClientConfig, credentials: Option<Credentials>) -> KrakenResult<Self> {
        config
            .validate()
            .map_err(|e| KrakenError::Construction(e.to_string()))?;
        let transport = ReqwestTransport::new(config.request_timeout)?;
        Ok(Self::with_transport(config, credentials, Arc::new(transport)))
    }

    /// Client over a caller-supplied transport
    pub fn with_transport(
        config: ClientConfig,
        credentials: Option<Credentials>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            builder: RequestBuilder::from_config(&config),
            executor: RetryExecutor::new(transport, config.retry.clone()),
            config,
            credentials,
            registry: MethodRegistry::default(),
            nonces: NonceGenerator::new(),
            minimums: MinimumOrderSizes::default(),
        }
    }

    pub fn with_registry(mut self, registry: MethodRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_nonce_generator(mut self, nonces: NonceGenerator) -> Self {
        self.nonces = nonces;
        self
    }

    pub fn with_minimum_order_sizes(mut self, minimums: MinimumOrderSizes) -> Self {
        self.minimums = minimums;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    pub fn minimum_order_sizes(&self) -> &MinimumOrderSizes {
        &self.minimums
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Whether `volume` of `asset` clears Kraken's minimum order size
    pub fn meets_minimum_order_size(&self, asset: &str, volume: f64) -> bool {
        self.minimums.meets_minimum(asset, volume)
    }

    async fn public_value(&self, method: &str, params: Params) -> KrakenResult<Value> {
        match self.registry.visibility(method)? {
            Visibility::Public => {}
            Visibility::Private => {
                return Err(KrakenError::Construction(format!(
                    "{} is a private method",
                    method
                )))
            }
        }
        debug!(method, "Calling public method");
        self.executor
            .execute(|| self.builder.public(method, &params))
            .await
    }

    async fn private_value(&self, method: &str, params: &mut Params) -> KrakenResult<Value> {
        match self.registry.visibility(method)? {
            Visibility::Private => {}
            Visibility::Public => {
                return Err(KrakenError::Construction(format!(
                    "{} is a public method",
                    method
                )))
            }
        }
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| KrakenError::MissingCredentials(method.to_string()))?;
        debug!(method, "Calling private method");
        self.executor
            .execute(|| self.builder.private(method, params, credentials, &self.nonces))
            .await
    }

    /// Call a public method and decode its result into `T`
    pub async fn call_public<T: DeserializeOwned>(&self, method: &str, params: Params) -> KrakenResult<T> {
        decode_payload(self.public_value(method, params).await?)
    }

    /// Call a private method and decode its result into `T`
    ///
    /// `params` gains the `nonce` of the last attempt.
    pub async fn call_private<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &mut Params,
    ) -> KrakenResult<T> {
        decode_payload(self.private_value(method, params).await?)
    }

    /// Call any registered method by name, passing `args` through unchanged
    ///
    /// Unknown names fail before any request is sent.
    pub async fn query(&self, method: &str, args: &Args) -> KrakenResult<QueryResult> {
        let mut params: Params = args.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        let payload = match self.registry.visibility(method)? {
            Visibility::Public => self.public_value(method, params).await?,
            Visibility::Private => self.private_value(method, &mut params).await?,
        };
        QueryResult::from_payload(method, payload)
    }

    // Public market data

    pub async fn time(&self) -> KrakenResult<TimeResponse> {
        self.call_public("Time", Params::new()).await
    }

    pub async fn assets(&self, args: &Args) -> KrakenResult<AssetsResponse> {
        let params = prepare_params("Assets", methods::ASSETS_PARAMS, args)?;
        self.call_public("Assets", params).await
    }

    pub async fn asset_pairs(&self, args: &Args) -> KrakenResult<AssetPairsResponse> {
        let params = prepare_params("AssetPairs", methods::ASSET_PAIRS_PARAMS, args)?;
        self.call_public("AssetPairs", params).await
    }

    pub async fn ticker(&self, pairs: &[&str]) -> KrakenResult<TickerResponse> {
        if pairs.is_empty() {
            return Err(KrakenError::Construction(
                "Ticker requires at least one pair".to_string(),
            ));
        }
        let mut params = Params::new();
        params.insert("pair".to_string(), pairs.join(","));
        self.call_public("Ticker", params).await
    }

    pub async fn ohlc(&self, pair: &str) -> KrakenResult<OhlcResponse> {
        let params = Params::from([("pair".to_string(), pair.to_string())]);
        let payload = self.public_value("OHLC", params).await?;
        Ok(OhlcResponse::from_payload(pair, &payload)?)
    }

    /// `interval` in minutes: 1, 5, 15, 30, 60, 240, 1440, 10080 or 21600
    pub async fn ohlc_with_interval(&self, pair: &str, interval: &str) -> KrakenResult<OhlcResponse> {
        let params = Params::from([
            ("pair".to_string(), pair.to_string()),
            ("interval".to_string(), interval.to_string()),
        ]);
        let payload = self.public_value("OHLC", params).await?;
        Ok(OhlcResponse::from_payload(pair, &payload)?)
    }

    /// Order book for one pair, at most `count` levels per side
    pub async fn depth(&self, pair: &str, count: u32) -> KrakenResult<OrderBook> {
        let params = Params::from([
            ("pair".to_string(), pair.to_string()),
            ("count".to_string(), count.to_string()),
        ]);
        let mut books: DepthResponse = self.call_public("Depth", params).await?;

        if let Some(book) = books.remove(pair) {
            return Ok(book);
        }
        // Alias request (`XBTEUR`) answered under the canonical name (`XXBTZEUR`)
        if books.len() == 1 {
            if let Some((_, book)) = books.drain().next() {
                return Ok(book);
            }
        }
        Err(DecodeError::MissingField {
            what: "depth result",
            field: pair.to_string(),
        }
        .into())
    }

    /// Recent trades; `since` of zero or less starts from the oldest available
    pub async fn trades(&self, pair: &str, since: i64) -> KrakenResult<TradesResponse> {
        let mut params = Params::from([("pair".to_string(), pair.to_string())]);
        if since > 0 {
            params.insert("since".to_string(), since.to_string());
        }
        let payload = self.public_value("Trades", params).await?;
        Ok(TradesResponse::from_payload(pair, &payload)?)
    }

    pub async fn spread(&self, pair: &str, since: i64) -> KrakenResult<SpreadResponse> {
        let mut params = Params::from([("pair".to_string(), pair.to_string())]);
        if since > 0 {
            params.insert("since".to_string(), since.to_string());
        }
        let payload = self.public_value("Spread", params).await?;
        Ok(SpreadResponse::from_payload(pair, &payload)?)
    }

    // Private account data

    pub async fn balance(&self) -> KrakenResult<BalanceResponse> {
        self.call_private("Balance", &mut Params::new()).await
    }

    pub async fn trade_balance(&self, args: &Args) -> KrakenResult<TradeBalanceResponse> {
        let mut params = prepare_params("TradeBalance", methods::TRADE_BALANCE_PARAMS, args)?;
        self.call_private("TradeBalance", &mut params).await
    }

    pub async fn open_orders(&self, args: &Args) -> KrakenResult<OpenOrdersResponse> {
        let mut params = prepare_params("OpenOrders", methods::OPEN_ORDERS_PARAMS, args)?;
        self.call_private("OpenOrders", &mut params).await
    }

    pub async fn closed_orders(&self, args: &Args) -> KrakenResult<ClosedOrdersResponse> {
        let mut params = prepare_params("ClosedOrders", methods::CLOSED_ORDERS_PARAMS, args)?;
        self.call_private("ClosedOrders", &mut params).await
    }

    /// `txids`: comma-separated, at most 50
    pub async fn query_orders(&self, txids: &str, args: &Args) -> KrakenResult<QueryOrdersResponse> {
        let mut params = prepare_params("QueryOrders", methods::QUERY_ORDERS_PARAMS, args)?;
        params.insert("txid".to_string(), txids.to_string());
        self.call_private("QueryOrders", &mut params).await
    }

    /// Account fills between two unix timestamps; zero leaves a bound open
    pub async fn trades_history(
        &self,
        start: i64,
        end: i64,
        args: &Args,
    ) -> KrakenResult<TradesHistoryResponse> {
        let mut params = prepare_params("TradesHistory", methods::TRADES_HISTORY_PARAMS, args)?;
        if start > 0 {
            params.insert("start".to_string(), start.to_string());
        }
        if end > 0 {
            params.insert("end".to_string(), end.to_string());
        }
        self.call_private("TradesHistory", &mut params).await
    }

    pub async fn query_trades(&self, txids: &str, args: &Args) -> KrakenResult<QueryTradesResponse> {
        let mut params = prepare_params("QueryTrades", methods::QUERY_TRADES_PARAMS, args)?;
        params.insert("txid".to_string(), txids.to_string());
        self.call_private("QueryTrades", &mut params).await
    }

    /// Open margin positions; an empty `txids` lists all of them
    pub async fn open_positions(&self, txids: &str, args: &Args) -> KrakenResult<OpenPositionsResponse> {
        let mut params = prepare_params("OpenPositions", methods::OPEN_POSITIONS_PARAMS, args)?;
        if !txids.is_empty() {
            params.insert("txid".to_string(), txids.to_string());
        }
        self.call_private("OpenPositions", &mut params).await
    }

    pub async fn ledgers(&self, args: &Args) -> KrakenResult<LedgersResponse> {
        let mut params = prepare_params("Ledgers", methods::LEDGERS_PARAMS, args)?;
        self.call_private("Ledgers", &mut params).await
    }

    /// `ids`: comma-separated ledger ids, at most 20
    pub async fn query_ledgers(&self, ids: &str) -> KrakenResult<QueryLedgersResponse> {
        let mut params = Params::from([("id".to_string(), ids.to_string())]);
        self.call_private("QueryLedgers", &mut params).await
    }

    pub async fn trade_volume(&self, args: &Args) -> KrakenResult<TradeVolumeResponse> {
        let mut params = prepare_params("TradeVolume", methods::TRADE_VOLUME_PARAMS, args)?;
        self.call_private("TradeVolume", &mut params).await
    }

    // Private trading

    /// Place an order; `args` may carry price, leverage, close order and flag settings
    pub async fn add_order(
        &self,
        pair: &str,
        direction: Direction,
        order_type: OrderType,
        volume: &BigDecimal,
        args: &Args,
    ) -> KrakenResult<AddOrderResponse> {
        let mut params = prepare_params("AddOrder", methods::ADD_ORDER_PARAMS, args)?;
        params.insert("pair".to_string(), pair.to_string());
        params.insert("type".to_string(), direction.as_str().to_string());
        params.insert("ordertype".to_string(), order_type.as_str().to_string());
        params.insert("volume".to_string(), volume.to_string());
        info!(pair, %direction, %order_type, %volume, "Placing order");
        self.call_private("AddOrder", &mut params).await
    }

    pub async fn cancel_order(&self, txid: &str) -> KrakenResult<CancelOrderResponse> {
        let mut params = Params::from([("txid".to_string(), txid.to_string())]);
        info!(txid, "Cancelling order");
        self.call_private("CancelOrder", &mut params).await
    }

    // Private funding

    pub async fn deposit_methods(&self, asset: &str) -> KrakenResult<DepositMethodsResponse> {
        let mut params = Params::from([("asset".to_string(), asset.to_string())]);
        self.call_private("DepositMethods", &mut params).await
    }

    pub async fn deposit_addresses(&self, asset: &str, method: &str) -> KrakenResult<DepositAddressesResponse> {
        let mut params = Params::from([
            ("asset".to_string(), asset.to_string()),
            ("method".to_string(), method.to_string()),
        ]);
        self.call_private("DepositAddresses", &mut params).await
    }

    /// Recent deposits; `args` must name the `asset`
    pub async fn deposit_status(&self, args: &Args) -> KrakenResult<TransferStatusResponse> {
        let mut params = prepare_params("DepositStatus", methods::DEPOSIT_STATUS_PARAMS, args)?;
        self.call_private("DepositStatus", &mut params).await
    }

    /// Withdraw `amount` of `asset` to the pre-registered withdrawal `key`
    pub async fn withdraw(&self, asset: &str, key: &str, amount: &BigDecimal) -> KrakenResult<WithdrawResponse> {
        let mut params = withdrawal_params(asset, key, amount);
        info!(asset, %amount, "Requesting withdrawal");
        self.call_private("Withdraw", &mut params).await
    }

    pub async fn withdraw_info(
        &self,
        asset: &str,
        key: &str,
        amount: &BigDecimal,
    ) -> KrakenResult<WithdrawInfoResponse> {
        let mut params = withdrawal_params(asset, key, amount);
        self.call_private("WithdrawInfo", &mut params).await
    }

    /// Recent withdrawals; `args` must name the `asset`
    pub async fn withdraw_status(&self, args: &Args) -> KrakenResult<TransferStatusResponse> {
        let mut params = prepare_params("WithdrawStatus", methods::WITHDRAW_STATUS_PARAMS, args)?;
        self.call_private("WithdrawStatus", &mut params).await
    }

    /// Token for the authenticated WebSocket feeds
    pub async fn get_websockets_token(&self) -> KrakenResult<WebSocketsTokenResponse> {
        self.call_private("GetWebSocketsToken", &mut Params::new()).await
    }
}

fn withdrawal_params(asset: &str, key: &str, amount: &BigDecimal) -> Params {
    Params::from([
        ("asset".to_string(), asset.to_string()),
        ("key".to_string(), key.to_string()),
        ("amount".to_string(), amount.to_string()),
    ])
}
