use crate::domain::entities::account::{BalanceResponse, TradeBalanceResponse};
use crate::domain::entities::market::{
    AssetPairsResponse, AssetsResponse, DepthResponse, TickerResponse, TimeResponse,
};
use crate::domain::entities::orders::{ClosedOrdersResponse, OpenOrdersResponse};
use crate::domain::errors::KrakenResult;
use crate::domain::services::envelope::decode_payload;
use serde_json::Value;

/// Result of a generic call, typed for the methods with a fixed shape
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Time(TimeResponse),
    Assets(AssetsResponse),
    AssetPairs(AssetPairsResponse),
    Ticker(TickerResponse),
    Depth(DepthResponse),
    Balance(BalanceResponse),
    TradeBalance(TradeBalanceResponse),
    OpenOrders(OpenOrdersResponse),
    ClosedOrders(ClosedOrdersResponse),
    /// Any other registered method, left as JSON
    Raw { method: String, value: Value },
}

impl QueryResult {
    pub fn from_payload(method: &str, payload: Value) -> KrakenResult<Self> {
        Ok(match method {
            "Time" => QueryResult::Time(decode_payload(payload)?),
            "Assets" => QueryResult::Assets(decode_payload(payload)?),
            "AssetPairs" => QueryResult::AssetPairs(decode_payload(payload)?),
            "Ticker" => QueryResult::Ticker(decode_payload(payload)?),
            "Depth" => QueryResult::Depth(decode_payload(payload)?),
            "Balance" => QueryResult::Balance(decode_payload(payload)?),
            "TradeBalance" => QueryResult::TradeBalance(decode_payload(payload)?),
            "OpenOrders" => QueryResult::OpenOrders(decode_payload(payload)?),
            "ClosedOrders" => QueryResult::ClosedOrders(decode_payload(payload)?),
            _ => QueryResult::Raw {
                method: method.to_string(),
                value: payload,
            },
        })
    }

    pub fn method(&self) -> &str {
        match self {
            QueryResult::Time(_) => "Time",
            QueryResult::Assets(_) => "Assets",
            QueryResult::AssetPairs(_) => "AssetPairs",
            QueryResult::Ticker(_) => "Ticker",
            QueryResult::Depth(_) => "Depth",
            QueryResult::Balance(_) => "Balance",
            QueryResult::TradeBalance(_) => "TradeBalance",
            QueryResult::OpenOrders(_) => "OpenOrders",
            QueryResult::ClosedOrders(_) => "ClosedOrders",
            QueryResult::Raw { method, .. } => method,
        }
    }
}
