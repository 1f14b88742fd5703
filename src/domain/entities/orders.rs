use crate::domain::value_objects::amount::Amount;
use crate::domain::value_objects::order::{Direction, OrderStatus, OrderType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Human-readable order summary nested in every order record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDescription {
    pub pair: String,
    #[serde(rename = "type")]
    pub direction: Direction,
    #[serde(rename = "ordertype")]
    pub order_type: OrderType,
    pub price: Amount,
    pub price2: Amount,
    pub leverage: String,
    pub order: String,
    #[serde(default)]
    pub close: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderInfo {
    #[serde(rename = "refid", default)]
    pub ref_id: Option<String>,
    #[serde(rename = "userref", default)]
    pub user_ref: Option<i64>,
    pub status: OrderStatus,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(rename = "opentm")]
    pub open_time: f64,
    #[serde(rename = "closetm", default, skip_serializing_if = "Option::is_none")]
    pub close_time: Option<f64>,
    #[serde(rename = "starttm", default)]
    pub start_time: f64,
    #[serde(rename = "expiretm", default)]
    pub expire_time: f64,
    #[serde(rename = "descr")]
    pub description: OrderDescription,
    #[serde(rename = "vol")]
    pub volume: Amount,
    #[serde(rename = "vol_exec")]
    pub volume_executed: Amount,
    pub cost: Amount,
    pub fee: Amount,
    pub price: Amount,
    #[serde(rename = "stopprice", default, skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<Amount>,
    #[serde(rename = "limitprice", default, skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<Amount>,
    #[serde(default)]
    pub misc: String,
    #[serde(rename = "oflags", default)]
    pub order_flags: String,
    /// Only present when the request asked for trades
    #[serde(rename = "trades", default, skip_serializing_if = "Vec::is_empty")]
    pub trade_ids: Vec<String>,
}

impl OrderInfo {
    pub fn is_fully_executed(&self) -> bool {
        self.volume_executed.value() >= self.volume.value()
    }
}

/// Result of `OpenOrders`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenOrdersResponse {
    pub open: HashMap<String, OrderInfo>,
}

/// Result of `ClosedOrders`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedOrdersResponse {
    pub closed: HashMap<String, OrderInfo>,
    pub count: u64,
}

/// Result of `QueryOrders`, keyed by transaction id
pub type QueryOrdersResponse = HashMap<String, OrderInfo>;

/// Result of `AddOrder`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOrderResponse {
    #[serde(rename = "descr")]
    pub description: AddOrderDescription,
    /// Empty when the order was only validated
    #[serde(rename = "txid", default)]
    pub transaction_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOrderDescription {
    pub order: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close: Option<String>,
}

/// Result of `CancelOrder`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelOrderResponse {
    pub count: u64,
    #[serde(default)]
    pub pending: bool,
}

/// One of the account's own fills
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeHistoryInfo {
    #[serde(rename = "ordertxid")]
    pub order_txid: String,
    #[serde(rename = "postxid", default, skip_serializing_if = "Option::is_none")]
    pub position_txid: Option<String>,
    pub pair: String,
    pub time: f64,
    #[serde(rename = "type")]
    pub direction: Direction,
    #[serde(rename = "ordertype")]
    pub order_type: OrderType,
    pub price: Amount,
    pub cost: Amount,
    pub fee: Amount,
    #[serde(rename = "vol")]
    pub volume: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<Amount>,
    #[serde(default)]
    pub misc: String,
    #[serde(rename = "posstatus", default, skip_serializing_if = "Option::is_none")]
    pub position_status: Option<String>,
}

/// Result of `TradesHistory`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradesHistoryResponse {
    pub trades: HashMap<String, TradeHistoryInfo>,
    pub count: u64,
}

/// Result of `QueryTrades`, keyed by trade id
pub type QueryTradesResponse = HashMap<String, TradeHistoryInfo>;

/// Open margin position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionInfo {
    #[serde(rename = "ordertxid")]
    pub order_txid: String,
    #[serde(rename = "posstatus")]
    pub position_status: String,
    pub pair: String,
    pub time: f64,
    #[serde(rename = "type")]
    pub direction: Direction,
    #[serde(rename = "ordertype")]
    pub order_type: OrderType,
    pub cost: Amount,
    pub fee: Amount,
    #[serde(rename = "vol")]
    pub volume: Amount,
    #[serde(rename = "vol_closed")]
    pub volume_closed: Amount,
    pub margin: Amount,
    /// Only with `docalcs=true`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net: Option<Amount>,
    #[serde(default)]
    pub terms: String,
    #[serde(rename = "rollovertm", default)]
    pub rollover_time: String,
    #[serde(default)]
    pub misc: String,
    #[serde(rename = "oflags", default)]
    pub order_flags: String,
}

/// Result of `OpenPositions`, keyed by position id
pub type OpenPositionsResponse = HashMap<String, PositionInfo>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn closed_order_payload() -> serde_json::Value {
        json!({
            "closed": {
                "AAAAAA-BBBBB-CCCCCC": {
                    "refid": null,
                    "userref": 1000000000,
                    "status": "closed",
                    "reason": null,
                    "opentm": 1000000000.5194,
                    "closetm": 1000000000.5288,
                    "starttm": 0,
                    "expiretm": 1200000000,
                    "descr": {
                        "pair": "ETHEUR",
                        "type": "sell",
                        "ordertype": "market",
                        "price": "0",
                        "price2": "0",
                        "leverage": "none",
                        "order": "sell 0.02000000 ETHEUR @ market",
                        "close": ""
                    },
                    "vol": "0.02000000",
                    "vol_exec": "0.02000000",
                    "cost": "2.95",
                    "fee": "0",
                    "price": "147.55",
                    "stopprice": "0.00000",
                    "limitprice": "0.00000",
                    "misc": "",
                    "oflags": "fciq",
                    "trades": ["DDDDDD-EEEEE-FFFFFF"]
                }
            },
            "count": 1
        })
    }

    #[test]
    fn test_closed_order_decodes() {
        let closed: ClosedOrdersResponse = serde_json::from_value(closed_order_payload()).unwrap();
        assert_eq!(closed.count, 1);

        let order = &closed.closed["AAAAAA-BBBBB-CCCCCC"];
        assert_eq!(order.trade_ids, vec!["DDDDDD-EEEEE-FFFFFF".to_string()]);
        assert_eq!(order.status, OrderStatus::Closed);
        assert_eq!(order.ref_id, None);
        assert_eq!(order.description.direction, Direction::Sell);
        assert_eq!(order.description.order_type, OrderType::Market);
        assert_eq!(order.close_time, Some(1000000000.5288));
        assert!(order.is_fully_executed());
    }

    #[test]
    fn test_open_order_without_trades_or_close_time() {
        let open: OpenOrdersResponse = serde_json::from_value(json!({
            "open": {
                "OQCLML-BW3P3-BUCMWZ": {
                    "refid": null,
                    "userref": 0,
                    "status": "open",
                    "opentm": 1688666559.8974,
                    "starttm": 0,
                    "expiretm": 0,
                    "descr": {
                        "pair": "XBTUSD",
                        "type": "buy",
                        "ordertype": "limit",
                        "price": "30010.0",
                        "price2": "0",
                        "leverage": "none",
                        "order": "buy 1.25000000 XBTUSD @ limit 30010.0",
                        "close": ""
                    },
                    "vol": "1.25000000",
                    "vol_exec": "0.37500000",
                    "cost": "11253.7",
                    "fee": "0.00000",
                    "price": "30010.0",
                    "misc": "",
                    "oflags": "fciq"
                }
            }
        }))
        .unwrap();

        let order = &open.open["OQCLML-BW3P3-BUCMWZ"];
        assert!(order.trade_ids.is_empty());
        assert_eq!(order.close_time, None);
        assert!(!order.is_fully_executed());
    }

    #[test]
    fn test_add_order_validate_only_has_no_txid() {
        let response: AddOrderResponse = serde_json::from_value(json!({
            "descr": {"order": "buy 1.25000000 XBTUSD @ limit 27500.0"}
        }))
        .unwrap();
        assert!(response.transaction_ids.is_empty());
        assert_eq!(response.description.close, None);
    }

    #[test]
    fn test_cancel_order_response() {
        let response: CancelOrderResponse =
            serde_json::from_value(json!({"count": 1})).unwrap();
        assert_eq!(response.count, 1);
        assert!(!response.pending);
    }

    #[test]
    fn test_trades_history_response() {
        let history: TradesHistoryResponse = serde_json::from_value(json!({
            "trades": {
                "THVRQM-33VKH-UCI7BS": {
                    "ordertxid": "OQCLML-BW3P3-BUCMWZ",
                    "postxid": "TKH2SE-M7IF5-CFI7LT",
                    "pair": "XXBTZUSD",
                    "time": 1688667796.8802,
                    "type": "buy",
                    "ordertype": "limit",
                    "price": "30010.00000",
                    "cost": "600.20000",
                    "fee": "0.00000",
                    "vol": "0.02000000",
                    "margin": "0.00000",
                    "misc": ""
                }
            },
            "count": 1
        }))
        .unwrap();
        let trade = &history.trades["THVRQM-33VKH-UCI7BS"];
        assert_eq!(trade.direction, Direction::Buy);
        assert_eq!(trade.order_type, OrderType::Limit);
        assert_eq!(trade.volume.value(), 0.02);
    }
}
