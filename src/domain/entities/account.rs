use crate::domain::value_objects::amount::Amount;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Result of `Balance`, keyed by asset name
pub type BalanceResponse = HashMap<String, Amount>;

/// Result of `TradeBalance`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeBalanceResponse {
    /// Combined balance of all currencies
    #[serde(rename = "eb")]
    pub equivalent_balance: Amount,
    /// Combined balance of all equity currencies
    #[serde(rename = "tb")]
    pub trade_balance: Amount,
    #[serde(rename = "m")]
    pub margin: Amount,
    /// Unrealized net profit/loss of open positions
    #[serde(rename = "n")]
    pub net_pnl: Amount,
    #[serde(rename = "c")]
    pub cost_basis: Amount,
    #[serde(rename = "v")]
    pub floating_valuation: Amount,
    #[serde(rename = "e")]
    pub equity: Amount,
    #[serde(rename = "mf")]
    pub free_margin: Amount,
    /// Only present with open positions
    #[serde(rename = "ml", default, skip_serializing_if = "Option::is_none")]
    pub margin_level: Option<Amount>,
}

/// Result of `Ledgers`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgersResponse {
    pub ledger: HashMap<String, LedgerEntry>,
    #[serde(default)]
    pub count: u64,
}

/// Result of `QueryLedgers`, keyed by ledger id
pub type QueryLedgersResponse = HashMap<String, LedgerEntry>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(rename = "refid")]
    pub ref_id: String,
    pub time: f64,
    #[serde(rename = "type")]
    pub entry_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(rename = "aclass")]
    pub asset_class: String,
    pub asset: String,
    pub amount: Amount,
    pub fee: Amount,
    pub balance: Amount,
}

/// Result of `TradeVolume`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeVolumeResponse {
    pub currency: String,
    pub volume: Amount,
    /// Taker fees by pair, only with `fee-info`
    #[serde(default)]
    pub fees: HashMap<String, FeeInfo>,
    #[serde(default)]
    pub fees_maker: HashMap<String, FeeInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeInfo {
    pub fee: Amount,
    #[serde(rename = "minfee", default, skip_serializing_if = "Option::is_none")]
    pub min_fee: Option<Amount>,
    #[serde(rename = "maxfee", default, skip_serializing_if = "Option::is_none")]
    pub max_fee: Option<Amount>,
    #[serde(rename = "nextfee", default, skip_serializing_if = "Option::is_none")]
    pub next_fee: Option<Amount>,
    #[serde(rename = "nextvolume", default, skip_serializing_if = "Option::is_none")]
    pub next_volume: Option<Amount>,
    #[serde(rename = "tiervolume", default, skip_serializing_if = "Option::is_none")]
    pub tier_volume: Option<Amount>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_balance_keyed_by_asset() {
        let balance: BalanceResponse = serde_json::from_value(json!({
            "ZEUR": "1000.5000",
            "XXBT": "0.0200000000"
        }))
        .unwrap();
        assert_eq!(balance["ZEUR"].value(), 1000.5);
        assert_eq!(balance["XXBT"].value(), 0.02);
    }

    #[test]
    fn test_trade_balance_without_positions() {
        let tb: TradeBalanceResponse = serde_json::from_value(json!({
            "eb": "1101.3425", "tb": "392.2264", "m": "7.0354", "n": "-10.0232",
            "c": "21.1063", "v": "31.1297", "e": "382.2032", "mf": "375.1678"
        }))
        .unwrap();
        assert_eq!(tb.equity.value(), 382.2032);
        assert_eq!(tb.net_pnl.value(), -10.0232);
        assert!(tb.margin_level.is_none());
    }

    #[test]
    fn test_ledgers_response() {
        let ledgers: LedgersResponse = serde_json::from_value(json!({
            "ledger": {
                "L4UESK-KG3EQ-UFO4T5": {
                    "refid": "TJKLXX-PGMUI-4NTLXU",
                    "time": 1688464484.1787,
                    "type": "trade",
                    "subtype": "",
                    "aclass": "currency",
                    "asset": "ZGBP",
                    "amount": "-24.5000",
                    "fee": "0.0490",
                    "balance": "459567.9171"
                }
            },
            "count": 1
        }))
        .unwrap();
        let entry = &ledgers.ledger["L4UESK-KG3EQ-UFO4T5"];
        assert_eq!(entry.entry_type, "trade");
        assert_eq!(entry.amount.value(), -24.5);
        assert_eq!(ledgers.count, 1);
    }

    #[test]
    fn test_trade_volume_fee_maps_default_empty() {
        let volume: TradeVolumeResponse = serde_json::from_value(json!({
            "currency": "ZUSD",
            "volume": "200709587.4223"
        }))
        .unwrap();
        assert!(volume.fees.is_empty());
        assert!(volume.fees_maker.is_empty());
    }
}
