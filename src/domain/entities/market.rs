use crate::domain::errors::DecodeError;
use crate::domain::value_objects::amount::Amount;
use crate::domain::value_objects::positional::{deserialize_positional, Positional};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;

/// Result of `Time`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeResponse {
    pub unixtime: i64,
    pub rfc1123: String,
}

impl TimeResponse {
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.unixtime, 0)
    }
}

/// Result of `Assets`, keyed by asset name (`XXBT`, `ZEUR`, ...)
pub type AssetsResponse = HashMap<String, AssetInfo>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetInfo {
    #[serde(rename = "altname")]
    pub alt_name: String,
    #[serde(rename = "aclass")]
    pub asset_class: String,
    pub decimals: u32,
    pub display_decimals: u32,
}

/// Result of `AssetPairs`, keyed by pair name. New listings need no code change.
pub type AssetPairsResponse = HashMap<String, AssetPairInfo>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetPairInfo {
    #[serde(rename = "altname")]
    pub alt_name: String,
    #[serde(rename = "wsname", default, skip_serializing_if = "Option::is_none")]
    pub ws_name: Option<String>,
    #[serde(rename = "aclass_base")]
    pub base_asset_class: String,
    pub base: String,
    #[serde(rename = "aclass_quote")]
    pub quote_asset_class: String,
    pub quote: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lot: Option<String>,
    pub pair_decimals: u32,
    pub lot_decimals: u32,
    pub lot_multiplier: u32,
    #[serde(default)]
    pub leverage_buy: Vec<u32>,
    #[serde(default)]
    pub leverage_sell: Vec<u32>,
    #[serde(rename = "fees", default)]
    pub taker_fees: Vec<FeeTier>,
    #[serde(rename = "fees_maker", default)]
    pub maker_fees: Vec<FeeTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_volume_currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_call: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_stop: Option<u32>,
    #[serde(rename = "ordermin", default, skip_serializing_if = "Option::is_none")]
    pub order_min: Option<Amount>,
}

/// `[volume, percent fee]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeTier {
    pub volume: Amount,
    pub percent: Amount,
}

impl TryFrom<&[Value]> for FeeTier {
    type Error = DecodeError;

    fn try_from(items: &[Value]) -> Result<Self, Self::Error> {
        let row = Positional::new("fee tier", items, 2)?;
        Ok(Self {
            volume: row.amount(0)?,
            percent: row.amount(1)?,
        })
    }
}

impl<'de> Deserialize<'de> for FeeTier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_positional(deserializer, |items| FeeTier::try_from(items))
    }
}

impl Serialize for FeeTier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.volume.value(), self.percent.value()).serialize(serializer)
    }
}

/// Result of `Ticker`, keyed by pair name
pub type TickerResponse = HashMap<String, TickerInfo>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerInfo {
    #[serde(rename = "a")]
    pub ask: BookLevel,
    #[serde(rename = "b")]
    pub bid: BookLevel,
    #[serde(rename = "c")]
    pub last_trade: LastTrade,
    #[serde(rename = "v")]
    pub volume: Window<Amount>,
    #[serde(rename = "p")]
    pub volume_weighted_average: Window<Amount>,
    #[serde(rename = "t")]
    pub trade_count: Window<i64>,
    #[serde(rename = "l")]
    pub low: Window<Amount>,
    #[serde(rename = "h")]
    pub high: Window<Amount>,
    #[serde(rename = "o")]
    pub opening_price: Amount,
}

/// `[price, whole lot volume, lot volume]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BookLevel {
    pub price: Amount,
    pub whole_lot_volume: i64,
    pub lot_volume: Amount,
}

impl TryFrom<&[Value]> for BookLevel {
    type Error = DecodeError;

    fn try_from(items: &[Value]) -> Result<Self, Self::Error> {
        let row = Positional::new("ticker book level", items, 3)?;
        Ok(Self {
            price: row.amount(0)?,
            whole_lot_volume: row.integer(1)?,
            lot_volume: row.amount(2)?,
        })
    }
}

impl<'de> Deserialize<'de> for BookLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_positional(deserializer, |items| BookLevel::try_from(items))
    }
}

impl Serialize for BookLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (
            self.price,
            self.whole_lot_volume.to_string(),
            self.lot_volume,
        )
            .serialize(serializer)
    }
}

/// `[price, lot volume]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LastTrade {
    pub price: Amount,
    pub lot_volume: Amount,
}

impl TryFrom<&[Value]> for LastTrade {
    type Error = DecodeError;

    fn try_from(items: &[Value]) -> Result<Self, Self::Error> {
        let row = Positional::new("ticker last trade", items, 2)?;
        Ok(Self {
            price: row.amount(0)?,
            lot_volume: row.amount(1)?,
        })
    }
}

impl<'de> Deserialize<'de> for LastTrade {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_positional(deserializer, |items| LastTrade::try_from(items))
    }
}

impl Serialize for LastTrade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.price, self.lot_volume).serialize(serializer)
    }
}

/// `[today, last 24 hours]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window<T> {
    pub today: T,
    pub last_24h: T,
}

impl TryFrom<&[Value]> for Window<Amount> {
    type Error = DecodeError;

    fn try_from(items: &[Value]) -> Result<Self, Self::Error> {
        let row = Positional::new("ticker window", items, 2)?;
        Ok(Self {
            today: row.amount(0)?,
            last_24h: row.amount(1)?,
        })
    }
}

impl TryFrom<&[Value]> for Window<i64> {
    type Error = DecodeError;

    fn try_from(items: &[Value]) -> Result<Self, Self::Error> {
        let row = Positional::new("ticker trade count", items, 2)?;
        Ok(Self {
            today: row.integer(0)?,
            last_24h: row.integer(1)?,
        })
    }
}

impl<'de, T> Deserialize<'de> for Window<T>
where
    for<'a> Window<T>: TryFrom<&'a [Value], Error = DecodeError>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_positional(deserializer, |items| Window::<T>::try_from(items))
    }
}

impl<T: Serialize> Serialize for Window<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.today, &self.last_24h).serialize(serializer)
    }
}

/// Result of `Depth`, keyed by pair name
pub type DepthResponse = HashMap<String, OrderBook>;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderBook {
    #[serde(default)]
    pub asks: Vec<OrderBookEntry>,
    #[serde(default)]
    pub bids: Vec<OrderBookEntry>,
}

impl OrderBook {
    pub fn best_ask(&self) -> Option<&OrderBookEntry> {
        self.asks.first()
    }

    pub fn best_bid(&self) -> Option<&OrderBookEntry> {
        self.bids.first()
    }
}

/// `[price, volume, timestamp]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderBookEntry {
    pub price: Amount,
    pub volume: Amount,
    pub timestamp: i64,
}

impl TryFrom<&[Value]> for OrderBookEntry {
    type Error = DecodeError;

    fn try_from(items: &[Value]) -> Result<Self, Self::Error> {
        let row = Positional::new("order book entry", items, 3)?;
        Ok(Self {
            price: row.amount(0)?,
            volume: row.amount(1)?,
            timestamp: row.integer(2)?,
        })
    }
}

impl<'de> Deserialize<'de> for OrderBookEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_positional(deserializer, |items| OrderBookEntry::try_from(items))
    }
}

impl Serialize for OrderBookEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.price, self.volume, self.timestamp).serialize(serializer)
    }
}
