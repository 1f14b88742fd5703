//! Public market history: OHLC candles, recent trades and spreads
//!
//! These results share one awkward shape: an object holding the requested pair
//! (as a list of tuples) next to a `last` cursor, e.g.
//! `{"XXBTZEUR": [[...], ...], "last": 1616662200}`.

use crate::domain::errors::DecodeError;
use crate::domain::value_objects::amount::Amount;
use crate::domain::value_objects::order::{Direction, ExecutionKind};
use crate::domain::value_objects::positional::{integer_field, Positional};
use serde::{Serialize, Serializer};
use serde_json::Value;

const LAST_FIELD: &str = "last";

/// Rows of the requested pair, falling back to the only non-cursor key
///
/// Kraken answers with its canonical pair name (`XXBTZEUR`) even when the
/// request used an alias (`XBTEUR`).
fn pair_rows<'a>(
    what: &'static str,
    payload: &'a Value,
    pair: &str,
) -> Result<(&'a str, &'a [Value]), DecodeError> {
    let object = payload.as_object().ok_or_else(|| DecodeError::NotAnObject {
        what,
        value: payload.to_string(),
    })?;

    let (key, rows) = match object.get_key_value(pair) {
        Some(entry) => entry,
        None => {
            let mut candidates = object.iter().filter(|(key, _)| key.as_str() != LAST_FIELD);
            match (candidates.next(), candidates.next()) {
                (Some(entry), None) => entry,
                _ => {
                    return Err(DecodeError::MissingField {
                        what,
                        field: pair.to_string(),
                    })
                }
            }
        }
    };

    match rows {
        Value::Array(items) => Ok((key.as_str(), items.as_slice())),
        other => Err(DecodeError::NotAnArray {
            what,
            value: other.to_string(),
        }),
    }
}

/// `[time, open, high, low, close, vwap, volume, count]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ohlc {
    pub time: i64,
    pub open: Amount,
    pub high: Amount,
    pub low: Amount,
    pub close: Amount,
    pub vwap: Amount,
    pub volume: Amount,
    pub count: i64,
}

impl TryFrom<&Value> for Ohlc {
    type Error = DecodeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let row = Positional::from_value("OHLC row", value, 8)?;
        Ok(Self {
            time: row.integer(0)?,
            open: row.amount(1)?,
            high: row.amount(2)?,
            low: row.amount(3)?,
            close: row.amount(4)?,
            vwap: row.amount(5)?,
            volume: row.amount(6)?,
            count: row.integer(7)?,
        })
    }
}

impl Serialize for Ohlc {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (
            self.time,
            self.open,
            self.high,
            self.low,
            self.close,
            self.vwap,
            self.volume,
            self.count,
        )
            .serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OhlcResponse {
    pub pair: String,
    pub candles: Vec<Ohlc>,
    /// Cursor for the next `since` request
    pub last: i64,
}

impl OhlcResponse {
    pub fn from_payload(pair: &str, payload: &Value) -> Result<Self, DecodeError> {
        let (key, rows) = pair_rows("OHLC result", payload, pair)?;
        let candles = rows.iter().map(Ohlc::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            pair: key.to_string(),
            candles,
            last: integer_field("OHLC result", payload, LAST_FIELD)?,
        })
    }
}

/// `[price, volume, time, side, execution, misc, trade id]`
#[derive(Debug, Clone, PartialEq)]
pub struct TradeInfo {
    pub price: Amount,
    pub volume: Amount,
    pub time: f64,
    pub direction: Direction,
    pub execution: ExecutionKind,
    pub misc: String,
    /// Absent from older responses
    pub trade_id: Option<i64>,
}

impl TradeInfo {
    pub fn is_buy(&self) -> bool {
        self.direction == Direction::Buy
    }

    pub fn is_market(&self) -> bool {
        self.execution == ExecutionKind::Market
    }
}

impl TryFrom<&Value> for TradeInfo {
    type Error = DecodeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let row = Positional::from_value("trade", value, 6)?;
        let direction =
            Direction::from_code(row.string(3)?).ok_or_else(|| row.unexpected(3, "'b' or 's'"))?;
        let execution = ExecutionKind::from_code(row.string(4)?)
            .ok_or_else(|| row.unexpected(4, "'m' or 'l'"))?;

        Ok(Self {
            price: row.amount(0)?,
            volume: row.amount(1)?,
            time: row.timestamp(2)?,
            direction,
            execution,
            misc: row.string(5)?.to_string(),
            trade_id: row.optional_integer(6)?,
        })
    }
}

impl Serialize for TradeInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.trade_id {
            Some(id) => (
                self.price,
                self.volume,
                self.time,
                self.direction.code(),
                self.execution.code(),
                &self.misc,
                id,
            )
                .serialize(serializer),
            None => (
                self.price,
                self.volume,
                self.time,
                self.direction.code(),
                self.execution.code(),
                &self.misc,
            )
                .serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradesResponse {
    pub pair: String,
    pub trades: Vec<TradeInfo>,
    pub last: i64,
}

impl TradesResponse {
    pub fn from_payload(pair: &str, payload: &Value) -> Result<Self, DecodeError> {
        let (key, rows) = pair_rows("trades result", payload, pair)?;
        let trades = rows
            .iter()
            .map(TradeInfo::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            pair: key.to_string(),
            trades,
            last: integer_field("trades result", payload, LAST_FIELD)?,
        })
    }
}

/// `[time, bid, ask]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadInfo {
    pub time: i64,
    pub bid: Amount,
    pub ask: Amount,
}

impl SpreadInfo {
    pub fn width(&self) -> f64 {
        self.ask.value() - self.bid.value()
    }
}

impl TryFrom<&Value> for SpreadInfo {
    type Error = DecodeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let row = Positional::from_value("spread", value, 3)?;
        Ok(Self {
            time: row.integer(0)?,
            bid: row.amount(1)?,
            ask: row.amount(2)?,
        })
    }
}

impl Serialize for SpreadInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.time, self.bid, self.ask).serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpreadResponse {
    pub pair: String,
    pub spreads: Vec<SpreadInfo>,
    pub last: i64,
}

impl SpreadResponse {
    pub fn from_payload(pair: &str, payload: &Value) -> Result<Self, DecodeError> {
        let (key, rows) = pair_rows("spread result", payload, pair)?;
        let spreads = rows
            .iter()
            .map(SpreadInfo::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            pair: key.to_string(),
            spreads,
            last: integer_field("spread result", payload, LAST_FIELD)?,
        })
    }
}
