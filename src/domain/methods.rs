//! Known Kraken REST methods and the arguments each typed operation forwards

use crate::domain::errors::{KrakenError, KrakenResult};
use crate::domain::value_objects::params::ParamSpec;
use std::collections::HashSet;

pub const PUBLIC_METHODS: &[&str] = &[
    "Assets",
    "AssetPairs",
    "Depth",
    "OHLC",
    "Spread",
    "Ticker",
    "Time",
    "Trades",
];

pub const PRIVATE_METHODS: &[&str] = &[
    "AddExport",
    "AddOrder",
    "Balance",
    "CancelOrder",
    "ClosedOrders",
    "DepositAddresses",
    "DepositMethods",
    "DepositStatus",
    "ExportStatus",
    "GetWebSocketsToken",
    "Ledgers",
    "OpenOrders",
    "OpenPositions",
    "QueryLedgers",
    "QueryOrders",
    "QueryTrades",
    "RemoveExport",
    "RetrieveExport",
    "TradeBalance",
    "TradesHistory",
    "TradeVolume",
    "WalletTransfer",
    "Withdraw",
    "WithdrawCancel",
    "WithdrawInfo",
    "WithdrawStatus",
];

/// Which endpoint family a method belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    /// Path segment between the version and the method name
    pub fn segment(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodClass {
    Public,
    Private,
    Unknown,
}

/// Fixed sets of public and private method names
///
/// Owned by each client instance. The two sets never overlap.
#[derive(Debug, Clone)]
pub struct MethodRegistry {
    public: HashSet<String>,
    private: HashSet<String>,
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::new(PUBLIC_METHODS, PRIVATE_METHODS)
    }
}

impl MethodRegistry {
    /// Build a registry from explicit name lists; a name listed as public wins
    pub fn new(public: &[&str], private: &[&str]) -> Self {
        let public: HashSet<String> = public.iter().map(|name| name.to_string()).collect();
        let private = private
            .iter()
            .filter(|name| !public.contains(**name))
            .map(|name| name.to_string())
            .collect();
        Self { public, private }
    }

    pub fn classify(&self, method: &str) -> MethodClass {
        if self.public.contains(method) {
            MethodClass::Public
        } else if self.private.contains(method) {
            MethodClass::Private
        } else {
            MethodClass::Unknown
        }
    }

    pub fn visibility(&self, method: &str) -> KrakenResult<Visibility> {
        match self.classify(method) {
            MethodClass::Public => Ok(Visibility::Public),
            MethodClass::Private => Ok(Visibility::Private),
            MethodClass::Unknown => Err(KrakenError::UnknownMethod(method.to_string())),
        }
    }

    pub fn is_public(&self, method: &str) -> bool {
        self.classify(method) == MethodClass::Public
    }

    pub fn is_private(&self, method: &str) -> bool {
        self.classify(method) == MethodClass::Private
    }
}

pub const ASSETS_PARAMS: &[ParamSpec] = &[
    ParamSpec::optional("info"),
    ParamSpec::optional("aclass"),
    ParamSpec::optional("asset"),
];

pub const ASSET_PAIRS_PARAMS: &[ParamSpec] = &[ParamSpec::optional("info"), ParamSpec::optional("pair")];

pub const TRADE_BALANCE_PARAMS: &[ParamSpec] = &[ParamSpec::optional("aclass"), ParamSpec::optional("asset")];

pub const TRADE_VOLUME_PARAMS: &[ParamSpec] = &[ParamSpec::optional("pair"), ParamSpec::optional("fee-info")];

pub const OPEN_ORDERS_PARAMS: &[ParamSpec] = &[ParamSpec::optional("trades"), ParamSpec::optional("userref")];

pub const CLOSED_ORDERS_PARAMS: &[ParamSpec] = &[
    ParamSpec::optional("trades"),
    ParamSpec::optional("userref"),
    ParamSpec::optional("start"),
    ParamSpec::optional("end"),
    ParamSpec::optional("ofs"),
    ParamSpec::optional("closetime"),
];

pub const QUERY_ORDERS_PARAMS: &[ParamSpec] = &[ParamSpec::optional("trades"), ParamSpec::optional("userref")];

pub const TRADES_HISTORY_PARAMS: &[ParamSpec] = &[
    ParamSpec::optional("type"),
    ParamSpec::optional("trades"),
    ParamSpec::optional("ofs"),
];

pub const QUERY_TRADES_PARAMS: &[ParamSpec] = &[ParamSpec::optional("trades")];

pub const OPEN_POSITIONS_PARAMS: &[ParamSpec] = &[ParamSpec::optional("docalcs"), ParamSpec::optional("consolidation")];

pub const LEDGERS_PARAMS: &[ParamSpec] = &[
    ParamSpec::optional("aclass"),
    ParamSpec::optional("asset"),
    ParamSpec::optional("type"),
    ParamSpec::optional("start"),
    ParamSpec::optional("end"),
    ParamSpec::optional("ofs"),
];

pub const DEPOSIT_STATUS_PARAMS: &[ParamSpec] = &[ParamSpec::required("asset"), ParamSpec::optional("method")];

pub const WITHDRAW_STATUS_PARAMS: &[ParamSpec] = &[ParamSpec::required("asset"), ParamSpec::optional("method")];

/// Optional `AddOrder` arguments; `pair`, `type`, `ordertype` and `volume` are positional
pub const ADD_ORDER_PARAMS: &[ParamSpec] = &[
    ParamSpec::optional("price"),
    ParamSpec::optional("price2"),
    ParamSpec::optional("leverage"),
    ParamSpec::optional("oflags"),
    ParamSpec::optional("starttm"),
    ParamSpec::optional("expiretm"),
    ParamSpec::optional("validate"),
    ParamSpec::renamed("close_order_type", "close[ordertype]"),
    ParamSpec::renamed("close_price", "close[price]"),
    ParamSpec::renamed("close_price2", "close[price2]"),
    ParamSpec::optional("trading_agreement"),
    ParamSpec::optional("userref"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_methods() {
        let registry = MethodRegistry::default();
        assert_eq!(registry.classify("Time"), MethodClass::Public);
        assert_eq!(registry.classify("Balance"), MethodClass::Private);
        assert_eq!(registry.classify("NotARealMethod"), MethodClass::Unknown);
        assert_eq!(registry.classify("time"), MethodClass::Unknown);
    }

    #[test]
    fn test_sets_are_disjoint() {
        let registry = MethodRegistry::default();
        for name in PUBLIC_METHODS {
            assert!(!registry.is_private(name), "{} listed twice", name);
        }
        assert_eq!(PRIVATE_METHODS.len(), 26);
    }

    #[test]
    fn test_overlapping_name_stays_public() {
        let registry = MethodRegistry::new(&["Time"], &["Time", "Balance"]);
        assert!(registry.is_public("Time"));
        assert!(!registry.is_private("Time"));
        assert!(registry.is_private("Balance"));
    }

    #[test]
    fn test_visibility_of_unknown_method_is_error() {
        let registry = MethodRegistry::default();
        assert_eq!(registry.visibility("Ticker").unwrap().segment(), "public");
        assert_eq!(registry.visibility("AddOrder").unwrap().segment(), "private");
        let err = registry.visibility("Bogus").unwrap_err();
        assert!(matches!(err, KrakenError::UnknownMethod(ref m) if m == "Bogus"));
    }

    #[test]
    fn test_add_order_renames_close_arguments() {
        let wire: Vec<&str> = ADD_ORDER_PARAMS
            .iter()
            .filter(|spec| spec.name != spec.wire)
            .map(|spec| spec.wire)
            .collect();
        assert_eq!(wire, vec!["close[ordertype]", "close[price]", "close[price2]"]);
    }
}
