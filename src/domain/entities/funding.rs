use crate::domain::value_objects::amount::Amount;
use serde::{Deserialize, Serialize};

/// Deposit limit: either a number or `false` when unlimited
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DepositLimit {
    Unlimited(bool),
    Limited(Amount),
}

impl DepositLimit {
    pub fn amount(&self) -> Option<Amount> {
        match self {
            DepositLimit::Limited(amount) => Some(*amount),
            DepositLimit::Unlimited(_) => None,
        }
    }
}

/// Entry of the `DepositMethods` result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositMethod {
    pub method: String,
    pub limit: DepositLimit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<Amount>,
    #[serde(rename = "gen-address", default)]
    pub generates_address: bool,
}

pub type DepositMethodsResponse = Vec<DepositMethod>;

/// Entry of the `DepositAddresses` result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositAddress {
    pub address: String,
    #[serde(rename = "expiretm", default)]
    pub expire_time: String,
    #[serde(default)]
    pub new: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

pub type DepositAddressesResponse = Vec<DepositAddress>;

/// Result of `WithdrawInfo`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawInfoResponse {
    pub method: String,
    pub limit: Amount,
    pub amount: Amount,
    pub fee: Amount,
}

/// Result of `Withdraw`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawResponse {
    #[serde(rename = "refid")]
    pub ref_id: String,
}

/// Entry of the `DepositStatus` and `WithdrawStatus` results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferStatus {
    pub method: String,
    #[serde(rename = "aclass", default)]
    pub asset_class: String,
    pub asset: String,
    #[serde(rename = "refid")]
    pub ref_id: String,
    #[serde(default)]
    pub txid: String,
    #[serde(default)]
    pub info: String,
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<Amount>,
    pub time: i64,
    /// `Initial`, `Pending`, `Settled`, `Success` or `Failure`
    pub status: String,
}

impl TransferStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self.status.as_str(), "Success" | "Settled")
    }
}

pub type TransferStatusResponse = Vec<TransferStatus>;

/// Result of `GetWebSocketsToken`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSocketsTokenResponse {
    pub token: String,
    /// Seconds until the token must be used
    pub expires: u64,
}
