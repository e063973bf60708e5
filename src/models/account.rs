use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// A validated Aptos account address (`0x` + 64 hex chars).
///
/// Only [`crate::services::address_validator::parse_address`] builds one, so holding
/// an `Address` means the format check already passed. Hex digits are stored
/// lowercase, the form the node and indexer key accounts by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub(crate) fn from_validated(value: &str) -> Self {
        Self(value.to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two chain deployments a session can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    pub const ALL: [Network; 2] = [Network::Mainnet, Network::Testnet];

    /// Name used by the explorer `network` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "primary" => Ok(Network::Mainnet),
            "testnet" | "secondary" => Ok(Network::Testnet),
            other => Err(AppError::BadRequest(format!("Unsupported network: {}", other))),
        }
    }
}

/// Base URLs for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkEndpoint {
    pub network: Network,
    pub node_url: String,
    pub indexer_url: String,
}

/// A stable token tracked alongside APT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StableToken {
    pub symbol: String,
    /// Matched case-insensitively as a substring of the resource type.
    pub pattern: String,
    pub decimals: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenBalance {
    pub symbol: String,
    pub amount: Decimal,
}

/// Native balance first, then stable tokens in configured order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Balance {
    pub tokens: Vec<TokenBalance>,
}

impl Balance {
    pub fn get(&self, symbol: &str) -> Option<Decimal> {
        self.tokens
            .iter()
            .find(|token| token.symbol == symbol)
            .map(|token| token.amount)
    }
}

/// One owned non-fungible token. Only the count is displayed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    pub token_data_id: String,
    pub token_name: Option<String>,
    pub collection_name: Option<String>,
    /// Raw owned amount as reported by the indexer.
    pub amount: Option<String>,
}

/// A resource entry from `GET /accounts/{addr}/resources`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionPayload {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub arguments: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub hash: String,
    pub timestamp_micros: u64,
    pub payload: Option<TransactionPayload>,
}

/// Presentation-time view of a transaction payload.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferKind {
    Transfer { destination: String, amount: Decimal },
    Unrecognized,
}
