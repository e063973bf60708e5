use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

use crate::{
    constants::{APT_COIN_STORE, APT_DECIMALS, APT_SYMBOL, COIN_STORE_PREFIX},
    error::{AppError, Result},
    indexer::ChainReader,
    models::{AccountResource, Address, Balance, NetworkEndpoint, StableToken, TokenBalance},
    utils::{json_integer_string, scale_base_units},
};

/// Which API avenue is used to read the APT coin store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BalanceRoute {
    /// Scan `GET /accounts/{addr}/resources`.
    #[default]
    List,
    /// `GET /accounts/{addr}/resource/{type}`.
    Direct,
}

impl FromStr for BalanceRoute {
    type Err = AppError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "list" => Ok(BalanceRoute::List),
            "direct" => Ok(BalanceRoute::Direct),
            other => Err(AppError::BadRequest(format!(
                "Unsupported balance route: {}",
                other
            ))),
        }
    }
}

// Reads `data.coin.value`; a present resource without it is malformed.
fn coin_value(resource: &AccountResource) -> Result<String> {
    resource
        .data
        .get("coin")
        .and_then(|coin| coin.get("value"))
        .and_then(json_integer_string)
        .ok_or_else(|| {
            AppError::Fetch(format!(
                "Malformed coin store resource {}",
                resource.resource_type
            ))
        })
}

fn scaled_or_zero(resource: Option<&AccountResource>, decimals: u32) -> Result<Decimal> {
    match resource {
        Some(resource) => scale_base_units(&coin_value(resource)?, decimals),
        None => Ok(Decimal::ZERO),
    }
}

// First coin store whose type contains the token pattern. Other resources
// naming the token (positions, vaults) carry no coin value and are skipped.
fn find_stable<'a>(resources: &'a [AccountResource], token: &StableToken) -> Option<&'a AccountResource> {
    let pattern = token.pattern.to_ascii_lowercase();
    resources.iter().find(|r| {
        r.resource_type.starts_with(COIN_STORE_PREFIX)
            && r.resource_type.to_ascii_lowercase().contains(&pattern)
    })
}

pub struct BalanceFetcher {
    chain: Arc<dyn ChainReader>,
    stable_tokens: Vec<StableToken>,
    route: BalanceRoute,
}

impl BalanceFetcher {
    pub fn new(chain: Arc<dyn ChainReader>, stable_tokens: Vec<StableToken>, route: BalanceRoute) -> Self {
        Self {
            chain,
            stable_tokens,
            route,
        }
    }

    /// APT plus every configured stable token. Missing tokens (or a missing account) are 0.
    pub async fn fetch(&self, address: &Address, endpoint: &NetworkEndpoint) -> Result<Balance> {
        let needs_list = self.route == BalanceRoute::List || !self.stable_tokens.is_empty();
        let resources = if needs_list {
            match self.chain.get_account_resources(endpoint, address).await? {
                Some(resources) => resources,
                None => {
                    tracing::debug!("Account {} not found on {}", address, endpoint.network);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let native = match self.route {
            BalanceRoute::List => {
                let store = resources.iter().find(|r| r.resource_type == APT_COIN_STORE);
                scaled_or_zero(store, APT_DECIMALS)?
            }
            BalanceRoute::Direct => {
                let store = self
                    .chain
                    .get_account_resource(endpoint, address, APT_COIN_STORE)
                    .await?;
                scaled_or_zero(store.as_ref(), APT_DECIMALS)?
            }
        };

        let mut tokens = Vec::with_capacity(self.stable_tokens.len() + 1);
        tokens.push(TokenBalance {
            symbol: APT_SYMBOL.to_string(),
            amount: native,
        });

        for token in &self.stable_tokens {
            let amount = scaled_or_zero(find_stable(&resources, token), token.decimals)?;
            tokens.push(TokenBalance {
                symbol: token.symbol.clone(),
                amount,
            });
        }

        tracing::debug!("Balances for {} on {}: {:?}", address, endpoint.network, tokens);
        Ok(Balance { tokens })
    }
}
