use std::env;
use std::time::Duration;

use url::Url;

use crate::constants::{
    DEFAULT_STABLE_TOKENS, EXPLORER_BASE_URL, HISTORY_PAGE_LIMIT, HISTORY_WINDOW_HOURS,
    HOLDINGS_PAGE_LIMIT, MAINNET_INDEXER_URL, MAINNET_NODE_URL, REQUEST_TIMEOUT_SECS,
    STABLE_TOKEN_DECIMALS, TESTNET_INDEXER_URL, TESTNET_NODE_URL,
};
use crate::models::{Network, NetworkEndpoint, StableToken};
use crate::services::balance_fetcher::BalanceRoute;
use crate::services::formatter::Locale;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Networks
    pub mainnet_node_url: String,
    pub mainnet_indexer_url: String,
    pub testnet_node_url: String,
    pub testnet_indexer_url: String,
    pub default_network: Network,
    pub explorer_base_url: String,

    // Lookup
    pub history_window_hours: u64,
    pub history_page_limit: u32,
    pub holdings_page_limit: u32,
    pub request_timeout_secs: u64,
    pub stable_tokens: Vec<StableToken>,
    pub balance_route: BalanceRoute,
    pub discard_partial_on_failure: bool,

    // Presentation
    pub display_locale: Locale,

    // CORS
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_source(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, falling back to defaults for unset keys.
    pub fn from_source<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            host: var("HOST", "0.0.0.0"),
            port: var("PORT", "3000").parse()?,
            environment: var("ENVIRONMENT", "development"),

            mainnet_node_url: var("APTOS_MAINNET_NODE_URL", MAINNET_NODE_URL),
            mainnet_indexer_url: var("APTOS_MAINNET_INDEXER_URL", MAINNET_INDEXER_URL),
            testnet_node_url: var("APTOS_TESTNET_NODE_URL", TESTNET_NODE_URL),
            testnet_indexer_url: var("APTOS_TESTNET_INDEXER_URL", TESTNET_INDEXER_URL),
            default_network: var("DEFAULT_NETWORK", "mainnet").parse()?,
            explorer_base_url: var("EXPLORER_BASE_URL", EXPLORER_BASE_URL),

            history_window_hours: var("HISTORY_WINDOW_HOURS", &HISTORY_WINDOW_HOURS.to_string())
                .parse()?,
            history_page_limit: var("HISTORY_PAGE_LIMIT", &HISTORY_PAGE_LIMIT.to_string())
                .parse()?,
            holdings_page_limit: var("HOLDINGS_PAGE_LIMIT", &HOLDINGS_PAGE_LIMIT.to_string())
                .parse()?,
            request_timeout_secs: var("REQUEST_TIMEOUT_SECS", &REQUEST_TIMEOUT_SECS.to_string())
                .parse()?,
            stable_tokens: match lookup("STABLE_TOKENS") {
                Some(raw) => parse_stable_tokens(&raw)?,
                None => default_stable_tokens(),
            },
            balance_route: var("BALANCE_ROUTE", "list").parse()?,
            discard_partial_on_failure: lookup("DISCARD_PARTIAL_ON_FAILURE")
                .map(|value| is_truthy(&value))
                .unwrap_or(false),

            display_locale: var("DISPLAY_LOCALE", "pt-BR").parse()?,

            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS", "*"),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, value) in [
            ("APTOS_MAINNET_NODE_URL", &self.mainnet_node_url),
            ("APTOS_MAINNET_INDEXER_URL", &self.mainnet_indexer_url),
            ("APTOS_TESTNET_NODE_URL", &self.testnet_node_url),
            ("APTOS_TESTNET_INDEXER_URL", &self.testnet_indexer_url),
            ("EXPLORER_BASE_URL", &self.explorer_base_url),
        ] {
            Url::parse(value).map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", name, e))?;
        }

        if self.history_window_hours == 0 {
            anyhow::bail!("HISTORY_WINDOW_HOURS must be > 0");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be > 0");
        }
        if self.history_page_limit == 0 || self.holdings_page_limit == 0 {
            tracing::warn!("Page limits of 0 will return empty history or holdings");
        }
        if self.stable_tokens.is_empty() {
            tracing::warn!("No stable tokens configured; only APT will be reported");
        }
        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }

    pub fn endpoint(&self, network: Network) -> NetworkEndpoint {
        let (node_url, indexer_url) = match network {
            Network::Mainnet => (&self.mainnet_node_url, &self.mainnet_indexer_url),
            Network::Testnet => (&self.testnet_node_url, &self.testnet_indexer_url),
        };
        NetworkEndpoint {
            network,
            node_url: node_url.trim_end_matches('/').to_string(),
            indexer_url: indexer_url.clone(),
        }
    }

    pub fn history_window(&self) -> Duration {
        Duration::from_secs(self.history_window_hours * 3600)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_stable_tokens() -> Vec<StableToken> {
    DEFAULT_STABLE_TOKENS
        .iter()
        .map(|(symbol, pattern)| StableToken {
            symbol: symbol.to_string(),
            pattern: pattern.to_string(),
            decimals: STABLE_TOKEN_DECIMALS,
        })
        .collect()
}

/// Parses `SYMBOL:pattern[:decimals]` entries separated by commas.
fn parse_stable_tokens(raw: &str) -> anyhow::Result<Vec<StableToken>> {
    let mut tokens = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let mut parts = entry.split(':').map(str::trim);
        let symbol = parts.next().unwrap_or_default();
        let pattern = parts.next().unwrap_or_default();
        if symbol.is_empty() || pattern.is_empty() {
            anyhow::bail!("Invalid STABLE_TOKENS entry: {}", entry);
        }
        let decimals = match parts.next() {
            Some(value) => value.parse()?,
            None => STABLE_TOKEN_DECIMALS,
        };
        tokens.push(StableToken {
            symbol: symbol.to_ascii_uppercase(),
            pattern: pattern.to_string(),
            decimals,
        });
    }
    Ok(tokens)
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_source(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_target_mainnet_with_usdc_and_usdt() {
        let config = config_with(&[]).unwrap();
        assert_eq!(config.default_network, Network::Mainnet);
        assert_eq!(config.history_window(), Duration::from_secs(24 * 3600));
        let symbols: Vec<_> = config.stable_tokens.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["USDC", "USDT"]);
        assert_eq!(config.display_locale, Locale::PtBr);
        assert!(!config.discard_partial_on_failure);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn stable_tokens_parse_with_optional_decimals() {
        let tokens = parse_stable_tokens("usdc:USDC, weth:weth:8").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].symbol, "USDC");
        assert_eq!(tokens[0].decimals, 6);
        assert_eq!(tokens[1].decimals, 8);
        assert!(parse_stable_tokens("USDC").is_err());
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let config = config_with(&[("APTOS_TESTNET_NODE_URL", "http://node.local/v1/")]).unwrap();
        let endpoint = config.endpoint(Network::Testnet);
        assert_eq!(endpoint.node_url, "http://node.local/v1");
        assert_eq!(endpoint.network, Network::Testnet);
    }

    #[test]
    fn validate_rejects_zero_window_and_bad_urls() {
        let config = config_with(&[("HISTORY_WINDOW_HOURS", "0")]).unwrap();
        assert!(config.validate().is_err());
        let config = config_with(&[("EXPLORER_BASE_URL", "not a url")]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn flags_and_enums_parse_from_source() {
        let config = config_with(&[
            ("DISCARD_PARTIAL_ON_FAILURE", "yes"),
            ("BALANCE_ROUTE", "direct"),
            ("DEFAULT_NETWORK", "testnet"),
            ("DISPLAY_LOCALE", "en-US"),
        ])
        .unwrap();
        assert!(config.discard_partial_on_failure);
        assert_eq!(config.balance_route, BalanceRoute::Direct);
        assert_eq!(config.default_network, Network::Testnet);
        assert_eq!(config.display_locale, Locale::EnUs);
    }
}
