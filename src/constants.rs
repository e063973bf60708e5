/// Application constants

// Address format
pub const ADDRESS_PREFIX: &str = "0x";
pub const ADDRESS_HEX_LEN: usize = 64;

// Native coin
pub const APT_SYMBOL: &str = "APT";
pub const APT_DECIMALS: u32 = 8;
pub const APT_COIN_STORE: &str = "0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>";
pub const COIN_STORE_PREFIX: &str = "0x1::coin::CoinStore<";

// Stable tokens tracked when STABLE_TOKENS is not set
pub const STABLE_TOKEN_DECIMALS: u32 = 6;
pub const DEFAULT_STABLE_TOKENS: &[(&str, &str)] = &[("USDC", "usdc"), ("USDT", "usdt")];

// Payload classification
pub const ENTRY_FUNCTION_PAYLOAD: &str = "entry_function_payload";
pub const COIN_TRANSFER_MARKER: &str = "coin::transfer";
pub const UNKNOWN_DESTINATION: &str = "Unknown";
pub const AMOUNT_NOT_AVAILABLE: &str = "N/A";

// Network endpoints
pub const MAINNET_NODE_URL: &str = "https://api.mainnet.aptoslabs.com/v1";
pub const MAINNET_INDEXER_URL: &str = "https://api.mainnet.aptoslabs.com/v1/graphql";
pub const TESTNET_NODE_URL: &str = "https://api.testnet.aptoslabs.com/v1";
pub const TESTNET_INDEXER_URL: &str = "https://api.testnet.aptoslabs.com/v1/graphql";
pub const EXPLORER_BASE_URL: &str = "https://explorer.aptoslabs.com";

// Lookup defaults
pub const HISTORY_WINDOW_HOURS: u64 = 24;
pub const HISTORY_PAGE_LIMIT: u32 = 100;
pub const HOLDINGS_PAGE_LIMIT: u32 = 100;
pub const RESOURCES_PAGE_LIMIT: u32 = 9999;
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

// User-facing messages
pub const MSG_INVALID_ADDRESS: &str = "Invalid Aptos address!";
pub const MSG_FETCH_FAILED: &str = "Failed to fetch wallet data.";

// API version
pub const API_VERSION: &str = "v1";
