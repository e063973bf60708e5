// In-memory ChainReader used by service tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::Result;
use crate::indexer::ChainReader;
use crate::models::{
    AccountResource, Address, Holding, NetworkEndpoint, TransactionPayload, TransactionRecord,
};

pub const ADDR_A: &str = "0x00000000000000000000000000000000000000000000000000000000000000aa";
pub const ADDR_B: &str = "0x00000000000000000000000000000000000000000000000000000000000000bb";

pub fn address(value: &str) -> Address {
    Address::from_validated(value)
}

pub fn resource(resource_type: &str, data: serde_json::Value) -> AccountResource {
    AccountResource {
        resource_type: resource_type.to_string(),
        data,
    }
}

pub fn coin_store(coin_type: &str, value: &str) -> AccountResource {
    resource(
        &format!("0x1::coin::CoinStore<{}>", coin_type),
        serde_json::json!({ "coin": { "value": value } }),
    )
}

pub fn transfer(hash: &str, timestamp_micros: u64, to: &str, amount: &str) -> TransactionRecord {
    TransactionRecord {
        hash: hash.to_string(),
        timestamp_micros,
        payload: Some(TransactionPayload {
            kind: "entry_function_payload".to_string(),
            function: Some("0x1::coin::transfer".to_string()),
            arguments: vec![serde_json::json!(to), serde_json::json!(amount)],
        }),
    }
}

pub struct StubChain {
    pub resources: Result<Option<Vec<AccountResource>>>,
    pub resource: Result<Option<AccountResource>>,
    pub holdings: Result<Vec<Holding>>,
    pub transactions: Result<Option<Vec<TransactionRecord>>>,
    /// Extra latency per address, applied to every call.
    pub delays: HashMap<String, Duration>,
    pub calls: AtomicUsize,
    pub endpoints_seen: std::sync::Mutex<Vec<String>>,
}

impl Default for StubChain {
    fn default() -> Self {
        Self {
            resources: Ok(Some(Vec::new())),
            resource: Ok(None),
            holdings: Ok(Vec::new()),
            transactions: Ok(Some(Vec::new())),
            delays: HashMap::new(),
            calls: AtomicUsize::new(0),
            endpoints_seen: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl StubChain {
    async fn record(&self, endpoint: &NetworkEndpoint, address: &Address) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.endpoints_seen.lock() {
            seen.push(endpoint.node_url.clone());
        }
        if let Some(delay) = self.delays.get(address.as_str()) {
            tokio::time::sleep(*delay).await;
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ChainReader for StubChain {
    async fn get_account_resources(
        &self,
        endpoint: &NetworkEndpoint,
        address: &Address,
    ) -> Result<Option<Vec<AccountResource>>> {
        self.record(endpoint, address).await;
        self.resources.clone()
    }

    async fn get_account_resource(
        &self,
        endpoint: &NetworkEndpoint,
        address: &Address,
        _resource_type: &str,
    ) -> Result<Option<AccountResource>> {
        self.record(endpoint, address).await;
        self.resource.clone()
    }

    async fn get_owned_tokens(
        &self,
        endpoint: &NetworkEndpoint,
        address: &Address,
        _limit: u32,
    ) -> Result<Vec<Holding>> {
        self.record(endpoint, address).await;
        self.holdings.clone()
    }

    async fn get_account_transactions(
        &self,
        endpoint: &NetworkEndpoint,
        address: &Address,
        _limit: u32,
    ) -> Result<Option<Vec<TransactionRecord>>> {
        self.record(endpoint, address).await;
        self.transactions.clone()
    }
}
