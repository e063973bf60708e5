use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{
    AccountResource, Address, Holding, NetworkEndpoint, TransactionPayload, TransactionRecord,
};

use super::ChainReader;
use crate::utils::json_integer_string;

const OWNED_TOKENS_QUERY: &str = r#"query OwnedTokens($address: String!, $limit: Int!) {
  current_token_ownerships_v2(
    where: { owner_address: { _eq: $address }, amount: { _gt: 0 } }
    limit: $limit
  ) {
    token_data_id
    amount
    current_token_data {
      token_name
      current_collection {
        collection_name
      }
    }
  }
}"#;

fn resources_url(endpoint: &NetworkEndpoint, address: &Address, limit: u32) -> String {
    format!(
        "{}/accounts/{}/resources?limit={}",
        endpoint.node_url, address, limit
    )
}

fn resource_url(endpoint: &NetworkEndpoint, address: &Address, resource_type: &str) -> String {
    format!(
        "{}/accounts/{}/resource/{}",
        endpoint.node_url, address, resource_type
    )
}

fn transactions_url(endpoint: &NetworkEndpoint, address: &Address, limit: u32) -> String {
    format!(
        "{}/accounts/{}/transactions?limit={}",
        endpoint.node_url, address, limit
    )
}

fn owned_tokens_request(address: &Address, limit: u32) -> serde_json::Value {
    serde_json::json!({
        "query": OWNED_TOKENS_QUERY,
        "variables": {
            "address": address.as_str(),
            "limit": limit
        }
    })
}

/// Aptos fullnode REST + indexer GraphQL client
pub struct AptosClient {
    client: reqwest::Client,
    resources_limit: u32,
}

impl AptosClient {
    /// `request_timeout` bounds every single HTTP call made by this client.
    pub fn new(resources_limit: u32, request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            resources_limit,
        })
    }

    /// GET returning `None` on 404 (account or resource not on chain).
    async fn get_optional<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Fetch(format!("{} returned {}: {}", url, status, body)));
        }

        let value = response
            .json::<T>()
            .await
            .map_err(|e| AppError::Fetch(format!("Invalid response from {}: {}", url, e)))?;
        Ok(Some(value))
    }
}

#[async_trait::async_trait]
impl ChainReader for AptosClient {
    async fn get_account_resources(
        &self,
        endpoint: &NetworkEndpoint,
        address: &Address,
    ) -> Result<Option<Vec<AccountResource>>> {
        self.get_optional(&resources_url(endpoint, address, self.resources_limit))
            .await
    }

    async fn get_account_resource(
        &self,
        endpoint: &NetworkEndpoint,
        address: &Address,
        resource_type: &str,
    ) -> Result<Option<AccountResource>> {
        self.get_optional(&resource_url(endpoint, address, resource_type))
            .await
    }

    async fn get_owned_tokens(
        &self,
        endpoint: &NetworkEndpoint,
        address: &Address,
        limit: u32,
    ) -> Result<Vec<Holding>> {
        tracing::debug!("POST {} (owned tokens)", endpoint.indexer_url);
        let response = self
            .client
            .post(&endpoint.indexer_url)
            .json(&owned_tokens_request(address, limit))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Fetch(format!(
                "Indexer returned {}: {}",
                status, body
            )));
        }

        let result: GraphqlResponse<OwnedTokensData> = response
            .json()
            .await
            .map_err(|e| AppError::Fetch(format!("Invalid indexer response: {}", e)))?;

        if let Some(errors) = result.errors.filter(|errors| !errors.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(AppError::Fetch(format!("Indexer error: {}", messages.join("; "))));
        }

        let data = result
            .data
            .ok_or_else(|| AppError::Fetch("Indexer response missing data".to_string()))?;

        Ok(data
            .current_token_ownerships_v2
            .into_iter()
            .map(OwnedToken::into_holding)
            .collect())
    }

    async fn get_account_transactions(
        &self,
        endpoint: &NetworkEndpoint,
        address: &Address,
        limit: u32,
    ) -> Result<Option<Vec<TransactionRecord>>> {
        let raw: Option<Vec<RawTransaction>> = self
            .get_optional(&transactions_url(endpoint, address, limit))
            .await?;

        raw.map(|transactions| {
            transactions
                .into_iter()
                .map(RawTransaction::into_record)
                .collect::<Result<Vec<_>>>()
        })
        .transpose()
    }
}

#[derive(Debug, Deserialize)]
struct RawTransaction {
    #[serde(default)]
    hash: String,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    payload: Option<TransactionPayload>,
}

impl RawTransaction {
    fn into_record(self) -> Result<TransactionRecord> {
        let timestamp_micros = self
            .timestamp
            .as_deref()
            .and_then(|ts| ts.parse::<u64>().ok())
            .ok_or_else(|| {
                AppError::Fetch(format!(
                    "Transaction {} has invalid timestamp {:?}",
                    self.hash, self.timestamp
                ))
            })?;

        Ok(TransactionRecord {
            hash: self.hash,
            timestamp_micros,
            payload: self.payload,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct OwnedTokensData {
    #[serde(default)]
    current_token_ownerships_v2: Vec<OwnedToken>,
}

#[derive(Debug, Deserialize)]
struct OwnedToken {
    token_data_id: String,
    #[serde(default)]
    amount: Option<serde_json::Value>,
    current_token_data: Option<TokenData>,
}

#[derive(Debug, Deserialize)]
struct TokenData {
    token_name: Option<String>,
    current_collection: Option<Collection>,
}

#[derive(Debug, Deserialize)]
struct Collection {
    collection_name: Option<String>,
}

impl OwnedToken {
    fn into_holding(self) -> Holding {
        let (token_name, collection_name) = match self.current_token_data {
            Some(data) => (
                data.token_name,
                data.current_collection.and_then(|c| c.collection_name),
            ),
            None => (None, None),
        };
        Holding {
            token_data_id: self.token_data_id,
            token_name,
            collection_name,
            amount: self.amount.as_ref().and_then(json_integer_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Network;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ADDR: &str = "0x00000000000000000000000000000000000000000000000000000000000000a1";

    fn address() -> Address {
        Address::from_validated(ADDR)
    }

    fn client() -> AptosClient {
        AptosClient::new(100, Duration::from_secs(5)).unwrap()
    }

    fn endpoint(server: &MockServer) -> NetworkEndpoint {
        NetworkEndpoint {
            network: Network::Mainnet,
            node_url: format!("{}/v1", server.uri()),
            indexer_url: format!("{}/v1/graphql", server.uri()),
        }
    }

    #[test]
    fn owned_tokens_request_carries_address_and_limit() {
        let body = owned_tokens_request(&address(), 25);
        assert_eq!(body["variables"]["address"], ADDR);
        assert_eq!(body["variables"]["limit"], 25);
        assert!(body["query"]
            .as_str()
            .unwrap()
            .contains("current_token_ownerships_v2"));
    }

    #[test]
    fn owned_tokens_request_lowercases_mixed_case_input() {
        let typed = format!("0x{}", "AB".repeat(32));
        let address = crate::services::address_validator::parse_address(&typed).unwrap();
        let body = owned_tokens_request(&address, 10);
        assert_eq!(body["variables"]["address"], format!("0x{}", "ab".repeat(32)));
    }

    #[tokio::test]
    async fn resources_return_none_for_unknown_account() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v1/accounts/{}/resources", ADDR)))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"error_code": "account_not_found"})),
            )
            .mount(&server)
            .await;

        let client = client();
        let result = client
            .get_account_resources(&endpoint(&server), &address())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn resources_decode_type_and_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v1/accounts/{}/resources", ADDR)))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "type": "0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>",
                    "data": { "coin": { "value": "250000000" } }
                }
            ])))
            .mount(&server)
            .await;

        let client = client();
        let resources = client
            .get_account_resources(&endpoint(&server), &address())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].data["coin"]["value"], "250000000");
    }

    #[tokio::test]
    async fn server_error_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/v1/accounts/.+/resource/.+$"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = client();
        let result = client
            .get_account_resource(&endpoint(&server), &address(), "0x1::account::Account")
            .await;
        assert!(matches!(result, Err(AppError::Fetch(_))));
    }

    #[tokio::test]
    async fn slow_node_hits_per_request_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/v1/accounts/.+/resource/.+$"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "type": "x", "data": {} }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = AptosClient::new(100, Duration::from_millis(100)).unwrap();
        let result = client
            .get_account_resource(&endpoint(&server), &address(), "0x1::account::Account")
            .await;
        assert!(matches!(result, Err(AppError::Timeout(_))));
    }

    #[tokio::test]
    async fn transactions_parse_string_timestamps() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v1/accounts/{}/transactions", ADDR)))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "hash": "0xabc",
                    "timestamp": "1700000000000000",
                    "payload": {
                        "type": "entry_function_payload",
                        "function": "0x1::coin::transfer",
                        "type_arguments": ["0x1::aptos_coin::AptosCoin"],
                        "arguments": ["0xdef", "100000000"]
                    }
                }
            ])))
            .mount(&server)
            .await;

        let client = client();
        let records = client
            .get_account_transactions(&endpoint(&server), &address(), 25)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].timestamp_micros, 1_700_000_000_000_000);
        let payload = records[0].payload.as_ref().unwrap();
        assert_eq!(payload.kind, "entry_function_payload");
        assert_eq!(payload.arguments.len(), 2);
    }

    #[tokio::test]
    async fn transactions_with_bad_timestamp_fail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v1/accounts/{}/transactions", ADDR)))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "hash": "0xabc", "timestamp": "yesterday" }
            ])))
            .mount(&server)
            .await;

        let client = client();
        let result = client
            .get_account_transactions(&endpoint(&server), &address(), 25)
            .await;
        assert!(matches!(result, Err(AppError::Fetch(_))));
    }

    #[tokio::test]
    async fn owned_tokens_map_names() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "current_token_ownerships_v2": [
                        {
                            "token_data_id": "0xt1",
                            "amount": 1,
                            "current_token_data": {
                                "token_name": "Punk #1",
                                "current_collection": { "collection_name": "Punks" }
                            }
                        },
                        { "token_data_id": "0xt2", "current_token_data": null }
                    ]
                }
            })))
            .mount(&server)
            .await;

        let client = client();
        let holdings = client
            .get_owned_tokens(&endpoint(&server), &address(), 50)
            .await
            .unwrap();
        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].token_name.as_deref(), Some("Punk #1"));
        assert_eq!(holdings[0].collection_name.as_deref(), Some("Punks"));
        assert_eq!(holdings[0].amount.as_deref(), Some("1"));
        assert_eq!(holdings[1].token_name, None);
        assert_eq!(holdings[1].amount, None);
    }

    #[tokio::test]
    async fn owned_tokens_surface_graphql_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "errors": [{ "message": "field not found" }]
            })))
            .mount(&server)
            .await;

        let client = client();
        let result = client
            .get_owned_tokens(&endpoint(&server), &address(), 50)
            .await;
        assert!(matches!(result, Err(AppError::Fetch(msg)) if msg.contains("field not found")));
    }
}
