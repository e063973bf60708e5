pub mod aptos_client;

pub use aptos_client::AptosClient;

use crate::error::Result;
use crate::models::{AccountResource, Address, Holding, NetworkEndpoint, TransactionRecord};

/// Read access to the chain API, scoped per call to one network endpoint.
///
/// `Ok(None)` means the account (or resource) does not exist on that network,
/// which callers treat as empty data rather than a failure.
#[async_trait::async_trait]
pub trait ChainReader: Send + Sync {
    async fn get_account_resources(
        &self,
        endpoint: &NetworkEndpoint,
        address: &Address,
    ) -> Result<Option<Vec<AccountResource>>>;

    /// Direct lookup of a single resource by its full type.
    async fn get_account_resource(
        &self,
        endpoint: &NetworkEndpoint,
        address: &Address,
        resource_type: &str,
    ) -> Result<Option<AccountResource>>;

    async fn get_owned_tokens(
        &self,
        endpoint: &NetworkEndpoint,
        address: &Address,
        limit: u32,
    ) -> Result<Vec<Holding>>;

    async fn get_account_transactions(
        &self,
        endpoint: &NetworkEndpoint,
        address: &Address,
        limit: u32,
    ) -> Result<Option<Vec<TransactionRecord>>>;
}
