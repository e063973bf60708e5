use std::sync::Arc;

use crate::{
    error::Result,
    indexer::ChainReader,
    models::{Address, Holding, NetworkEndpoint},
};

pub struct HoldingsFetcher {
    chain: Arc<dyn ChainReader>,
    limit: u32,
}

impl HoldingsFetcher {
    pub fn new(chain: Arc<dyn ChainReader>, limit: u32) -> Self {
        Self { chain, limit }
    }

    /// Owned NFTs in indexer order, one page only.
    pub async fn fetch(&self, address: &Address, endpoint: &NetworkEndpoint) -> Result<Vec<Holding>> {
        let holdings = self.chain.get_owned_tokens(endpoint, address, self.limit).await?;
        tracing::debug!(
            "Found {} owned tokens for {} on {}",
            holdings.len(),
            address,
            endpoint.network
        );
        Ok(holdings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::Network;
    use crate::services::testing::{address, StubChain, ADDR_A};

    fn endpoint() -> NetworkEndpoint {
        NetworkEndpoint {
            network: Network::Testnet,
            node_url: "http://node".to_string(),
            indexer_url: "http://indexer".to_string(),
        }
    }

    fn holding(id: &str) -> Holding {
        Holding {
            token_data_id: id.to_string(),
            token_name: None,
            collection_name: None,
            amount: Some("1".to_string()),
        }
    }

    #[tokio::test]
    async fn keeps_indexer_order() {
        let chain = StubChain {
            holdings: Ok(vec![holding("0x2"), holding("0x1")]),
            ..Default::default()
        };
        let fetcher = HoldingsFetcher::new(Arc::new(chain), 50);
        let holdings = fetcher.fetch(&address(ADDR_A), &endpoint()).await.unwrap();
        let ids: Vec<_> = holdings.iter().map(|h| h.token_data_id.as_str()).collect();
        assert_eq!(ids, vec!["0x2", "0x1"]);
    }

    #[tokio::test]
    async fn indexer_failure_is_fetch_error() {
        let chain = StubChain {
            holdings: Err(AppError::Fetch("indexer down".into())),
            ..Default::default()
        };
        let fetcher = HoldingsFetcher::new(Arc::new(chain), 50);
        assert!(fetcher.fetch(&address(ADDR_A), &endpoint()).await.is_err());
    }
}
