use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::{
    constants::{APT_DECIMALS, COIN_TRANSFER_MARKER, ENTRY_FUNCTION_PAYLOAD},
    error::Result,
    indexer::ChainReader,
    models::{Address, NetworkEndpoint, TransactionRecord, TransferKind},
    utils::{json_integer_string, scale_base_units},
};

fn now_micros() -> u64 {
    Utc::now().timestamp_micros().max(0) as u64
}

/// Keeps records with `now - timestamp <= window`, most recent first.
///
/// Records stamped after `now` are kept. The sort is stable, so equal
/// timestamps stay in API order.
pub fn filter_recent(
    records: Vec<TransactionRecord>,
    now_micros: u64,
    window: Duration,
) -> Vec<TransactionRecord> {
    let window_micros = window.as_micros().min(u64::MAX as u128) as u64;
    let mut recent: Vec<TransactionRecord> = records
        .into_iter()
        .filter(|record| now_micros.saturating_sub(record.timestamp_micros) <= window_micros)
        .collect();
    recent.sort_by(|a, b| b.timestamp_micros.cmp(&a.timestamp_micros));
    recent
}

/// Presentation-time classification of a record's payload.
pub fn classify(record: &TransactionRecord) -> TransferKind {
    let Some(payload) = record.payload.as_ref() else {
        return TransferKind::Unrecognized;
    };
    let is_transfer = payload.kind == ENTRY_FUNCTION_PAYLOAD
        && payload
            .function
            .as_deref()
            .is_some_and(|function| function.contains(COIN_TRANSFER_MARKER));
    if !is_transfer {
        return TransferKind::Unrecognized;
    }

    let destination = payload.arguments.first().and_then(|v| v.as_str());
    let amount = payload
        .arguments
        .get(1)
        .and_then(json_integer_string)
        .and_then(|raw| scale_base_units(&raw, APT_DECIMALS).ok());

    match (destination, amount) {
        (Some(destination), Some(amount)) => TransferKind::Transfer {
            destination: destination.to_string(),
            amount,
        },
        _ => {
            tracing::debug!("Transfer payload in {} has unexpected arguments", record.hash);
            TransferKind::Unrecognized
        }
    }
}

pub struct HistoryFetcher {
    chain: Arc<dyn ChainReader>,
    limit: u32,
}

impl HistoryFetcher {
    pub fn new(chain: Arc<dyn ChainReader>, limit: u32) -> Self {
        Self { chain, limit }
    }

    pub async fn fetch(
        &self,
        address: &Address,
        endpoint: &NetworkEndpoint,
        window: Duration,
    ) -> Result<Vec<TransactionRecord>> {
        let records = self
            .chain
            .get_account_transactions(endpoint, address, self.limit)
            .await?
            .unwrap_or_default();
        let total = records.len();
        let recent = filter_recent(records, now_micros(), window);
        tracing::debug!(
            "History for {} on {}: {} of {} transactions within {:?}",
            address,
            endpoint.network,
            recent.len(),
            total,
            window
        );
        Ok(recent)
    }
}
