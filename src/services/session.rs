use serde::Serialize;

use crate::{
    constants::{MSG_FETCH_FAILED, MSG_INVALID_ADDRESS},
    error::{AppError, Result},
    models::{Address, Balance, Holding, Network, NetworkEndpoint, TransactionRecord},
    services::address_validator::parse_address,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupPhase {
    Idle,
    Loading,
    Success,
    Failed,
}

/// One independently filled result section.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<T> {
    Empty,
    Ready(T),
    Failed,
}

impl<T> Slot<T> {
    fn from_result(label: &str, result: Result<T>) -> Self {
        match result {
            Ok(value) => Slot::Ready(value),
            Err(err) => {
                tracing::warn!("{} fetch failed: {}", label, err);
                Slot::Failed
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Slot::Failed)
    }
}

/// Holds the selected network and the endpoints it maps to.
#[derive(Debug, Clone)]
pub struct EndpointSelector {
    current: Network,
    mainnet: NetworkEndpoint,
    testnet: NetworkEndpoint,
}

impl EndpointSelector {
    pub fn new(current: Network, mainnet: NetworkEndpoint, testnet: NetworkEndpoint) -> Self {
        Self {
            current,
            mainnet,
            testnet,
        }
    }

    pub fn current(&self) -> Network {
        self.current
    }

    pub fn endpoint(&self) -> &NetworkEndpoint {
        match self.current {
            Network::Mainnet => &self.mainnet,
            Network::Testnet => &self.testnet,
        }
    }

    /// Returns true when the selection actually changed.
    pub fn select(&mut self, next: Network) -> bool {
        if next == self.current {
            return false;
        }
        self.current = next;
        true
    }
}

/// Everything a lookup needs, captured when the action starts.
#[derive(Debug, Clone)]
pub struct LookupTicket {
    pub generation: u64,
    pub address: Address,
    pub endpoint: NetworkEndpoint,
}

#[derive(Debug)]
pub struct LookupOutcome {
    pub balance: Result<Balance>,
    pub holdings: Result<Vec<Holding>>,
    pub history: Result<Vec<TransactionRecord>>,
}

/// Display state for one user session.
///
/// Every action bumps `generation`; a completion is applied only when its
/// ticket carries the current generation, so superseded lookups never
/// overwrite newer state.
#[derive(Debug)]
pub struct Session {
    selector: EndpointSelector,
    generation: u64,
    phase: LookupPhase,
    address: Option<Address>,
    error: Option<String>,
    balance: Slot<Balance>,
    holdings: Slot<Vec<Holding>>,
    history: Slot<Vec<TransactionRecord>>,
    discard_partial_on_failure: bool,
}

impl Session {
    pub fn new(selector: EndpointSelector, discard_partial_on_failure: bool) -> Self {
        Self {
            selector,
            generation: 0,
            phase: LookupPhase::Idle,
            address: None,
            error: None,
            balance: Slot::Empty,
            holdings: Slot::Empty,
            history: Slot::Empty,
            discard_partial_on_failure,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> LookupPhase {
        self.phase
    }

    pub fn network(&self) -> Network {
        self.selector.current()
    }

    pub fn endpoint(&self) -> &NetworkEndpoint {
        self.selector.endpoint()
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn balance(&self) -> &Slot<Balance> {
        &self.balance
    }

    pub fn holdings(&self) -> &Slot<Vec<Holding>> {
        &self.holdings
    }

    pub fn history(&self) -> &Slot<Vec<TransactionRecord>> {
        &self.history
    }

    fn clear_results(&mut self) {
        self.balance = Slot::Empty;
        self.holdings = Slot::Empty;
        self.history = Slot::Empty;
        self.error = None;
    }

    /// Switches network. Any change drops all results and the error, and
    /// supersedes an in-flight lookup.
    pub fn select_network(&mut self, next: Network) -> bool {
        if !self.selector.select(next) {
            return false;
        }
        self.generation += 1;
        self.clear_results();
        self.phase = LookupPhase::Idle;
        tracing::info!("Network switched to {}", next);
        true
    }

    /// Starts a lookup for `input`.
    ///
    /// Invalid input fails locally without a ticket. Repeating the lookup that
    /// is already loading is rejected; any other lookup supersedes it.
    pub fn begin_lookup(&mut self, input: &str) -> Result<LookupTicket> {
        let address = match parse_address(input) {
            Ok(address) => address,
            Err(err) => {
                self.generation += 1;
                self.clear_results();
                self.address = None;
                self.phase = LookupPhase::Failed;
                self.error = Some(MSG_INVALID_ADDRESS.to_string());
                return Err(err);
            }
        };

        if self.phase == LookupPhase::Loading && self.address.as_ref() == Some(&address) {
            return Err(AppError::LookupInProgress);
        }

        self.generation += 1;
        self.clear_results();
        self.address = Some(address.clone());
        self.phase = LookupPhase::Loading;

        Ok(LookupTicket {
            generation: self.generation,
            address,
            endpoint: self.selector.endpoint().clone(),
        })
    }

    /// Applies a finished lookup. Returns false when the ticket is stale.
    pub fn complete(&mut self, ticket: &LookupTicket, outcome: LookupOutcome) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                "Discarding stale lookup for {} (generation {} < {})",
                ticket.address,
                ticket.generation,
                self.generation
            );
            return false;
        }

        self.balance = Slot::from_result("balance", outcome.balance);
        self.holdings = Slot::from_result("holdings", outcome.holdings);
        self.history = Slot::from_result("history", outcome.history);

        let any_failed =
            self.balance.is_failed() || self.holdings.is_failed() || self.history.is_failed();
        if any_failed {
            if self.discard_partial_on_failure {
                self.balance = Slot::Empty;
                self.holdings = Slot::Empty;
                self.history = Slot::Empty;
            }
            self.phase = LookupPhase::Failed;
            self.error = Some(MSG_FETCH_FAILED.to_string());
        } else {
            self.phase = LookupPhase::Success;
            self.error = None;
        }
        true
    }
}
