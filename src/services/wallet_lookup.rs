use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};

use crate::{
    config::Config,
    error::{AppError, Result},
    indexer::ChainReader,
    models::Network,
    services::{
        balance_fetcher::BalanceFetcher,
        formatter::{PresentationFormatter, SessionView},
        history_fetcher::HistoryFetcher,
        holdings_fetcher::HoldingsFetcher,
        session::{EndpointSelector, LookupOutcome, LookupTicket, Session},
    },
};

// Bounds a whole fetcher, which may issue several requests; elapsed time
// surfaces as a fetch error.
async fn fetch_with_timeout<T, F>(label: &str, limit: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::debug!("{} fetch timed out after {:?}", label, limit);
            Err(AppError::Timeout(format!(
                "{} fetch timed out after {}s",
                label,
                limit.as_secs_f64()
            )))
        }
    }
}

/// Runs lookups for one session and publishes every state change as a
/// [`SessionView`] on a watch channel.
pub struct WalletLookupService {
    session: Mutex<Session>,
    balances: BalanceFetcher,
    holdings: HoldingsFetcher,
    history: HistoryFetcher,
    formatter: PresentationFormatter,
    history_window: Duration,
    request_timeout: Duration,
    views: watch::Sender<SessionView>,
}

impl WalletLookupService {
    pub fn new(config: &Config, chain: Arc<dyn ChainReader>) -> Self {
        let selector = EndpointSelector::new(
            config.default_network,
            config.endpoint(Network::Mainnet),
            config.endpoint(Network::Testnet),
        );
        let session = Session::new(selector, config.discard_partial_on_failure);
        let formatter =
            PresentationFormatter::new(config.display_locale, config.explorer_base_url.clone());
        let (views, _) = watch::channel(formatter.render(&session));

        Self {
            session: Mutex::new(session),
            balances: BalanceFetcher::new(
                chain.clone(),
                config.stable_tokens.clone(),
                config.balance_route,
            ),
            holdings: HoldingsFetcher::new(chain.clone(), config.holdings_page_limit),
            history: HistoryFetcher::new(chain, config.history_page_limit),
            formatter,
            history_window: config.history_window(),
            request_timeout: config.request_timeout(),
            views,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.views.subscribe()
    }

    /// Latest published view.
    pub fn current_view(&self) -> SessionView {
        self.views.borrow().clone()
    }

    fn publish(&self, session: &Session) -> SessionView {
        let view = self.formatter.render(session);
        self.views.send_replace(view.clone());
        view
    }

    pub async fn select_network(&self, network: Network) -> SessionView {
        let mut session = self.session.lock().await;
        if session.select_network(network) {
            self.publish(&session)
        } else {
            self.formatter.render(&session)
        }
    }

    /// Validates `input`, fetches balance, holdings and history concurrently
    /// against the endpoint active now, then applies the result unless a newer
    /// action superseded it. Returns the view current after completion.
    pub async fn lookup(&self, input: &str) -> Result<SessionView> {
        let ticket = {
            let mut session = self.session.lock().await;
            let ticket = session.begin_lookup(input);
            if !matches!(ticket, Err(AppError::LookupInProgress)) {
                self.publish(&session);
            }
            ticket?
        };

        tracing::info!(
            "Looking up {} on {} (generation {})",
            ticket.address,
            ticket.endpoint.network,
            ticket.generation
        );
        let outcome = self.run_fetches(&ticket).await;

        let mut session = self.session.lock().await;
        if session.complete(&ticket, outcome) {
            Ok(self.publish(&session))
        } else {
            Ok(self.formatter.render(&session))
        }
    }

    async fn run_fetches(&self, ticket: &LookupTicket) -> LookupOutcome {
        let address = &ticket.address;
        let endpoint = &ticket.endpoint;
        let limit = self.request_timeout;

        let (balance, holdings, history) = tokio::join!(
            fetch_with_timeout("balance", limit, self.balances.fetch(address, endpoint)),
            fetch_with_timeout("holdings", limit, self.holdings.fetch(address, endpoint)),
            fetch_with_timeout(
                "history",
                limit,
                self.history.fetch(address, endpoint, self.history_window)
            ),
        );

        LookupOutcome {
            balance,
            holdings,
            history,
        }
    }
}
