// Lookup pipeline: validation, fetchers, session state and presentation
pub mod address_validator;
pub mod balance_fetcher;
pub mod formatter;
pub mod history_fetcher;
pub mod holdings_fetcher;
pub mod session;
pub mod wallet_lookup;

#[cfg(test)]
pub(crate) mod testing;

// Re-export for convenience
pub use formatter::SessionView;
pub use wallet_lookup::WalletLookupService;
