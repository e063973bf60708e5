use chrono::{DateTime, Local, TimeZone};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::str::FromStr;

use crate::{
    constants::{AMOUNT_NOT_AVAILABLE, UNKNOWN_DESTINATION},
    error::AppError,
    models::{Balance, Holding, Network, TransactionRecord, TransferKind},
    services::{
        history_fetcher::classify,
        session::{LookupPhase, Session, Slot},
    },
};

/// Number and date conventions for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    PtBr,
    EnUs,
}

impl Locale {
    fn separators(&self) -> (char, char) {
        match self {
            Locale::PtBr => ('.', ','),
            Locale::EnUs => (',', '.'),
        }
    }

    fn datetime_pattern(&self) -> &'static str {
        match self {
            Locale::PtBr => "%d/%m/%Y %H:%M:%S",
            Locale::EnUs => "%m/%d/%Y, %I:%M:%S %p",
        }
    }
}

impl FromStr for Locale {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "pt-br" | "pt" => Ok(Locale::PtBr),
            "en-us" | "en" => Ok(Locale::EnUs),
            other => Err(AppError::BadRequest(format!("Unsupported locale: {}", other))),
        }
    }
}

/// Two fraction digits, half away from zero, with locale grouping.
pub fn format_decimal(value: Decimal, locale: Locale) -> String {
    let (group_sep, decimal_sep) = locale.separators();
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(group_sep);
        }
        grouped.push(*digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{}{}{}", sign, grouped, decimal_sep, frac_part)
}

/// Microsecond epoch rendered in `tz`.
pub fn format_timestamp_in<Tz>(timestamp_micros: u64, locale: Locale, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let millis = (timestamp_micros / 1000) as i64;
    match tz.timestamp_millis_opt(millis).single() {
        Some(datetime) => datetime.format(locale.datetime_pattern()).to_string(),
        None => timestamp_micros.to_string(),
    }
}

pub fn format_timestamp(timestamp_micros: u64, locale: Locale) -> String {
    format_timestamp_in(timestamp_micros, locale, &Local)
}

pub fn explorer_url(explorer_base: &str, hash: &str, network: Network) -> String {
    format!(
        "{}/txn/{}?network={}",
        explorer_base.trim_end_matches('/'),
        hash,
        network.as_str()
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceLine {
    pub symbol: String,
    pub amount: Decimal,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingsView {
    pub count: usize,
    pub items: Vec<Holding>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferView {
    pub hash: String,
    pub timestamp_micros: u64,
    pub date: String,
    pub destination: String,
    pub amount: String,
    pub is_transfer: bool,
    pub explorer_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum SectionView<T> {
    Empty,
    Loaded(T),
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub generation: u64,
    pub phase: LookupPhase,
    pub network: Network,
    pub address: Option<String>,
    pub error: Option<String>,
    pub balance: SectionView<Vec<BalanceLine>>,
    pub holdings: SectionView<HoldingsView>,
    pub history: SectionView<Vec<TransferView>>,
}

pub struct PresentationFormatter {
    locale: Locale,
    explorer_base_url: String,
}

impl PresentationFormatter {
    pub fn new(locale: Locale, explorer_base_url: impl Into<String>) -> Self {
        Self {
            locale,
            explorer_base_url: explorer_base_url.into(),
        }
    }

    pub fn balance_lines(&self, balance: &Balance) -> Vec<BalanceLine> {
        balance
            .tokens
            .iter()
            .map(|token| BalanceLine {
                symbol: token.symbol.clone(),
                amount: token.amount,
                display: format_decimal(token.amount, self.locale),
            })
            .collect()
    }

    pub fn transfer_view(&self, record: &TransactionRecord, network: Network) -> TransferView {
        let (destination, amount, is_transfer) = match classify(record) {
            TransferKind::Transfer {
                destination,
                amount,
            } => (destination, format_decimal(amount, self.locale), true),
            TransferKind::Unrecognized => (
                UNKNOWN_DESTINATION.to_string(),
                AMOUNT_NOT_AVAILABLE.to_string(),
                false,
            ),
        };

        TransferView {
            hash: record.hash.clone(),
            timestamp_micros: record.timestamp_micros,
            date: format_timestamp(record.timestamp_micros, self.locale),
            destination,
            amount,
            is_transfer,
            explorer_url: explorer_url(&self.explorer_base_url, &record.hash, network),
        }
    }

    pub fn render(&self, session: &Session) -> SessionView {
        let network = session.network();
        SessionView {
            generation: session.generation(),
            phase: session.phase(),
            network,
            address: session.address().map(|a| a.to_string()),
            error: session.error().map(str::to_string),
            balance: section(session.balance(), |b| self.balance_lines(b)),
            holdings: section(session.holdings(), |items| HoldingsView {
                count: items.len(),
                items: items.clone(),
            }),
            history: section(session.history(), |records| {
                records
                    .iter()
                    .map(|record| self.transfer_view(record, network))
                    .collect()
            }),
        }
    }
}

fn section<T, V>(slot: &Slot<T>, render: impl FnOnce(&T) -> V) -> SectionView<V> {
    match slot {
        Slot::Empty => SectionView::Empty,
        Slot::Ready(value) => SectionView::Loaded(render(value)),
        Slot::Failed => SectionView::Failed,
    }
}
