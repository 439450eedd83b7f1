use super::provider::ProviderRecord;
use crate::error::{PaymentError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Reference amounts offered by the comparison table.
pub const REFERENCE_PRESETS: [Decimal; 4] = [dec!(100), dec!(500), dec!(1000), dec!(5000)];

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Name,
    Fee,
    ProcessingTime,
    Payout,
    Rating,
}

impl FromStr for SortField {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "name" => Ok(SortField::Name),
            "fee" => Ok(SortField::Fee),
            "processingtime" => Ok(SortField::ProcessingTime),
            "payout" => Ok(SortField::Payout),
            "rating" => Ok(SortField::Rating),
            _ => Err(PaymentError::UnknownSortField(s.to_string())),
        }
    }
}

impl SortField {
    fn compare(self, a: &ProviderRecord, b: &ProviderRecord) -> Ordering {
        match self {
            SortField::Name => a
                .name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name)),
            SortField::Fee => a.fee.cmp(&b.fee),
            SortField::ProcessingTime => a.processing_time_minutes.cmp(&b.processing_time_minutes),
            SortField::Payout => a.payout.cmp(&b.payout),
            SortField::Rating => a.rating.cmp(&b.rating),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortOrder {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(PaymentError::UnknownSortOrder(s.to_string())),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => f.write_str("asc"),
            SortOrder::Desc => f.write_str("desc"),
        }
    }
}

/// Search, sort and reference amount currently applied to the comparison table.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct ComparisonQuery {
    pub search_term: String,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
    pub reference_amount: Decimal,
}

impl Default for ComparisonQuery {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            sort_field: SortField::Payout,
            sort_order: SortOrder::Desc,
            reference_amount: REFERENCE_PRESETS[0],
        }
    }
}

impl ComparisonQuery {
    /// Clicking a column header: flips the order on the active column,
    /// otherwise switches column and sorts descending.
    pub fn toggle_sort(&mut self, field: SortField) {
        if self.sort_field == field {
            self.sort_order = self.sort_order.flipped();
        } else {
            self.sort_field = field;
            self.sort_order = SortOrder::Desc;
        }
    }
}

/// A provider paired with what the recipient gets for the query's reference amount.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct RateQuote<'a> {
    pub provider: &'a ProviderRecord,
    /// Unrounded.
    pub received: Decimal,
}

impl RateQuote<'_> {
    pub fn display_received(&self) -> Decimal {
        self.received
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// Filters, sorts and prices `providers` for `query`.
///
/// The sort is stable: providers with equal keys keep their table order in both directions.
pub fn compare_rates<'a>(providers: &'a [ProviderRecord], query: &ComparisonQuery) -> Vec<RateQuote<'a>> {
    let needle = query.search_term.to_lowercase();
    let mut visible: Vec<&ProviderRecord> = providers.iter().filter(|p| p.matches(&needle)).collect();

    visible.sort_by(|a, b| query.sort_order.apply(query.sort_field.compare(a, b)));

    visible
        .into_iter()
        .map(|provider| RateQuote {
            provider,
            received: provider.received(query.reference_amount),
        })
        .collect()
}
