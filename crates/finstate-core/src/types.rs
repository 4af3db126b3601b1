//! Core data types for statement lookups.
//!
//! This module defines the fundamental data structures:
//!
//! - [`CorporateDirectoryEntry`] - Company known to the disclosure service
//! - [`FetchRequest`] - One probe's parameters
//! - [`RawRow`] - A row exactly as the remote service returned it
//! - [`StatementType`] - Which statement a line belongs to
//! - [`StatementLine`] - A canonical statement line item
//! - [`FetchResult`] - The outcome of a probe sweep

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::period::{Consolidation, ReportPeriod};

/// A company listed in the disclosure service's corporate directory.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorporateDirectoryEntry {
    /// Stable corporate identifier (OpenDART 8-digit `corp_code`).
    pub identifier: String,
    /// Registered company name.
    pub display_name: String,
    /// Exchange listing code, present only for listed companies.
    pub stock_code: Option<String>,
    /// Date the entry was last modified (`YYYYMMDD`).
    pub modify_date: Option<String>,
}

impl CorporateDirectoryEntry {
    /// Creates a new entry with required fields.
    #[must_use]
    pub fn new(identifier: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            display_name: display_name.into(),
            stock_code: None,
            modify_date: None,
        }
    }

    /// Sets the listing code. Blank codes are treated as unlisted.
    #[must_use]
    pub fn with_stock_code(mut self, stock_code: impl Into<String>) -> Self {
        let code = stock_code.into();
        self.stock_code = if code.trim().is_empty() {
            None
        } else {
            Some(code.trim().to_string())
        };
        self
    }

    /// Sets the last-modified date.
    #[must_use]
    pub fn with_modify_date(mut self, modify_date: impl Into<String>) -> Self {
        self.modify_date = Some(modify_date.into());
        self
    }

    /// Returns true if the company is listed on an exchange.
    #[must_use]
    pub const fn is_listed(&self) -> bool {
        self.stock_code.is_some()
    }
}

/// Parameters of a single probe against the statement service.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Corporate identifier.
    pub identifier: String,
    /// Business year of the filing.
    pub fiscal_year: i32,
    /// Filing period.
    pub report_period: ReportPeriod,
    /// Consolidation scope.
    pub consolidation: Consolidation,
}

impl FetchRequest {
    /// Creates a new fetch request.
    #[must_use]
    pub fn new(
        identifier: impl Into<String>,
        fiscal_year: i32,
        report_period: ReportPeriod,
        consolidation: Consolidation,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            fiscal_year,
            report_period,
            consolidation,
        }
    }
}

impl fmt::Display for FetchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}/{}",
            self.identifier, self.fiscal_year, self.report_period, self.consolidation
        )
    }
}

/// A row as returned by the remote service, keyed by its own field names.
///
/// Field names vary between service versions, so nothing is assumed about
/// which keys are present.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow(BTreeMap<String, String>);

impl RawRow {
    /// Creates an empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds a field, returning the row.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Sets a field.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    /// Returns the value of a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Returns the value of the first field in `aliases` that holds a non-blank value.
    #[must_use]
    pub fn first_of(&self, aliases: &[&str]) -> Option<&str> {
        aliases
            .iter()
            .filter_map(|alias| self.get(alias))
            .find(|value| !value.trim().is_empty())
    }

    /// Number of fields in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the row has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// The financial statement a line item belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementType {
    /// Statement of financial position.
    BalanceSheet,
    /// Income statement.
    IncomeStatement,
    /// Statement of comprehensive income.
    ComprehensiveIncome,
    /// Cash flow statement.
    CashFlow,
    /// Statement of changes in equity.
    EquityChanges,
    /// A code outside the known set, kept verbatim.
    Unrecognized(String),
}

impl StatementType {
    /// Maps an upstream statement code or title to a statement type.
    ///
    /// Accepts the OpenDART `sj_div` abbreviations and the statement titles
    /// that appear in `sj_nm`. Anything else is kept as [`StatementType::Unrecognized`].
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "BS" | "재무상태표" => Self::BalanceSheet,
            "IS" | "손익계산서" => Self::IncomeStatement,
            "CIS" | "포괄손익계산서" => Self::ComprehensiveIncome,
            "CF" | "현금흐름표" => Self::CashFlow,
            "SCE" | "자본변동표" => Self::EquityChanges,
            _ => Self::Unrecognized(code.to_string()),
        }
    }

    /// The canonical code; unrecognized types return their original string.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::BalanceSheet => "BS",
            Self::IncomeStatement => "IS",
            Self::ComprehensiveIncome => "CIS",
            Self::CashFlow => "CF",
            Self::EquityChanges => "SCE",
            Self::Unrecognized(code) => code,
        }
    }

    /// Returns true for the [`StatementType::Unrecognized`] bucket.
    #[must_use]
    pub const fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A canonical financial-statement line item.
///
/// Amounts are the literal strings reported upstream (thousands separators
/// included); no numeric parsing is done.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementLine {
    /// Statement the line belongs to.
    pub statement_type: StatementType,
    /// Account name as reported.
    pub account_name: String,
    /// Amount for the requested fiscal period.
    pub current_amount: Option<String>,
    /// Amount for the comparative prior period.
    pub prior_amount: Option<String>,
}

impl StatementLine {
    /// Creates a line with no amounts.
    #[must_use]
    pub fn new(statement_type: StatementType, account_name: impl Into<String>) -> Self {
        Self {
            statement_type,
            account_name: account_name.into(),
            current_amount: None,
            prior_amount: None,
        }
    }

    /// Sets the current-period amount.
    #[must_use]
    pub fn with_current(mut self, amount: impl Into<String>) -> Self {
        self.current_amount = Some(amount.into());
        self
    }

    /// Sets the prior-period amount.
    #[must_use]
    pub fn with_prior(mut self, amount: impl Into<String>) -> Self {
        self.prior_amount = Some(amount.into());
        self
    }
}

/// Outcome of a probe sweep.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    /// Reconciled line items, in upstream order.
    pub lines: Vec<StatementLine>,
    /// The probe that produced `lines`; `None` when nothing was accepted.
    pub request: Option<FetchRequest>,
    /// True iff a probe met the richness threshold.
    pub sufficient: bool,
    /// Number of probes issued during the sweep.
    pub attempts: usize,
}

impl FetchResult {
    /// A result accepted from `request`.
    #[must_use]
    pub const fn found(request: FetchRequest, lines: Vec<StatementLine>, attempts: usize) -> Self {
        Self {
            lines,
            request: Some(request),
            sufficient: true,
            attempts,
        }
    }

    /// The explicit empty result of an exhausted sweep.
    #[must_use]
    pub const fn empty(attempts: usize) -> Self {
        Self {
            lines: Vec::new(),
            request: None,
            sufficient: false,
            attempts,
        }
    }

    /// Number of line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if there are no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns an iterator over the lines of one statement.
    pub fn statement(&self, statement_type: &StatementType) -> impl Iterator<Item = &StatementLine> {
        self.lines
            .iter()
            .filter(move |l| &l.statement_type == statement_type)
    }
}
