//! Report period and consolidation scope definitions.
//!
//! This module defines [`ReportPeriod`], the filing a statement comes from, and
//! [`Consolidation`], whether the statement covers the group or the parent alone.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Filing period a statement is reported in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReportPeriod {
    /// First-quarter report.
    Q1,
    /// Half-year report.
    H1,
    /// Third-quarter report.
    Q3,
    /// Annual business report.
    Annual,
}

impl ReportPeriod {
    /// All periods, in the default probe priority (interim filings first).
    pub const ALL: [Self; 4] = [Self::Q1, Self::H1, Self::Q3, Self::Annual];

    /// OpenDART `reprt_code` for this period.
    #[must_use]
    pub const fn dart_code(&self) -> &'static str {
        match self {
            Self::Q1 => "11013",
            Self::H1 => "11012",
            Self::Q3 => "11014",
            Self::Annual => "11011",
        }
    }

    /// Parses an OpenDART `reprt_code`.
    #[must_use]
    pub fn from_dart_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.dart_code() == code)
    }

    /// Short label used in logs, cache keys and exports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Q1 => "Q1",
            Self::H1 => "H1",
            Self::Q3 => "Q3",
            Self::Annual => "ANNUAL",
        }
    }

    /// Parses a label produced by [`ReportPeriod::as_str`].
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == label)
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consolidation scope of a statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Consolidation {
    /// Parent company only (OpenDART `OFS`).
    Separate,
    /// Group including subsidiaries (OpenDART `CFS`).
    Consolidated,
}

impl Consolidation {
    /// Both scopes, in the default probe priority.
    pub const ALL: [Self; 2] = [Self::Separate, Self::Consolidated];

    /// OpenDART `fs_div` value for this scope.
    #[must_use]
    pub const fn dart_code(&self) -> &'static str {
        match self {
            Self::Separate => "OFS",
            Self::Consolidated => "CFS",
        }
    }

    /// Short label used in logs, cache keys and exports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Separate => "SEPARATE",
            Self::Consolidated => "CONSOLIDATED",
        }
    }

    /// Parses a label produced by [`Consolidation::as_str`].
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == label)
    }
}

impl fmt::Display for Consolidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dart_codes() {
        assert_eq!(ReportPeriod::Q1.dart_code(), "11013");
        assert_eq!(ReportPeriod::Annual.dart_code(), "11011");
        assert_eq!(ReportPeriod::from_dart_code("11014"), Some(ReportPeriod::Q3));
        assert_eq!(ReportPeriod::from_dart_code("99999"), None);
        assert_eq!(Consolidation::Consolidated.dart_code(), "CFS");
        assert_eq!(Consolidation::Separate.dart_code(), "OFS");
    }

    #[test]
    fn test_labels_round_trip() {
        for period in ReportPeriod::ALL {
            assert_eq!(ReportPeriod::from_label(period.as_str()), Some(period));
        }
        for scope in Consolidation::ALL {
            assert_eq!(Consolidation::from_label(&scope.to_string()), Some(scope));
        }
    }
}
