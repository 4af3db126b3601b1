//! Schema reconciliation.
//!
//! The statement service has shipped rows under more than one field naming
//! scheme. Each logical field has a fixed priority list of aliases; the first
//! alias holding a non-blank value wins. The canonical name always comes first so that
//! already-reconciled data maps onto itself.

use tracing::debug;

use crate::types::{RawRow, StatementLine, StatementType};

/// Aliases for the statement-type field.
pub const STATEMENT_TYPE_FIELDS: &[&str] = &["statement_type", "sj_div", "sj_nm"];
/// Aliases for the account-name field.
pub const ACCOUNT_NAME_FIELDS: &[&str] = &["account_name", "account_nm"];
/// Aliases for the current-period amount field.
pub const CURRENT_AMOUNT_FIELDS: &[&str] = &["current_amount", "thstrm_amount"];
/// Aliases for the prior-period amount field.
pub const PRIOR_AMOUNT_FIELDS: &[&str] = &["prior_amount", "frmtrm_amount"];

/// Conversion of one row into a canonical [`StatementLine`].
pub trait Reconcile {
    /// Converts the row, never dropping it.
    fn reconcile(self) -> StatementLine;
}

impl Reconcile for RawRow {
    fn reconcile(self) -> StatementLine {
        let statement_type = match self.first_of(STATEMENT_TYPE_FIELDS) {
            Some(code) => StatementType::from_code(code),
            None => {
                debug!("Row has no statement type field");
                StatementType::Unrecognized(String::new())
            }
        };

        StatementLine {
            statement_type,
            account_name: self
                .first_of(ACCOUNT_NAME_FIELDS)
                .unwrap_or_default()
                .to_string(),
            current_amount: amount(&self, CURRENT_AMOUNT_FIELDS),
            prior_amount: amount(&self, PRIOR_AMOUNT_FIELDS),
        }
    }
}

impl Reconcile for &RawRow {
    fn reconcile(self) -> StatementLine {
        self.clone().reconcile()
    }
}

impl Reconcile for StatementLine {
    fn reconcile(self) -> StatementLine {
        let Self {
            statement_type,
            account_name,
            current_amount,
            prior_amount,
        } = self;

        let statement_type = match statement_type {
            StatementType::Unrecognized(code) => StatementType::from_code(&code),
            known => known,
        };
        Self {
            statement_type,
            account_name,
            current_amount: current_amount.filter(|a| !a.trim().is_empty()),
            prior_amount: prior_amount.filter(|a| !a.trim().is_empty()),
        }
    }
}

/// Reconciles a sequence of rows, preserving order and length.
pub fn reconcile<R, I>(rows: I) -> Vec<StatementLine>
where
    R: Reconcile,
    I: IntoIterator<Item = R>,
{
    rows.into_iter().map(Reconcile::reconcile).collect()
}

/// Blank amounts are reported as missing.
fn amount(row: &RawRow, aliases: &[&str]) -> Option<String> {
    row.first_of(aliases).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dart_row(sj_div: &str, account: &str, current: &str, prior: Option<&str>) -> RawRow {
        let row = RawRow::new()
            .with("sj_div", sj_div)
            .with("account_nm", account)
            .with("thstrm_amount", current);
        match prior {
            Some(p) => row.with("frmtrm_amount", p),
            None => row,
        }
    }

    #[test]
    fn test_reconcile_dart_rows() {
        let lines = reconcile(vec![
            dart_row("BS", "자산총계", "100,000", Some("90,000")),
            dart_row("IS", "매출액", "200,000", None),
        ]);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].statement_type, StatementType::BalanceSheet);
        assert_eq!(lines[0].account_name, "자산총계");
        assert_eq!(lines[0].current_amount.as_deref(), Some("100,000"));
        assert_eq!(lines[0].prior_amount.as_deref(), Some("90,000"));
        assert_eq!(lines[1].statement_type, StatementType::IncomeStatement);
        assert_eq!(lines[1].prior_amount, None);
    }

    #[test]
    fn test_legacy_title_field() {
        let row = RawRow::new()
            .with("sj_nm", "포괄손익계산서")
            .with("account_nm", "총포괄손익");
        let line = row.reconcile();
        assert_eq!(line.statement_type, StatementType::ComprehensiveIncome);
    }

    #[test]
    fn test_blank_amounts_are_missing() {
        let line = dart_row("CF", "영업활동현금흐름", "", Some("  ")).reconcile();
        assert_eq!(line.current_amount, None);
        assert_eq!(line.prior_amount, None);
    }

    #[test]
    fn test_blank_alias_falls_through() {
        let line = RawRow::new()
            .with("sj_div", " ")
            .with("sj_nm", "현금흐름표")
            .with("account_nm", "영업활동현금흐름")
            .with("current_amount", "")
            .with("thstrm_amount", "12,345")
            .reconcile();

        assert_eq!(line.statement_type, StatementType::CashFlow);
        assert_eq!(line.current_amount.as_deref(), Some("12,345"));
        assert_eq!(line.prior_amount, None);
    }

    #[test]
    fn test_unrecognized_code_preserved() {
        let lines = reconcile(vec![dart_row("XYZ", "기타", "1", None)]);
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0].statement_type,
            StatementType::Unrecognized("XYZ".to_string())
        );
        assert_eq!(lines[0].statement_type.code(), "XYZ");
    }

    #[test]
    fn test_missing_statement_type_kept() {
        let row = RawRow::new().with("account_nm", "자본총계");
        let line = row.reconcile();
        assert!(!line.statement_type.is_recognized());
        assert_eq!(line.account_name, "자본총계");
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let once = reconcile(vec![
            dart_row("BS", "자산총계", "100,000", Some("90,000")),
            dart_row("SCE", "자본총계", "5", None),
            dart_row("XYZ", "기타", "1", None),
        ]);
        let twice = reconcile(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_borrowed_rows() {
        let rows = vec![dart_row("CIS", "총포괄손익", "7", None)];
        let lines = reconcile(&rows);
        assert_eq!(lines[0].statement_type, StatementType::ComprehensiveIncome);
        assert_eq!(rows.len(), 1);
    }
}
