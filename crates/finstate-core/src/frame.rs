//! Tabular view of a fetch result.

use polars::prelude::{Column, DataFrame};

use crate::{
    error::{FinstateError, Result},
    types::FetchResult,
};

impl FetchResult {
    /// Builds a DataFrame with columns: statement_type, account_name,
    /// current_amount, prior_amount.
    ///
    /// Amount columns are strings; missing amounts are null.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let statement_types: Vec<&str> = self
            .lines
            .iter()
            .map(|l| l.statement_type.code())
            .collect();
        let accounts: Vec<&str> = self.lines.iter().map(|l| l.account_name.as_str()).collect();
        let current: Vec<Option<&str>> = self
            .lines
            .iter()
            .map(|l| l.current_amount.as_deref())
            .collect();
        let prior: Vec<Option<&str>> = self
            .lines
            .iter()
            .map(|l| l.prior_amount.as_deref())
            .collect();

        DataFrame::new(vec![
            Column::new("statement_type".into(), statement_types),
            Column::new("account_name".into(), accounts),
            Column::new("current_amount".into(), current),
            Column::new("prior_amount".into(), prior),
        ])
        .map_err(|e| FinstateError::Other(e.to_string()))
    }
}
