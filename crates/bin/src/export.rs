//! CSV export of statement lines.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use finstate::FetchResult;
use thiserror::Error;

/// Errors that can occur during export.
#[derive(Debug, Error)]
pub(crate) enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes `result` as CSV: a header row, then one record per line.
///
/// Amount columns are headed by the fiscal year and the year before it.
/// Missing amounts are written as empty fields.
pub(crate) fn write_csv<W: Write>(
    result: &FetchResult,
    fiscal_year: i32,
    writer: W,
) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "statement_type".to_string(),
        "account_name".to_string(),
        fiscal_year.to_string(),
        fiscal_year.saturating_sub(1).to_string(),
    ])?;

    for line in &result.lines {
        wtr.write_record([
            line.statement_type.code(),
            line.account_name.as_str(),
            line.current_amount.as_deref().unwrap_or_default(),
            line.prior_amount.as_deref().unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes `result` as CSV to the file at `path`, replacing it.
pub(crate) fn export_to_file(
    result: &FetchResult,
    fiscal_year: i32,
    path: &Path,
) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_csv(result, fiscal_year, file)
}
