//! Statement probe sweep.
//!
//! A sweep tries `(report period, consolidation)` combinations in priority
//! order and accepts the first response rich enough to look like a real
//! statement. Probes run one at a time so an early hit stops the sweep.

use finstate_core::{
    Consolidation, FetchError, FetchRequest, FetchResult, QueryError, RawRow, ReportPeriod,
    StatementQuery, reconcile,
};
use tracing::{debug, info, warn};

/// Default richness threshold: a response needs more than this many rows.
pub const DEFAULT_MIN_ROWS: usize = 5;

/// Probe ordering and acceptance policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPolicy {
    /// A response is sufficient iff it has strictly more rows than this.
    pub min_rows: usize,
    /// Combinations to try, highest priority first.
    pub probe_order: Vec<(ReportPeriod, Consolidation)>,
}

impl Default for FetchPolicy {
    /// Interim filings before annual, separate before consolidated.
    fn default() -> Self {
        Self {
            min_rows: DEFAULT_MIN_ROWS,
            probe_order: probe_order(&ReportPeriod::ALL, &Consolidation::ALL),
        }
    }
}

impl FetchPolicy {
    /// Like the default, but with annual filings probed first.
    #[must_use]
    pub fn annual_first() -> Self {
        let periods = [
            ReportPeriod::Annual,
            ReportPeriod::Q1,
            ReportPeriod::H1,
            ReportPeriod::Q3,
        ];
        Self {
            probe_order: probe_order(&periods, &Consolidation::ALL),
            ..Self::default()
        }
    }

    /// Sets the richness threshold.
    #[must_use]
    pub const fn with_min_rows(mut self, min_rows: usize) -> Self {
        self.min_rows = min_rows;
        self
    }

    /// Replaces the probe order.
    #[must_use]
    pub fn with_probe_order(mut self, probe_order: Vec<(ReportPeriod, Consolidation)>) -> Self {
        self.probe_order = probe_order;
        self
    }

    /// Returns true if a response with `rows` rows would be accepted.
    #[must_use]
    pub const fn is_sufficient(&self, rows: usize) -> bool {
        rows > self.min_rows
    }

    /// The requests a sweep for this company and year would issue, in order.
    #[must_use]
    pub fn requests(&self, identifier: &str, fiscal_year: i32) -> Vec<FetchRequest> {
        self.probe_order
            .iter()
            .map(|&(period, consolidation)| {
                FetchRequest::new(identifier, fiscal_year, period, consolidation)
            })
            .collect()
    }
}

/// Cartesian product with `periods` as the outer loop.
fn probe_order(
    periods: &[ReportPeriod],
    scopes: &[Consolidation],
) -> Vec<(ReportPeriod, Consolidation)> {
    periods
        .iter()
        .flat_map(|&period| scopes.iter().map(move |&scope| (period, scope)))
        .collect()
}

/// Outcome of one probe.
#[derive(Debug)]
pub enum ProbeOutcome {
    /// The response met the threshold.
    Sufficient(Vec<RawRow>),
    /// The service answered, but with too few rows.
    Insufficient {
        /// Number of rows returned.
        rows: usize,
    },
    /// The query itself failed.
    Failed(QueryError),
}

/// Runs one probe and classifies its outcome.
pub async fn probe<Q>(query: &Q, request: &FetchRequest, policy: &FetchPolicy) -> ProbeOutcome
where
    Q: StatementQuery + ?Sized,
{
    match query.query(request).await {
        Ok(rows) if policy.is_sufficient(rows.len()) => ProbeOutcome::Sufficient(rows),
        Ok(rows) => ProbeOutcome::Insufficient { rows: rows.len() },
        Err(e) => ProbeOutcome::Failed(e),
    }
}

/// Retrieves the statements for a company and fiscal year.
///
/// Returns the first sufficient probe, reconciled into canonical lines. If the
/// sweep finds nothing sufficient the result is empty with `sufficient = false`.
/// Individual query failures are skipped; only when every probe fails is a
/// [`FetchError`] returned.
pub async fn fetch<Q>(
    identifier: &str,
    fiscal_year: i32,
    query: &Q,
    policy: &FetchPolicy,
) -> Result<FetchResult, FetchError>
where
    Q: StatementQuery + ?Sized,
{
    let mut failures = Vec::new();
    let mut attempts = 0;

    for request in policy.requests(identifier, fiscal_year) {
        attempts += 1;
        debug!(request = %request, source = query.name(), "Probing statements");

        match probe(query, &request, policy).await {
            ProbeOutcome::Sufficient(rows) => {
                info!(
                    request = %request,
                    rows = rows.len(),
                    attempts,
                    "Found statements"
                );
                let lines = reconcile(rows);
                return Ok(FetchResult::found(request, lines, attempts));
            }
            ProbeOutcome::Insufficient { rows } => {
                debug!(request = %request, rows, "Probe insufficient, trying next");
            }
            ProbeOutcome::Failed(e) => {
                warn!(request = %request, error = %e, "Probe failed, trying next");
                failures.push((request, e));
            }
        }
    }

    if attempts > 0 && failures.len() == attempts {
        return Err(FetchError::new(failures));
    }

    debug!(
        corp_code = identifier,
        fiscal_year,
        attempts,
        failed = failures.len(),
        "No sufficient statement found"
    );
    Ok(FetchResult::empty(attempts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use finstate_core::{FinstateError, StatementType};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Scripted responses per combination; unscripted combinations return no rows.
    #[derive(Debug, Default)]
    struct FakeQuery {
        responses: HashMap<(ReportPeriod, Consolidation), Result<usize, String>>,
        calls: Mutex<Vec<FetchRequest>>,
    }

    impl FakeQuery {
        fn rows(mut self, period: ReportPeriod, scope: Consolidation, count: usize) -> Self {
            self.responses.insert((period, scope), Ok(count));
            self
        }

        fn failing(mut self, period: ReportPeriod, scope: Consolidation) -> Self {
            self.responses
                .insert((period, scope), Err(format!("{period} {scope} unavailable")));
            self
        }

        fn always_failing() -> Self {
            let mut fake = Self::default();
            for (period, scope) in FetchPolicy::default().probe_order {
                fake = fake.failing(period, scope);
            }
            fake
        }

        fn calls(&self) -> Vec<FetchRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StatementQuery for FakeQuery {
        fn name(&self) -> &str {
            "fake"
        }

        async fn query(&self, request: &FetchRequest) -> Result<Vec<RawRow>, QueryError> {
            self.calls.lock().unwrap().push(request.clone());
            match self
                .responses
                .get(&(request.report_period, request.consolidation))
            {
                Some(Ok(count)) => Ok((0..*count)
                    .map(|i| {
                        RawRow::new()
                            .with("sj_div", "BS")
                            .with("account_nm", format!("account {i}"))
                            .with("thstrm_amount", "1,000")
                    })
                    .collect()),
                Some(Err(message)) => Err(FinstateError::Network(message.clone())),
                None => Ok(Vec::new()),
            }
        }
    }

    #[test]
    fn test_default_probe_order() {
        let order = FetchPolicy::default().probe_order;
        assert_eq!(order.len(), 8);
        assert_eq!(order[0], (ReportPeriod::Q1, Consolidation::Separate));
        assert_eq!(order[1], (ReportPeriod::Q1, Consolidation::Consolidated));
        assert_eq!(order[2], (ReportPeriod::H1, Consolidation::Separate));
        assert_eq!(order[7], (ReportPeriod::Annual, Consolidation::Consolidated));
    }

    #[test]
    fn test_annual_first_order() {
        let policy = FetchPolicy::annual_first();
        assert_eq!(policy.probe_order[0], (ReportPeriod::Annual, Consolidation::Separate));
        assert_eq!(policy.probe_order.len(), 8);
        assert_eq!(policy.min_rows, DEFAULT_MIN_ROWS);
    }

    #[test]
    fn test_sufficiency_boundary() {
        let policy = FetchPolicy::default();
        assert!(!policy.is_sufficient(0));
        assert!(!policy.is_sufficient(5));
        assert!(policy.is_sufficient(6));

        let strict = FetchPolicy::default().with_min_rows(10);
        assert!(!strict.is_sufficient(10));
        assert!(strict.is_sufficient(11));
    }

    #[tokio::test]
    async fn test_short_circuits_on_first_sufficient() {
        let query = FakeQuery::default().rows(ReportPeriod::H1, Consolidation::Consolidated, 6);

        let result = fetch("00126380", 2023, &query, &FetchPolicy::default())
            .await
            .unwrap();

        assert!(result.sufficient);
        assert_eq!(result.len(), 6);
        let request = result.request.unwrap();
        assert_eq!(request.report_period, ReportPeriod::H1);
        assert_eq!(request.consolidation, Consolidation::Consolidated);

        let calls = query.calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(result.attempts, 4);
        assert_eq!(calls.last(), Some(&request));
    }

    #[tokio::test]
    async fn test_five_rows_is_not_enough() {
        let query = FakeQuery::default()
            .rows(ReportPeriod::Q1, Consolidation::Separate, 5)
            .rows(ReportPeriod::Q3, Consolidation::Separate, 6);

        let result = fetch("00126380", 2023, &query, &FetchPolicy::default())
            .await
            .unwrap();

        let request = result.request.unwrap();
        assert_eq!(request.report_period, ReportPeriod::Q3);
        assert_eq!(request.consolidation, Consolidation::Separate);
    }

    #[tokio::test]
    async fn test_partial_failure_tolerated() {
        let query = FakeQuery::default()
            .failing(ReportPeriod::Q1, Consolidation::Separate)
            .rows(ReportPeriod::Q1, Consolidation::Consolidated, 10);

        let result = fetch("00126380", 2023, &query, &FetchPolicy::default())
            .await
            .unwrap();

        assert!(result.sufficient);
        assert_eq!(result.len(), 10);
        assert_eq!(result.attempts, 2);
    }

    #[tokio::test]
    async fn test_exhausted_sweep_is_empty() {
        let query = FakeQuery::default().rows(ReportPeriod::Annual, Consolidation::Consolidated, 3);

        let result = fetch("00126380", 2023, &query, &FetchPolicy::default())
            .await
            .unwrap();

        assert!(!result.sufficient);
        assert!(result.is_empty());
        assert!(result.request.is_none());
        assert_eq!(query.calls().len(), 8);
    }

    #[tokio::test]
    async fn test_mixed_failures_and_empty_is_not_an_error() {
        let query = FakeQuery::default()
            .failing(ReportPeriod::Q1, Consolidation::Separate)
            .failing(ReportPeriod::H1, Consolidation::Separate);

        let result = fetch("00126380", 2023, &query, &FetchPolicy::default())
            .await
            .unwrap();
        assert!(!result.sufficient);
        assert_eq!(result.attempts, 8);
    }

    #[tokio::test]
    async fn test_total_failure_is_fetch_error() {
        let query = FakeQuery::always_failing();

        let err = fetch("00126380", 2023, &query, &FetchPolicy::default())
            .await
            .unwrap_err();

        assert_eq!(err.attempts(), 8);
        assert_eq!(err.failures[0].0.report_period, ReportPeriod::Q1);
        assert!(matches!(err.last(), Some(FinstateError::Network(_))));
    }

    #[tokio::test]
    async fn test_accepted_rows_are_reconciled() {
        let query = FakeQuery::default().rows(ReportPeriod::Q1, Consolidation::Separate, 7);

        let result = fetch("00126380", 2023, &query, &FetchPolicy::default())
            .await
            .unwrap();

        assert!(
            result
                .lines
                .iter()
                .all(|l| l.statement_type == StatementType::BalanceSheet)
        );
        assert_eq!(result.lines[0].account_name, "account 0");
        assert_eq!(result.lines[0].current_amount.as_deref(), Some("1,000"));
        assert_eq!(result.lines[0].prior_amount, None);
    }

    #[tokio::test]
    async fn test_custom_order_is_respected() {
        let query = FakeQuery::default()
            .rows(ReportPeriod::Q1, Consolidation::Separate, 8)
            .rows(ReportPeriod::Annual, Consolidation::Consolidated, 8);
        let policy = FetchPolicy::annual_first();

        let result = fetch("00126380", 2023, &query, &policy).await.unwrap();

        let request = result.request.unwrap();
        assert_eq!(request.report_period, ReportPeriod::Annual);
        assert_eq!(request.consolidation, Consolidation::Consolidated);
        assert_eq!(result.attempts, 2);
    }
}
