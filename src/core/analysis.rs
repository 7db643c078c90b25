//! Combines dealers, metrics and the analysis period into the aggregate.

use crate::core::{dealers, fields, metrics};
use crate::domain::model::{DateRange, ProcessedResult, Sheet, SheetSet};
use crate::domain::schema::SALE_DATE;

/// Derives the full aggregate from the five sheets.
///
/// Pure: both ingestion paths feed the same computation. The raw sheets are
/// retained in the result for drill-down.
pub fn analyze(sheets: SheetSet) -> ProcessedResult {
    let period = extract_period(&sheets.leads);
    let dealer_names = dealers::extract_dealers(&sheets);
    let summary = metrics::compute_metrics(&sheets);

    ProcessedResult {
        leads: summary.leads,
        test_drives: summary.test_drives,
        billed: summary.billed,
        total_store_visits: summary.total_store_visits,
        avg_lead_to_test_drive: summary.avg_lead_to_test_drive,
        avg_test_drive_to_billing: summary.avg_test_drive_to_billing,
        avg_lead_to_billing: summary.avg_lead_to_billing,
        avg_total_journey: summary.avg_total_journey,
        decided_leads_count: summary.decided_leads_count,
        decided_leads_percentage: summary.decided_leads_percentage,
        billed_leads_count: summary.billed_leads_count,
        funnel_metrics: summary.funnel,
        period,
        dealers: dealer_names,
        raw_data: sheets,
    }
}

/// The analysis date range: min and max parseable sale date on the leads
/// sheet. Rows with unparseable dates are skipped.
fn extract_period(leads: &Sheet) -> DateRange {
    let mut dates: Vec<_> = leads
        .iter()
        .filter_map(|row| fields::resolve(row, &SALE_DATE))
        .filter_map(crate::core::dates::parse_date)
        .collect();

    if dates.is_empty() {
        tracing::debug!("no valid sale dates found");
        return DateRange::default();
    }

    dates.sort();
    let range = DateRange {
        start: dates.first().copied(),
        end: dates.last().copied(),
    };
    tracing::info!(valid_dates = dates.len(), ?range.start, ?range.end, "analysis period");
    range
}
