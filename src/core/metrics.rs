//! Funnel-metric computation over the five sheets.

use crate::core::fields::{self, Flag};
use crate::domain::model::{FunnelMetricPair, FunnelMetrics, RawRecord, SheetSet};
use crate::domain::schema::{
    DAYS_LEAD_TO_BILLING, DAYS_LEAD_TO_TEST_DRIVE, DAYS_TEST_DRIVE_TO_BILLING, FLAG_BILLED,
    FLAG_TEST_DRIVE,
};
use serde_json::Value;

/// A lead that billed within this many days counts as "decided".
const DECIDED_LEAD_MAX_DAYS: f64 = 10.0;

/// Everything the metrics engine derives from the sheets; period, dealers and
/// raw data are combined in separately.
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub leads: u64,
    pub test_drives: u64,
    pub billed: u64,
    pub total_store_visits: u64,
    pub avg_lead_to_test_drive: Option<f64>,
    pub avg_test_drive_to_billing: Option<f64>,
    pub avg_lead_to_billing: Option<f64>,
    pub avg_total_journey: Option<f64>,
    pub decided_leads_count: u64,
    pub decided_leads_percentage: f64,
    pub billed_leads_count: u64,
    pub funnel: FunnelMetrics,
}

/// Computes all funnel metrics from row counts and field predicates.
///
/// Pure: no external state, no failure mode. Malformed individual field
/// values are excluded from the relevant aggregate rather than raised.
pub fn compute_metrics(sheets: &SheetSet) -> MetricsSummary {
    let total_leads = sheets.leads.len() as u64;
    let total_test_drives = sheets.test_drives.len() as u64;
    let total_journeys = sheets.complete_journey.len() as u64;
    let billed_sheet_rows = sheets.billed.len() as u64;

    let total_store_visits = sum_store_visits(&sheets.store_visits);

    let leads_with_test_drive = count_rows(&sheets.leads, |row| {
        fields::resolve_flag(row, &FLAG_TEST_DRIVE).is_true()
    });
    let leads_billed = count_rows(&sheets.leads, |row| {
        fields::resolve_flag(row, &FLAG_BILLED).is_true()
    });
    let test_drives_billed = count_rows(&sheets.test_drives, |row| {
        fields::resolve_flag(row, &FLAG_BILLED).is_true()
    });
    let leads_direct = count_rows(&sheets.leads, |row| {
        fields::resolve_flag(row, &FLAG_BILLED).is_true()
            && fields::resolve_flag(row, &FLAG_TEST_DRIVE) != Flag::True
    });

    // The dedicated billed sheet is authoritative when present; otherwise
    // fall back to the flag-derived counts from leads and test drives.
    let total_billed = if billed_sheet_rows > 0 {
        billed_sheet_rows
    } else {
        leads_billed + test_drives_billed
    };

    tracing::debug!(
        total_leads,
        total_test_drives,
        total_journeys,
        billed_sheet_rows,
        total_store_visits,
        leads_with_test_drive,
        leads_billed,
        test_drives_billed,
        leads_direct,
        total_billed,
        "funnel counts"
    );

    let funnel = FunnelMetrics {
        leads_direct: FunnelMetricPair {
            from: total_leads,
            to: leads_direct,
        },
        leads_with_test_drive: FunnelMetricPair {
            from: total_leads,
            to: leads_with_test_drive,
        },
        test_drive_to_sale: FunnelMetricPair {
            from: total_test_drives,
            to: test_drives_billed,
        },
        complete_journey: FunnelMetricPair {
            from: total_leads,
            to: total_journeys,
        },
        visits_to_test_drive: FunnelMetricPair {
            from: total_store_visits,
            to: total_test_drives,
        },
        visits_to_billing: FunnelMetricPair {
            from: total_store_visits,
            to: total_billed,
        },
    };

    // Duration averages, each collected from the sheets where the field
    // legitimately appears.
    let mut lead_to_test_drive = Vec::new();
    let mut lead_to_billing = Vec::new();
    let mut test_drive_to_billing = Vec::new();
    let mut total_journey = Vec::new();

    for row in sheets.leads.iter().chain(sheets.complete_journey.iter()) {
        if let Some(days) = fields::resolve_number(row, &DAYS_LEAD_TO_TEST_DRIVE) {
            lead_to_test_drive.push(days);
        }
        if let Some(days) = fields::resolve_number(row, &DAYS_LEAD_TO_BILLING) {
            lead_to_billing.push(days);
        }
    }
    for row in sheets
        .test_drives
        .iter()
        .chain(sheets.complete_journey.iter())
    {
        if let Some(days) = fields::resolve_number(row, &DAYS_TEST_DRIVE_TO_BILLING) {
            test_drive_to_billing.push(days);
        }
    }
    for row in &sheets.complete_journey {
        if let Some(days) = fields::resolve_number(row, &DAYS_LEAD_TO_BILLING) {
            total_journey.push(days);
        }
    }

    // Decided leads: rows of the leads and complete-journey sheets whose
    // lead-to-billing duration is present and within the threshold.
    let decided_leads_count = sheets
        .leads
        .iter()
        .chain(sheets.complete_journey.iter())
        .filter(|row| {
            fields::resolve_number(row, &DAYS_LEAD_TO_BILLING)
                .is_some_and(|days| days <= DECIDED_LEAD_MAX_DAYS)
        })
        .count() as u64;

    let billed_leads_count = leads_billed + total_journeys;
    let decided_leads_percentage = if billed_leads_count > 0 {
        (decided_leads_count as f64 / billed_leads_count as f64) * 100.0
    } else {
        0.0
    };

    MetricsSummary {
        leads: total_leads,
        test_drives: total_test_drives,
        billed: total_billed,
        total_store_visits,
        avg_lead_to_test_drive: mean(&lead_to_test_drive),
        avg_test_drive_to_billing: mean(&test_drive_to_billing),
        avg_lead_to_billing: mean(&lead_to_billing),
        avg_total_journey: mean(&total_journey),
        decided_leads_count,
        decided_leads_percentage,
        billed_leads_count,
        funnel,
    }
}

fn count_rows<F: Fn(&RawRecord) -> bool>(sheet: &[RawRecord], pred: F) -> u64 {
    sheet.iter().filter(|row| pred(row)).count() as u64
}

/// Sums the third positional column of each store-visits row.
///
/// This sheet's schema is externally fixed and column-name-agnostic, so
/// access is by position, an intentional exception to synonym resolution.
fn sum_store_visits(sheet: &[RawRecord]) -> u64 {
    let mut total = 0.0_f64;
    for row in sheet {
        let Some((_, value)) = row.data.iter().nth(2) else {
            continue;
        };
        let visits = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        if let Some(v) = visits {
            total += v;
        }
    }
    total.max(0.0).round() as u64
}

/// Average of the collected values; `None` when nothing was collected,
/// never zero or NaN.
fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(values: Vec<serde_json::Value>) -> Vec<RawRecord> {
        values.into_iter().map(RawRecord::from_value).collect()
    }

    #[test]
    fn test_leads_direct_pair() {
        // 10 leads, exactly 3 billed without a test drive.
        let mut leads = Vec::new();
        for _ in 0..3 {
            leads.push(json!({"Flag_Faturado": 1, "Flag_TestDrive": 0}));
        }
        leads.push(json!({"Flag_Faturado": 1, "Flag_TestDrive": 1}));
        for _ in 0..6 {
            leads.push(json!({"Flag_Faturado": 0}));
        }
        let sheets = SheetSet {
            leads: rows(leads),
            ..Default::default()
        };

        let summary = compute_metrics(&sheets);
        assert_eq!(
            summary.funnel.leads_direct,
            FunnelMetricPair { from: 10, to: 3 }
        );
        assert_eq!(
            summary.funnel.leads_with_test_drive,
            FunnelMetricPair { from: 10, to: 1 }
        );
    }

    #[test]
    fn test_billed_fallback_when_sheet_empty() {
        let sheets = SheetSet {
            leads: rows(vec![
                json!({"Flag_Faturado": 1}),
                json!({"Flag_Faturado": "1"}),
            ]),
            test_drives: rows(vec![json!({"Faturado": true}), json!({"Faturado": 0})]),
            ..Default::default()
        };
        let summary = compute_metrics(&sheets);
        // Billed sheet empty: 2 lead flags + 1 test-drive flag.
        assert_eq!(summary.billed, 3);
    }

    #[test]
    fn test_billed_sheet_preferred_when_present() {
        let sheets = SheetSet {
            leads: rows(vec![json!({"Flag_Faturado": 1})]),
            billed: rows(vec![json!({}), json!({}), json!({}), json!({})]),
            ..Default::default()
        };
        let summary = compute_metrics(&sheets);
        assert_eq!(summary.billed, 4);
        assert_eq!(summary.funnel.visits_to_billing.to, 4);
    }

    #[test]
    fn test_store_visits_positional_sum() {
        let sheets = SheetSet {
            store_visits: rows(vec![
                json!({"Loja": "A", "Mes": "Jan", "Visitas": 120}),
                json!({"Store": "B", "Month": "Jan", "Count": "80"}),
                json!({"Loja": "C", "Mes": "Jan", "Visitas": "n/a"}),
                json!({"Loja": "D"}),
            ]),
            ..Default::default()
        };
        let summary = compute_metrics(&sheets);
        assert_eq!(summary.total_store_visits, 200);
    }

    #[test]
    fn test_empty_duration_averages_are_none() {
        let sheets = SheetSet {
            leads: rows(vec![json!({"Flag_Faturado": 1})]),
            ..Default::default()
        };
        let summary = compute_metrics(&sheets);
        assert_eq!(summary.avg_lead_to_test_drive, None);
        assert_eq!(summary.avg_test_drive_to_billing, None);
        assert_eq!(summary.avg_lead_to_billing, None);
        assert_eq!(summary.avg_total_journey, None);
    }

    #[test]
    fn test_duration_average_sources() {
        let sheets = SheetSet {
            leads: rows(vec![
                json!({"Dias_Lead_TestDrive": 2, "Dias_Lead_Faturamento": 8}),
                json!({"Dias_Lead_TestDrive": "bad"}),
            ]),
            test_drives: rows(vec![json!({"Dias_TestDrive_Faturamento": 3})]),
            complete_journey: rows(vec![
                json!({
                    "Dias_Lead_TestDrive": 4,
                    "Dias_TestDrive_Faturamento": 5,
                    "Dias_Lead_Faturamento": 12
                }),
            ]),
            ..Default::default()
        };
        let summary = compute_metrics(&sheets);
        assert_eq!(summary.avg_lead_to_test_drive, Some(3.0)); // (2 + 4) / 2
        assert_eq!(summary.avg_test_drive_to_billing, Some(4.0)); // (3 + 5) / 2
        assert_eq!(summary.avg_lead_to_billing, Some(10.0)); // (8 + 12) / 2
        assert_eq!(summary.avg_total_journey, Some(12.0)); // sheet 3 only
    }

    #[test]
    fn test_decided_leads() {
        let sheets = SheetSet {
            leads: rows(vec![
                json!({"Flag_Faturado": 1, "Dias_Lead_Faturamento": 5}),
                json!({"Flag_Faturado": 1, "Dias_Lead_Faturamento": 15}),
            ]),
            complete_journey: rows(vec![
                json!({"Dias_Lead_Faturamento": 10}),
                json!({"Dias_Lead_Faturamento": "7"}),
            ]),
            ..Default::default()
        };
        let summary = compute_metrics(&sheets);
        // Within threshold: 5, 10 and "7"; denominator = 2 billed leads + 2 journeys.
        assert_eq!(summary.decided_leads_count, 3);
        assert_eq!(summary.billed_leads_count, 4);
        assert_eq!(summary.decided_leads_percentage, 75.0);
    }

    #[test]
    fn test_decided_percentage_zero_denominator() {
        let sheets = SheetSet {
            leads: rows(vec![json!({"Flag_Faturado": 0})]),
            ..Default::default()
        };
        let summary = compute_metrics(&sheets);
        assert_eq!(summary.decided_leads_percentage, 0.0);
        assert!(summary.decided_leads_percentage.is_finite());
    }

    #[test]
    fn test_flag_to_may_exceed_from() {
        // Flag-derived billed counts are heuristic; more billed than visits
        // is an accepted data-quality artifact, not clamped.
        let sheets = SheetSet {
            billed: rows(vec![json!({}), json!({})]),
            store_visits: rows(vec![json!({"a": 1, "b": 2, "c": 1})]),
            ..Default::default()
        };
        let summary = compute_metrics(&sheets);
        assert_eq!(summary.funnel.visits_to_billing.from, 1);
        assert_eq!(summary.funnel.visits_to_billing.to, 2);
    }
}
