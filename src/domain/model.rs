use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row from any source: a column-name to scalar mapping.
///
/// The underlying map preserves source column order (serde_json's
/// `preserve_order` feature), which the store-visits sheet relies on for
/// positional access.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl RawRecord {
    /// Builds a record from a JSON object; any other value yields an empty record.
    pub fn from_value(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(data) => Self { data },
            _ => Self::default(),
        }
    }
}

pub type Sheet = Vec<RawRecord>;

/// The five positional funnel-stage tables.
///
/// Positions 2..5 are optional in every source; an absent sheet is an empty
/// table, never an error.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetSet {
    pub leads: Sheet,
    pub test_drives: Sheet,
    pub complete_journey: Sheet,
    pub billed: Sheet,
    pub store_visits: Sheet,
}

impl SheetSet {
    /// Assembles a set from positionally ordered tables; missing trailing
    /// positions become empty sheets, extras are dropped.
    pub fn from_positional(tables: Vec<Sheet>) -> Self {
        let mut iter = tables.into_iter();
        Self {
            leads: iter.next().unwrap_or_default(),
            test_drives: iter.next().unwrap_or_default(),
            complete_journey: iter.next().unwrap_or_default(),
            billed: iter.next().unwrap_or_default(),
            store_visits: iter.next().unwrap_or_default(),
        }
    }
}

/// Numerator/denominator counts for one conversion segment.
///
/// `to` is not guaranteed to be <= `from`: flag-derived counts are heuristic
/// and may exceed the nominal denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FunnelMetricPair {
    pub from: u64,
    pub to: u64,
}

/// The six named conversion segments.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelMetrics {
    pub leads_direct: FunnelMetricPair,
    pub leads_with_test_drive: FunnelMetricPair,
    pub test_drive_to_sale: FunnelMetricPair,
    pub complete_journey: FunnelMetricPair,
    pub visits_to_test_drive: FunnelMetricPair,
    pub visits_to_billing: FunnelMetricPair,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// The aggregate output of one ingestion call.
///
/// Immutable once returned; the raw sheets are retained for drill-down by the
/// presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedResult {
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
    pub funnel_metrics: FunnelMetrics,
    pub period: DateRange,
    pub dealers: Vec<String>,
    pub raw_data: SheetSet,
}
