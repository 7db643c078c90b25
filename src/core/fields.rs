//! Tolerant field lookup over heterogeneous rows.

use crate::domain::model::RawRecord;
use crate::domain::schema::FieldSpec;
use serde_json::Value;

/// Returns the value of the first synonym present in the row, skipping nulls
/// and empty strings. Unrelated keys in the row are ignored.
pub fn resolve<'a>(record: &'a RawRecord, spec: &FieldSpec) -> Option<&'a Value> {
    for key in spec.synonyms {
        match record.data.get(*key) {
            None | Some(Value::Null) => continue,
            Some(Value::String(s)) if s.is_empty() => continue,
            Some(value) => return Some(value),
        }
    }
    None
}

/// Resolves a field and coerces it to a number. Numeric strings count;
/// anything else is treated as absent.
pub fn resolve_number(record: &RawRecord, spec: &FieldSpec) -> Option<f64> {
    let value = resolve(record, spec)?;
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    if parsed.is_none() {
        tracing::debug!(field = spec.name, %value, "non-numeric value ignored");
    }
    parsed
}

/// Resolves a field and stringifies it, for columns holding free-form text.
pub fn resolve_string(record: &RawRecord, spec: &FieldSpec) -> Option<String> {
    match resolve(record, spec)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Tri-state reading of a boolean flag column.
///
/// Sources encode "set" as the integer 1, the string "1" or a real boolean;
/// a missing or unresolvable field is `Unknown` rather than `False` so
/// downstream counts can tell the two apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    True,
    False,
    Unknown,
}

impl Flag {
    pub fn is_true(self) -> bool {
        self == Flag::True
    }
}

pub fn resolve_flag(record: &RawRecord, spec: &FieldSpec) -> Flag {
    match resolve(record, spec) {
        None => Flag::Unknown,
        Some(value) => {
            let set = match value {
                Value::Bool(b) => *b,
                Value::Number(n) => n.as_i64() == Some(1) || n.as_f64() == Some(1.0),
                Value::String(s) => s == "1",
                _ => false,
            };
            if set {
                Flag::True
            } else {
                Flag::False
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{FLAG_BILLED, FLAG_TEST_DRIVE, SALE_DATE};
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawRecord {
        RawRecord::from_value(value)
    }

    #[test]
    fn test_resolve_first_synonym_wins() {
        let row = record(json!({"data": "2024-01-01", "Date": "2023-12-31"}));
        let value = resolve(&row, &SALE_DATE).unwrap();
        // "Date" precedes "data" in the synonym list.
        assert_eq!(value, &json!("2023-12-31"));
    }

    #[test]
    fn test_resolve_skips_null_and_empty() {
        let row = record(json!({"dateSales": null, "Date": "", "data": "2024-05-01"}));
        assert_eq!(resolve(&row, &SALE_DATE), Some(&json!("2024-05-01")));
    }

    #[test]
    fn test_resolve_none_when_all_candidates_absent() {
        let row = record(json!({"unrelated": 42, "Dealer": "ABC"}));
        assert_eq!(resolve(&row, &SALE_DATE), None);
    }

    #[test]
    fn test_flag_truthy_variants() {
        for value in [json!(1), json!("1"), json!(true)] {
            let row = record(json!({ "Flag_Faturado": value }));
            assert_eq!(resolve_flag(&row, &FLAG_BILLED), Flag::True);
        }
    }

    #[test]
    fn test_flag_false_when_present_but_unset() {
        for value in [json!(0), json!("0"), json!(false), json!("yes")] {
            let row = record(json!({ "Flag_TestDrive": value }));
            assert_eq!(resolve_flag(&row, &FLAG_TEST_DRIVE), Flag::False);
        }
    }

    #[test]
    fn test_flag_unknown_when_missing() {
        let row = record(json!({"other": 1}));
        assert_eq!(resolve_flag(&row, &FLAG_TEST_DRIVE), Flag::Unknown);
        assert!(!resolve_flag(&row, &FLAG_TEST_DRIVE).is_true());
    }

    #[test]
    fn test_resolve_number_from_string() {
        let row = record(json!({"Dias_Lead_Faturamento": "7"}));
        assert_eq!(
            resolve_number(&row, &crate::domain::schema::DAYS_LEAD_TO_BILLING),
            Some(7.0)
        );
    }

    #[test]
    fn test_resolve_number_rejects_garbage() {
        let row = record(json!({"Dias_Lead_Faturamento": "soon"}));
        assert_eq!(
            resolve_number(&row, &crate::domain::schema::DAYS_LEAD_TO_BILLING),
            None
        );
    }
}
