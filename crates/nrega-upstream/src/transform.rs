//! Pure mapping from one untyped upstream record to a [`DistrictReport`].
//!
//! The transform is total: any input maps to a report. Numeric fields that
//! are missing or unparseable degrade to zero instead of failing, matching
//! the upstream API's loosely-typed contract where figures arrive sometimes
//! as JSON numbers and sometimes as strings. Silent zero-fallback trades
//! data loss on malformed fields for never aborting a sync.

use nrega_common::types::{DistrictReport, UpstreamRecord};
use serde_json::Value;

/// Upstream field names this resource is known to use.
const F_STATE: &str = "state_name";
const F_DISTRICT: &str = "district_name";
const F_FIN_YEAR: &str = "fin_year";
const F_HOUSEHOLDS: &str = "Total_Households_Worked";
const F_INDIVIDUALS: &str = "Total_Individuals_Worked";
const F_WAGES: &str = "Wages";
const F_PAYMENT_PCT: &str = "percentage_payments_gererated_within_15_days";

/// Transform one upstream record into a normalized report candidate.
///
/// Identity strings are trimmed and default to empty when absent; the store
/// rejects empty identity at upsert time, so such records surface as one
/// counted per-record failure rather than aborting the transform.
pub fn transform_record(record: &UpstreamRecord) -> DistrictReport {
    DistrictReport {
        state_name: field_string(record, F_STATE),
        district_name: field_string(record, F_DISTRICT),
        fin_year: field_string(record, F_FIN_YEAR),
        families_given_work: field_i64(record, F_HOUSEHOLDS),
        total_work_days: field_i64(record, F_INDIVIDUALS),
        total_wages_paid: field_f64(record, F_WAGES),
        payments_on_time_percent: field_f64(record, F_PAYMENT_PCT),
        raw_api_record: Value::Object(record.clone()),
    }
}

fn field_string(record: &UpstreamRecord, name: &str) -> String {
    match record.get(name) {
        Some(Value::String(s)) => s.trim().to_string(),
        // A non-string identity value (number, bool) is still usable as text.
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn field_i64(record: &UpstreamRecord, name: &str) -> i64 {
    match record.get(name) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            // Accept "100" and "50000.5" (truncated), reject everything else.
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

fn field_f64(record: &UpstreamRecord, name: &str) -> f64 {
    match record.get(name) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> UpstreamRecord {
        value.as_object().expect("test record is an object").clone()
    }

    #[test]
    fn maps_the_documented_upstream_fields() {
        let rec = record(json!({
            "state_name": "UTTAR PRADESH",
            "district_name": "AGRA",
            "fin_year": "2024-2025",
            "Total_Households_Worked": "100",
            "Total_Individuals_Worked": "250",
            "Wages": "50000.5",
            "percentage_payments_gererated_within_15_days": "92.3"
        }));

        let report = transform_record(&rec);
        assert_eq!(report.state_name, "UTTAR PRADESH");
        assert_eq!(report.district_name, "AGRA");
        assert_eq!(report.fin_year, "2024-2025");
        assert_eq!(report.families_given_work, 100);
        assert_eq!(report.total_work_days, 250);
        assert_eq!(report.total_wages_paid, 50000.5);
        assert_eq!(report.payments_on_time_percent, 92.3);
    }

    #[test]
    fn unparseable_numerics_degrade_to_zero_not_error() {
        let rec = record(json!({
            "state_name": "UP",
            "district_name": "Agra",
            "fin_year": "2024-2025",
            "Total_Households_Worked": "NA",
            "Wages": null,
            "percentage_payments_gererated_within_15_days": {"nested": true}
        }));

        let report = transform_record(&rec);
        assert_eq!(report.families_given_work, 0);
        assert_eq!(report.total_work_days, 0); // absent entirely
        assert_eq!(report.total_wages_paid, 0.0);
        assert_eq!(report.payments_on_time_percent, 0.0);
    }

    #[test]
    fn accepts_json_numbers_as_well_as_strings() {
        let rec = record(json!({
            "district_name": "Agra",
            "Total_Households_Worked": 42,
            "Wages": 12.5
        }));

        let report = transform_record(&rec);
        assert_eq!(report.families_given_work, 42);
        assert_eq!(report.total_wages_paid, 12.5);
    }

    #[test]
    fn fractional_strings_truncate_for_integer_fields() {
        let rec = record(json!({ "Total_Individuals_Worked": "199.9" }));
        assert_eq!(transform_record(&rec).total_work_days, 199);
    }

    #[test]
    fn missing_identity_degrades_to_empty_string() {
        let rec = record(json!({ "Wages": "10" }));
        let report = transform_record(&rec);
        assert_eq!(report.state_name, "");
        assert_eq!(report.district_name, "");
        assert_eq!(report.fin_year, "");
    }

    #[test]
    fn identity_strings_are_trimmed() {
        let rec = record(json!({ "district_name": "  Agra  " }));
        assert_eq!(transform_record(&rec).district_name, "Agra");
    }

    #[test]
    fn no_range_validation_is_applied() {
        let rec = record(json!({
            "Wages": "-5",
            "percentage_payments_gererated_within_15_days": "120.5"
        }));
        let report = transform_record(&rec);
        assert_eq!(report.total_wages_paid, -5.0);
        assert_eq!(report.payments_on_time_percent, 120.5);
    }

    #[test]
    fn raw_record_is_the_verbatim_input() {
        let rec = record(json!({
            "district_name": "Agra",
            "Some_Future_Field": "kept"
        }));
        let report = transform_record(&rec);
        assert_eq!(
            report.raw_api_record["Some_Future_Field"],
            json!("kept"),
        );
    }
}
