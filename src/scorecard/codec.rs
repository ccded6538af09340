//! Wire/storage codec for score-card records
//!
//! `encode` produces the JSON mapping used both as the POST body and as the
//! persisted payload. `decode` is total: older or damaged mappings decode to
//! a best-effort valid record instead of failing, so drafts written by
//! previous versions of the tool keep loading after schema drift.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use super::model::{MAX_SCORE, ScoreCardRecord, ScoreSection, canonical_sections};

/// Encode a record into its wire/storage mapping
///
/// Dates render as `YYYY-MM-DD`; an unset date encodes as null.
pub fn encode(record: &ScoreCardRecord) -> Value {
    serde_json::to_value(record).expect("score-card serialization is infallible")
}

/// Decode a stored mapping into a record
///
/// Every field defaults when absent or of the wrong shape. Sections are
/// rebuilt from the canonical schema and incoming scores/remarks are merged
/// in by section title and parameter name, so the result always carries the
/// full fixed schema.
pub fn decode(mapping: &Value) -> ScoreCardRecord {
    let obj = match mapping.as_object() {
        Some(obj) => obj,
        None => return ScoreCardRecord::default(),
    };

    ScoreCardRecord {
        submission_id: obj
            .get("submissionId")
            .and_then(Value::as_str)
            .map(str::to_string),
        location: string_field(obj, "location"),
        date: obj
            .get("date")
            .and_then(Value::as_str)
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()),
        inspector_name: string_field(obj, "inspectorName"),
        inspector_designation: string_field(obj, "inspectorDesignation"),
        train_no: string_field(obj, "trainNo"),
        remarks_overall: string_field(obj, "remarksOverall"),
        is_synced: obj.get("isSynced").and_then(Value::as_bool).unwrap_or(false),
        sections: decode_sections(obj.get("sections")),
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Merge incoming section data onto the canonical schema.
/// Unknown sections and parameters are ignored; missing ones stay at their
/// defaults, so partial records never escape this function.
fn decode_sections(value: Option<&Value>) -> Vec<ScoreSection> {
    let mut sections = canonical_sections();

    let incoming = match value.and_then(Value::as_array) {
        Some(entries) => entries,
        None => return sections,
    };

    for entry in incoming {
        let Some(entry) = entry.as_object() else { continue };
        let Some(title) = entry.get("section").and_then(Value::as_str) else { continue };
        let Some(section) = sections.iter_mut().find(|s| s.title == title) else { continue };

        let Some(parameters) = entry.get("parameters").and_then(Value::as_array) else { continue };
        for parameter in parameters {
            let Some(parameter) = parameter.as_object() else { continue };
            let Some(name) = parameter.get("parameter").and_then(Value::as_str) else { continue };
            let Some(target) = section.parameters.iter_mut().find(|p| p.name == name) else {
                continue;
            };

            target.score = parameter
                .get("score")
                .and_then(Value::as_u64)
                .map(|score| score.min(MAX_SCORE as u64) as u8)
                .unwrap_or(0);
            target.remarks = parameter
                .get("remarks")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
        }
    }

    sections
}
