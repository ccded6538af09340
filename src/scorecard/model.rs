//! Score-card data model
//!
//! The section/parameter structure is a fixed schema: every record carries
//! every canonical section with every canonical parameter. Only scores and
//! remarks vary per instance. Serde renames on these types define the wire
//! payload shape; the defensive decode lives in [`crate::scorecard::codec`].

use chrono::NaiveDate;
use serde::Serialize;

/// Highest score a parameter can receive
pub const MAX_SCORE: u8 = 10;

/// Canonical section titles and parameter names, generated once per record
const CANONICAL_SCHEMA: &[(&str, &[&str])] = &[
    (
        "Platform & Circulating Area",
        &["Platform Surface", "Dustbins Availability", "Urinals & Toilets", "Drains"],
    ),
    (
        "Coach Exterior",
        &["Body Cleanliness", "Destination Boards", "Windows & Panes"],
    ),
    (
        "Coach Interior",
        &["Floor & Aisles", "Seats & Berths", "Fans & Fittings", "Dustbins"],
    ),
    (
        "Toilets & Vestibules",
        &["Toilet Floor", "Wash Basin", "Water Availability", "Vestibule Area"],
    ),
];

/// One scored item within a section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreParameter {
    #[serde(rename = "parameter")]
    pub name: String,
    pub score: u8,
    pub remarks: String,
}

/// A titled group of parameters; structure comes from the canonical schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSection {
    #[serde(rename = "section")]
    pub title: String,
    pub parameters: Vec<ScoreParameter>,
}

impl ScoreSection {
    /// Sum of parameter scores in this section
    pub fn total_score(&self) -> u32 {
        self.parameters.iter().map(|p| p.score as u32).sum()
    }

    /// Maximum attainable score for this section
    pub fn max_score(&self) -> u32 {
        self.parameters.len() as u32 * MAX_SCORE as u32
    }
}

/// A complete score-card: header fields plus the fixed section schema
///
/// `submission_id` is `None` only for the in-progress form and the draft;
/// every persisted submission has a unique id. `is_synced` goes false→true
/// exactly once, on confirmed delivery, and never back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreCardRecord {
    pub submission_id: Option<String>,
    pub location: String,
    pub date: Option<NaiveDate>,
    pub inspector_name: String,
    pub inspector_designation: String,
    pub train_no: String,
    pub remarks_overall: String,
    pub is_synced: bool,
    pub sections: Vec<ScoreSection>,
}

impl Default for ScoreCardRecord {
    fn default() -> Self {
        Self {
            submission_id: None,
            location: String::new(),
            date: None,
            inspector_name: String::new(),
            inspector_designation: String::new(),
            train_no: String::new(),
            remarks_overall: String::new(),
            is_synced: false,
            sections: canonical_sections(),
        }
    }
}

impl ScoreCardRecord {
    pub fn set_location(&mut self, value: impl Into<String>) {
        self.location = value.into();
    }

    pub fn set_inspector_name(&mut self, value: impl Into<String>) {
        self.inspector_name = value.into();
    }

    pub fn set_inspector_designation(&mut self, value: impl Into<String>) {
        self.inspector_designation = value.into();
    }

    pub fn set_train_no(&mut self, value: impl Into<String>) {
        self.train_no = value.into();
    }

    pub fn set_remarks_overall(&mut self, value: impl Into<String>) {
        self.remarks_overall = value.into();
    }

    pub fn set_date(&mut self, value: Option<NaiveDate>) {
        self.date = value;
    }

    /// Whether any identifying header field has been filled in.
    /// Drafts are only worth persisting once this is true.
    pub fn has_header_data(&self) -> bool {
        !self.location.is_empty()
            || !self.inspector_name.is_empty()
            || !self.inspector_designation.is_empty()
            || !self.train_no.is_empty()
    }

    /// Mutable access to a section by its canonical title
    pub fn section_mut(&mut self, title: &str) -> Option<&mut ScoreSection> {
        self.sections.iter_mut().find(|s| s.title == title)
    }

    /// Sum of all parameter scores
    pub fn total_score(&self) -> u32 {
        self.sections.iter().map(|s| s.total_score()).sum()
    }

    /// Maximum attainable score across all sections
    pub fn max_score(&self) -> u32 {
        self.sections.iter().map(|s| s.max_score()).sum()
    }
}

/// Build the canonical fixed schema: every section and parameter present,
/// scores 0, remarks empty
pub fn canonical_sections() -> Vec<ScoreSection> {
    CANONICAL_SCHEMA
        .iter()
        .map(|(title, parameters)| ScoreSection {
            title: (*title).to_string(),
            parameters: parameters
                .iter()
                .map(|name| ScoreParameter {
                    name: (*name).to_string(),
                    score: 0,
                    remarks: String::new(),
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_schema_shape() {
        let sections = canonical_sections();
        assert_eq!(sections.len(), 4);
        for section in &sections {
            assert!(!section.parameters.is_empty());
            for parameter in &section.parameters {
                assert_eq!(parameter.score, 0);
                assert!(parameter.remarks.is_empty());
            }
        }
    }

    #[test]
    fn test_default_record_is_clean() {
        let record = ScoreCardRecord::default();
        assert_eq!(record.submission_id, None);
        assert!(!record.is_synced);
        assert!(!record.has_header_data());
        assert_eq!(record.sections, canonical_sections());
    }

    #[test]
    fn test_has_header_data() {
        let mut record = ScoreCardRecord::default();
        assert!(!record.has_header_data());

        record.set_train_no("12309");
        assert!(record.has_header_data());
    }

    #[test]
    fn test_score_totals() {
        let mut record = ScoreCardRecord::default();
        let section = record.section_mut("Coach Interior").unwrap();
        section.parameters[0].score = 7;
        section.parameters[1].score = 9;

        assert_eq!(record.total_score(), 16);
        assert_eq!(record.max_score(), 15 * MAX_SCORE as u32);
    }
}
