//! Course domain types: the curriculum corpus, the timetable retrieval
//! documents, and the request/response contract of the advisor.
//!
//! Corpus records and generator output decode leniently. The inbound request
//! decodes strictly.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::error::RequestError;
use crate::timeslot::TimeSlot;

/// Written in place of an empty requisite list, in the curriculum text and
/// often echoed back by the generator.
pub const NONE_MARKER: &str = "ندارد";

/// Weekday name → ordered list of `HH:MM-HH:MM` availability intervals.
pub type TimeMap = BTreeMap<String, Vec<String>>;

/// One course of a program's curriculum, as stored in the line-delimited
/// curriculum file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurriculumRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub program: String,

    /// Term number. Accepts `3` as well as labels like `"ترم 3"`.
    #[serde(deserialize_with = "term_number")]
    pub term: i64,

    pub name: String,

    #[serde(deserialize_with = "text_or_number")]
    pub units_text: String,

    /// Course category (e.g. "پایه", "تخصصی", "اختیاری").
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(deserialize_with = "nullable_list")]
    pub prerequisites: Vec<String>,

    #[serde(deserialize_with = "nullable_list")]
    pub corequisites: Vec<String>,
}

/// A timetable document indexed for retrieval: free text plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalDocument {
    pub text: String,

    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl RetrievalDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: serde_json::Map::new(),
        }
    }
}

/// Inbound request: what the student has left and when they are free.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseSelectionRequest {
    pub program: String,
    pub term: i64,
    /// Outstanding (unpassed) courses carried over from earlier terms.
    pub course: Vec<String>,
    pub time: TimeMap,
}

impl CourseSelectionRequest {
    /// Check the semantic constraints the JSON shape alone cannot express.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.program.trim().is_empty() {
            return Err(RequestError::EmptyProgram);
        }
        if self.term <= 0 {
            return Err(RequestError::InvalidTerm(self.term));
        }
        for (day, slots) in &self.time {
            for slot in slots {
                slot.parse::<TimeSlot>()
                    .map_err(|reason| RequestError::InvalidTimeSlot {
                        day: day.clone(),
                        slot: slot.clone(),
                        reason,
                    })?;
            }
        }
        Ok(())
    }

    /// True when no availability was declared at all.
    pub fn has_no_availability(&self) -> bool {
        self.time.values().all(|slots| slots.is_empty())
    }
}

/// One recommended, schedule-compatible course section.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CourseSelection {
    #[serde(default, deserialize_with = "text_or_number")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "lenient_units")]
    pub units_number: i64,

    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default, deserialize_with = "nullable_list")]
    pub prerequisites: Vec<String>,

    #[serde(default, deserialize_with = "nullable_list")]
    pub corequisites: Vec<String>,

    #[serde(default, deserialize_with = "session_text")]
    pub time: String,
}

/// The advisor's answer. Always a list, possibly empty.
pub type CourseSelectionResult = Vec<CourseSelection>;

// --- Lenient field decoders ---

/// Map ASCII, Persian (۰-۹) and Arabic-Indic (٠-٩) digits to their value.
fn digit_value(c: char) -> Option<u32> {
    match c {
        '0'..='9' => c.to_digit(10),
        '\u{06F0}'..='\u{06F9}' => Some(c as u32 - 0x06F0),
        '\u{0660}'..='\u{0669}' => Some(c as u32 - 0x0660),
        _ => None,
    }
}

/// Extract the first run of digits from a label such as `"ترم ۳"`.
pub fn parse_number_label(label: &str) -> Option<i64> {
    let mut value: Option<i64> = None;
    for c in label.chars() {
        match (digit_value(c), value) {
            (Some(d), v) => value = Some(v.unwrap_or(0).checked_mul(10)? + d as i64),
            (None, Some(_)) => break,
            (None, None) => {}
        }
    }
    value
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Number(serde_json::Number),
    Text(String),
}

fn term_number<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    match TextOrNumber::deserialize(d)? {
        TextOrNumber::Number(n) => n
            .as_i64()
            .ok_or_else(|| serde::de::Error::custom(format!("term {n} is not an integer"))),
        TextOrNumber::Text(s) => parse_number_label(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("no term number in '{s}'"))),
    }
}

fn text_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Option::<TextOrNumber>::deserialize(d)? {
        Some(TextOrNumber::Number(n)) => n.to_string(),
        Some(TextOrNumber::Text(s)) => s,
        None => String::new(),
    })
}

fn lenient_units<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    Ok(match Option::<TextOrNumber>::deserialize(d)? {
        Some(TextOrNumber::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .unwrap_or_default(),
        Some(TextOrNumber::Text(s)) => parse_number_label(&s).unwrap_or_default(),
        None => 0,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrText {
    List(Vec<String>),
    Text(String),
}

/// Split a requisite list written as one string. Blank text and the
/// none-marker mean no requisites.
fn split_list_text(text: &str) -> Vec<String> {
    text.split([',', '،'])
        .map(str::trim)
        .filter(|item| !item.is_empty() && *item != NONE_MARKER)
        .map(String::from)
        .collect()
}

fn nullable_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Option::<ListOrText>::deserialize(d)? {
        Some(ListOrText::List(items)) => items,
        Some(ListOrText::Text(text)) => split_list_text(&text),
        None => Vec::new(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SessionText {
    One(String),
    Many(Vec<String>),
    /// Weekday → one slot or a list of slots
    ByDay(serde_json::Map<String, serde_json::Value>),
}

fn day_sessions(day: &str, slots: &serde_json::Value) -> Vec<String> {
    match slots {
        serde_json::Value::String(slot) => vec![format!("{day} {slot}")],
        serde_json::Value::Array(all) => all.iter().flat_map(|slot| day_sessions(day, slot)).collect(),
        serde_json::Value::Null => Vec::new(),
        other => vec![format!("{day} {other}")],
    }
}

fn session_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Option::<SessionText>::deserialize(d)? {
        Some(SessionText::One(s)) => s,
        Some(SessionText::Many(all)) => all.join(" / "),
        Some(SessionText::ByDay(days)) => days
            .iter()
            .flat_map(|(day, slots)| day_sessions(day, slots))
            .collect::<Vec<_>>()
            .join(" / "),
        None => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(time: TimeMap) -> CourseSelectionRequest {
        CourseSelectionRequest {
            program: "Computer Engineering".into(),
            term: 3,
            course: vec!["Physics 2".into()],
            time,
        }
    }

    #[test]
    fn curriculum_record_accepts_integer_term() {
        let line = r#"{"program":"CE","term":2,"name":"Logic Circuits","units_text":"3","type":"core","prerequisites":["Discrete Math"],"corequisites":[]}"#;
        let rec: CurriculumRecord = serde_json::from_str(line).unwrap();
        assert_eq!(rec.term, 2);
        assert_eq!(rec.kind, "core");
        assert_eq!(rec.prerequisites, vec!["Discrete Math"]);
        assert!(rec.id.is_none());
    }

    #[test]
    fn curriculum_record_accepts_persian_term_label() {
        let line = r#"{"id":"ترم ۳_course_2","program":"مهندسی کامپیوتر","term":"ترم ۳","name":"مدارهای منطقی","units_text":3,"type":"تخصصی","prerequisites":null,"corequisites":null}"#;
        let rec: CurriculumRecord = serde_json::from_str(line).unwrap();
        assert_eq!(rec.term, 3);
        assert_eq!(rec.units_text, "3");
        assert!(rec.prerequisites.is_empty());
        assert_eq!(rec.id.as_deref(), Some("ترم ۳_course_2"));
    }

    #[test]
    fn curriculum_record_requires_prerequisite_field() {
        let line = r#"{"program":"CE","term":1,"name":"Math 1","units_text":"3","type":"core","corequisites":[]}"#;
        assert!(serde_json::from_str::<CurriculumRecord>(line).is_err());
    }

    #[test]
    fn number_label_parsing() {
        assert_eq!(parse_number_label("ترم 12"), Some(12));
        assert_eq!(parse_number_label("ترم ۱۰"), Some(10));
        assert_eq!(parse_number_label("٤ واحد"), Some(4));
        assert_eq!(parse_number_label("term 3 (2 units)"), Some(3));
        assert_eq!(parse_number_label("none"), None);
    }

    #[test]
    fn retrieval_document_metadata_defaults_empty() {
        let doc: RetrievalDocument = serde_json::from_str(r#"{"text":"Logic Circuits, Sunday 08:00-10:00"}"#).unwrap();
        assert!(doc.metadata.is_empty());
    }

    #[test]
    fn valid_request_passes() {
        let mut time = TimeMap::new();
        time.insert("Sunday".into(), vec!["08:00-10:00".into(), "10:00-12:00".into()]);
        assert!(request(time).validate().is_ok());
    }

    #[test]
    fn empty_collections_are_valid() {
        let mut req = request(TimeMap::new());
        req.course.clear();
        assert!(req.validate().is_ok());
        assert!(req.has_no_availability());
    }

    #[test]
    fn blank_program_rejected() {
        let mut req = request(TimeMap::new());
        req.program = "   ".into();
        assert_eq!(req.validate(), Err(RequestError::EmptyProgram));
    }

    #[test]
    fn non_positive_term_rejected() {
        let mut req = request(TimeMap::new());
        req.term = 0;
        assert_eq!(req.validate(), Err(RequestError::InvalidTerm(0)));
    }

    #[test]
    fn malformed_slot_rejected() {
        let mut time = TimeMap::new();
        time.insert("Sunday".into(), vec!["8-10".into()]);
        let err = request(time).validate().unwrap_err();
        assert!(matches!(err, RequestError::InvalidTimeSlot { ref day, .. } if day == "Sunday"));
    }

    #[test]
    fn request_rejects_string_term() {
        let body = r#"{"program":"CE","term":"three","course":[],"time":{}}"#;
        assert!(serde_json::from_str::<CourseSelectionRequest>(body).is_err());
    }

    #[test]
    fn selection_decodes_canonical_shape() {
        let json = r#"{"id":"ترم ۱_course_1","name":"برنامه سازی کامپیوتر","units_number":3,"type":"پایه","prerequisites":[],"corequisites":[],"time":"یکشنبه 08:00-10:00"}"#;
        let sel: CourseSelection = serde_json::from_str(json).unwrap();
        assert_eq!(sel.units_number, 3);
        assert_eq!(sel.kind, "پایه");
        let back = serde_json::to_value(&sel).unwrap();
        assert_eq!(back, serde_json::from_str::<serde_json::Value>(json).unwrap());
    }

    #[test]
    fn requisites_written_as_text() {
        let json = r#"{"name":"Logic Circuits","prerequisites":"ندارد","corequisites":"Physics 1، Math 1, Discrete Math"}"#;
        let sel: CourseSelection = serde_json::from_str(json).unwrap();
        assert!(sel.prerequisites.is_empty());
        assert_eq!(sel.corequisites, vec!["Physics 1", "Math 1", "Discrete Math"]);

        let sel: CourseSelection = serde_json::from_str(r#"{"prerequisites":"  "}"#).unwrap();
        assert!(sel.prerequisites.is_empty());
    }

    #[test]
    fn sessions_written_by_day() {
        let json = r#"{"name":"Logic Circuits","time":{"Sunday":"08:00-10:00","Tuesday":["10:00-12:00","14:00-16:00"]}}"#;
        let sel: CourseSelection = serde_json::from_str(json).unwrap();
        assert_eq!(
            sel.time,
            "Sunday 08:00-10:00 / Tuesday 10:00-12:00 / Tuesday 14:00-16:00"
        );
    }

    #[test]
    fn selection_tolerates_near_miss_fields() {
        let json = r#"{"name":"Logic Circuits","units_number":"3","prerequisites":null,"time":["Sunday 08:00-10:00","Tuesday 14:00-16:00"]}"#;
        let sel: CourseSelection = serde_json::from_str(json).unwrap();
        assert_eq!(sel.units_number, 3);
        assert!(sel.id.is_empty());
        assert!(sel.prerequisites.is_empty());
        assert_eq!(sel.time, "Sunday 08:00-10:00 / Tuesday 14:00-16:00");
    }
}
