use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

//
// ─── VALUES ────────────────────────────────────────────────────────────────────
//

/// Age record for a child travelling with a family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChildAge {
    pub age: f64,
}

/// A single answer as captured by the questionnaire.
///
/// Unrecognised shapes are kept verbatim in `Other` so that deserializing a
/// stored answer set never fails because of one odd value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Number(f64),
    List(Vec<String>),
    Children(Vec<ChildAge>),
    Other(serde_json::Value),
}

impl AnswerValue {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[must_use]
    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_children(&self) -> Option<&[ChildAge]> {
        match self {
            Self::Children(c) => Some(c.as_slice()),
            _ => None,
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for AnswerValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<Vec<ChildAge>> for AnswerValue {
    fn from(value: Vec<ChildAge>) -> Self {
        Self::Children(value)
    }
}

//
// ─── ANSWER SET ────────────────────────────────────────────────────────────────
//

/// Accumulated answers of one questionnaire run, keyed by question key.
///
/// Serializes as a flat JSON object. Keys iterate in sorted order, which keeps
/// persisted payloads stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet {
    values: BTreeMap<String, AnswerValue>,
}

impl AnswerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an answer, returning whatever was previously recorded for `key`.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<AnswerValue>,
    ) -> Option<AnswerValue> {
        self.values.insert(key.into(), value.into())
    }

    /// Builder-style variant of [`AnswerSet::set`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AnswerValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<AnswerValue> {
        self.values.remove(key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.values.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AnswerValue::as_text)
    }

    #[must_use]
    pub fn list(&self, key: &str) -> Option<&[String]> {
        self.get(key).and_then(AnswerValue::as_list)
    }

    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(AnswerValue::as_number)
    }

    #[must_use]
    pub fn children(&self, key: &str) -> Option<&[ChildAge]> {
        self.get(key).and_then(AnswerValue::as_children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_and_returns_previous() {
        let mut answers = AnswerSet::new();
        assert!(answers.set("travelGroup", "solo").is_none());
        let previous = answers.set("travelGroup", "family");
        assert_eq!(previous, Some(AnswerValue::text("solo")));
        assert_eq!(answers.text("travelGroup"), Some("family"));
        assert_eq!(answers.len(), 1);
    }

    #[test]
    fn typed_accessors_reject_wrong_shapes() {
        let answers = AnswerSet::new()
            .with("helpWith", "flights")
            .with("budget", 1200.0);
        assert!(answers.list("helpWith").is_none());
        assert!(answers.text("budget").is_none());
        assert_eq!(answers.number("budget"), Some(1200.0));
    }

    #[test]
    fn deserializes_mixed_json_shapes() {
        let json = r#"{
            "travelGroup": "family",
            "helpWith": ["flights", "activities"],
            "children": [{"age": 4}, {"age": 9}],
            "travelerCount": 4,
            "extra": {"nested": true}
        }"#;
        let answers: AnswerSet = serde_json::from_str(json).unwrap();

        assert_eq!(answers.text("travelGroup"), Some("family"));
        assert_eq!(answers.list("helpWith").map(<[String]>::len), Some(2));
        assert_eq!(answers.children("children").map(<[ChildAge]>::len), Some(2));
        assert_eq!(answers.number("travelerCount"), Some(4.0));
        assert!(matches!(answers.get("extra"), Some(AnswerValue::Other(_))));
    }

    #[test]
    fn empty_list_deserializes_as_list() {
        let answers: AnswerSet = serde_json::from_str(r#"{"helpWith": []}"#).unwrap();
        assert_eq!(answers.list("helpWith"), Some(&[][..]));
    }
}
