use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A score that is either already aggregated or still one value per rater
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ScoreValue {
    Scalar(f64),
    PerRater(Vec<f64>),
}

impl ScoreValue {
    /// Collapse to a single number, averaging per-rater lists.
    /// An empty list has no mean.
    pub fn mean(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::PerRater(values) if values.is_empty() => None,
            Self::PerRater(values) => Some(values.iter().sum::<f64>() / values.len() as f64),
        }
    }
}

/// One utterance entry from a raw scores document (detailed or coarse)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawUtteranceScores {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub accuracy: Option<ScoreValue>,
    #[serde(default)]
    pub completeness: Option<ScoreValue>,
    #[serde(default)]
    pub fluency: Option<ScoreValue>,
    #[serde(default)]
    pub prosodic: Option<ScoreValue>,
    #[serde(default)]
    pub total: Option<ScoreValue>,
    #[serde(default)]
    pub words: Vec<RawWordScores>,
}

/// One word entry from the detailed scores document
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawWordScores {
    pub text: String,
    pub accuracy: ScoreValue,
    pub stress: ScoreValue,
    #[serde(default)]
    pub total: Option<ScoreValue>,
    /// Space-delimited canonical phones
    #[serde(rename = "ref-phones", default)]
    pub ref_phones: String,
    /// One space-delimited transcription per rater
    #[serde(default)]
    pub phones: Vec<String>,
}

/// Utterance id -> raw scores, as stored in `scores-detail.json` / `scores.json`
pub type RawScoresDocument = HashMap<String, RawUtteranceScores>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_value_scalar_or_list() {
        let scalar: ScoreValue = serde_json::from_str("7.5").unwrap();
        let list: ScoreValue = serde_json::from_str("[8, 9, 10]").unwrap();
        let empty: ScoreValue = serde_json::from_str("[]").unwrap();

        assert_eq!(scalar.mean(), Some(7.5));
        assert_eq!(list.mean(), Some(9.0));
        assert_eq!(empty.mean(), None);
    }

    #[test]
    fn test_parse_detailed_entry() {
        let json = r#"{
            "text": "WE CALL IT BEAR",
            "accuracy": [8, 9, 8, 9, 8],
            "completeness": [10.0, 10.0, 10.0, 10.0, 10.0],
            "fluency": [9, 9, 9, 9, 9],
            "prosodic": [9, 9, 9, 9, 9],
            "total": [8, 9, 8, 9, 8],
            "words": [
                {"text": "WE", "accuracy": [10, 10, 10, 10, 10], "stress": [10, 10, 10, 10, 10],
                 "total": [10, 10, 10, 10, 10], "ref-phones": "W IY0",
                 "phones": ["W IY0", "W IY0", "W IY0", "W IY0", "W IY0"]}
            ]
        }"#;

        let entry: RawUtteranceScores = serde_json::from_str(json).unwrap();

        assert_eq!(entry.accuracy.as_ref().and_then(ScoreValue::mean), Some(8.4));
        assert_eq!(entry.words.len(), 1);
        assert_eq!(entry.words[0].ref_phones, "W IY0");
        assert_eq!(entry.words[0].phones.len(), 5);
    }
}
