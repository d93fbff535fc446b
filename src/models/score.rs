use serde::{Deserialize, Serialize};

use super::UNINTELLIGIBLE_MARKER;

/// A mispronounced phone, derived by majority vote across raters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mispronunciation {
    /// Phone the reference transcription expects
    #[serde(rename = "canonical-phone")]
    pub canonical_phone: String,
    /// Position in the word's phone sequence (absent for caller-supplied scores)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Phone actually produced, or `<unk>`
    #[serde(rename = "produced-phone", alias = "pronounced-phone")]
    pub produced_phone: String,
}

impl Mispronunciation {
    pub fn unintelligible(canonical_phone: &str, index: usize) -> Self {
        Self {
            canonical_phone: canonical_phone.to_string(),
            index: Some(index),
            produced_phone: UNINTELLIGIBLE_MARKER.to_string(),
        }
    }

    pub fn substitution(canonical_phone: &str, index: usize, produced: &str) -> Self {
        Self {
            canonical_phone: canonical_phone.to_string(),
            index: Some(index),
            produced_phone: produced.to_string(),
        }
    }

    pub fn is_unintelligible(&self) -> bool {
        self.produced_phone == UNINTELLIGIBLE_MARKER
    }
}

/// Scores for a single word of an utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordScore {
    #[serde(alias = "word")]
    pub text: String,
    /// Word accuracy (0-10)
    pub accuracy: f64,
    /// Word stress (0-10)
    pub stress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    /// Canonical phone labels
    pub phones: Vec<String>,
    /// Per-phone accuracy (0-2), parallel to `phones`
    #[serde(rename = "phones-accuracy")]
    pub phones_accuracy: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mispronunciations: Vec<Mispronunciation>,
}

impl WordScore {
    /// Whether `phones` and `phones_accuracy` line up
    pub fn is_aligned(&self) -> bool {
        self.phones.len() == self.phones_accuracy.len()
    }

    /// Words below full marks on accuracy or stress get their own feedback
    pub fn needs_feedback(&self) -> bool {
        self.accuracy < 8.0 || self.stress < 10.0
    }
}

/// Utterance-level scores plus per-word detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSet {
    pub accuracy: f64,
    pub completeness: f64,
    pub fluency: f64,
    pub prosodic: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(default)]
    pub word_scores: Vec<WordScore>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_caller_word_score() {
        let json = r#"{
            "word": "HELLO",
            "accuracy": 7.0,
            "stress": 8.0,
            "phones": ["HH", "EH1", "L", "OW0"],
            "phones-accuracy": [2.0, 1.0, 2.0, 2.0],
            "mispronunciations": [{"canonical-phone": "EH1", "produced-phone": "<unk>"}]
        }"#;

        let word: WordScore = serde_json::from_str(json).unwrap();

        assert_eq!(word.text, "HELLO");
        assert!(word.is_aligned());
        assert!(word.needs_feedback());
        assert_eq!(word.mispronunciations.len(), 1);
        assert!(word.mispronunciations[0].is_unintelligible());
        assert_eq!(word.mispronunciations[0].index, None);
    }

    #[test]
    fn test_legacy_pronounced_phone_key() {
        let json = r#"{"canonical-phone": "T", "index": 2, "pronounced-phone": "D"}"#;
        let mis: Mispronunciation = serde_json::from_str(json).unwrap();
        assert_eq!(mis, Mispronunciation::substitution("T", 2, "D"));

        let out = serde_json::to_string(&mis).unwrap();
        assert!(out.contains("\"produced-phone\":\"D\""));
    }

    #[test]
    fn test_perfect_word_needs_no_feedback() {
        let word = WordScore {
            text: "WE".into(),
            accuracy: 10.0,
            stress: 10.0,
            total: Some(10.0),
            phones: vec!["W".into(), "IY0".into()],
            phones_accuracy: vec![2.0, 2.0],
            mispronunciations: vec![],
        };
        assert!(!word.needs_feedback());

        let out = serde_json::to_value(&word).unwrap();
        assert!(out.get("mispronunciations").is_none());
        assert_eq!(out["text"], "WE");
    }
}
