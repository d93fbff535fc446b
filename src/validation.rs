use serde_json::Value;

use crate::error::ValidationError;
use crate::models::WordScore;

const REQUIRED_WORD_FIELDS: [&str; 6] = [
    "word",
    "accuracy",
    "stress",
    "phones",
    "phones-accuracy",
    "mispronunciations",
];

/// Parse a utterance-level score and check it lies in [0, 10]
pub fn parse_score(name: &str, raw: &str) -> Result<f64, ValidationError> {
    let value: f64 = raw.trim().parse().map_err(|e: std::num::ParseFloatError| {
        ValidationError::NotANumber {
            name: name.to_string(),
            message: e.to_string(),
        }
    })?;
    check_range(name, value, 0.0, 10.0)
}

fn check_range(name: &str, value: f64, min: f64, max: f64) -> Result<f64, ValidationError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::out_of_range(name, value, min, max))
    }
}

/// Parse and validate a JSON array of caller-supplied word scores.
///
/// Every entry needs `word`, `accuracy`, `stress`, `phones`,
/// `phones-accuracy` and `mispronunciations`; accuracy and stress lie in
/// [0, 10], phone accuracies in [0, 2], phones and phone accuracies have equal
/// length, and every mispronunciation names `canonical-phone` and
/// `produced-phone`.
pub fn parse_word_scores(raw: &str) -> Result<Vec<WordScore>, ValidationError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ValidationError::word_scores(e.to_string()))?;
    let Value::Array(entries) = value else {
        return Err(ValidationError::word_scores(
            "word_scores must be a list of word score objects",
        ));
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| parse_word_entry(i, entry))
        .collect()
}

fn parse_word_entry(i: usize, entry: Value) -> Result<WordScore, ValidationError> {
    let Some(object) = entry.as_object() else {
        return Err(ValidationError::word_scores(format!(
            "word score at index {} is not an object",
            i
        )));
    };

    if let Some(field) = REQUIRED_WORD_FIELDS.iter().find(|f| !object.contains_key(**f)) {
        return Err(ValidationError::word_scores(format!(
            "word score at index {} is missing required field: {}",
            i, field
        )));
    }

    let missing_phone_field = object["mispronunciations"]
        .as_array()
        .into_iter()
        .flatten()
        .any(|m| m.get("canonical-phone").is_none() || m.get("produced-phone").is_none());
    if missing_phone_field {
        return Err(ValidationError::word_scores(format!(
            "word score at index {} has invalid mispronunciation: missing canonical-phone or produced-phone",
            i
        )));
    }

    let word: WordScore = serde_json::from_value(entry).map_err(|e| {
        ValidationError::word_scores(format!("word score at index {}: {}", i, e))
    })?;

    let in_range = |name: &str, value: f64, max: f64| {
        check_range(name, value, 0.0, max).map_err(|_| {
            ValidationError::word_scores(format!(
                "word score at index {} has invalid {}: {} (must be between 0 and {})",
                i, name, value, max
            ))
        })
    };

    in_range("accuracy", word.accuracy, 10.0)?;
    in_range("stress", word.stress, 10.0)?;

    if !word.is_aligned() {
        return Err(ValidationError::word_scores(format!(
            "word score at index {} has mismatched phones and phones-accuracy lengths",
            i
        )));
    }
    for &score in &word.phones_accuracy {
        in_range("phones-accuracy value", score, 2.0)?;
    }

    Ok(word)
}
