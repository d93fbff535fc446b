//! Turns multi-rater phone transcriptions into per-phone scores and
//! mispronunciation events.

pub mod accuracy;
pub mod mispronunciation;

pub use accuracy::*;
pub use mispronunciation::*;

use anyhow::{Context, Result};

use crate::models::{RaterTranscription, RawWordScores, ScoreValue, WordScore};

/// Score one word from its raw per-rater detail
pub fn score_word(raw: &RawWordScores) -> Result<WordScore> {
    let reference: Vec<&str> = raw.ref_phones.split_whitespace().collect();
    let raters: Vec<RaterTranscription> = raw
        .phones
        .iter()
        .map(|r| RaterTranscription::parse(r))
        .collect();

    Ok(WordScore {
        text: raw.text.clone(),
        accuracy: raw
            .accuracy
            .mean()
            .with_context(|| format!("word '{}' has no accuracy scores", raw.text))?,
        stress: raw
            .stress
            .mean()
            .with_context(|| format!("word '{}' has no stress scores", raw.text))?,
        total: raw.total.as_ref().and_then(ScoreValue::mean),
        phones: reference.iter().map(|p| p.to_string()).collect(),
        phones_accuracy: phone_accuracies(&reference, &raters),
        mispronunciations: detect_mispronunciations(&reference, &raters),
    })
}
