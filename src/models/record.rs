use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ScoreSet;

/// A scored utterance as persisted in the record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtteranceRecord {
    pub utt_id: String,
    pub speaker_id: String,
    pub text: String,
    #[serde(default)]
    pub audio_path: String,
    /// Reference phone transcription for the whole utterance (may be empty)
    #[serde(default)]
    pub text_phone: String,
    pub scores: ScoreSet,
    /// Cached analysis feedback, filled in once
    #[serde(default)]
    pub analysis_feedback: Option<String>,
}

impl UtteranceRecord {
    pub fn new(utt_id: &str, speaker_id: &str, text: &str, scores: ScoreSet) -> Self {
        Self {
            utt_id: utt_id.to_string(),
            speaker_id: speaker_id.to_string(),
            text: text.to_string(),
            audio_path: audio_path(speaker_id, utt_id),
            text_phone: String::new(),
            scores,
            analysis_feedback: None,
        }
    }

    pub fn with_text_phone(mut self, text_phone: impl Into<String>) -> Self {
        self.text_phone = text_phone.into();
        self
    }

    pub fn with_analysis_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.analysis_feedback = Some(feedback.into());
        self
    }
}

/// Relative path of the recording for an utterance
pub fn audio_path(speaker_id: &str, utt_id: &str) -> String {
    format!("WAVE/SPEAKER{}/{}.wav", speaker_id, utt_id)
}

/// Speaker id -> owned utterance ids, each bucket sorted and de-duplicated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeakerIndex(BTreeMap<String, Vec<String>>);

impl SpeakerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an utterance to a speaker's bucket. Returns false if it was already there.
    pub fn insert(&mut self, speaker_id: &str, utt_id: &str) -> bool {
        let bucket = self.0.entry(speaker_id.to_string()).or_default();
        match bucket.binary_search_by(|id| id.as_str().cmp(utt_id)) {
            Ok(_) => false,
            Err(pos) => {
                bucket.insert(pos, utt_id.to_string());
                true
            }
        }
    }

    /// Make sure a speaker has a bucket, even an empty one
    pub fn ensure_speaker(&mut self, speaker_id: &str) {
        self.0.entry(speaker_id.to_string()).or_default();
    }

    pub fn utterances(&self, speaker_id: &str) -> &[String] {
        self.0.get(speaker_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn speakers(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sort and de-duplicate every bucket, dropping ids `keep` rejects.
    /// Returns the dropped `(speaker, utterance)` pairs.
    pub fn retain_sorted(&mut self, mut keep: impl FnMut(&str, &str) -> bool) -> Vec<(String, String)> {
        let mut dropped = Vec::new();
        for (speaker, bucket) in self.0.iter_mut() {
            bucket.sort();
            bucket.dedup();
            bucket.retain(|utt| {
                let ok = keep(speaker.as_str(), utt.as_str());
                if !ok {
                    dropped.push((speaker.clone(), utt.clone()));
                }
                ok
            });
        }
        dropped
    }
}
