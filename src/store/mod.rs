//! Persistent map from utterance id to scored record, plus the per-speaker index.

mod document;

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::{DataPaths, SourcePaths};
use crate::error::StoreError;
use crate::io::{parse_scores_file, parse_speaker_map_file, parse_text_phone_file, write_json_file};
use crate::models::{
    RawScoresDocument, RawUtteranceScores, ScoreSet, ScoreValue, SpeakerIndex, UtteranceRecord,
};
use crate::scoring::score_word;

use document::{StoredDocument, StoredDocumentRef};

/// Scored utterances backed by a single JSON file.
///
/// Mutations stay in memory until [`RecordStore::flush`] rewrites the file.
/// Not safe for concurrent use; callers serialize access.
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    speakers: SpeakerIndex,
    utterances: BTreeMap<String, UtteranceRecord>,
    pending_writes: usize,
}

impl RecordStore {
    /// An empty store that will persist to `path`
    pub fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            speakers: SpeakerIndex::new(),
            utterances: BTreeMap::new(),
            pending_writes: 0,
        }
    }

    /// Load an existing store. A missing file is [`StoreError::Missing`].
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(StoreError::Missing {
                path: path.to_path_buf(),
            }
            .into());
        }

        info!("Loading record store from {:?}", path);
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {:?}", path))?;
        let doc = StoredDocument::from_json(&content)
            .with_context(|| format!("Failed to parse record store: {:?}", path))?
            .normalize();

        let mut store = Self {
            path: path.to_path_buf(),
            speakers: doc.speakers,
            utterances: doc.utterances,
            pending_writes: 0,
        };

        if doc.upgraded || doc.repaired > 0 {
            info!(
                "Rewriting record store (legacy shape upgraded: {}, index repairs: {})",
                doc.upgraded, doc.repaired
            );
            store.flush()?;
        }

        info!(
            "Loaded {} utterances for {} speakers",
            store.len(),
            store.speaker_count()
        );
        Ok(store)
    }

    /// Load the store if it exists, otherwise build it from the raw sources and persist it
    pub fn load_or_build(paths: &DataPaths) -> Result<Self> {
        if paths.database.exists() {
            Self::open(&paths.database)
        } else {
            info!("No record store at {:?}, building from sources", paths.database);
            Self::build(&paths.database, &paths.sources)
        }
    }

    /// Read every raw source, score all utterances and persist the result
    pub fn build(path: &Path, sources: &SourcePaths) -> Result<Self> {
        let speaker_map = parse_speaker_map_file(&sources.speaker_map)?;
        let detail = parse_scores_file(&sources.scores_detail)?;
        let coarse = parse_scores_file(&sources.scores)?;
        let text_phone = parse_text_phone_file(&sources.text_phone)?;

        let mut store = Self::from_sources(path, &speaker_map, &detail, &coarse, &text_phone);
        store.flush()?;
        Ok(store)
    }

    /// Assemble a store in memory from already-parsed sources.
    ///
    /// Utterances that cannot be scored are logged and left out.
    pub fn from_sources(
        path: &Path,
        speaker_map: &HashMap<String, String>,
        detail: &RawScoresDocument,
        coarse: &RawScoresDocument,
        text_phone: &HashMap<String, String>,
    ) -> Self {
        let mut store = Self::empty(path);

        let mut utt_ids: Vec<&String> = detail.keys().collect();
        utt_ids.sort();

        for utt_id in utt_ids {
            let speaker_id = speaker_map
                .get(utt_id)
                .cloned()
                .unwrap_or_else(|| fallback_speaker_id(utt_id));

            match build_scores(&detail[utt_id], coarse.get(utt_id)) {
                Ok(scores) => {
                    let text = first_non_empty(&detail[utt_id].text, coarse.get(utt_id));
                    let record = UtteranceRecord::new(utt_id, &speaker_id, text, scores)
                        .with_text_phone(text_phone.get(utt_id).cloned().unwrap_or_default());
                    store.put(record);
                }
                Err(e) => warn!("Skipping utterance {}: {:#}", utt_id, e),
            }
        }

        info!(
            "Built {} utterances for {} speakers",
            store.len(),
            store.speaker_count()
        );
        store
    }

    /// Add or replace a record and persist the store
    pub fn insert(&mut self, record: UtteranceRecord) -> Result<()> {
        self.put(record);
        self.flush()
    }

    fn put(&mut self, record: UtteranceRecord) {
        if let Some(previous) = self.utterances.get(&record.utt_id) {
            if previous.speaker_id != record.speaker_id {
                let (old_speaker, utt_id) = (previous.speaker_id.clone(), record.utt_id.clone());
                self.speakers
                    .retain_sorted(|speaker, utt| !(speaker == old_speaker && utt == utt_id));
            }
        }
        self.speakers.insert(&record.speaker_id, &record.utt_id);
        self.utterances.insert(record.utt_id.clone(), record);
    }

    pub fn get_record(&self, utt_id: &str) -> Option<&UtteranceRecord> {
        self.utterances.get(utt_id)
    }

    pub fn get_scores(&self, utt_id: &str) -> Option<&ScoreSet> {
        self.get_record(utt_id).map(|r| &r.scores)
    }

    pub fn get_analysis_feedback(&self, utt_id: &str) -> Option<&str> {
        self.get_record(utt_id)
            .and_then(|r| r.analysis_feedback.as_deref())
    }

    /// A speaker's records in id order; empty for an unknown speaker
    pub fn get_speaker_history(&self, speaker_id: &str) -> Vec<&UtteranceRecord> {
        self.speakers
            .utterances(speaker_id)
            .iter()
            .filter_map(|id| self.utterances.get(id))
            .collect()
    }

    /// Cached analysis feedback for each of a speaker's utterances, in id order
    pub fn get_speaker_analysis_history(&self, speaker_id: &str) -> Vec<Option<&str>> {
        self.get_speaker_history(speaker_id)
            .into_iter()
            .map(|r| r.analysis_feedback.as_deref())
            .collect()
    }

    /// Cache analysis feedback for an utterance.
    ///
    /// Persists immediately unless `deferred`, in which case the write waits
    /// for the next [`RecordStore::flush`]. Returns false for an unknown id.
    pub fn save_analysis_feedback(&mut self, utt_id: &str, feedback: &str, deferred: bool) -> Result<bool> {
        let Some(record) = self.utterances.get_mut(utt_id) else {
            warn!("Cannot save analysis feedback for unknown utterance {}", utt_id);
            return Ok(false);
        };

        record.analysis_feedback = Some(feedback.to_string());
        debug!("Saved analysis feedback for utterance {}", utt_id);

        if deferred {
            self.pending_writes += 1;
        } else {
            self.flush()?;
        }
        Ok(true)
    }

    /// Rewrite the whole backing file
    pub fn flush(&mut self) -> Result<()> {
        let doc = StoredDocumentRef {
            speakers: &self.speakers,
            utterances: &self.utterances,
        };
        write_json_file(&self.path, &doc)
            .with_context(|| format!("Failed to write record store: {:?}", self.path))?;

        let with_feedback = self
            .utterances
            .values()
            .filter(|u| u.analysis_feedback.is_some())
            .count();
        debug!(
            "Record store saved ({} utterances, {} with analysis feedback, {} deferred writes)",
            self.len(),
            with_feedback,
            self.pending_writes
        );
        self.pending_writes = 0;
        Ok(())
    }

    /// All utterance ids in order
    pub fn utterance_ids(&self) -> Vec<String> {
        self.utterances.keys().cloned().collect()
    }

    pub fn speakers(&self) -> &SpeakerIndex {
        &self.speakers
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deferred feedback writes not yet flushed
    pub fn pending_writes(&self) -> usize {
        self.pending_writes
    }

    pub fn len(&self) -> usize {
        self.utterances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }

    pub fn speaker_count(&self) -> usize {
        self.speakers.len()
    }
}

/// Speaker id used when the speaker map has no entry for an utterance
fn fallback_speaker_id(utt_id: &str) -> String {
    utt_id.chars().take(5).collect()
}

fn first_non_empty<'a>(text: &'a str, coarse: Option<&'a RawUtteranceScores>) -> &'a str {
    if text.is_empty() {
        coarse.map(|c| c.text.as_str()).unwrap_or(text)
    } else {
        text
    }
}

/// Utterance-level metrics from the detailed entry, falling back to the coarse one
fn build_scores(detail: &RawUtteranceScores, coarse: Option<&RawUtteranceScores>) -> Result<ScoreSet> {
    let metric = |name: &str, pick: fn(&RawUtteranceScores) -> Option<&ScoreValue>| -> Result<f64> {
        pick(detail)
            .or_else(|| coarse.and_then(pick))
            .and_then(ScoreValue::mean)
            .with_context(|| format!("no {} score", name))
    };

    let word_scores = detail
        .words
        .iter()
        .map(score_word)
        .collect::<Result<Vec<_>>>()?;

    Ok(ScoreSet {
        accuracy: metric("accuracy", |s| s.accuracy.as_ref())?,
        completeness: metric("completeness", |s| s.completeness.as_ref())?,
        fluency: metric("fluency", |s| s.fluency.as_ref())?,
        prosodic: metric("prosodic", |s| s.prosodic.as_ref())?,
        total: metric("total", |s| s.total.as_ref()).ok(),
        word_scores,
    })
}
