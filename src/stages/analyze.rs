use anyhow::Result;
use tracing::info;

use crate::feedback::render_analysis;
use crate::models::{ScoreSet, UtteranceRecord};
use crate::store::RecordStore;

/// Everything needed to score a utterance the store has not seen
#[derive(Debug, Clone)]
pub struct NewUtterance {
    pub speaker_id: String,
    pub text: String,
    pub scores: ScoreSet,
}

/// Outcome of an analysis request
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// Feedback was already cached for this utterance
    Cached(String),
    /// Feedback was rendered now and stored with a new record
    Generated(String),
    /// Unknown utterance and no inputs to score it
    MissingInputs { utt_id: String },
}

impl AnalysisOutcome {
    /// Text to show the user
    pub fn text(&self) -> String {
        match self {
            Self::Cached(text) | Self::Generated(text) => text.clone(),
            Self::MissingInputs { utt_id } => format!(
                "Cannot generate analysis feedback for new utterance {}. \
                 Missing required inputs: speaker_id, text, or scores.",
                utt_id
            ),
        }
    }
}

/// Return cached analysis feedback, or render it once for a new utterance.
///
/// An utterance with cached feedback is never re-rendered, even when new
/// inputs are supplied.
pub fn execute_analysis(
    store: &mut RecordStore,
    utt_id: &str,
    new_utterance: Option<NewUtterance>,
) -> Result<AnalysisOutcome> {
    if let Some(cached) = store.get_analysis_feedback(utt_id) {
        info!("Using cached analysis feedback for utterance {}", utt_id);
        return Ok(AnalysisOutcome::Cached(cached.to_string()));
    }

    let Some(input) = new_utterance else {
        return Ok(AnalysisOutcome::MissingInputs {
            utt_id: utt_id.to_string(),
        });
    };

    let feedback = render_analysis(utt_id, &input.text, &input.scores);
    let record = UtteranceRecord::new(utt_id, &input.speaker_id, &input.text, input.scores)
        .with_analysis_feedback(feedback.clone());
    store.insert(record)?;
    info!(
        "Stored new utterance {} for speaker {}",
        utt_id, input.speaker_id
    );

    Ok(AnalysisOutcome::Generated(feedback))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_utterance(accuracy: f64) -> NewUtterance {
        NewUtterance {
            speaker_id: "0001".to_string(),
            text: "HELLO".to_string(),
            scores: ScoreSet {
                accuracy,
                completeness: 1.0,
                fluency: 8.0,
                prosodic: 8.0,
                total: None,
                word_scores: vec![],
            },
        }
    }

    #[test]
    fn test_generates_once_then_reads_cache() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = RecordStore::empty(&dir.path().join("database.json"));

        let first = execute_analysis(&mut store, "000019999", Some(new_utterance(9.5))).unwrap();
        let AnalysisOutcome::Generated(text) = &first else {
            panic!("expected generated feedback, got {:?}", first);
        };
        assert!(text.contains("Accuracy 9.5: Excellent"));

        // Different scores must not re-render cached feedback
        let second = execute_analysis(&mut store, "000019999", Some(new_utterance(2.0))).unwrap();
        assert_eq!(second, AnalysisOutcome::Cached(text.clone()));

        assert_eq!(store.speakers().utterances("0001"), ["000019999"]);
        let reloaded = RecordStore::open(store.path()).unwrap();
        assert_eq!(reloaded.get_analysis_feedback("000019999"), Some(text.as_str()));
    }

    #[test]
    fn test_unknown_utterance_without_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = RecordStore::empty(&dir.path().join("database.json"));

        let outcome = execute_analysis(&mut store, "000010011", None).unwrap();

        assert!(matches!(outcome, AnalysisOutcome::MissingInputs { .. }));
        assert!(outcome.text().contains("Missing required inputs"));
        assert!(store.is_empty());
    }
}
