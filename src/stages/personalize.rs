use anyhow::Result;
use tracing::info;

use crate::io::{PersonalizedFeedbackEntry, PersonalizedFeedbackLog};
use crate::llm::HistorySummarizer;
use crate::store::RecordStore;

/// Summarize a speaker's history and append it to the personalized-feedback log
pub async fn execute_personalized(
    summarizer: &dyn HistorySummarizer,
    store: &RecordStore,
    log: &mut PersonalizedFeedbackLog,
    speaker_id: &str,
    current_utt_id: &str,
) -> Result<String> {
    let history = store.get_speaker_history(speaker_id);
    info!(
        "Generating personalized feedback for speaker {} from {} utterances",
        speaker_id,
        history.len()
    );

    let feedback = summarizer
        .summarize(speaker_id, &history, current_utt_id)
        .await?;
    log.append(PersonalizedFeedbackEntry::new(speaker_id, &feedback))?;

    Ok(feedback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::RuleBasedSummarizer;
    use crate::models::{ScoreSet, UtteranceRecord};

    #[tokio::test]
    async fn test_personalized_feedback_is_logged() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = RecordStore::empty(&dir.path().join("database.json"));
        let scores = ScoreSet {
            accuracy: 8.0,
            completeness: 1.0,
            fluency: 8.0,
            prosodic: 8.0,
            total: None,
            word_scores: vec![],
        };
        store
            .insert(UtteranceRecord::new("000010011", "0001", "WE", scores))
            .unwrap();

        let log_path = dir.path().join("personalized_feedback.json");
        let mut log = PersonalizedFeedbackLog::load(&log_path).unwrap();

        let feedback = execute_personalized(&RuleBasedSummarizer, &store, &mut log, "0001", "000010011")
            .await
            .unwrap();

        assert!(feedback.contains("1 utterance on record"));
        let reloaded = PersonalizedFeedbackLog::load(&log_path).unwrap();
        assert_eq!(reloaded.entries().len(), 1);
        assert_eq!(reloaded.entries()[0].speaker_id, "0001");
        assert_eq!(reloaded.entries()[0].personalized_feedback, feedback);
    }
}
