use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

use super::{build_history_prompt, AnthropicClient, HISTORY_SYSTEM_PROMPT};
use crate::models::UtteranceRecord;

/// Score change (0-10 scale) treated as a real trend
const TREND_THRESHOLD: f64 = 0.5;
/// Phones below this accuracy count as problem phones
const PROBLEM_PHONE_THRESHOLD: f64 = 1.5;
const MAX_PROBLEM_PHONES: usize = 3;

/// Turns a speaker's accumulated records into longitudinal feedback
#[async_trait]
pub trait HistorySummarizer: Send + Sync {
    async fn summarize(
        &self,
        speaker_id: &str,
        history: &[&UtteranceRecord],
        current_utt_id: &str,
    ) -> Result<String>;
}

/// Summarizer backed by the Anthropic messages API
pub struct AnthropicSummarizer {
    client: AnthropicClient,
}

impl AnthropicSummarizer {
    pub fn new(client: AnthropicClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HistorySummarizer for AnthropicSummarizer {
    async fn summarize(
        &self,
        speaker_id: &str,
        history: &[&UtteranceRecord],
        current_utt_id: &str,
    ) -> Result<String> {
        let prompt = build_history_prompt(speaker_id, history, current_utt_id);
        info!(
            "Requesting personalized feedback for speaker {} ({} utterances) from {}",
            speaker_id,
            history.len(),
            self.client.model()
        );
        let text = self.client.send_message(HISTORY_SYSTEM_PROMPT, &prompt).await?;
        Ok(text.trim().to_string())
    }
}

/// Offline summarizer: averages, trends and recurring problem phones
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedSummarizer;

#[async_trait]
impl HistorySummarizer for RuleBasedSummarizer {
    async fn summarize(
        &self,
        speaker_id: &str,
        history: &[&UtteranceRecord],
        current_utt_id: &str,
    ) -> Result<String> {
        debug!("Summarizing {} utterances offline", history.len());
        Ok(summarize_history(speaker_id, history, current_utt_id))
    }
}

/// Deterministic history summary used by [`RuleBasedSummarizer`]
pub fn summarize_history(
    speaker_id: &str,
    history: &[&UtteranceRecord],
    current_utt_id: &str,
) -> String {
    let (Some(first), Some(last)) = (history.first(), history.last()) else {
        return format!("No recorded utterances for speaker {} yet.", speaker_id);
    };
    let latest = history
        .iter()
        .find(|r| r.utt_id == current_utt_id)
        .unwrap_or(last);

    let count = history.len() as f64;
    let average = |pick: fn(&UtteranceRecord) -> f64| history.iter().map(|r| pick(r)).sum::<f64>() / count;

    let mut lines = vec![format!(
        "Speaker {}: {} utterance{} on record.",
        speaker_id,
        history.len(),
        if history.len() == 1 { "" } else { "s" }
    )];
    lines.push(format!(
        "Average scores: accuracy {:.1}, completeness {:.1}, fluency {:.1}, prosodic {:.1}.",
        average(|r| r.scores.accuracy),
        average(|r| r.scores.completeness),
        average(|r| r.scores.fluency),
        average(|r| r.scores.prosodic),
    ));

    if history.len() > 1 {
        let trends: Vec<String> = [
            ("accuracy", first.scores.accuracy, latest.scores.accuracy),
            ("fluency", first.scores.fluency, latest.scores.fluency),
            ("prosodic", first.scores.prosodic, latest.scores.prosodic),
        ]
        .iter()
        .map(|(name, from, to)| format!("{} {}", name, trend(*from, *to)))
        .collect();
        lines.push(format!("Since your first recording: {}.", trends.join(", ")));
    }

    let problems = problem_phones(history);
    if problems.is_empty() {
        lines.push("No recurring problem phones. Keep it up!".to_string());
    } else {
        let listed: Vec<String> = problems
            .iter()
            .map(|(phone, n)| format!("'{}' ({}x)", phone, n))
            .collect();
        lines.push(format!("Recurring problem phones: {}.", listed.join(", ")));
        lines.push(format!(
            "Practice words containing '{}' slowly, then at normal speed.",
            problems[0].0
        ));
    }

    lines.join("\n")
}

fn trend(from: f64, to: f64) -> &'static str {
    let delta = to - from;
    if delta > TREND_THRESHOLD {
        "improving"
    } else if delta < -TREND_THRESHOLD {
        "declining"
    } else {
        "stable"
    }
}

/// Most frequent problem phones across the history, by count then label
fn problem_phones(history: &[&UtteranceRecord]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for word in history.iter().flat_map(|r| &r.scores.word_scores) {
        for mis in &word.mispronunciations {
            *counts.entry(mis.canonical_phone.as_str()).or_insert(0) += 1;
        }
        if word.is_aligned() {
            for (phone, &score) in word.phones.iter().zip(&word.phones_accuracy) {
                let already_counted = word
                    .mispronunciations
                    .iter()
                    .any(|m| m.canonical_phone == *phone);
                if score < PROBLEM_PHONE_THRESHOLD && !already_counted {
                    *counts.entry(phone.as_str()).or_insert(0) += 1;
                }
            }
        }
    }

    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(phone, n)| (phone.to_string(), n))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(MAX_PROBLEM_PHONES);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Mispronunciation, ScoreSet, WordScore};

    fn record(utt_id: &str, accuracy: f64, fluency: f64, words: Vec<WordScore>) -> UtteranceRecord {
        UtteranceRecord::new(
            utt_id,
            "0001",
            "TEXT",
            ScoreSet {
                accuracy,
                completeness: 1.0,
                fluency,
                prosodic: 7.0,
                total: None,
                word_scores: words,
            },
        )
    }

    fn word_with(phones: &[&str], accuracy: &[f64], mis: Vec<Mispronunciation>) -> WordScore {
        WordScore {
            text: "W".to_string(),
            accuracy: 6.0,
            stress: 10.0,
            total: None,
            phones: phones.iter().map(|p| p.to_string()).collect(),
            phones_accuracy: accuracy.to_vec(),
            mispronunciations: mis,
        }
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(
            summarize_history("0042", &[], "x"),
            "No recorded utterances for speaker 0042 yet."
        );
    }

    #[test]
    fn test_trends_and_problem_phones() {
        let a = record(
            "000010011",
            5.0,
            8.0,
            vec![word_with(
                &["TH", "IH1"],
                &[0.0, 2.0],
                vec![Mispronunciation::unintelligible("TH", 0)],
            )],
        );
        let b = record(
            "000010035",
            7.0,
            8.2,
            vec![word_with(&["TH", "R"], &[1.0, 1.0], vec![])],
        );

        let summary = summarize_history("0001", &[&a, &b], "000010035");

        assert!(summary.contains("2 utterances on record"));
        assert!(summary.contains("accuracy 6.0"));
        assert!(summary.contains("accuracy improving, fluency stable, prosodic stable"));
        assert!(summary.contains("Recurring problem phones: 'TH' (2x), 'R' (1x)."));
        assert!(summary.contains("Practice words containing 'TH'"));
    }

    #[test]
    fn test_single_utterance_has_no_trend() {
        let a = record("000010011", 9.0, 9.0, vec![]);
        let summary = summarize_history("0001", &[&a], "000010011");

        assert!(summary.contains("1 utterance on record"));
        assert!(!summary.contains("Since your first recording"));
        assert!(summary.contains("No recurring problem phones"));
    }

    #[tokio::test]
    async fn test_rule_based_summarizer_trait() {
        let a = record("000010011", 9.0, 9.0, vec![]);
        let summarizer: Box<dyn HistorySummarizer> = Box::new(RuleBasedSummarizer);

        let text = summarizer.summarize("0001", &[&a], "000010011").await.unwrap();
        assert!(text.starts_with("Speaker 0001"));
    }
}
