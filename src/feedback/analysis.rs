use tracing::warn;

use super::bands::{describe_or_sentinel, Metric};
use crate::models::{ScoreSet, WordScore};

/// Phones below this accuracy get a focus clause
const FOCUS_THRESHOLD: f64 = 1.5;
/// Below this a focused phone is called incorrect rather than accented
const INCORRECT_THRESHOLD: f64 = 0.5;

/// Render analysis feedback for one utterance.
///
/// Pure and deterministic: the same scores always give the same text.
/// `utt_id` is only used for diagnostics.
pub fn render_analysis(utt_id: &str, text: &str, scores: &ScoreSet) -> String {
    let mut feedback = format!("Your sentence '{}' scores:\n", text);

    for (metric, score) in [
        (Metric::Accuracy, scores.accuracy),
        (Metric::Completeness, scores.completeness),
        (Metric::Fluency, scores.fluency),
        (Metric::Prosodic, scores.prosodic),
    ] {
        feedback.push_str(&format!(
            "- {} {:.1}: {}.\n",
            metric,
            score,
            describe_or_sentinel(metric, score)
        ));
    }

    for word in scores.word_scores.iter().filter(|w| w.needs_feedback()) {
        feedback.push_str(&render_word(utt_id, word));
        feedback.push('\n');
    }

    feedback
}

fn render_word(utt_id: &str, word: &WordScore) -> String {
    let mut clauses = vec![format!(
        "- '{}' (accuracy: {:.1}, stress: {:.1}):",
        word.text, word.accuracy, word.stress
    )];

    if word.mispronunciations.is_empty() {
        clauses.push("Some phonemes need work.".to_string());
    } else {
        for mis in &word.mispronunciations {
            clauses.push(format!(
                "You said '{}' instead of '{}'.",
                mis.produced_phone, mis.canonical_phone
            ));
        }
    }

    if word.is_aligned() {
        for (phone, &score) in word.phones.iter().zip(&word.phones_accuracy) {
            if score < FOCUS_THRESHOLD {
                let severity = if score < INCORRECT_THRESHOLD {
                    "incorrect"
                } else {
                    "heavy accent"
                };
                clauses.push(format!("Focus on '{}': {} pronunciation.", phone, severity));
            }
        }
    } else {
        warn!(
            "Utterance {}, word '{}': {} phones but {} phone scores, skipping phone detail",
            utt_id,
            word.text,
            word.phones.len(),
            word.phones_accuracy.len()
        );
    }

    clauses.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Mispronunciation;

    fn word(text: &str, accuracy: f64, stress: f64, phones: &[&str], phones_accuracy: &[f64]) -> WordScore {
        WordScore {
            text: text.to_string(),
            accuracy,
            stress,
            total: None,
            phones: phones.iter().map(|p| p.to_string()).collect(),
            phones_accuracy: phones_accuracy.to_vec(),
            mispronunciations: vec![],
        }
    }

    fn scores(word_scores: Vec<WordScore>) -> ScoreSet {
        ScoreSet {
            accuracy: 9.5,
            completeness: 1.0,
            fluency: 6.5,
            prosodic: 11.0,
            total: None,
            word_scores,
        }
    }

    #[test]
    fn test_header_and_metric_lines() {
        let text = render_analysis("u1", "HELLO WORLD", &scores(vec![]));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Your sentence 'HELLO WORLD' scores:");
        assert_eq!(lines[1], "- Accuracy 9.5: Excellent, no obvious mistakes.");
        assert_eq!(lines[2], "- Completeness 1.0: All words pronounced.");
        assert_eq!(lines[3], "- Fluency 6.5: Generally fluent, few pauses.");
        assert_eq!(lines[4], "- Prosodic 11.0: Score out of range.");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_flagged_word_with_mispronunciation_and_focus() {
        let mut hello = word("HELLO", 7.0, 10.0, &["HH", "EH1", "L", "OW0"], &[2.0, 0.0, 1.0, 2.0]);
        hello.mispronunciations = vec![Mispronunciation::unintelligible("EH1", 1)];

        let text = render_analysis("u1", "HELLO", &scores(vec![hello]));
        let last = text.lines().last().unwrap();

        assert_eq!(
            last,
            "- 'HELLO' (accuracy: 7.0, stress: 10.0): You said '<unk>' instead of 'EH1'. \
             Focus on 'EH1': incorrect pronunciation. Focus on 'L': heavy accent pronunciation."
        );
    }

    #[test]
    fn test_only_flagged_words_in_order() {
        let words = vec![
            word("WE", 6.0, 10.0, &["W", "IY0"], &[2.0, 2.0]),
            word("CALL", 10.0, 10.0, &["K", "AO1", "L"], &[2.0, 2.0, 2.0]),
            word("IT", 9.0, 5.0, &["IH1", "T"], &[2.0, 2.0]),
        ];
        let text = render_analysis("u1", "WE CALL IT", &scores(words));
        let word_lines: Vec<&str> = text.lines().skip(5).collect();

        assert_eq!(word_lines.len(), 2);
        assert!(word_lines[0].starts_with("- 'WE'"));
        assert!(word_lines[0].ends_with("Some phonemes need work."));
        assert!(word_lines[1].starts_with("- 'IT'"));
    }

    #[test]
    fn test_misaligned_word_skips_phone_detail() {
        let broken = word("BEAR", 5.0, 10.0, &["B", "EH1", "R"], &[0.0, 0.0]);
        let text = render_analysis("u1", "BEAR", &scores(vec![broken]));

        assert!(text.contains("- 'BEAR' (accuracy: 5.0, stress: 10.0): Some phonemes need work."));
        assert!(!text.contains("Focus on"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let words = vec![word("WE", 6.0, 10.0, &["W", "IY0"], &[1.0, 0.2])];
        let s = scores(words);
        assert_eq!(render_analysis("u1", "WE", &s), render_analysis("u1", "WE", &s));
    }
}
