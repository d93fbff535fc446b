use crate::models::UtteranceRecord;

/// System prompt for longitudinal pronunciation coaching
pub const HISTORY_SYSTEM_PROMPT: &str = r#"You are a pronunciation coach reviewing a learner's practice history.

You receive every scored utterance the learner has recorded, oldest first, with
utterance-level scores (accuracy, completeness, fluency, prosodic on a 0-10 scale)
and the analysis feedback already given for each one.

Write a short personalized summary (at most 150 words) that:
- Names the learner's most persistent problem phones or words.
- Says whether accuracy, fluency and prosody are improving, stable or declining.
- Gives two or three concrete practice suggestions.

Do not invent scores. Do not repeat the per-utterance feedback verbatim."#;

/// Build the user prompt from a speaker's history
pub fn build_history_prompt(
    speaker_id: &str,
    history: &[&UtteranceRecord],
    current_utt_id: &str,
) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!("# Speaker: {}\n", speaker_id));
    prompt.push_str(&format!("Utterances on record: {}\n", history.len()));
    prompt.push_str(&format!("Most recent utterance: {}\n\n", current_utt_id));

    for record in history {
        let scores = &record.scores;
        let marker = if record.utt_id == current_utt_id {
            " (current)"
        } else {
            ""
        };
        prompt.push_str(&format!("## {}{}: \"{}\"\n", record.utt_id, marker, record.text));
        prompt.push_str(&format!(
            "Scores: accuracy {:.1}, completeness {:.1}, fluency {:.1}, prosodic {:.1}\n",
            scores.accuracy, scores.completeness, scores.fluency, scores.prosodic
        ));
        match &record.analysis_feedback {
            Some(feedback) => {
                prompt.push_str("Feedback given:\n");
                prompt.push_str(feedback.trim_end());
                prompt.push_str("\n\n");
            }
            None => prompt.push_str("Feedback given: none\n\n"),
        }
    }

    prompt.push_str("Write the personalized summary now.\n");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScoreSet;

    #[test]
    fn test_history_prompt_lists_utterances_in_order() {
        let scores = ScoreSet {
            accuracy: 7.0,
            completeness: 1.0,
            fluency: 8.0,
            prosodic: 7.5,
            total: None,
            word_scores: vec![],
        };
        let first = UtteranceRecord::new("000010011", "0001", "WE CALL IT BEAR", scores.clone())
            .with_analysis_feedback("Good job.\n");
        let second = UtteranceRecord::new("000010035", "0001", "IT IS", scores);

        let prompt = build_history_prompt("0001", &[&first, &second], "000010035");

        let first_pos = prompt.find("## 000010011").unwrap();
        let second_pos = prompt.find("## 000010035 (current)").unwrap();
        assert!(first_pos < second_pos);
        assert!(prompt.contains("Feedback given:\nGood job.\n"));
        assert!(prompt.contains("Feedback given: none"));
        assert!(prompt.contains("Utterances on record: 2"));
    }
}
