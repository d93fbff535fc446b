use crate::models::{Mispronunciation, PhoneToken, RaterTranscription};

/// Tallies of what the raters heard at one reference position
#[derive(Debug, Default)]
struct PositionVotes<'a> {
    unintelligible: usize,
    correct: usize,
    /// Inserted phones with their counts, in first-seen order
    inserted: Vec<(&'a str, usize)>,
}

impl<'a> PositionVotes<'a> {
    fn record(&mut self, token: &'a PhoneToken) {
        match token {
            PhoneToken::Unintelligible(_) => self.unintelligible += 1,
            PhoneToken::Inserted(payload) => {
                match self.inserted.iter_mut().find(|(phone, _)| *phone == payload.as_str()) {
                    Some((_, count)) => *count += 1,
                    None => self.inserted.push((payload.as_str(), 1)),
                }
            }
            PhoneToken::Correct(_) => self.correct += 1,
            PhoneToken::StressMarked(_) => {}
        }
    }

    /// Most frequent inserted phone; earliest seen wins a tie
    fn top_insertion(&self) -> Option<(&'a str, usize)> {
        self.inserted
            .iter()
            .copied()
            .fold(None, |best, candidate| match best {
                Some((_, best_count)) if best_count >= candidate.1 => best,
                _ => Some(candidate),
            })
    }
}

/// Whether any rater marked anything in this word
pub fn has_markers(raters: &[RaterTranscription]) -> bool {
    raters.iter().any(|r| r.has_markers)
}

/// Mispronunciations agreed on by the raters
///
/// Nothing is reported unless at least one rater used a bracket marker. At
/// each reference position an `<unk>` event is emitted if any rater found the
/// phone unintelligible, and independently a substitution event for the most
/// frequent inserted phone. Both can fire for the same position.
pub fn detect_mispronunciations(
    reference: &[&str],
    raters: &[RaterTranscription],
) -> Vec<Mispronunciation> {
    if !has_markers(raters) {
        return Vec::new();
    }

    let mut found = Vec::new();
    for (i, canonical) in reference.iter().enumerate() {
        let mut votes = PositionVotes::default();
        for token in raters.iter().filter_map(|r| r.get(i)) {
            votes.record(token);
        }

        if votes.unintelligible > 0 {
            found.push(Mispronunciation::unintelligible(canonical, i));
        }
        if let Some((produced, count)) = votes.top_insertion() {
            if count > 0 {
                found.push(Mispronunciation::substitution(canonical, i, produced));
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNINTELLIGIBLE_MARKER;

    fn raters(raw: &[&str]) -> Vec<RaterTranscription> {
        raw.iter().map(|r| RaterTranscription::parse(r)).collect()
    }

    #[test]
    fn test_unintelligible_phone_detected() {
        let found = detect_mispronunciations(&["HH", "EH1", "L", "OW0"], &raters(&["HH (EH1) L OW0"]));

        assert_eq!(found, vec![Mispronunciation::unintelligible("EH1", 1)]);
        assert_eq!(found[0].produced_phone, UNINTELLIGIBLE_MARKER);
    }

    #[test]
    fn test_no_markers_means_no_mispronunciations() {
        let found = detect_mispronunciations(&["W", "IY0"], &raters(&["W IY0", "W IY0", "W"]));
        assert!(found.is_empty());
    }

    #[test]
    fn test_most_frequent_insertion_wins() {
        let found = detect_mispronunciations(
            &["DH", "AH0"],
            &raters(&["[D] AH0", "[Z] AH0", "[D] AH0", "DH AH0"]),
        );
        assert_eq!(found, vec![Mispronunciation::substitution("DH", 0, "D")]);
    }

    #[test]
    fn test_insertion_tie_keeps_first_seen() {
        let found = detect_mispronunciations(&["T"], &raters(&["[Z]", "[D]", "[D]", "[Z]"]));
        assert_eq!(found, vec![Mispronunciation::substitution("T", 0, "Z")]);
    }

    #[test]
    fn test_both_triggers_fire_at_same_index() {
        let found = detect_mispronunciations(&["R", "IY1"], &raters(&["(R) IY1", "[L] IY1"]));
        assert_eq!(
            found,
            vec![
                Mispronunciation::unintelligible("R", 0),
                Mispronunciation::substitution("R", 0, "L"),
            ]
        );
    }

    #[test]
    fn test_stress_marks_alone_report_nothing() {
        let found = detect_mispronunciations(&["AE1", "P"], &raters(&["{AE1} P", "AE1 P"]));
        assert!(found.is_empty());
    }
}
