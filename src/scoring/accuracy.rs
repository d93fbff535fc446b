use crate::models::RaterTranscription;

/// Accuracy assumed for a phone no rater reported
pub const UNREPORTED_PHONE_ACCURACY: f64 = 2.0;

/// Per-phone accuracy (0-2) for each reference phone
///
/// Each rater that reaches index `i` contributes 0 for an unintelligible
/// token, 1 for a stress-marked one and 2 otherwise; the phone's score is the
/// mean. Raters shorter than the reference are skipped past their length,
/// tokens past the reference length are ignored.
pub fn phone_accuracies(reference: &[&str], raters: &[RaterTranscription]) -> Vec<f64> {
    (0..reference.len())
        .map(|i| {
            let weights: Vec<u8> = raters
                .iter()
                .filter_map(|rater| rater.get(i))
                .map(|token| token.accuracy_weight())
                .collect();

            if weights.is_empty() {
                UNREPORTED_PHONE_ACCURACY
            } else {
                weights.iter().map(|&w| f64::from(w)).sum::<f64>() / weights.len() as f64
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raters(raw: &[&str]) -> Vec<RaterTranscription> {
        raw.iter().map(|r| RaterTranscription::parse(r)).collect()
    }

    #[test]
    fn test_single_unintelligible_phone() {
        let scores = phone_accuracies(&["HH", "EH1", "L", "OW0"], &raters(&["HH (EH1) L OW0"]));
        assert_eq!(scores, vec![2.0, 0.0, 2.0, 2.0]);
    }

    #[test]
    fn test_mean_across_raters() {
        let scores = phone_accuracies(
            &["W", "IY0"],
            &raters(&["W {IY0}", "W IY0", "(W) IY0", "W [IH0]"]),
        );
        assert_eq!(scores[0], 1.5);
        assert_eq!(scores[1], 1.75);
    }

    #[test]
    fn test_all_unintelligible_is_zero() {
        let scores = phone_accuracies(&["K", "AA1"], &raters(&["(K) AA1", "(K) AA1", "(K) {AA1}"]));
        assert_eq!(scores[0], 0.0);
    }

    #[test]
    fn test_unreported_index_defaults_to_two() {
        let scores = phone_accuracies(&["B", "EH1", "R"], &raters(&["(B)", "{B} EH1"]));
        assert_eq!(scores, vec![0.5, 2.0, UNREPORTED_PHONE_ACCURACY]);

        let nobody = phone_accuracies(&["B"], &[]);
        assert_eq!(nobody, vec![UNREPORTED_PHONE_ACCURACY]);
    }

    #[test]
    fn test_extra_rater_tokens_ignored() {
        let scores = phone_accuracies(&["IH1", "T"], &raters(&["IH1 T (S) (S)"]));
        assert_eq!(scores, vec![2.0, 2.0]);
    }

    #[test]
    fn test_scores_stay_in_range() {
        let reference = ["DH", "AH0", "K", "AE1", "T"];
        let scores = phone_accuracies(
            &reference,
            &raters(&["(DH) {AH0} K [EH1] T", "DH AH0 (K) AE1 {T}", "{DH} (AH0) K AE1 T"]),
        );
        assert_eq!(scores.len(), reference.len());
        assert!(scores.iter().all(|s| (0.0..=2.0).contains(s)));
    }
}
