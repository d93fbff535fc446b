use std::path::{Path, PathBuf};

/// Where the raw assessment sources live
#[derive(Debug, Clone)]
pub struct SourcePaths {
    /// `utt_id speaker_id` pairs
    pub speaker_map: PathBuf,
    /// Per-rater scores with phone transcriptions
    pub scores_detail: PathBuf,
    /// Aggregated scores
    pub scores: PathBuf,
    /// Reference phone transcription per utterance
    pub text_phone: PathBuf,
}

impl SourcePaths {
    /// Standard corpus layout under `corpus_dir`
    pub fn under(corpus_dir: &Path) -> Self {
        Self {
            speaker_map: corpus_dir.join("train").join("utt2spk"),
            scores_detail: corpus_dir.join("resource").join("scores-detail.json"),
            scores: corpus_dir.join("resource").join("scores.json"),
            text_phone: corpus_dir.join("resource").join("text-phone"),
        }
    }
}

/// All files the tool reads and writes
#[derive(Debug, Clone)]
pub struct DataPaths {
    /// Persisted record store
    pub database: PathBuf,
    /// Personalized-feedback log
    pub personalized_feedback: PathBuf,
    pub sources: SourcePaths,
}

impl DataPaths {
    pub const DATABASE_FILE: &'static str = "database.json";
    pub const PERSONALIZED_FILE: &'static str = "personalized_feedback.json";
    pub const CORPUS_DIR: &'static str = "speechocean762-main";

    pub fn under(data_dir: &Path) -> Self {
        Self {
            database: data_dir.join(Self::DATABASE_FILE),
            personalized_feedback: data_dir.join(Self::PERSONALIZED_FILE),
            sources: SourcePaths::under(&data_dir.join(Self::CORPUS_DIR)),
        }
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::under(Path::new("data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let paths = DataPaths::default();
        assert_eq!(paths.database, PathBuf::from("data/database.json"));
        assert_eq!(
            paths.sources.scores_detail,
            PathBuf::from("data/speechocean762-main/resource/scores-detail.json")
        );
        assert_eq!(
            paths.sources.speaker_map,
            PathBuf::from("data/speechocean762-main/train/utt2spk")
        );
    }
}
