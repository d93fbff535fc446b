use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One personalized-feedback entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalizedFeedbackEntry {
    pub speaker_id: String,
    pub personalized_feedback: String,
    /// RFC 3339 timestamp of generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

impl PersonalizedFeedbackEntry {
    pub fn new(speaker_id: &str, feedback: &str) -> Self {
        Self {
            speaker_id: speaker_id.to_string(),
            personalized_feedback: feedback.to_string(),
            generated_at: Some(chrono::Utc::now().to_rfc3339()),
        }
    }
}

/// Append-only log of personalized feedback, rewritten in full on each append
#[derive(Debug)]
pub struct PersonalizedFeedbackLog {
    path: PathBuf,
    entries: Vec<PersonalizedFeedbackEntry>,
}

impl PersonalizedFeedbackLog {
    /// Load the log; a missing file starts an empty one
    pub fn load(path: &Path) -> Result<Self> {
        let entries = match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse personalized feedback: {:?}", path))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read file: {:?}", path));
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn append(&mut self, entry: PersonalizedFeedbackEntry) -> Result<()> {
        self.entries.push(entry);
        self.write_json()
    }

    pub fn entries(&self) -> &[PersonalizedFeedbackEntry] {
        &self.entries
    }

    /// Entries for one speaker, oldest first
    pub fn for_speaker<'a>(
        &'a self,
        speaker_id: &'a str,
    ) -> impl Iterator<Item = &'a PersonalizedFeedbackEntry> + 'a {
        self.entries.iter().filter(move |e| e.speaker_id == speaker_id)
    }

    fn write_json(&self) -> Result<()> {
        write_json_file(&self.path, &self.entries)?;
        debug!("Wrote {} personalized feedback entries", self.entries.len());
        Ok(())
    }
}

/// Serialize `value` as pretty JSON, replacing the whole file
pub fn write_json_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, value).context("Failed to write JSON")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_log_starts_empty_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("personalized_feedback.json");

        let mut log = PersonalizedFeedbackLog::load(&path).unwrap();
        assert!(log.entries().is_empty());

        log.append(PersonalizedFeedbackEntry::new("0001", "Keep practising 'TH'."))
            .unwrap();
        log.append(PersonalizedFeedbackEntry::new("0002", "Great progress."))
            .unwrap();

        let reloaded = PersonalizedFeedbackLog::load(&path).unwrap();
        assert_eq!(reloaded.entries().len(), 2);
        assert_eq!(reloaded.for_speaker("0001").count(), 1);
        assert_eq!(reloaded.entries()[1].personalized_feedback, "Great progress.");
    }

    #[test]
    fn test_reads_entries_without_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("personalized_feedback.json");
        std::fs::write(
            &path,
            r#"[{"speaker_id": "0001", "personalized_feedback": "Older entry"}]"#,
        )
        .unwrap();

        let log = PersonalizedFeedbackLog::load(&path).unwrap();
        assert_eq!(log.entries()[0].generated_at, None);
    }
}
