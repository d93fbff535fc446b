use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::models::RawScoresDocument;

/// Read a speaker map file (`utt_id speaker_id` per line)
pub fn parse_speaker_map_file(path: &Path) -> Result<HashMap<String, String>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    Ok(parse_speaker_map(&content))
}

/// Parse speaker map text. Lines without exactly two columns are skipped.
pub fn parse_speaker_map(content: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [utt_id, speaker_id] => {
                map.insert(utt_id.to_string(), speaker_id.to_string());
            }
            _ => warn!("Invalid speaker map line: {}", line),
        }
    }

    debug!("Loaded {} speaker mappings", map.len());
    map
}

/// Read a reference phone transcription file (`utt_id phone phone ...` per line)
pub fn parse_text_phone_file(path: &Path) -> Result<HashMap<String, String>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    Ok(parse_text_phone(&content))
}

/// Parse reference phone text. Lines with an id but no phones are skipped.
pub fn parse_text_phone(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .filter_map(|line| {
            let (utt_id, phones) = line.trim().split_once(char::is_whitespace)?;
            let phones = phones.trim();
            (!phones.is_empty()).then(|| (utt_id.to_string(), phones.to_string()))
        })
        .collect()
}

/// Read a raw scores document (detailed or coarse)
pub fn parse_scores_file(path: &Path) -> Result<RawScoresDocument> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    parse_scores_json(&content)
}

pub fn parse_scores_json(json: &str) -> Result<RawScoresDocument> {
    serde_json::from_str(json).context("Failed to parse scores JSON")
}
