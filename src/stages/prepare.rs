use anyhow::Result;
use tracing::{debug, info, warn};

use crate::feedback::render_analysis;
use crate::store::RecordStore;

/// Configuration for bulk analysis regeneration
#[derive(Debug, Clone)]
pub struct PrepareConfig {
    /// Utterances processed between flushes
    pub batch_size: usize,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self { batch_size: 100 }
    }
}

/// Result of bulk regeneration
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PrepareResult {
    /// Feedback rendered and saved
    pub generated: usize,
    /// Feedback already cached
    pub already_present: usize,
    /// Utterances with no scores
    pub skipped: usize,
    /// Number of batches (and flushes)
    pub batches: usize,
}

/// Render analysis feedback for every utterance that lacks it.
///
/// Work proceeds in batches of `batch_size` with one flush per batch; batch
/// boundaries do not change the output.
pub fn execute_prepare(store: &mut RecordStore, config: &PrepareConfig) -> Result<PrepareResult> {
    let utt_ids = store.utterance_ids();
    let batch_size = config.batch_size.max(1);
    let total_batches = utt_ids.len().div_ceil(batch_size);
    let mut result = PrepareResult::default();

    info!(
        "Processing {} utterances in {} batches",
        utt_ids.len(),
        total_batches
    );

    for (n, batch) in utt_ids.chunks(batch_size).enumerate() {
        info!(
            "Processing batch {} of {} ({} utterances)",
            n + 1,
            total_batches,
            batch.len()
        );

        for utt_id in batch {
            if store.get_analysis_feedback(utt_id).is_some() {
                debug!("Analysis feedback already exists for utterance {}", utt_id);
                result.already_present += 1;
                continue;
            }

            let Some(record) = store.get_record(utt_id) else {
                warn!("No scores found for utterance {}, skipping", utt_id);
                result.skipped += 1;
                continue;
            };

            let feedback = render_analysis(utt_id, &record.text, &record.scores);
            store.save_analysis_feedback(utt_id, &feedback, true)?;
            debug!("Generated analysis feedback for utterance {}", utt_id);
            result.generated += 1;
        }

        store.flush()?;
        result.batches += 1;
    }

    info!(
        "Prepare complete: {} generated, {} already present, {} skipped",
        result.generated, result.already_present, result.skipped
    );
    Ok(result)
}
