use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{SpeakerIndex, UtteranceRecord};

/// `speakers` as written today, or as the older list of speaker ids
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SpeakersField {
    Keyed(SpeakerIndex),
    Legacy(Vec<String>),
}

/// `utterances` keyed by id, or as the older plain list of records
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UtterancesField {
    Keyed(BTreeMap<String, UtteranceRecord>),
    Legacy(Vec<UtteranceRecord>),
}

/// The store file as read from disk, in any supported shape
#[derive(Debug, Deserialize)]
pub(crate) struct StoredDocument {
    speakers: SpeakersField,
    utterances: UtterancesField,
}

/// The store file as written
#[derive(Debug, Serialize)]
pub(crate) struct StoredDocumentRef<'a> {
    pub speakers: &'a SpeakerIndex,
    pub utterances: &'a BTreeMap<String, UtteranceRecord>,
}

/// A loaded document in the keyed shape, with its index consistent
#[derive(Debug)]
pub(crate) struct NormalizedDocument {
    pub speakers: SpeakerIndex,
    pub utterances: BTreeMap<String, UtteranceRecord>,
    /// A legacy shape was upgraded
    pub upgraded: bool,
    /// Index entries added or dropped to match the records
    pub repaired: usize,
}

impl StoredDocument {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Upgrade legacy shapes and make the speaker index agree with the records.
    ///
    /// Afterwards every bucket id has a record owned by that speaker, every
    /// record sits in its speaker's bucket, and buckets are sorted.
    pub fn normalize(self) -> NormalizedDocument {
        let mut upgraded = false;

        let utterances = match self.utterances {
            UtterancesField::Keyed(map) => map,
            UtterancesField::Legacy(list) => {
                upgraded = true;
                list.into_iter().map(|u| (u.utt_id.clone(), u)).collect()
            }
        };

        let (mut speakers, legacy_speakers) = match self.speakers {
            SpeakersField::Keyed(index) => (index, false),
            SpeakersField::Legacy(ids) => {
                upgraded = true;
                let mut index = SpeakerIndex::new();
                for id in &ids {
                    index.ensure_speaker(id);
                }
                (index, true)
            }
        };

        let mut repaired = 0;

        let dropped = speakers.retain_sorted(|speaker, utt| {
            utterances
                .get(utt)
                .is_some_and(|record| record.speaker_id == speaker)
        });
        for (speaker, utt) in &dropped {
            warn!("Dropping {} from speaker {}: no matching utterance record", utt, speaker);
        }
        repaired += dropped.len();

        for record in utterances.values() {
            let added = speakers.insert(&record.speaker_id, &record.utt_id);
            if added && !legacy_speakers {
                warn!(
                    "Utterance {} was missing from speaker {} index",
                    record.utt_id, record.speaker_id
                );
                repaired += 1;
            }
        }

        NormalizedDocument {
            speakers,
            utterances,
            upgraded,
            repaired,
        }
    }
}
