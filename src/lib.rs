pub mod config;
pub mod error;
pub mod feedback;
pub mod io;
pub mod llm;
pub mod models;
pub mod scoring;
pub mod stages;
pub mod store;
pub mod validation;

pub use config::{DataPaths, SourcePaths};
pub use error::{StoreError, ValidationError};
pub use feedback::{describe, render_analysis, Metric};
pub use io::{PersonalizedFeedbackEntry, PersonalizedFeedbackLog};
pub use llm::{
    AnthropicClient, AnthropicConfig, AnthropicSummarizer, HistorySummarizer, RuleBasedSummarizer,
};
pub use models::{
    Mispronunciation, PhoneToken, RaterTranscription, ScoreSet, SpeakerIndex, UtteranceRecord,
    WordScore,
};
pub use scoring::{detect_mispronunciations, phone_accuracies, score_word};
pub use stages::{
    execute_analysis, execute_personalized, execute_prepare, AnalysisOutcome, NewUtterance,
    PrepareConfig,
};
pub use store::RecordStore;
pub use validation::{parse_score, parse_word_scores};
