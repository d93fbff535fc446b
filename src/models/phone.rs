/// Marker printed in place of a phone nobody could make out
pub const UNINTELLIGIBLE_MARKER: &str = "<unk>";

const BRACKET_CHARS: [char; 6] = ['(', ')', '{', '}', '[', ']'];

/// One rater token, classified by its bracket convention
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhoneToken {
    /// Bare label, pronounced as expected
    Correct(String),
    /// `(x)`: deleted or unintelligible
    Unintelligible(String),
    /// `{x}`: stress misplaced
    StressMarked(String),
    /// `[x]`: the phone the speaker produced instead
    Inserted(String),
}

impl PhoneToken {
    /// Classify a raw token.
    ///
    /// Parentheses win over braces, braces over square brackets. A token
    /// with an unmatched bracket character is treated as `Correct`.
    pub fn parse(raw: &str) -> Self {
        if raw.contains('(') && raw.contains(')') {
            Self::Unintelligible(strip(raw, &['(', ')']))
        } else if raw.contains('{') && raw.contains('}') {
            Self::StressMarked(strip(raw, &['{', '}']))
        } else if raw.contains('[') && raw.contains(']') {
            Self::Inserted(strip(raw, &['[', ']']))
        } else {
            Self::Correct(raw.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Correct(l) | Self::Unintelligible(l) | Self::StressMarked(l) | Self::Inserted(l) => l,
        }
    }

    /// Contribution of this token to a per-phone accuracy score (0-2)
    pub fn accuracy_weight(&self) -> u8 {
        match self {
            Self::Unintelligible(_) => 0,
            Self::StressMarked(_) => 1,
            Self::Correct(_) | Self::Inserted(_) => 2,
        }
    }
}

fn strip(raw: &str, chars: &[char]) -> String {
    raw.trim_matches(|c| chars.contains(&c)).to_string()
}

/// A single rater's phone transcription for one word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaterTranscription {
    pub tokens: Vec<PhoneToken>,
    /// Whether the raw text carried any bracket character at all
    pub has_markers: bool,
}

impl RaterTranscription {
    pub fn parse(raw: &str) -> Self {
        Self {
            tokens: raw.split_whitespace().map(PhoneToken::parse).collect(),
            has_markers: raw.contains(BRACKET_CHARS),
        }
    }

    pub fn get(&self, index: usize) -> Option<&PhoneToken> {
        self.tokens.get(index)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
