use std::fmt;

/// Rendered when a score falls outside every band
pub const OUT_OF_RANGE: &str = "Score out of range";

/// Slack added to a band's upper bound so fractional scores land in it
const UPPER_SLACK: f64 = 0.999;
/// Tolerance for single-point bands
const POINT_TOLERANCE: f64 = 0.001;

/// The four utterance-level metrics with descriptive bands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Accuracy,
    Completeness,
    Fluency,
    Prosodic,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Accuracy,
        Metric::Completeness,
        Metric::Fluency,
        Metric::Prosodic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Accuracy => "Accuracy",
            Metric::Completeness => "Completeness",
            Metric::Fluency => "Fluency",
            Metric::Prosodic => "Prosodic",
        }
    }

    fn bands(self) -> &'static [(Band, &'static str)] {
        match self {
            Metric::Accuracy => ACCURACY_BANDS,
            Metric::Completeness => COMPLETENESS_BANDS,
            Metric::Fluency => FLUENCY_BANDS,
            Metric::Prosodic => PROSODIC_BANDS,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A closed score range, or a single exact value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Band {
    Range { low: f64, high: f64 },
    Point(f64),
}

impl Band {
    pub fn contains(&self, score: f64) -> bool {
        match *self {
            Band::Range { low, high } => low <= score && score <= high + UPPER_SLACK,
            Band::Point(p) => (p - score).abs() < POINT_TOLERANCE,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Band::Range { low, high } => write!(f, "{}-{}", low, high),
            Band::Point(p) => write!(f, "{:.1}", p),
        }
    }
}

const fn range(low: f64, high: f64) -> Band {
    Band::Range { low, high }
}

// Checked in order; the first containing band wins.
const ACCURACY_BANDS: &[(Band, &str)] = &[
    (range(9.0, 10.0), "Excellent, no obvious mistakes"),
    (range(7.0, 8.0), "Good, few pronunciation mistakes"),
    (range(5.0, 6.0), "Understandable, many mistakes and accent"),
    (range(3.0, 4.0), "Poor, serious mistakes"),
    (range(0.0, 2.0), "Extremely poor, barely recognizable"),
];

const COMPLETENESS_BANDS: &[(Band, &str)] = &[
    (Band::Point(1.0), "All words pronounced"),
    (range(0.8, 0.9), "Most words pronounced"),
    (range(0.0, 0.7), "Significant omissions"),
];

const FLUENCY_BANDS: &[(Band, &str)] = &[
    (range(8.0, 10.0), "Fluent, no noticeable pauses"),
    (range(6.0, 7.0), "Generally fluent, few pauses"),
    (range(4.0, 5.0), "A little influent, many pauses"),
    (range(0.0, 3.0), "Very influent, lots of pauses"),
];

const PROSODIC_BANDS: &[(Band, &str)] = &[
    (range(9.0, 10.0), "Correct intonation, native-like rhythm"),
    (range(7.0, 8.0), "Nearly correct intonation, little stammering"),
    (range(5.0, 6.0), "Unstable speed, poor rhythm"),
    (range(3.0, 4.0), "Too fast/slow, no rhythm"),
    (range(0.0, 2.0), "Poor intonation, lots of pauses"),
];

/// Phrase for the first band containing `score`, or `None` if out of range
pub fn describe(metric: Metric, score: f64) -> Option<&'static str> {
    metric
        .bands()
        .iter()
        .find(|(band, _)| band.contains(score))
        .map(|(_, phrase)| *phrase)
}

/// Like [`describe`] but renders the out-of-range sentinel
pub fn describe_or_sentinel(metric: Metric, score: f64) -> &'static str {
    describe(metric, score).unwrap_or(OUT_OF_RANGE)
}
