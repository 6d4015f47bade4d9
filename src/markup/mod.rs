// src/markup/mod.rs
// Inline error markup embedded in corrected transcriptions:
//   [phrase|category] or [phrase|category|original]

mod scanner;

pub use scanner::parse;

use serde::Serialize;

/// Class of reading mistake carried by an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Replacement,
    Addition,
    Omission,
    Repetition,
    Reversal,
}

impl ErrorCategory {
    pub(crate) fn from_token(token: &str) -> Option<Self> {
        match token {
            "replacement" => Some(Self::Replacement),
            "addition" => Some(Self::Addition),
            "omission" => Some(Self::Omission),
            "repetition" => Some(Self::Repetition),
            "reversal" => Some(Self::Reversal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replacement => "replacement",
            Self::Addition => "addition",
            Self::Omission => "omission",
            Self::Repetition => "repetition",
            Self::Reversal => "reversal",
        }
    }

    /// Only replacements and reversals carry the text the reader should have
    /// said; for the other categories a third markup field is meaningless and
    /// gets dropped.
    pub fn keeps_original(&self) -> bool {
        matches!(self, Self::Replacement | Self::Reversal)
    }
}

/// One contiguous unit of display text produced by the scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Segment {
    Plain {
        text: String,
    },
    Error {
        phrase: String,
        category: ErrorCategory,
        #[serde(skip_serializing_if = "Option::is_none")]
        original: Option<String>,
    },
}
