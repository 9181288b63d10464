use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The text transformation a user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextIntent {
    ShortenText,
    SimplifyText,
    FixGrammarIssues,
}

impl TextIntent {
    /// Stable command name, as typed on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            TextIntent::ShortenText => "shorten",
            TextIntent::SimplifyText => "simplify",
            TextIntent::FixGrammarIssues => "fix-grammar",
        }
    }

    pub fn all() -> [TextIntent; 3] {
        [
            TextIntent::ShortenText,
            TextIntent::SimplifyText,
            TextIntent::FixGrammarIssues,
        ]
    }

    /// Instruction placed at the top of the prompt.
    pub fn instruction(&self) -> &'static str {
        match self {
            TextIntent::ShortenText => "Shorten the following text. Keep the formatting.",
            TextIntent::SimplifyText => {
                "Make the following snippet easier to understand. Keep the formatting."
            }
            TextIntent::FixGrammarIssues => {
                "Fix grammar and spelling issues in the following snippet. Keep the formatting. Change as few words as possible."
            }
        }
    }

    /// Label for the progress indicator while the request runs.
    pub fn progress_title(&self) -> &'static str {
        match self {
            TextIntent::ShortenText => "Shortening the text",
            TextIntent::SimplifyText => "Simplifying the text",
            TextIntent::FixGrammarIssues => "Fixing grammar and spelling issues",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown text command: {0}")]
pub struct UnknownIntent(pub String);

impl FromStr for TextIntent {
    type Err = UnknownIntent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TextIntent::all()
            .into_iter()
            .find(|intent| intent.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownIntent(s.to_string()))
    }
}

impl fmt::Display for TextIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
