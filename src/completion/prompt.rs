//! Input validation, prompt rendering and response cleanup.

use super::error::CompletionError;
use super::intent::TextIntent;

/// Fewer characters than this (after trimming) tend to produce filler text.
pub const MIN_TEXT_LENGTH: usize = 20;

/// Upper bound on the selection, in characters.
///
/// A rough stand-in for a token count.
pub const MAX_TEXT_LENGTH: usize = 2000;

/// Fences the user's text inside the prompt.
pub const DELIMITER: &str = "\"\"\"";

/// Reject selections that are too short or too long to send.
pub fn validate(text: &str) -> Result<(), CompletionError> {
    if text.trim().chars().count() < MIN_TEXT_LENGTH {
        return Err(CompletionError::TooShort);
    }
    if text.chars().count() > MAX_TEXT_LENGTH {
        return Err(CompletionError::TooLong);
    }
    Ok(())
}

/// Render the completion prompt for `intent`.
///
/// Any delimiter inside `text` is removed so the text cannot close the fence.
pub fn build_prompt(intent: TextIntent, text: &str) -> String {
    let sanitized = text.replace(DELIMITER, "");
    format!(
        "{}\n\nText: {}\n{}\n{}\n\n",
        intent.instruction(),
        DELIMITER,
        sanitized,
        DELIMITER
    )
}

/// Clean up the raw completion text.
///
/// Drops delimiter lines the model echoed back, then blank lines at either
/// end. Applying it twice gives the same result as applying it once.
pub fn clean_completion(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').filter(|line| *line != DELIMITER).collect();

    let start = lines
        .iter()
        .position(|line| !line.trim().is_empty())
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .map_or(start, |i| i + 1);

    lines[start..end].join("\n")
}
