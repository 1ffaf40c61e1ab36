// Validation utilities
use crate::error::{Error, Result};
use regex::Regex;
use std::sync::OnceLock;

const PROHIBITED_WORDS: &[&str] = &["spam", "scam", "viagra", "casino"];

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)https?://\S+").expect("valid url regex"))
}

/// Title must be 3-200 characters once trimmed
pub fn validate_recipe_title(title: &str) -> Result<()> {
    let len = title.trim().chars().count();
    if (3..=200).contains(&len) {
        Ok(())
    } else {
        Err(Error::Validation(
            "Title must be between 3 and 200 characters".to_string(),
        ))
    }
}

/// Validate difficulty level
pub fn validate_difficulty(difficulty: &str) -> Result<()> {
    match difficulty {
        "easy" | "medium" | "hard" => Ok(()),
        _ => Err(Error::Validation(format!(
            "Invalid difficulty level: {difficulty}. Must be easy, medium, or hard"
        ))),
    }
}

/// A character followed by ten or more repeats of itself
fn has_repeated_run(text: &str) -> bool {
    let mut previous = None;
    let mut run = 0;
    for c in text.chars() {
        if Some(c) == previous {
            run += 1;
            if run >= 10 {
                return true;
            }
        } else {
            previous = Some(c);
            run = 0;
        }
    }
    false
}

/// Basic content moderation: prohibited words, character spam and links
pub fn moderate_content(text: &str) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }

    let lower = text.to_lowercase();
    if PROHIBITED_WORDS.iter().any(|word| lower.contains(word)) {
        return Err(Error::Validation(
            "Content contains prohibited words".to_string(),
        ));
    }

    if has_repeated_run(text) || url_re().is_match(text) {
        return Err(Error::Validation("Content appears to be spam".to_string()));
    }

    Ok(())
}
