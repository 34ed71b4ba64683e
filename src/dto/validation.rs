//! Validation helpers for inbound payloads.

use std::collections::HashSet;

use validator::ValidationError;

/// Longest accepted person name, in characters.
pub const MAX_NAME_CHARS: usize = 64;
/// Most candidate answers accepted on either side of a duel.
pub const MAX_DUEL_ANSWERS: usize = 64;

/// Validates that a person name is non-blank and at most [`MAX_NAME_CHARS`] long.
///
/// # Examples
///
/// ```ignore
/// validate_person_name("Alice") // Ok
/// validate_person_name("   ")   // Err - blank
/// ```
pub fn validate_person_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("person_name_blank");
        err.message = Some("Person name must not be blank".into());
        return Err(err);
    }

    let count = name.chars().count();
    if count > MAX_NAME_CHARS {
        let mut err = ValidationError::new("person_name_length");
        err.message = Some(
            format!("Person name must be at most {MAX_NAME_CHARS} characters (got {count})")
                .into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates a list of candidate answers: bounded length, no blank entries.
///
/// Duplicates are allowed since answers are free text.
pub fn validate_answer_list(answers: &[String]) -> Result<(), ValidationError> {
    if answers.len() > MAX_DUEL_ANSWERS {
        let mut err = ValidationError::new("answer_list_length");
        err.message = Some(
            format!(
                "At most {MAX_DUEL_ANSWERS} answers are accepted (got {})",
                answers.len()
            )
            .into(),
        );
        return Err(err);
    }

    if answers.iter().any(|answer| answer.trim().is_empty()) {
        let mut err = ValidationError::new("answer_blank");
        err.message = Some("Answers must not be blank".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that every name of a roster is unique and that at most one
/// showman is announced.
pub fn validate_roster<'a>(
    entries: impl IntoIterator<Item = (&'a str, bool)>,
) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    let mut showmen = 0;

    for (name, is_showman) in entries {
        if !seen.insert(name) {
            let mut err = ValidationError::new("roster_duplicate_name");
            err.message = Some(format!("Person `{name}` is listed more than once").into());
            return Err(err);
        }
        if is_showman {
            showmen += 1;
        }
    }

    if showmen > 1 {
        let mut err = ValidationError::new("roster_showman_count");
        err.message = Some(format!("At most one showman is allowed (got {showmen})").into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_person_name() {
        assert!(validate_person_name("Alice").is_ok());
        assert!(validate_person_name("Жанна").is_ok());
        assert!(validate_person_name("").is_err());
        assert!(validate_person_name("   ").is_err());
        assert!(validate_person_name(&"x".repeat(MAX_NAME_CHARS + 1)).is_err());
    }

    #[test]
    fn test_validate_answer_list() {
        let answers = vec!["Paris".to_string(), "Paris".to_string()];
        assert!(validate_answer_list(&answers).is_ok()); // duplicates allowed
        assert!(validate_answer_list(&[]).is_ok());
        assert!(validate_answer_list(&[" ".to_string()]).is_err());
        assert!(validate_answer_list(&vec!["a".to_string(); MAX_DUEL_ANSWERS + 1]).is_err());
    }

    #[test]
    fn test_validate_roster() {
        assert!(validate_roster([("Host", true), ("Alice", false)]).is_ok());
        assert!(validate_roster([("Alice", false), ("Alice", false)]).is_err());
        assert!(validate_roster([("Host", true), ("Other", true)]).is_err());
    }
}
