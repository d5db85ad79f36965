pub mod admin;
pub mod auth;
pub mod chat;
pub mod reviews;
pub mod teams;
pub mod tournaments;

use infra::models::AGE_GROUPS;

use crate::error::AppError;

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn validate_state_code(value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.len() != 2 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::Validation(
            "state must be a two-letter code".to_string(),
        ));
    }
    Ok(trimmed.to_uppercase())
}

pub(crate) fn validate_age_groups(groups: &[String]) -> Result<Vec<String>, AppError> {
    if groups.is_empty() {
        return Err(AppError::Validation(
            "at least one age group is required".to_string(),
        ));
    }

    let mut validated = Vec::with_capacity(groups.len());
    for group in groups {
        let tag = group.trim().to_uppercase();
        if !AGE_GROUPS.contains(&tag.as_str()) {
            return Err(AppError::Validation(format!("unknown age group: {group}")));
        }
        if !validated.contains(&tag) {
            validated.push(tag);
        }
    }

    Ok(validated)
}

pub(crate) fn validate_rating(field: &str, value: i16) -> Result<i16, AppError> {
    if !(1..=5).contains(&value) {
        return Err(AppError::Validation(format!(
            "{field} must be between 1 and 5"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_codes_normalize_to_uppercase() {
        assert_eq!(validate_state_code("ga").unwrap(), "GA");
        assert!(validate_state_code("Georgia").is_err());
        assert!(validate_state_code("1A").is_err());
    }

    #[test]
    fn age_groups_validate_against_known_tags() {
        let ok = validate_age_groups(&["12u".into(), "14U".into()]).unwrap();
        assert_eq!(ok, vec!["12U".to_string(), "14U".to_string()]);

        assert!(validate_age_groups(&[]).is_err());
        assert!(validate_age_groups(&["21U".into()]).is_err());
    }

    #[test]
    fn ratings_must_be_one_to_five() {
        assert!(validate_rating("coaching", 0).is_err());
        assert!(validate_rating("coaching", 6).is_err());
        assert_eq!(validate_rating("coaching", 3).unwrap(), 3);
    }
}
