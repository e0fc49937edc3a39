//! Validation of player-written values.
//!
//! Rules:
//! - Names: length range, letters/digits/space/`_`/`-`, no forbidden substring
//! - Descriptions: length cap, no forbidden substring
//! - Announcements: `|` or newline separated, line count and line length caps
//! - Tags: must be one of the configured tags
//! - Radii: whole number within the configured range
//!
//! A failed check re-prompts in the same state; nothing is mutated.

use thiserror::Error;

use crate::config::{OverlayConfig, TextLimits};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name must be {min} to {max} characters long")]
    NameLength { min: usize, max: usize },
    #[error("name may not contain {0:?}")]
    NameCharset(char),
    #[error("that text contains a forbidden word")]
    Forbidden,
    #[error("another world is already called {0:?}")]
    NameTaken(String),
    #[error("description may be at most {max} characters")]
    DescriptionLength { max: usize },
    #[error("announcement may have at most {max} lines")]
    TooManyLines { max: usize },
    #[error("announcement lines may be at most {max} characters")]
    LineLength { max: usize },
    #[error("{0:?} is not an available tag")]
    UnknownTag(String),
    #[error("{0:?} is not an available overlay")]
    UnknownOverlay(String),
    #[error("no player named {0:?}")]
    UnknownPlayer(String),
    #[error("that player is already a member")]
    AlreadyMember,
    #[error("that player is not a member")]
    NotAMember,
    #[error("the owner cannot be targeted")]
    OwnerImmune,
    #[error("expected a whole number, got {0:?}")]
    NotANumber(String),
    #[error("radius must be between {min} and {max}")]
    Radius { min: i32, max: i32 },
    #[error("that position is outside the world border")]
    OutsideBorder,
    #[error("missing value for {0:?}")]
    MissingField(&'static str),
}

fn check_forbidden(value: &str, limits: &TextLimits) -> Result<(), ValidationError> {
    let lowered = value.to_lowercase();
    if limits
        .forbidden
        .iter()
        .any(|word| !word.is_empty() && lowered.contains(&word.to_lowercase()))
    {
        return Err(ValidationError::Forbidden);
    }
    Ok(())
}

/// Validate a world name. Returns the trimmed name.
pub fn validate_name(raw: &str, limits: &TextLimits) -> Result<String, ValidationError> {
    let name = raw.trim();
    let len = name.chars().count();
    if len < limits.name_min || len > limits.name_max {
        return Err(ValidationError::NameLength {
            min: limits.name_min,
            max: limits.name_max,
        });
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-')))
    {
        return Err(ValidationError::NameCharset(bad));
    }
    check_forbidden(name, limits)?;
    Ok(name.to_string())
}

/// Validate a description. Returns the trimmed text.
pub fn validate_description(raw: &str, limits: &TextLimits) -> Result<String, ValidationError> {
    let text = raw.trim();
    if text.chars().count() > limits.description_max {
        return Err(ValidationError::DescriptionLength {
            max: limits.description_max,
        });
    }
    check_forbidden(text, limits)?;
    Ok(text.to_string())
}

/// Split and validate an announcement. Blank lines are dropped.
pub fn parse_announcement(raw: &str, limits: &TextLimits) -> Result<Vec<String>, ValidationError> {
    let lines: Vec<String> = raw
        .split(['|', '\n'])
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();
    if lines.len() > limits.announcement_max_lines {
        return Err(ValidationError::TooManyLines {
            max: limits.announcement_max_lines,
        });
    }
    if lines
        .iter()
        .any(|l| l.chars().count() > limits.announcement_max_line_len)
    {
        return Err(ValidationError::LineLength {
            max: limits.announcement_max_line_len,
        });
    }
    for line in &lines {
        check_forbidden(line, limits)?;
    }
    Ok(lines)
}

/// Match a tag against the configured set. Returns the canonical spelling.
pub fn validate_tag(raw: &str, limits: &TextLimits) -> Result<String, ValidationError> {
    let wanted = raw.trim();
    limits
        .tags
        .iter()
        .find(|t| t.eq_ignore_ascii_case(wanted))
        .cloned()
        .ok_or_else(|| ValidationError::UnknownTag(wanted.to_string()))
}

/// Match an overlay label against the configured set.
pub fn validate_overlay(raw: &str, overlay: &OverlayConfig) -> Result<String, ValidationError> {
    let wanted = raw.trim();
    overlay
        .labels
        .iter()
        .find(|l| l.eq_ignore_ascii_case(wanted))
        .cloned()
        .ok_or_else(|| ValidationError::UnknownOverlay(wanted.to_string()))
}

pub fn parse_radius(raw: &str, overlay: &OverlayConfig) -> Result<i32, ValidationError> {
    let trimmed = raw.trim();
    let radius: i32 = trimmed
        .parse()
        .map_err(|_| ValidationError::NotANumber(trimmed.to_string()))?;
    if radius < overlay.min_radius || radius > overlay.max_radius {
        return Err(ValidationError::Radius {
            min: overlay.min_radius,
            max: overlay.max_radius,
        });
    }
    Ok(radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> TextLimits {
        TextLimits {
            forbidden: vec!["Admin".to_string()],
            ..TextLimits::default()
        }
    }

    #[test]
    fn test_name_length_bounds() {
        let l = limits();
        assert_eq!(
            validate_name("ab", &l),
            Err(ValidationError::NameLength { min: 3, max: 24 })
        );
        assert_eq!(validate_name("  abc  ", &l), Ok("abc".to_string()));
        assert!(validate_name(&"x".repeat(25), &l).is_err());
        assert!(validate_name(&"x".repeat(24), &l).is_ok());
    }

    #[test]
    fn test_name_charset() {
        let l = limits();
        assert_eq!(
            validate_name("my/world", &l),
            Err(ValidationError::NameCharset('/'))
        );
        assert!(validate_name("My_World-2 b", &l).is_ok());
    }

    #[test]
    fn test_forbidden_substring_case_insensitive() {
        let l = limits();
        assert_eq!(validate_name("TheADMINS", &l), Err(ValidationError::Forbidden));
        assert_eq!(
            validate_description("ask an admin", &l),
            Err(ValidationError::Forbidden)
        );
    }

    #[test]
    fn test_description_cap() {
        let l = limits();
        assert!(validate_description(&"a".repeat(120), &l).is_ok());
        assert_eq!(
            validate_description(&"a".repeat(121), &l),
            Err(ValidationError::DescriptionLength { max: 120 })
        );
    }

    #[test]
    fn test_announcement_lines() {
        let l = limits();
        assert_eq!(
            parse_announcement("Welcome! | Be nice ||\nHave fun", &l),
            Ok(vec![
                "Welcome!".to_string(),
                "Be nice".to_string(),
                "Have fun".to_string()
            ])
        );
        assert_eq!(
            parse_announcement("a|b|c|d|e|f", &l),
            Err(ValidationError::TooManyLines { max: 5 })
        );
        assert_eq!(
            parse_announcement(&"x".repeat(81), &l),
            Err(ValidationError::LineLength { max: 80 })
        );
    }

    #[test]
    fn test_tag_and_overlay_lookup() {
        let l = limits();
        assert_eq!(validate_tag("Survival", &l), Ok("survival".to_string()));
        assert!(matches!(
            validate_tag("pvp-arena", &l),
            Err(ValidationError::UnknownTag(_))
        ));

        let overlay = OverlayConfig::default();
        assert_eq!(validate_overlay(" DESERT ", &overlay), Ok("desert".to_string()));
        assert!(validate_overlay("nether", &overlay).is_err());
    }

    #[test]
    fn test_radius_parsing() {
        let overlay = OverlayConfig::default();
        assert_eq!(parse_radius(" 12 ", &overlay), Ok(12));
        assert_eq!(
            parse_radius("twelve", &overlay),
            Err(ValidationError::NotANumber("twelve".to_string()))
        );
        assert_eq!(
            parse_radius("0", &overlay),
            Err(ValidationError::Radius { min: 1, max: 64 })
        );
        assert!(parse_radius("65", &overlay).is_err());
    }
}
