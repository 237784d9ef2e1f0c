//! Score extraction from scholarship evaluations.
//!
//! The evaluation prompt asks for a mark out of 100; the jury persona answers
//! in French with a line such as `Note : 72/100`. The score is whatever sits
//! between [`SCORE_MARKER`] and the next `/`.

use crate::error::ScoreParseError;

/// Literal that introduces the score in the model's reply.
pub const SCORE_MARKER: &str = "Note :";

/// Highest valid score.
pub const MAX_SCORE: u8 = 100;

/// Pull the score out of an evaluation.
///
/// * marker absent → `Ok(None)`
/// * marker present and well-formed → `Ok(Some(score))`
/// * marker present but malformed → `Err(_)`
///
/// Only the first occurrence of the marker is considered.
pub fn extract_score(evaluation: &str) -> Result<Option<u8>, ScoreParseError> {
    let Some(pos) = evaluation.find(SCORE_MARKER) else {
        return Ok(None);
    };
    let rest = &evaluation[pos + SCORE_MARKER.len()..];

    let slash = rest.find('/').ok_or(ScoreParseError::MissingDelimiter)?;
    let raw = rest[..slash].trim();

    let value: i64 = raw.parse().map_err(|_| ScoreParseError::NotAnInteger {
        raw: raw.to_string(),
    })?;

    if !(0..=i64::from(MAX_SCORE)).contains(&value) {
        return Err(ScoreParseError::OutOfRange { value });
    }

    Ok(Some(value as u8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_score() {
        let text = "Dossier solide.\nNote : 72/100\nPoints forts: ...";
        assert_eq!(extract_score(text), Ok(Some(72)));
    }

    #[test]
    fn whitespace_around_number_is_ignored() {
        assert_eq!(extract_score("Note :   85 /100"), Ok(Some(85)));
    }

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(extract_score("Note : 0/100"), Ok(Some(0)));
        assert_eq!(extract_score("Note : 100/100"), Ok(Some(100)));
    }

    #[test]
    fn missing_marker_is_no_score() {
        assert_eq!(extract_score("Très bon dossier, 90 sur 100."), Ok(None));
    }

    #[test]
    fn marker_without_space_is_not_recognised() {
        assert_eq!(extract_score("Note: 72/100"), Ok(None));
    }

    #[test]
    fn missing_slash() {
        assert_eq!(
            extract_score("Note : 72 sur 100"),
            Err(ScoreParseError::MissingDelimiter)
        );
    }

    #[test]
    fn non_integer_score() {
        assert_eq!(
            extract_score("Note : 7.5/10"),
            Err(ScoreParseError::NotAnInteger { raw: "7.5".into() })
        );
        assert!(matches!(
            extract_score("Note : excellente/100"),
            Err(ScoreParseError::NotAnInteger { .. })
        ));
    }

    #[test]
    fn out_of_range_score() {
        assert_eq!(
            extract_score("Note : 140/100"),
            Err(ScoreParseError::OutOfRange { value: 140 })
        );
        assert_eq!(
            extract_score("Note : -3/100"),
            Err(ScoreParseError::OutOfRange { value: -3 })
        );
    }

    #[test]
    fn first_marker_wins() {
        assert_eq!(extract_score("Note : 60/100 puis Note : 90/100"), Ok(Some(60)));
    }
}
