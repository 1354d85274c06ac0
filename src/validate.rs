// Input validation shared by create and edit

use crate::movie::{MovieForm, NewMovie};
use chrono::Datelike;
use thiserror::Error;

pub const MIN_YEAR: i32 = 1900;
pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// A user-correctable problem with form input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    MissingTitle,

    #[error("year must be between {min} and {max}")]
    InvalidYear { min: i32, max: i32 },

    #[error("rating must be between 1 and 5")]
    InvalidRating,
}

/// The current calendar year in local time
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Validate a form against this year's bounds
pub fn validate_form(form: &MovieForm) -> Result<NewMovie, ValidationError> {
    validate_form_for_year(form, current_year())
}

/// Validate a form, checking title, then year, then rating
///
/// Returns the cleaned field values: trimmed title, and absent (not zero)
/// year/rating when those fields were left empty.
pub fn validate_form_for_year(form: &MovieForm, current_year: i32) -> Result<NewMovie, ValidationError> {
    let title = form.title.trim();
    if title.is_empty() {
        return Err(ValidationError::MissingTitle);
    }

    let year_error = ValidationError::InvalidYear {
        min: MIN_YEAR,
        max: current_year,
    };
    let year = parse_optional(&form.year, MIN_YEAR, current_year).map_err(|_| year_error)?;

    let rating = parse_optional(&form.rating, MIN_RATING, MAX_RATING).map_err(|_| ValidationError::InvalidRating)?;

    Ok(NewMovie {
        title: title.to_string(),
        year,
        watched: form.watched as i64,
        rating,
    })
}

// Empty means absent; anything else must be an integer in [min, max]
fn parse_optional(raw: &str, min: i32, max: i32) -> Result<Option<i32>, ()> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    match raw.parse::<i32>() {
        Ok(value) if (min..=max).contains(&value) => Ok(Some(value)),
        _ => Err(()),
    }
}
