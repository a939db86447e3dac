//! Field rules for new registrations.

use crate::error::ValidationError;
use crate::user::{Club, RegistrationRequest};
use std::ops::RangeInclusive;

pub const USERNAME_LENGTH: RangeInclusive<usize> = 6..=20;
pub const PASSWORD_LENGTH: RangeInclusive<usize> = 8..=36;
const PASSWORD_MIN_CHARSET_LENGTH: usize = 8;

/// A registration that passed every rule, ready to be given an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub favorite_club: Club,
    pub news_letter: bool,
}

/// Runs the rules in order and reports the first one that fails.
///
/// Order: presence of username, password and club; username length;
/// password length; password characters; club membership.
pub fn validate_registration(request: &RegistrationRequest) -> Result<NewUser, ValidationError> {
    let username = present(&request.username).ok_or(ValidationError::UsernameRequired)?;
    let password = present(&request.password).ok_or(ValidationError::PasswordRequired)?;
    let club = present(&request.favorite_club).ok_or(ValidationError::FavoriteClubRequired)?;

    if !USERNAME_LENGTH.contains(&text_length(username)) {
        return Err(ValidationError::UsernameLength);
    }
    if !PASSWORD_LENGTH.contains(&text_length(password)) {
        return Err(ValidationError::PasswordLength);
    }
    if !is_acceptable_password(password) {
        return Err(ValidationError::PasswordCharacters);
    }
    let favorite_club = Club::from_name(club).ok_or(ValidationError::InvalidClub)?;

    Ok(NewUser {
        username: username.to_string(),
        password: password.to_string(),
        favorite_club,
        news_letter: request.news_letter.unwrap_or(false),
    })
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

/// Length in UTF-16 code units, the unit browsers count form input in.
fn text_length(value: &str) -> usize {
    value.encode_utf16().count()
}

/// Letters and digits only, at least one of each, at least eight long.
pub fn is_acceptable_password(password: &str) -> bool {
    has_letter(password)
        && has_digit(password)
        && password.len() >= PASSWORD_MIN_CHARSET_LENGTH
        && is_alphanumeric_only(password)
}

pub fn has_letter(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_alphabetic())
}

pub fn has_digit(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_digit())
}

pub fn is_alphanumeric_only(value: &str) -> bool {
    value.chars().all(|c| c.is_ascii_alphanumeric())
}
