//! Validation and workflow errors callers are expected to match on.
//!
//! Transport failures stay `ApiError` (see `api::error`); both travel
//! through `anyhow::Error` and can be recovered with `downcast_ref`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClubError {
    #[error("{criterion} score must be between 0 and 10, got {value}")]
    SubscoreOutOfRange { criterion: &'static str, value: f64 },

    #[error("Please fill in all required fields (missing {0})")]
    MissingField(&'static str),

    #[error("Form has been closed. Your rating was not submitted.")]
    FormClosed,

    #[error("The form is open but no burger is selected for rating.")]
    NoActiveItem,

    #[error("Please search and select an address for the map pin.")]
    MissingCoordinates,

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid visit date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),

    #[error("Password must be at least {0} characters.")]
    PasswordTooShort(usize),

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Incorrect password.")]
    IncorrectPassword,

    #[error("No burger with id {0}")]
    UnknownItem(i64),

    #[error("Deletion needs two explicit confirmations")]
    NotConfirmed,

    #[error("Please select at least one photo.")]
    NoPhotos,

    #[error("{0} is already a member")]
    DuplicateMember(String),
}
