//! Client model and related types

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::reservation::Reservation;

/// Accepted phone numbers: optional leading '+', then 7 to 15 digits, spaces, dashes or parentheses
pub static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+]?[0-9\s\-()]{7,15}$").expect("phone pattern is a valid regex")
});

/// Hotel client
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
}

// Identity is the database id; field values do not matter.
impl PartialEq for Client {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Client {}

/// Create / update client request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewClient {
    #[validate(length(
        min = 2,
        max = 100,
        message = "The name must have between 2 and 100 characters"
    ))]
    pub name: String,
    #[validate(
        email(message = "The email format is not valid"),
        length(max = 150, message = "The email cannot exceed 150 characters")
    )]
    pub email: String,
    #[validate(regex(path = *PHONE_REGEX, message = "The phone format is not valid"))]
    pub phone: String,
}

/// Client with its reservations, ordered by start date
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClientDetails {
    #[serde(flatten)]
    pub client: Client,
    pub reservations: Vec<Reservation>,
}

/// Client list query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ClientQuery {
    /// Partial name match; blank returns every client
    pub name: Option<String>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

/// Email availability query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmailAvailabilityQuery {
    pub email: String,
    /// Client allowed to already own the email (edit forms)
    pub exclude_id: Option<i64>,
}
