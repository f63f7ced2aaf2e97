use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub profile_picture: Option<String>, // relative path, e.g. uploads/<stored-name>
    #[serde(skip_serializing)]
    pub registration_date: OffsetDateTime, // listing order only
}

/// Column values written by insert and by the full-overwrite update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
}

/// Result of a write aimed at one row by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowWrite {
    Missing,
    Applied { previous_picture: Option<String> },
}
