use tracing::{debug, info, warn};

use super::dto::{FormFields, UserForm};
use super::repo_types::{RowWrite, User, UserInput};
use crate::error::ApiError;
use crate::mailer::notify_welcome;
use crate::state::AppState;
use crate::uploads::{discard_upload, save_upload, UploadItem};

const REQUIRED_FIELDS: &str = "Name and Email are required.";
const USER_NOT_FOUND: &str = "User not found.";
const UPDATE_NOT_FOUND: &str = "User not found or no changes made.";

pub async fn register_user(st: &AppState, form: UserForm) -> Result<i64, ApiError> {
    let UserForm { fields, file } = form;
    let (name, email) = require_identity(&fields)?;

    let profile_picture = store_file(st, file).await?;
    let input = UserInput {
        name,
        email,
        phone: non_blank(fields.phone),
        profile_picture,
    };

    let id = match st.store.insert(&input).await {
        Ok(id) => id,
        Err(e) => {
            if let Some(path) = &input.profile_picture {
                discard_upload(st, path).await;
            }
            return Err(ApiError::store("Database error.")(e));
        }
    };
    info!(user_id = id, email = %input.email, "user registered");

    notify_welcome(st.mailer.clone(), &st.config.mail.brand, input.email, &input.name);
    Ok(id)
}

pub async fn list_users(st: &AppState) -> Result<Vec<User>, ApiError> {
    st.store
        .list()
        .await
        .map_err(ApiError::store("Error fetching users."))
}

pub async fn get_user(st: &AppState, raw_id: &str) -> Result<User, ApiError> {
    let id = parse_id(raw_id).ok_or(ApiError::NotFound(USER_NOT_FOUND))?;
    st.store
        .find(id)
        .await
        .map_err(ApiError::store("Error fetching user."))?
        .ok_or(ApiError::NotFound(USER_NOT_FOUND))
}

/// Full overwrite: the picture becomes the new upload, else the client's
/// `existingProfilePicture` hint, else nothing.
pub async fn update_user(st: &AppState, raw_id: &str, form: UserForm) -> Result<(), ApiError> {
    let id = parse_id(raw_id).ok_or(ApiError::NotFound(UPDATE_NOT_FOUND))?;
    let UserForm { fields, file } = form;
    let (name, email) = require_identity(&fields)?;

    let uploaded = store_file(st, file).await?;
    let input = UserInput {
        name,
        email,
        phone: non_blank(fields.phone),
        profile_picture: uploaded
            .clone()
            .or_else(|| non_blank(fields.existing_profile_picture)),
    };

    let outcome = st.store.update(id, &input).await;
    if !matches!(outcome, Ok(RowWrite::Applied { .. })) {
        if let Some(path) = &uploaded {
            discard_upload(st, path).await;
        }
    }

    match outcome.map_err(ApiError::store("Error updating user."))? {
        RowWrite::Missing => Err(ApiError::NotFound(UPDATE_NOT_FOUND)),
        RowWrite::Applied { previous_picture } => {
            info!(user_id = id, "user updated");
            if previous_picture != input.profile_picture {
                reclaim(st, previous_picture).await;
            }
            Ok(())
        }
    }
}

pub async fn delete_user(st: &AppState, raw_id: &str) -> Result<(), ApiError> {
    let id = parse_id(raw_id).ok_or(ApiError::NotFound(USER_NOT_FOUND))?;
    match st
        .store
        .delete(id)
        .await
        .map_err(ApiError::store("Error deleting user."))?
    {
        RowWrite::Missing => Err(ApiError::NotFound(USER_NOT_FOUND)),
        RowWrite::Applied { previous_picture } => {
            info!(user_id = id, "user deleted");
            reclaim(st, previous_picture).await;
            Ok(())
        }
    }
}

async fn store_file(st: &AppState, file: Option<UploadItem>) -> Result<Option<String>, ApiError> {
    match file {
        Some(item) => save_upload(st, item)
            .await
            .map(Some)
            .map_err(|source| ApiError::Upload { source }),
        None => Ok(None),
    }
}

/// Removes a picture left behind by an update or delete, when reclamation is
/// enabled and no other row still points at it.
async fn reclaim(st: &AppState, previous: Option<String>) {
    let Some(path) = previous else { return };
    if !st.config.uploads.reclaim_orphans {
        warn!(path = %path, "stored picture may no longer be referenced");
        return;
    }
    match st.store.picture_in_use(&path).await {
        Ok(true) => debug!(path = %path, "picture still referenced; kept"),
        Ok(false) => discard_upload(st, &path).await,
        Err(e) => warn!(error = %e, path = %path, "could not check picture references; kept"),
    }
}

fn require_identity(fields: &FormFields) -> Result<(String, String), ApiError> {
    match (present(&fields.name), present(&fields.email)) {
        (Some(name), Some(email)) => Ok((name.to_string(), email.to_string())),
        _ => Err(ApiError::Validation(REQUIRED_FIELDS.into())),
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok()
}
