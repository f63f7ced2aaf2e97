use serde::{Deserialize, Serialize};

use crate::uploads::UploadItem;

/// Text fields accepted by register and update, from any supported body type.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FormFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(rename = "existingProfilePicture")]
    pub existing_profile_picture: Option<String>,
}

/// A register/update body: text fields plus at most one uploaded picture.
#[derive(Debug, Default)]
pub struct UserForm {
    pub fields: FormFields,
    pub file: Option<UploadItem>,
}

#[derive(Debug, Serialize)]
pub struct RegisteredResponse {
    pub id: i64,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
