use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    Form, Json,
};
use tracing::debug;

use super::dto::{FormFields, UserForm};
use crate::error::ApiError;
use crate::uploads::{UploadItem, PROFILE_PICTURE_FIELD};

#[async_trait]
impl<S> FromRequest<S> for UserForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| rejected(e.status(), e.body_text()))?;
            read_multipart(multipart).await
        } else if content_type.starts_with("application/json") {
            let Json(fields) = Json::<FormFields>::from_request(req, state)
                .await
                .map_err(|e| rejected(e.status(), e.body_text()))?;
            Ok(Self { fields, file: None })
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<FormFields>::from_request(req, state)
                .await
                .map_err(|e| rejected(e.status(), e.body_text()))?;
            Ok(Self { fields, file: None })
        } else {
            // no body we understand; the service answers with a validation error
            Ok(Self::default())
        }
    }
}

async fn read_multipart(mut mp: Multipart) -> Result<UserForm, ApiError> {
    let mut form = UserForm::default();

    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| rejected(e.status(), e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(file_name) = field.file_name().map(str::to_string) {
            let content_type = field.content_type().map(str::to_string);
            let body = field
                .bytes()
                .await
                .map_err(|e| rejected(e.status(), e.body_text()))?;
            // browsers send an empty part when no file was chosen
            if file_name.is_empty() && body.is_empty() {
                continue;
            }
            if name != PROFILE_PICTURE_FIELD {
                return Err(ApiError::Validation(format!("Unexpected file field: {name}")));
            }
            if form.file.is_some() {
                return Err(ApiError::Validation(format!(
                    "Only one {PROFILE_PICTURE_FIELD} file is allowed."
                )));
            }
            form.file = Some(UploadItem {
                file_name,
                content_type,
                body,
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| rejected(e.status(), e.body_text()))?;
        match name.as_str() {
            "name" => form.fields.name = Some(value),
            "email" => form.fields.email = Some(value),
            "phone" => form.fields.phone = Some(value),
            "existingProfilePicture" => form.fields.existing_profile_picture = Some(value),
            other => debug!(field = other, "ignoring unknown form field"),
        }
    }

    Ok(form)
}

fn rejected(status: StatusCode, message: String) -> ApiError {
    ApiError::Rejected { status, message }
}
