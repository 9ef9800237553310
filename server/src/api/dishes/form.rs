//! Reading the multipart body shared by dish create and update.

use crate::error::ApiError;
use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use platebook_core::photo::normalize_content_type;
use platebook_core::validation::DishForm;
use platebook_core::PhotoMeta;

/// Body size limit for dish routes. Above the photo limit, so an oversized
/// photo still gets its own field error.
pub const MAX_DISH_BODY_SIZE: usize = 6 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct UploadedPhoto {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct DishSubmission {
    pub form: DishForm,
    pub photo: Option<UploadedPhoto>,
}

fn multipart_error(e: MultipartError) -> ApiError {
    tracing::warn!("Multipart read error: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge("Request body too large. Maximum photo size is 5MB".to_string())
    } else {
        ApiError::BadRequest(format!("Failed to read multipart data: {}", e.body_text()))
    }
}

/// Collect the dish fields and optional `photo` file. Unknown fields are
/// ignored; a file part with neither a filename nor bytes counts as no photo.
pub async fn read_dish_form(mut multipart: Multipart) -> Result<DishSubmission, ApiError> {
    let mut submission = DishSubmission::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == "photo" {
            let filename = field.file_name().unwrap_or_default().to_string();
            let content_type = field
                .content_type()
                .map(normalize_content_type)
                .unwrap_or_default();
            let data = field.bytes().await.map_err(multipart_error)?;

            submission.photo = if filename.is_empty() && data.is_empty() {
                None
            } else {
                Some(UploadedPhoto {
                    filename,
                    content_type,
                    data,
                })
            };
            continue;
        }

        let value = field.text().await.map_err(multipart_error)?;
        let form = &mut submission.form;
        match name.as_str() {
            "name" => form.name = value,
            "description" => form.description = Some(value),
            "calories" => form.calories = Some(value),
            "proteins" => form.proteins = Some(value),
            "fats" => form.fats = Some(value),
            "carbohydrates" => form.carbohydrates = Some(value),
            "url" => form.url = Some(value),
            "allergens" => {
                if !value.trim().is_empty() {
                    form.allergens.push(value);
                }
            }
            _ => tracing::debug!(field = %name, "ignoring unknown dish form field"),
        }
    }

    submission.form.photo = submission.photo.as_ref().map(|p| PhotoMeta {
        filename: p.filename.clone(),
        content_type: p.content_type.clone(),
        size: p.data.len(),
    });

    Ok(submission)
}
