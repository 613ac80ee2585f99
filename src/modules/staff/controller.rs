use axum::Json;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{StatusCode, header};
use serde_json::{Value, json};
use tracing::instrument;

use crate::state::AppState;
use crate::storage::UploadedFile;
use crate::utils::errors::AppError;
use crate::utils::response::ApiResponse;
use crate::validator::{ValidatedJson, ValidatedPath, validation_errors_json};
use validator::Validate;

use super::model::{CreateStaffDto, Staff, UpdateStaffDto};
use super::service::StaffService;

#[instrument(skip_all)]
pub async fn get_staff_list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Staff>>>, AppError> {
    let staff = StaffService::list_staff(&state.db).await?;
    Ok(ApiResponse::new("Staff retrieved successfully.", staff))
}

/// Accepts JSON or `multipart/form-data`; the multipart form may carry an
/// optional `image_src` file part. The response includes the generated
/// `unique_code`: the only time the verification secret is handed out.
#[instrument(skip_all)]
pub async fn create_staff(
    State(state): State<AppState>,
    req: Request,
) -> Result<(StatusCode, Json<ApiResponse<Staff>>), AppError> {
    let (dto, image) = extract_create_payload(req).await?;

    let staff = StaffService::create_staff(&state.db, state.storage.as_ref(), dto, image).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::new("Staff created successfully.", staff),
    ))
}

#[instrument(skip(state))]
pub async fn get_staff(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<Json<ApiResponse<Staff>>, AppError> {
    let staff = StaffService::find_staff(&state.db, id).await?;
    Ok(ApiResponse::new("Staff retrieved successfully.", staff))
}

#[instrument(skip(state, dto))]
pub async fn update_staff(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateStaffDto>,
) -> Result<Json<ApiResponse<Staff>>, AppError> {
    let staff = StaffService::update_staff(&state.db, id, dto).await?;
    Ok(ApiResponse::new("Staff updated successfully.", staff))
}

#[instrument(skip(state, multipart))]
pub async fn upload_staff_image(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<Staff>>, AppError> {
    let image = read_image_field(multipart)
        .await?
        .ok_or_else(|| AppError::validation(json!({
            "image_src": ["image_src field is required"]
        })))?;

    let staff =
        StaffService::update_staff_image(&state.db, state.storage.as_ref(), id, image).await?;

    Ok(ApiResponse::new("Staff image updated successfully.", staff))
}

#[instrument(skip(state))]
pub async fn delete_staff(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    StaffService::delete_staff(&state.db, id).await?;
    Ok(ApiResponse::new("Staff deleted successfully.", json!([])))
}

/// Pulls the creation payload out of either a JSON body or a multipart form.
async fn extract_create_payload(
    req: Request,
) -> Result<(CreateStaffDto, Option<UploadedFile>), AppError> {
    let is_multipart = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("multipart/form-data"))
        .unwrap_or(false);

    if !is_multipart {
        let ValidatedJson(dto) = ValidatedJson::<CreateStaffDto>::from_request(req, &()).await?;
        return Ok((dto, None));
    }

    let mut multipart = Multipart::from_request(req, &())
        .await
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

    let mut surname = None;
    let mut other_names = None;
    let mut date_of_birth_raw = None;
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(e.body_text()))?
    {
        match field.name() {
            Some("surname") => surname = Some(read_text(field).await?),
            Some("other_names") => other_names = Some(read_text(field).await?),
            Some("date_of_birth") => date_of_birth_raw = Some(read_text(field).await?),
            Some("image_src") => image = Some(read_file(field).await?),
            _ => {}
        }
    }

    let mut errors = serde_json::Map::new();

    let date_of_birth = match date_of_birth_raw.as_deref() {
        None => {
            errors.insert(
                "date_of_birth".to_string(),
                json!(["date_of_birth field is required"]),
            );
            None
        }
        Some(raw) => match raw.parse::<chrono::NaiveDate>() {
            Ok(date) => Some(date),
            Err(_) => {
                errors.insert(
                    "date_of_birth".to_string(),
                    json!(["date_of_birth must be a valid date"]),
                );
                None
            }
        },
    };
    if surname.is_none() {
        errors.insert("surname".to_string(), json!(["surname field is required"]));
    }
    if other_names.is_none() {
        errors.insert(
            "other_names".to_string(),
            json!(["other_names field is required"]),
        );
    }

    if !errors.is_empty() {
        return Err(AppError::validation(Value::Object(errors)));
    }

    let dto = CreateStaffDto {
        surname: surname.unwrap_or_default(),
        other_names: other_names.unwrap_or_default(),
        date_of_birth: date_of_birth.unwrap_or_default(),
    };

    dto.validate()
        .map_err(|errors| AppError::validation(validation_errors_json(&errors)))?;

    Ok((dto, image))
}

/// Finds the `image_src` file part in a multipart body, if present.
async fn read_image_field(mut multipart: Multipart) -> Result<Option<UploadedFile>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(e.body_text()))?
    {
        if field.name() == Some("image_src") {
            return Ok(Some(read_file(field).await?));
        }
    }

    Ok(None)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::bad_request(e.body_text()))
}

async fn read_file(field: axum::extract::multipart::Field<'_>) -> Result<UploadedFile, AppError> {
    let filename = field.file_name().unwrap_or("upload").to_string();
    let content = field
        .bytes()
        .await
        .map_err(|e| AppError::bad_request(e.body_text()))?;

    Ok(UploadedFile { filename, content })
}
