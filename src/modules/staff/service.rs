use chrono::Utc;
use rand::Rng;
use serde_json::json;
use sqlx::PgPool;
use tracing::instrument;

use crate::storage::{FileStorage, ImagePolicy, STAFF_CREATE_IMAGE, STAFF_PROFILE_IMAGE,
    UploadedFile, timestamped_filename};
use crate::utils::errors::AppError;

use super::model::{CreateStaffDto, Staff, UpdateStaffDto};

const STAFF_COLUMNS: &str =
    "id, surname, other_names, date_of_birth, unique_code, is_verified, employee_number, image_src";

/// Generates the one-time verification secret: a uniformly random 10-digit
/// number.
pub fn generate_unique_code<R: Rng>(rng: &mut R) -> i64 {
    rng.gen_range(1_000_000_000..=9_999_999_999)
}

/// Generates the employee number assigned at verification, `EN-<4 digits>`.
pub fn generate_employee_number<R: Rng>(rng: &mut R) -> String {
    format!("EN-{}", rng.gen_range(1000..=9999))
}

fn code_matches(submitted: &str, stored: i64) -> bool {
    submitted.trim().parse::<i64>() == Ok(stored)
}

pub struct StaffService;

impl StaffService {
    /// All staff records, id ascending.
    #[instrument(skip(db))]
    pub async fn list_staff(db: &PgPool) -> Result<Vec<Staff>, AppError> {
        let staff = sqlx::query_as::<_, Staff>(&format!(
            "SELECT {STAFF_COLUMNS} FROM staff ORDER BY id"
        ))
        .fetch_all(db)
        .await?;

        Ok(staff)
    }

    /// Creates a record with a fresh `unique_code`. If an image accompanies
    /// the request, it is checked against the create policy and written to
    /// the file store before the row is inserted, so a crash in between
    /// leaves `image_src` unset rather than dangling.
    #[instrument(skip(db, storage, dto, image))]
    pub async fn create_staff(
        db: &PgPool,
        storage: &dyn FileStorage,
        dto: CreateStaffDto,
        image: Option<UploadedFile>,
    ) -> Result<Staff, AppError> {
        let image_src = match image {
            Some(file) => Some(store_image(storage, &file, &STAFF_CREATE_IMAGE).await?),
            None => None,
        };

        let unique_code = generate_unique_code(&mut rand::thread_rng());

        let staff = sqlx::query_as::<_, Staff>(&format!(
            "INSERT INTO staff (surname, other_names, date_of_birth, unique_code, image_src)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {STAFF_COLUMNS}"
        ))
        .bind(&dto.surname)
        .bind(&dto.other_names)
        .bind(dto.date_of_birth)
        .bind(unique_code)
        .bind(&image_src)
        .fetch_one(db)
        .await?;

        Ok(staff)
    }

    #[instrument(skip(db))]
    pub async fn find_staff(db: &PgPool, id: i64) -> Result<Staff, AppError> {
        sqlx::query_as::<_, Staff>(&format!("SELECT {STAFF_COLUMNS} FROM staff WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found("Staff not found."))
    }

    /// The verification transition plus the independent date-of-birth update.
    ///
    /// The row is locked for the duration of the transaction so two
    /// concurrent submissions of the correct code serialize: exactly one
    /// flips the record, the other observes `is_verified` and gets the
    /// conflict error.
    ///
    /// A date change in the same request commits even when the code check
    /// fails; the response is still the code error.
    #[instrument(skip(db, dto))]
    pub async fn update_staff(db: &PgPool, id: i64, dto: UpdateStaffDto) -> Result<Staff, AppError> {
        let mut tx = db.begin().await?;

        let staff = sqlx::query_as::<_, Staff>(&format!(
            "SELECT {STAFF_COLUMNS} FROM staff WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Staff not found."))?;

        if let Some(date_of_birth) = dto.date_of_birth {
            sqlx::query("UPDATE staff SET date_of_birth = $1 WHERE id = $2")
                .bind(date_of_birth)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        let submitted = dto
            .unique_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty());

        let verification = match submitted {
            None => Ok(()),
            Some(code) if !code_matches(code, staff.unique_code) => {
                Err(AppError::unprocessable("Wrong Code."))
            }
            Some(_) if staff.is_verified => {
                Err(AppError::conflict("Staff member is already verified."))
            }
            Some(_) => {
                let employee_number = generate_employee_number(&mut rand::thread_rng());
                sqlx::query(
                    "UPDATE staff SET is_verified = TRUE, employee_number = $1 WHERE id = $2",
                )
                .bind(&employee_number)
                .bind(id)
                .execute(&mut *tx)
                .await?;
                Ok(())
            }
        };

        // Independent fields, independent effects: the date change lands even
        // when the code check failed.
        tx.commit().await?;
        verification?;

        Self::find_staff(db, id).await
    }

    /// Stores a new profile image and points the record at it. The old file,
    /// if any, is removed best-effort once the reference has moved.
    #[instrument(skip(db, storage, file))]
    pub async fn update_staff_image(
        db: &PgPool,
        storage: &dyn FileStorage,
        id: i64,
        file: UploadedFile,
    ) -> Result<Staff, AppError> {
        let mut tx = db.begin().await?;

        // row lock: a concurrent delete either waits or has already won,
        // in which case this is a plain not-found
        let staff = sqlx::query_as::<_, Staff>(&format!(
            "SELECT {STAFF_COLUMNS} FROM staff WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Staff not found."))?;

        let image_src = store_image(storage, &file, &STAFF_PROFILE_IMAGE).await?;

        let updated = sqlx::query_as::<_, Staff>(&format!(
            "UPDATE staff SET image_src = $1 WHERE id = $2 RETURNING {STAFF_COLUMNS}"
        ))
        .bind(&image_src)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        if let Some(previous) = staff.image_src {
            if previous != image_src {
                if let Err(e) = storage.delete(&previous).await {
                    tracing::warn!(filename = %previous, error = %e, "failed to remove replaced image");
                }
            }
        }

        Ok(updated)
    }

    /// Removes the record permanently. Deleting an unknown (or already
    /// deleted) id is a not-found error.
    #[instrument(skip(db))]
    pub async fn delete_staff(db: &PgPool, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM staff WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Staff not found."));
        }

        Ok(())
    }
}

/// Checks the upload against the policy, then writes it under a
/// collision-resistant timestamped name.
async fn store_image(
    storage: &dyn FileStorage,
    file: &UploadedFile,
    policy: &ImagePolicy,
) -> Result<String, AppError> {
    policy
        .check(file)
        .map_err(|e| AppError::validation(json!({ "image_src": [e.to_string()] })))?;

    let filename = timestamped_filename(&file.filename, Utc::now().timestamp());

    let stored = storage
        .save(&filename, &file.content)
        .await
        .map_err(AppError::internal)?;

    Ok(stored)
}
