use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::serde::{deserialize_flexible_code, deserialize_optional_date};

/// A staff record as projected to callers.
///
/// `unique_code` is generated at creation and immutable afterwards; it is the
/// secret a staff member echoes back once to verify their record.
/// `employee_number` is present exactly when `is_verified` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Staff {
    pub id: i64,
    pub surname: String,
    pub other_names: String,
    pub date_of_birth: NaiveDate,
    pub unique_code: i64,
    pub is_verified: bool,
    pub employee_number: Option<String>,
    pub image_src: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStaffDto {
    #[validate(length(min = 1, message = "surname field is required"))]
    pub surname: String,
    #[validate(length(min = 1, message = "other_names field is required"))]
    pub other_names: String,
    pub date_of_birth: NaiveDate,
}

/// Update payload. Both fields are optional and act independently: a failed
/// code check does not block an accompanying date change.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateStaffDto {
    /// Accepted as a JSON number or string; empty strings count as absent.
    #[serde(default, deserialize_with = "deserialize_flexible_code")]
    pub unique_code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub date_of_birth: Option<NaiveDate>,
}
