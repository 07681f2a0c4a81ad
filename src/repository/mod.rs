pub mod expenses;
pub mod leases;
pub mod payments;
pub mod properties;
pub mod sessions;
pub mod tenants;
pub mod units;
pub mod users;

use crate::error::AppError;

pub(crate) fn map_db_error(error: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            return AppError::Conflict("Duplicate value violates a unique constraint.".to_string());
        }
        if db_error.is_foreign_key_violation() {
            return AppError::BadRequest("Referenced record does not exist.".to_string());
        }
        if db_error.is_check_violation() {
            return AppError::UnprocessableEntity("Value violates a table constraint.".to_string());
        }
    }
    tracing::error!(db_error = %error, "Database query failed");
    AppError::Dependency("Database operation failed.".to_string())
}
