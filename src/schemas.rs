use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::AppError;

/// Missing or malformed required fields are a 400; violations of a value
/// invariant (non-positive rent or payment amount) are a 422.
pub fn validate_input<T: Validate>(input: &T) -> Result<(), AppError> {
    input.validate().map_err(|errors| {
        let message = format!("Validation failed: {errors}");
        if has_range_violation(&errors) {
            AppError::UnprocessableEntity(message)
        } else {
            AppError::BadRequest(message)
        }
    })
}

fn has_range_violation(errors: &ValidationErrors) -> bool {
    errors
        .field_errors()
        .values()
        .flat_map(|field_errors| field_errors.iter())
        .any(|error| error.code == "range")
}

fn default_cash() -> String {
    "cash".to_string()
}
fn default_vacant() -> String {
    "vacant".to_string()
}

fn validate_unit_status(status: &str) -> Result<(), ValidationError> {
    if status == "vacant" || status == "occupied" {
        return Ok(());
    }
    Err(ValidationError::new("unit_status"))
}

/// Maps an absent field to `None` and an explicit `null` to `Some(None)`,
/// so partial updates can clear a nullable column.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

// ── Account ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 255))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 255))]
    pub username: Option<String>,
    #[validate(length(min = 1, max = 16))]
    pub currency: Option<String>,
    pub new_password: Option<String>,
    pub current_password: Option<String>,
}

// ── Entities ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePropertyInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 512))]
    pub address: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePropertyInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 512))]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUnitInput {
    #[validate(length(min = 1, max = 64))]
    pub unit_number: String,
    #[serde(default = "default_vacant")]
    #[validate(custom(function = validate_unit_status))]
    pub status: String,
    pub property_id: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateUnitInput {
    #[validate(length(min = 1, max = 64))]
    pub unit_number: Option<String>,
    #[validate(custom(function = validate_unit_status))]
    pub status: Option<String>,
    pub property_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTenantInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub contact: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTenantInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub contact: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLeaseInput {
    pub tenant_id: i64,
    pub unit_id: i64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[validate(range(exclusive_min = 0.0, message = "Rent must be a positive number"))]
    pub rent_amount: f64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateLeaseInput {
    pub tenant_id: Option<i64>,
    pub unit_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<NaiveDate>>,
    #[validate(range(exclusive_min = 0.0, message = "Rent must be a positive number"))]
    pub rent_amount: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePaymentInput {
    pub lease_id: i64,
    #[validate(range(exclusive_min = 0.0, message = "Payment amount must be a positive number"))]
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default = "default_cash")]
    pub method: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePaymentInput {
    pub lease_id: Option<i64>,
    #[validate(range(exclusive_min = 0.0, message = "Payment amount must be a positive number"))]
    pub amount: Option<f64>,
    pub date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 64))]
    pub method: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateExpenseInput {
    pub property_id: i64,
    #[validate(length(min = 1, max = 255))]
    pub category: String,
    pub description: Option<String>,
    pub amount: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateExpenseInput {
    pub property_id: Option<i64>,
    #[validate(length(min = 1, max = 255))]
    pub category: Option<String>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<NaiveDate>,
}

// ── Reports ───────────────────────────────────────────────────────

/// Raw query strings; `year` and `property_id` are parsed explicitly so a
/// malformed value yields a structured 400 instead of an extractor reject.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyFinancialsQuery {
    pub property_id: Option<String>,
    pub year: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn rejects_non_positive_amounts_as_unprocessable() {
        let lease: CreateLeaseInput = serde_json::from_value(serde_json::json!({
            "tenant_id": 1, "unit_id": 1, "start_date": "2026-01-01", "rent_amount": 0.0
        }))
        .expect("deserialize");
        assert!(matches!(
            validate_input(&lease),
            Err(AppError::UnprocessableEntity(_))
        ));

        let payment: CreatePaymentInput = serde_json::from_value(serde_json::json!({
            "lease_id": 1, "amount": -5.0, "date": "2026-01-15"
        }))
        .expect("deserialize");
        assert!(matches!(
            validate_input(&payment),
            Err(AppError::UnprocessableEntity(_))
        ));
    }

    #[test]
    fn accepts_positive_amounts_and_defaults_method() {
        let payment: CreatePaymentInput = serde_json::from_value(serde_json::json!({
            "lease_id": 1, "amount": 8000.0, "date": "2026-01-15"
        }))
        .expect("deserialize");
        assert!(validate_input(&payment).is_ok());
        assert_eq!(payment.method, "cash");
    }

    #[test]
    fn parses_iso_dates() {
        let lease: CreateLeaseInput = serde_json::from_value(serde_json::json!({
            "tenant_id": 1, "unit_id": 2, "start_date": "2026-03-01",
            "end_date": "2027-02-28", "rent_amount": 12000.0
        }))
        .expect("deserialize");
        assert_eq!(lease.start_date.to_string(), "2026-03-01");
        assert_eq!(lease.end_date.map(|d| d.to_string()).as_deref(), Some("2027-02-28"));

        let bad = serde_json::from_value::<CreateLeaseInput>(serde_json::json!({
            "tenant_id": 1, "unit_id": 2, "start_date": "03/01/2026", "rent_amount": 12000.0
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn distinguishes_absent_from_null_end_date() {
        let absent: UpdateLeaseInput =
            serde_json::from_value(serde_json::json!({ "rent_amount": 9000.0 }))
                .expect("deserialize");
        assert_eq!(absent.end_date, None);

        let cleared: UpdateLeaseInput =
            serde_json::from_value(serde_json::json!({ "end_date": null })).expect("deserialize");
        assert_eq!(cleared.end_date, Some(None));
    }

    #[test]
    fn constrains_unit_status() {
        let vacant: CreateUnitInput = serde_json::from_value(serde_json::json!({
            "unit_number": "A1", "property_id": 1
        }))
        .expect("deserialize");
        assert!(validate_input(&vacant).is_ok());
        assert_eq!(vacant.status, "vacant");

        let bogus: CreateUnitInput = serde_json::from_value(serde_json::json!({
            "unit_number": "A1", "status": "condemned", "property_id": 1
        }))
        .expect("deserialize");
        assert!(validate_input(&bogus).is_err());
    }

    #[test]
    fn rejects_empty_registration_fields_as_bad_request() {
        let input: RegisterInput = serde_json::from_value(serde_json::json!({
            "username": "", "password": "secret"
        }))
        .expect("deserialize");
        assert!(matches!(validate_input(&input), Err(AppError::BadRequest(_))));

        let no_password: RegisterInput = serde_json::from_value(serde_json::json!({
            "username": "asha", "password": ""
        }))
        .expect("deserialize");
        assert!(matches!(
            validate_input(&no_password),
            Err(AppError::BadRequest(_))
        ));
    }
}
