use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::auth::require_user;
use crate::error::{AppError, AppResult};
use crate::repository::{expenses, payments, units};
use crate::schemas::PropertyFinancialsQuery;
use crate::services::reporting::build_financial_report;
use crate::state::AppState;

pub fn router() -> axum::Router<AppState> {
    axum::Router::new().route(
        "/reports/property_financials",
        axum::routing::get(property_financials),
    )
}

/// `year` is mandatory; a missing or malformed value is a client error.
fn parse_year(raw: Option<&str>) -> Result<i32, AppError> {
    let raw = raw.ok_or_else(|| AppError::BadRequest("Query parameter 'year' is required.".to_string()))?;
    raw.trim()
        .parse::<i32>()
        .map_err(|_| AppError::BadRequest(format!("Invalid year: '{raw}'.")))
}

/// `property_id` is a numeric id, or "all" (also the default) for the
/// whole portfolio.
fn parse_property_filter(raw: Option<&str>) -> Result<Option<i64>, AppError> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => value
            .parse::<i64>()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("Invalid property_id: '{value}'."))),
    }
}

fn year_bounds(year: i32) -> Result<(NaiveDate, NaiveDate), AppError> {
    let from = NaiveDate::from_ymd_opt(year, 1, 1);
    let to = year
        .checked_add(1)
        .and_then(|next| NaiveDate::from_ymd_opt(next, 1, 1));
    match (from, to) {
        (Some(from), Some(to)) => Ok((from, to)),
        _ => Err(AppError::BadRequest(format!("Year {year} is out of range."))),
    }
}

async fn property_financials(
    State(state): State<AppState>,
    Query(query): Query<PropertyFinancialsQuery>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    require_user(&state, &headers).await?;

    let year = parse_year(query.year.as_deref())?;
    let property_id = parse_property_filter(query.property_id.as_deref())?;
    let (from, to) = year_bounds(year)?;

    let year_payments = payments::in_date_range(&state.db_pool, from, to, property_id).await?;
    let year_expenses = expenses::in_date_range(&state.db_pool, from, to, property_id).await?;
    let (occupied, total) = units::occupancy_counts(&state.db_pool, property_id).await?;

    let report = build_financial_report(&year_payments, &year_expenses, occupied, total);
    Ok(Json(json!(report)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_is_required_and_numeric() {
        assert!(parse_year(None).is_err());
        assert!(parse_year(Some("twenty")).is_err());
        assert!(parse_year(Some("")).is_err());
        assert_eq!(parse_year(Some("2026")).unwrap(), 2026);
        assert_eq!(parse_year(Some(" 2026 ")).unwrap(), 2026);
    }

    #[test]
    fn property_filter_accepts_all_or_id() {
        assert_eq!(parse_property_filter(None).unwrap(), None);
        assert_eq!(parse_property_filter(Some("all")).unwrap(), None);
        assert_eq!(parse_property_filter(Some("")).unwrap(), None);
        assert_eq!(parse_property_filter(Some("42")).unwrap(), Some(42));
        assert!(parse_property_filter(Some("everything")).is_err());
    }

    #[test]
    fn year_bounds_span_the_calendar_year() {
        let (from, to) = year_bounds(2026).unwrap();
        assert_eq!(from.to_string(), "2026-01-01");
        assert_eq!(to.to_string(), "2027-01-01");
        assert!(year_bounds(i32::MAX).is_err());
        assert!(year_bounds(i32::MIN).is_err());
    }
}
