pub mod account;
pub mod dashboard;
pub mod expenses;
pub mod health;
pub mod leases;
pub mod payments;
pub mod properties;
pub mod reports;
pub mod tenants;
pub mod units;

use crate::state::AppState;

pub fn api_router() -> axum::Router<AppState> {
    axum::Router::new()
        .merge(health::router())
        .merge(account::router())
        .merge(properties::router())
        .merge(units::router())
        .merge(tenants::router())
        .merge(leases::router())
        .merge(payments::router())
        .merge(expenses::router())
        .merge(dashboard::router())
        .merge(reports::router())
}
