use chrono::NaiveDate;
use serde::Serialize;

use crate::repository::payments::PaymentRow;

/// Leases ending within this many days of the reference date count as
/// expiring soon.
pub const EXPIRING_SOON_WINDOW_DAYS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LeaseStatus {
    Active,
    Expired,
    Overdue,
    #[serde(rename = "Expiring Soon")]
    ExpiringSoon,
}

/// Status precedence: an ended lease is Expired no matter what is owed,
/// an outstanding balance beats an approaching end date, and only a
/// fully paid lease inside the window reads Expiring Soon.
pub fn lease_status(end_date: Option<NaiveDate>, balance: f64, as_of: NaiveDate) -> LeaseStatus {
    if let Some(end) = end_date {
        if end < as_of {
            return LeaseStatus::Expired;
        }
        if balance <= 0.0 && (end - as_of).num_days() <= EXPIRING_SOON_WINDOW_DAYS {
            return LeaseStatus::ExpiringSoon;
        }
    }
    if balance > 0.0 {
        return LeaseStatus::Overdue;
    }
    LeaseStatus::Active
}

pub fn total_paid(payments: &[PaymentRow]) -> f64 {
    payments.iter().map(|payment| payment.amount).sum()
}

/// Outstanding amount against one rent period. Overpayment goes negative
/// rather than clamping to zero.
pub fn balance(rent_amount: f64, total_paid: f64) -> f64 {
    round2(rent_amount - total_paid)
}

/// Percentage of units occupied, or 0 when there are no units.
pub fn occupancy_rate(occupied: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(100.0 * occupied as f64 / total as f64)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn payment(amount: f64) -> PaymentRow {
        PaymentRow {
            id: 1,
            lease_id: 1,
            amount,
            date: date(2026, 1, 15),
            method: "cash".to_string(),
        }
    }

    #[test]
    fn balance_is_rent_minus_payments() {
        let payments = vec![payment(5000.0), payment(3000.0)];
        let paid = total_paid(&payments);
        assert_eq!(paid, 8000.0);
        assert_eq!(balance(12000.0, paid), 4000.0);
    }

    #[test]
    fn overpayment_yields_negative_balance() {
        assert_eq!(balance(1000.0, 1250.0), -250.0);
    }

    #[test]
    fn ended_lease_is_expired_even_with_debt() {
        let as_of = date(2026, 6, 1);
        let status = lease_status(Some(date(2026, 5, 31)), 4000.0, as_of);
        assert_eq!(status, LeaseStatus::Expired);
    }

    #[test]
    fn outstanding_balance_beats_expiry_window() {
        let as_of = date(2026, 6, 1);
        let status = lease_status(Some(date(2026, 6, 20)), 500.0, as_of);
        assert_eq!(status, LeaseStatus::Overdue);
    }

    #[test]
    fn paid_lease_inside_window_is_expiring_soon() {
        let as_of = date(2026, 6, 1);
        // 60 days out is inside the window, inclusive.
        let status = lease_status(Some(date(2026, 7, 31)), 0.0, as_of);
        assert_eq!(status, LeaseStatus::ExpiringSoon);

        let beyond = lease_status(Some(date(2026, 8, 1)), 0.0, as_of);
        assert_eq!(beyond, LeaseStatus::Active);
    }

    #[test]
    fn open_ended_lease_is_active_when_paid() {
        let as_of = date(2026, 6, 1);
        assert_eq!(lease_status(None, 0.0, as_of), LeaseStatus::Active);
        assert_eq!(lease_status(None, -100.0, as_of), LeaseStatus::Active);
        assert_eq!(lease_status(None, 100.0, as_of), LeaseStatus::Overdue);
    }

    #[test]
    fn lease_ending_today_is_not_expired() {
        let as_of = date(2026, 6, 1);
        let status = lease_status(Some(date(2026, 6, 1)), 0.0, as_of);
        assert_eq!(status, LeaseStatus::ExpiringSoon);
    }

    #[test]
    fn occupancy_rate_handles_empty_portfolio() {
        assert_eq!(occupancy_rate(0, 0), 0.0);
        assert_eq!(occupancy_rate(1, 2), 50.0);
        assert_eq!(occupancy_rate(2, 3), 66.67);
    }

    #[test]
    fn rounds_to_cents() {
        assert_eq!(round2(10.005), 10.01);
        assert_eq!(round2(10.004), 10.0);
    }
}
