use chrono::Datelike;
use serde::Serialize;

use super::finance::{occupancy_rate, round2};
use crate::repository::expenses::ExpenseRow;
use crate::repository::payments::PaymentRow;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyTotals {
    pub month: &'static str,
    pub income: f64,
    pub expense: f64,
    pub net_profit: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinancialReport {
    pub total_income: f64,
    pub total_expense: f64,
    pub net_profit: f64,
    pub occupancy_rate: f64,
    pub monthly_breakdown: Vec<MonthlyTotals>,
    pub expense_breakdown: Vec<CategoryTotal>,
}

/// One calendar year of income and expenses. The monthly breakdown always
/// carries twelve entries, Jan through Dec, zero-filled where nothing
/// happened; categories appear in order of their first expense row.
pub fn build_financial_report(
    payments: &[PaymentRow],
    expenses: &[ExpenseRow],
    occupied_units: i64,
    total_units: i64,
) -> FinancialReport {
    let mut income_by_month = [0.0_f64; 12];
    let mut expense_by_month = [0.0_f64; 12];

    for payment in payments {
        income_by_month[payment.date.month0() as usize] += payment.amount;
    }

    let mut categories: Vec<CategoryTotal> = Vec::new();
    for expense in expenses {
        expense_by_month[expense.date.month0() as usize] += expense.amount;
        match categories
            .iter_mut()
            .find(|entry| entry.category == expense.category)
        {
            Some(entry) => entry.amount += expense.amount,
            None => categories.push(CategoryTotal {
                category: expense.category.clone(),
                amount: expense.amount,
            }),
        }
    }
    for entry in &mut categories {
        entry.amount = round2(entry.amount);
    }

    let total_income = round2(income_by_month.iter().sum());
    let total_expense = round2(expense_by_month.iter().sum());

    let monthly_breakdown = MONTH_NAMES
        .iter()
        .enumerate()
        .map(|(index, month)| {
            let income = round2(income_by_month[index]);
            let expense = round2(expense_by_month[index]);
            MonthlyTotals {
                month,
                income,
                expense,
                net_profit: round2(income - expense),
            }
        })
        .collect();

    FinancialReport {
        total_income,
        total_expense,
        net_profit: round2(total_income - total_expense),
        occupancy_rate: occupancy_rate(occupied_units, total_units),
        monthly_breakdown,
        expense_breakdown: categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).expect("valid date")
    }

    fn payment(amount: f64, month: u32, day: u32) -> PaymentRow {
        PaymentRow {
            id: 0,
            lease_id: 1,
            amount,
            date: date(month, day),
            method: "cash".to_string(),
        }
    }

    fn expense(category: &str, amount: f64, month: u32, day: u32) -> ExpenseRow {
        ExpenseRow {
            id: 0,
            property_id: 1,
            category: category.to_string(),
            description: None,
            amount,
            date: date(month, day),
        }
    }

    #[test]
    fn empty_year_still_lists_twelve_months() {
        let report = build_financial_report(&[], &[], 0, 0);
        assert_eq!(report.monthly_breakdown.len(), 12);
        assert_eq!(report.monthly_breakdown[0].month, "Jan");
        assert_eq!(report.monthly_breakdown[11].month, "Dec");
        assert_eq!(report.total_income, 0.0);
        assert_eq!(report.total_expense, 0.0);
        assert_eq!(report.net_profit, 0.0);
        assert_eq!(report.occupancy_rate, 0.0);
        assert!(report.expense_breakdown.is_empty());
    }

    #[test]
    fn buckets_rows_into_their_months() {
        let payments = vec![payment(1000.0, 1, 5), payment(500.0, 1, 20), payment(700.0, 3, 1)];
        let expenses = vec![expense("Repairs", 300.0, 3, 15)];
        let report = build_financial_report(&payments, &expenses, 1, 2);

        assert_eq!(report.monthly_breakdown[0].income, 1500.0);
        assert_eq!(report.monthly_breakdown[1].income, 0.0);
        assert_eq!(report.monthly_breakdown[2].income, 700.0);
        assert_eq!(report.monthly_breakdown[2].expense, 300.0);
        assert_eq!(report.monthly_breakdown[2].net_profit, 400.0);
        assert_eq!(report.occupancy_rate, 50.0);
    }

    #[test]
    fn monthly_entries_sum_to_totals() {
        let payments = vec![payment(1200.5, 2, 1), payment(99.49, 11, 30)];
        let expenses = vec![expense("Tax", 50.0, 6, 1), expense("Repairs", 25.25, 6, 2)];
        let report = build_financial_report(&payments, &expenses, 0, 4);

        let income: f64 = report.monthly_breakdown.iter().map(|m| m.income).sum();
        let outgo: f64 = report.monthly_breakdown.iter().map(|m| m.expense).sum();
        assert_eq!(round2(income), report.total_income);
        assert_eq!(round2(outgo), report.total_expense);
        assert_eq!(report.net_profit, round2(report.total_income - report.total_expense));
    }

    #[test]
    fn categories_keep_first_occurrence_order() {
        let expenses = vec![
            expense("Repairs", 100.0, 1, 10),
            expense("Tax", 400.0, 2, 1),
            expense("Repairs", 50.0, 5, 3),
        ];
        let report = build_financial_report(&[], &expenses, 0, 0);

        let labels: Vec<&str> = report
            .expense_breakdown
            .iter()
            .map(|entry| entry.category.as_str())
            .collect();
        assert_eq!(labels, vec!["Repairs", "Tax"]);
        assert_eq!(report.expense_breakdown[0].amount, 150.0);
        assert_eq!(report.expense_breakdown[1].amount, 400.0);
    }
}
