pub mod finance;
pub mod reporting;
