use crate::domain::model::Fine;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Lending rules, the `[lending]` table of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LendingPolicy {
    pub loan_period_days: i64,
    /// Whole currency units charged per calendar day late.
    pub fine_per_day: u64,
    pub borrow_limit: usize,
}

impl Default for LendingPolicy {
    fn default() -> Self {
        Self {
            loan_period_days: 14,
            fine_per_day: 1,
            borrow_limit: 5,
        }
    }
}

impl LendingPolicy {
    pub fn loan_period(&self) -> Duration {
        Duration::days(self.loan_period_days)
    }

    /// Late fine for a loan due on `due` and handed back on `returned_on`.
    pub fn fine_for(&self, due: NaiveDate, returned_on: NaiveDate) -> Option<Fine> {
        let days_late = (returned_on - due).num_days();
        (days_late > 0).then(|| Fine {
            days_late,
            amount: days_late.unsigned_abs() * self.fine_per_day,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fine_counts_calendar_days() {
        let policy = LendingPolicy {
            fine_per_day: 2,
            ..LendingPolicy::default()
        };
        let due = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(policy.fine_for(due, due), None);
        assert_eq!(
            policy.fine_for(due, due + Duration::days(1)),
            Some(Fine {
                days_late: 1,
                amount: 2
            })
        );
        assert_eq!(policy.fine_for(due, due - Duration::days(5)), None);
    }

    #[test]
    fn test_default_loan_period_is_two_weeks() {
        assert_eq!(LendingPolicy::default().loan_period(), Duration::days(14));
    }
}
