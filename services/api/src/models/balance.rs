//! Balance mutations and the audit log entries they leave behind

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::InvalidValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceOperation {
    /// Add `amount` to the current balance
    Add,
    /// Replace the balance with `amount`
    Set,
}

impl BalanceOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            BalanceOperation::Add => "add",
            BalanceOperation::Set => "set",
        }
    }

    /// New balance, or `None` on overflow. Negative results are allowed.
    pub fn apply(&self, current: i64, amount: i64) -> Option<i64> {
        match self {
            BalanceOperation::Add => current.checked_add(amount),
            BalanceOperation::Set => Some(amount),
        }
    }
}

impl FromStr for BalanceOperation {
    type Err = InvalidValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(BalanceOperation::Add),
            "set" => Ok(BalanceOperation::Set),
            other => Err(InvalidValue::new("operation", other)),
        }
    }
}

/// Write-once audit record, key `balance_log:{studentId}:{millis}:{nonce}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceLogEntry {
    pub student_id: String,
    pub operation: BalanceOperation,
    pub amount: i64,
    pub previous_balance: i64,
    pub new_balance: i64,
    pub timestamp: DateTime<Utc>,
    /// Acting teacher or admin
    pub admin_id: String,
}

/// Body of `POST /students/:id/balance`
#[derive(Debug, Deserialize)]
pub struct BalanceRequest {
    pub amount: i64,
    #[serde(default)]
    pub operation: String,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply() {
        assert_eq!(BalanceOperation::Add.apply(2, 3), Some(5));
        assert_eq!(BalanceOperation::Add.apply(2, -5), Some(-3));
        assert_eq!(BalanceOperation::Set.apply(42, 7), Some(7));
        assert_eq!(BalanceOperation::Set.apply(0, -1), Some(-1));
        assert_eq!(BalanceOperation::Add.apply(i64::MAX, 1), None);
    }

    #[test]
    fn test_parse_operation() {
        assert_eq!("add".parse::<BalanceOperation>().unwrap(), BalanceOperation::Add);
        assert_eq!("set".parse::<BalanceOperation>().unwrap(), BalanceOperation::Set);
        assert!("subtract".parse::<BalanceOperation>().is_err());
    }
}
