//! Lesson credit balance

use chrono::Utc;
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    models::{BalanceLogEntry, BalanceOperation, BalanceRequest},
    policy::{Action, Actor},
    services::load_student,
    state::AppState,
};

/// Add to or overwrite a student's balance, then log the change
///
/// The profile write and the log append are separate store calls; a
/// failure between them leaves the balance changed without a log entry.
pub async fn update_balance(
    state: &AppState,
    actor: &Actor,
    student_id: &str,
    req: BalanceRequest,
) -> ApiResult<i64> {
    actor.authorize(Action::UpdateBalance)?;
    let operation: BalanceOperation = req.operation.parse()?;
    let mut student = load_student(state, student_id).await?;
    actor.ensure_student(Action::UpdateBalance, &student)?;

    let previous_balance = student.balance.unwrap_or(0);
    let new_balance = operation
        .apply(previous_balance, req.amount)
        .ok_or_else(|| ApiError::invalid("Balance out of range"))?;

    student.balance = Some(new_balance);
    state.profiles.save(&student).await?;

    state
        .balance_log
        .append(&BalanceLogEntry {
            student_id: student.id.clone(),
            operation,
            amount: req.amount,
            previous_balance,
            new_balance,
            timestamp: Utc::now(),
            admin_id: actor.id.clone(),
        })
        .await?;

    info!(
        student_id = %student.id,
        operation = operation.as_str(),
        amount = req.amount,
        previous_balance,
        new_balance,
        actor = %actor.id,
        "balance updated"
    );
    Ok(new_balance)
}
