use crate::model::{RunHistoryEntry, Summary, TrendPoint};

pub const TREND_LENGTH: usize = 8;

/// Summarizes run history relative to the current execution.
///
/// `history` is newest-first. Executions newer than the current one are
/// dropped; the first important status after the current one is the
/// previous status. Transient statuses (in progress, superseded) are
/// skipped as predecessors, and a transient current status is never
/// reported as a change.
///
/// If the current execution is not in the history, the whole list is used.
///
/// # Returns
///
/// `None` when the history is empty.
pub fn analyze(current_execution_id: &str, history: &[RunHistoryEntry]) -> Option<Summary> {
    let start = history
        .iter()
        .position(|e| e.execution_id == current_execution_id)
        .unwrap_or(0);
    let since_current = history.get(start..)?;
    let (current, older) = since_current.split_first()?;

    let prev_status = older
        .iter()
        .find(|e| e.status.is_important())
        .map(|e| e.status.clone());

    // A transient current status never counts as a transition.
    let status_changed = current.status.is_important()
        && prev_status
            .as_ref()
            .is_some_and(|prev| *prev != current.status);

    let trend: Vec<TrendPoint> = since_current
        .iter()
        .filter(|e| e.status.is_important())
        .take(TREND_LENGTH)
        .map(trend_point)
        .collect();

    Some(Summary {
        status_changed,
        cur_status: current.status.clone(),
        prev_status,
        trend: (!trend.is_empty()).then_some(trend),
    })
}

fn trend_point(entry: &RunHistoryEntry) -> TrendPoint {
    if entry.status.is_failure() {
        return TrendPoint::Failure;
    }

    match (entry.start_time, entry.last_update_time) {
        (Some(start), Some(end)) => {
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            let secs = ((end - start).num_milliseconds() as f64 / 1000.0).round() as i64;
            TrendPoint::Duration(secs)
        }
        _ => TrendPoint::Unknown,
    }
}
