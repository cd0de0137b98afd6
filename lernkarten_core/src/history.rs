//! Review history within a sliding window.

use crate::{Error, Result, ReviewSession};
use chrono::{DateTime, Duration, Utc};
use std::path::Path;

/// Aggregate over a set of review sessions
#[derive(Clone, Debug, PartialEq)]
pub struct HistorySummary {
    pub sessions: usize,
    pub cards_reviewed: usize,
    pub average_percentage: u32,
}

/// Load sessions finished within the last `days` days, newest first.
///
/// `days` must be positive. A window reaching past the earliest
/// representable date covers every session.
pub fn load_recent_sessions(path: &Path, days: i64) -> Result<Vec<ReviewSession>> {
    if days <= 0 {
        return Err(Error::Config(format!(
            "history window must be positive, got {} days",
            days
        )));
    }
    let cutoff = Duration::try_days(days)
        .and_then(|window| Utc::now().checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let mut sessions: Vec<_> = crate::review_log::read_sessions(path)?
        .into_iter()
        .filter(|s| s.finished_at >= cutoff)
        .collect();
    sessions.sort_by(|a, b| b.finished_at.cmp(&a.finished_at));

    tracing::info!(
        "Loaded {} review sessions from last {} days",
        sessions.len(),
        days
    );
    Ok(sessions)
}

/// Summarize sessions; the average is 0 when there are none
pub fn summarize(sessions: &[ReviewSession]) -> HistorySummary {
    let cards_reviewed = sessions.iter().map(|s| s.card_count).sum();
    let average_percentage = if sessions.is_empty() {
        0
    } else {
        let total: u64 = sessions.iter().map(|s| u64::from(s.percentage)).sum();
        (total as f64 / sessions.len() as f64).round() as u32
    };

    HistorySummary {
        sessions: sessions.len(),
        cards_reviewed,
        average_percentage,
    }
}
