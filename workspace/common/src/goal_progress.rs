//! Derived goal state: active/completed split, months remaining and pacing.
//!
//! Nothing here is stored server-side. Every function takes `now` explicitly
//! and must be re-run on each fetch because deadlines move relative to it.
//! All arithmetic stays in `Decimal` and integer milliseconds so no path can
//! produce NaN or infinity. Products and quotients saturate at the `Decimal`
//! bounds instead of panicking on absurd server amounts.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

use crate::goal::Goal;

/// Length of the "month" used for goal arithmetic: 30 days, in milliseconds.
pub const MONTH_MS: i64 = 30 * 24 * 60 * 60 * 1000;

/// Pace at or above which a goal is on track.
const ON_TRACK_PACE: Decimal = Decimal::ONE;
/// Pace at or above which a goal is only slightly behind (0.75).
const SLIGHTLY_BEHIND_PACE: Decimal = Decimal::from_parts(75, 0, 0, false, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PaceStatus {
    Completed,
    OnTrack,
    SlightlyBehind,
    AtRisk,
}

impl PaceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::OnTrack => "On Track",
            Self::SlightlyBehind => "Slightly Behind",
            Self::AtRisk => "At Risk",
        }
    }
}

impl fmt::Display for PaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn deadline_instant(deadline: NaiveDate) -> DateTime<Utc> {
    deadline.and_time(NaiveTime::MIN).and_utc()
}

/// Whole 30-day months from `from` to `to`, rounded up. Zero when `to` is not after `from`.
pub fn months_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u32 {
    let diff_ms = (to - from).num_milliseconds();
    if diff_ms <= 0 {
        return 0;
    }
    let months = (diff_ms + MONTH_MS - 1) / MONTH_MS;
    u32::try_from(months).unwrap_or(u32::MAX)
}

/// Months left until the deadline (midnight UTC), floored at zero.
pub fn months_remaining(deadline: NaiveDate, now: DateTime<Utc>) -> u32 {
    months_between(now, deadline_instant(deadline))
}

/// Planned duration of a goal: creation to deadline, when the creation time is known.
pub fn timeframe(goal: &Goal) -> Option<u32> {
    let created_at = goal.created_at?;
    match months_between(created_at, deadline_instant(goal.deadline)) {
        0 => None,
        months => Some(months),
    }
}

/// `part / whole`, saturating at `Decimal::MAX`/`Decimal::MIN` on overflow.
/// Callers guarantee a non-zero `whole`.
pub fn saturating_div(part: Decimal, whole: Decimal) -> Decimal {
    part.checked_div(whole).unwrap_or_else(|| {
        if part.is_sign_negative() == whole.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        }
    })
}

/// Share of `whole` in percent, saturating instead of overflowing.
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    saturating_div(part, whole).saturating_mul(Decimal::ONE_HUNDRED)
}

/// Saved fraction of the target, in `[0, inf)`. Zero for a non-positive target.
pub fn progress_fraction(goal: &Goal) -> Decimal {
    if goal.target_amount <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    saturating_div(goal.current_amount, goal.target_amount).max(Decimal::ZERO)
}

/// Progress relative to elapsed time. With no elapsed time the pace is the
/// progress fraction itself.
pub fn pace(progress: Decimal, elapsed_fraction: Decimal) -> Decimal {
    if elapsed_fraction > Decimal::ZERO {
        saturating_div(progress, elapsed_fraction)
    } else {
        progress
    }
}

pub fn classify_pace(pace: Decimal) -> PaceStatus {
    if pace >= ON_TRACK_PACE {
        PaceStatus::OnTrack
    } else if pace >= SLIGHTLY_BEHIND_PACE {
        PaceStatus::SlightlyBehind
    } else {
        PaceStatus::AtRisk
    }
}

/// Status shown on a goal card. Funded goals are always `Completed`.
pub fn pace_status(goal: &Goal, months_remaining: u32) -> PaceStatus {
    if goal.is_funded() {
        return PaceStatus::Completed;
    }

    let total_months = timeframe(goal)
        .or(Some(months_remaining).filter(|months| *months > 0))
        .unwrap_or(1);
    let elapsed = total_months.saturating_sub(months_remaining);
    let elapsed_fraction = Decimal::from(elapsed) / Decimal::from(total_months);

    classify_pace(pace(progress_fraction(goal), elapsed_fraction))
}

/// Everything a goal card displays, computed for one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub goal: Goal,
    pub months_remaining: u32,
    /// Saved share of the target in percent, capped at 100.
    pub progress_percent: Decimal,
    pub remaining: Decimal,
    pub overfunded_by: Decimal,
    /// Suggested monthly contribution, rounded up to a whole unit.
    pub monthly_needed: Decimal,
    /// Deadline passed without reaching the target.
    pub overdue: bool,
    pub status: PaceStatus,
}

impl GoalProgress {
    pub fn compute(goal: &Goal, now: DateTime<Utc>) -> Self {
        let months_remaining = months_remaining(goal.deadline, now);
        let remaining = goal.remaining();
        let progress_percent = progress_fraction(goal)
            .saturating_mul(Decimal::ONE_HUNDRED)
            .min(Decimal::ONE_HUNDRED)
            .round_dp(1);
        let monthly_needed = (remaining / Decimal::from(months_remaining.max(1))).ceil();

        Self {
            goal: goal.clone(),
            months_remaining,
            progress_percent,
            remaining,
            overfunded_by: goal
                .current_amount
                .saturating_sub(goal.target_amount)
                .max(Decimal::ZERO),
            monthly_needed,
            overdue: !goal.is_funded() && deadline_instant(goal.deadline) <= now,
            status: pace_status(goal, months_remaining),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == PaceStatus::Completed
    }
}

/// Goals split into exactly one of two buckets, in server order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GoalPartition {
    pub active: Vec<GoalProgress>,
    pub completed: Vec<GoalProgress>,
}

impl GoalPartition {
    pub fn len(&self) -> usize {
        self.active.len() + self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn overdue(&self) -> impl Iterator<Item = &GoalProgress> {
        self.active.iter().filter(|progress| progress.overdue)
    }

    pub fn totals(&self) -> GoalTotals {
        GoalTotals::from_active(&self.active)
    }
}

/// Completed iff funded; everything else is active (overdue ones flagged).
pub fn partition_goals(goals: &[Goal], now: DateTime<Utc>) -> GoalPartition {
    let (completed, active) = goals
        .iter()
        .map(|goal| GoalProgress::compute(goal, now))
        .partition(GoalProgress::is_completed);

    GoalPartition { active, completed }
}

/// Aggregates over the active goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct GoalTotals {
    pub saved: Decimal,
    pub target: Decimal,
    /// Sum of the gaps still to fund.
    pub reserved: Decimal,
}

impl GoalTotals {
    pub fn from_active(active: &[GoalProgress]) -> Self {
        active.iter().fold(Self::default(), |totals, progress| Self {
            saved: totals.saved.saturating_add(progress.goal.current_amount),
            target: totals.target.saturating_add(progress.goal.target_amount),
            reserved: totals.reserved.saturating_add(progress.remaining),
        })
    }

    pub fn percent(&self) -> Decimal {
        if self.target <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        percent_of(self.saved, self.target).round_dp(1)
    }

    /// Balance left after reserving every active gap, floored at zero.
    pub fn unallocated(&self, available_balance: Decimal) -> Decimal {
        available_balance
            .saturating_sub(self.reserved)
            .max(Decimal::ZERO)
    }
}
