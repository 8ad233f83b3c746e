/*
Habit status engine.
Module was independently written from HTTP / Axum for testing:
pure functions over a habit snapshot and an explicit reference date,
no clock reads and no I/O.
*/

use chrono::{DateTime, Datelike, NaiveDate};
use serde::Serialize;

use crate::models::{GoalTimeframe, Habit, RepeatPattern};

// Resolved state of a habit on a single calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    NotScheduled,
    Pending,
    Complete,
    Skipped,
    Failed,
}

// Counts over the full activity log, plus the current streak.
// Intentionally a raw log scan: entries on unscheduled dates count here
// even though the date-driven status path ignores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HabitStats {
    pub complete_days: u32,
    pub skipped_days: u32,
    pub failed_days: u32,
    pub total_days: u32,
    pub streak: u32,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid date: {0}")]
pub struct InvalidDate(pub String);

// Parse a day from "YYYY-MM-DD" or an RFC 3339 timestamp.
// Timestamps are normalized to their calendar day; comparisons in this
// module are by day, never by instant.
pub fn parse_day(raw: &str) -> Result<NaiveDate, InvalidDate> {
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.date_naive());
    }
    Err(InvalidDate(raw.to_string()))
}

// Whether the habit is expected to be acted upon on `date`.
//
// Rules:
// - daily: every date
// - weekly: date's weekday is in days_of_week (0 = Sunday .. 6 = Saturday)
// - monthly: day-of-month matches; months shorter than day_of_month simply
//   never match (explicit policy, not special-cased)
// - yearly: month and day-of-month both match
// - unknown pattern kinds: never scheduled
pub fn is_scheduled_on(pattern: &RepeatPattern, date: NaiveDate) -> bool {
    match pattern {
        RepeatPattern::Daily => true,
        RepeatPattern::Weekly { days_of_week } => {
            days_of_week.contains(&(date.weekday().num_days_from_sunday() as u8))
        }
        RepeatPattern::Monthly { day_of_month } => date.day() == *day_of_month,
        RepeatPattern::Yearly {
            month_of_year,
            day_of_month,
        } => date.month() == *month_of_year && date.day() == *day_of_month,
        RepeatPattern::Unknown => false,
    }
}

// Resolve the habit's status on `date`, as seen from `today`.
//
// Outside [start_date, end_date] or off-pattern dates are NotScheduled no
// matter what the log contains. A scheduled date with no log entry is
// Pending if it is today or later, Failed if it is already past.
pub fn status_on(habit: &Habit, date: NaiveDate, today: NaiveDate) -> DayStatus {
    if date < habit.start_date {
        return DayStatus::NotScheduled;
    }
    if let Some(end) = habit.end_date {
        if date > end {
            return DayStatus::NotScheduled;
        }
    }
    if !is_scheduled_on(&habit.repeat_pattern, date) {
        return DayStatus::NotScheduled;
    }

    // Latest entry wins when several share a date (the log endpoint
    // replaces in place, but older data may still carry duplicates).
    match habit.log.iter().rev().find(|e| e.date == date) {
        Some(e) if e.completed => DayStatus::Complete,
        Some(e) if e.skipped => DayStatus::Skipped,
        Some(_) => DayStatus::Failed,
        None if date >= today => DayStatus::Pending,
        None => DayStatus::Failed,
    }
}

// Consecutive satisfied scheduled days ending at `today`.
//
// Left-to-right fold over every day from start_date through today:
// Complete increments, Failed resets to zero, Skipped and NotScheduled
// leave the counter untouched. Order matters: a later Failed wipes out
// everything accumulated before it, regardless of interleaved skips.
pub fn current_streak(habit: &Habit, today: NaiveDate) -> u32 {
    let mut streak: u32 = 0;
    let mut day = habit.start_date;

    // start_date after today gives an empty range and a zero streak
    while day <= today {
        match status_on(habit, day, today) {
            DayStatus::Complete => streak += 1,
            DayStatus::Failed => streak = 0,
            _ => {}
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    streak
}

// Counts of log entries by category over the entire log, not filtered by
// the scheduling predicate. When both flags are set on an entry,
// completed takes precedence and the entry is counted once.
pub fn aggregate_stats(habit: &Habit, today: NaiveDate) -> HabitStats {
    let complete_days = habit.log.iter().filter(|e| e.completed).count() as u32;
    let skipped_days = habit
        .log
        .iter()
        .filter(|e| e.skipped && !e.completed)
        .count() as u32;
    let failed_days = habit
        .log
        .iter()
        .filter(|e| !e.completed && !e.skipped)
        .count() as u32;

    HabitStats {
        complete_days,
        skipped_days,
        failed_days,
        total_days: complete_days + skipped_days + failed_days,
        streak: current_streak(habit, today),
    }
}

// Progress toward the goal as a percentage, clamped to [0, 100].
//
// The goal timeframe maps to a target day count:
//   total -> goal.value, per_day -> 1, per_week -> 7,
//   per_month -> 30 (fixed approximation, not calendar-accurate)
pub fn progress_percent(habit: &Habit) -> f64 {
    let complete_days = habit.log.iter().filter(|e| e.completed).count() as f64;

    let target_days = match habit.goal.timeframe {
        GoalTimeframe::Total => habit.goal.value,
        GoalTimeframe::PerDay => 1.0,
        GoalTimeframe::PerWeek => 7.0,
        GoalTimeframe::PerMonth => 30.0,
    };

    // goal.value is validated positive at the API boundary; guard anyway
    // so the function stays total over arbitrary snapshots
    if target_days <= 0.0 {
        return 0.0;
    }

    (complete_days / target_days * 100.0).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Goal, GoalUnit, LogEntry};
    use chrono::FixedOffset;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn habit(start: &str, pattern: RepeatPattern) -> Habit {
        Habit {
            id: Uuid::new_v4(),
            name: "Read".to_string(),
            emoji: None,
            goal: Goal {
                value: 10.0,
                unit: GoalUnit::Times,
                timeframe: GoalTimeframe::Total,
            },
            repeat_pattern: pattern,
            completion_target: None,
            time_of_day: Vec::new(),
            specific_time: None,
            start_date: day(start),
            end_date: None,
            area_id: None,
            log: Vec::new(),
            created_at: day(start)
                .and_hms_opt(8, 0, 0)
                .unwrap()
                .and_local_timezone(FixedOffset::east_opt(0).unwrap())
                .unwrap(),
        }
    }

    fn entry(date: &str, completed: bool, skipped: bool) -> LogEntry {
        LogEntry {
            date: day(date),
            completed,
            skipped,
            value: 0.0,
        }
    }

    #[test]
    fn daily_is_always_scheduled() {
        for d in ["2024-01-01", "2024-02-29", "2025-12-31"] {
            assert!(is_scheduled_on(&RepeatPattern::Daily, day(d)));
        }
    }

    #[test]
    fn weekly_matches_days_of_week() {
        let p = RepeatPattern::Weekly {
            days_of_week: vec![1, 3, 5], // Mon/Wed/Fri
        };
        assert!(is_scheduled_on(&p, day("2024-01-01"))); // Monday
        assert!(!is_scheduled_on(&p, day("2024-01-02"))); // Tuesday
        assert!(is_scheduled_on(&p, day("2024-01-03"))); // Wednesday
        assert!(is_scheduled_on(&p, day("2024-01-05"))); // Friday
        assert!(!is_scheduled_on(&p, day("2024-01-07"))); // Sunday
    }

    #[test]
    fn monthly_short_months_never_match() {
        let p = RepeatPattern::Monthly { day_of_month: 31 };
        assert!(is_scheduled_on(&p, day("2024-01-31")));
        assert!(is_scheduled_on(&p, day("2024-03-31")));
        // February has no 31st; the pattern simply never fires there
        for d in 1..=29 {
            let date = NaiveDate::from_ymd_opt(2024, 2, d).unwrap();
            assert!(!is_scheduled_on(&p, date));
        }
    }

    #[test]
    fn yearly_needs_month_and_day() {
        let p = RepeatPattern::Yearly {
            month_of_year: 7,
            day_of_month: 4,
        };
        assert!(is_scheduled_on(&p, day("2024-07-04")));
        assert!(!is_scheduled_on(&p, day("2024-07-05")));
        assert!(!is_scheduled_on(&p, day("2024-06-04")));
    }

    #[test]
    fn unknown_pattern_never_scheduled() {
        let p: RepeatPattern = serde_json::from_str(r#"{"type":"lunar"}"#).unwrap();
        assert!(!is_scheduled_on(&p, day("2024-01-01")));
    }

    #[test]
    fn outside_window_is_not_scheduled_despite_log() {
        let mut h = habit("2024-01-10", RepeatPattern::Daily);
        h.end_date = Some(day("2024-01-20"));
        // stray entries outside the window must not leak through
        h.log.push(entry("2024-01-05", true, false));
        h.log.push(entry("2024-01-25", true, false));

        let today = day("2024-02-01");
        assert_eq!(
            status_on(&h, day("2024-01-05"), today),
            DayStatus::NotScheduled
        );
        assert_eq!(
            status_on(&h, day("2024-01-25"), today),
            DayStatus::NotScheduled
        );
        assert_eq!(status_on(&h, day("2024-01-10"), today), DayStatus::Failed);
    }

    #[test]
    fn log_entry_resolves_status() {
        let mut h = habit("2024-01-01", RepeatPattern::Daily);
        h.log.push(entry("2024-01-01", true, false));
        h.log.push(entry("2024-01-02", false, true));
        h.log.push(entry("2024-01-03", false, false));

        let today = day("2024-01-10");
        assert_eq!(status_on(&h, day("2024-01-01"), today), DayStatus::Complete);
        assert_eq!(status_on(&h, day("2024-01-02"), today), DayStatus::Skipped);
        assert_eq!(status_on(&h, day("2024-01-03"), today), DayStatus::Failed);
    }

    #[test]
    fn missing_entry_pending_today_failed_in_past() {
        // Weekly Mon/Wed/Fri habit starting Mon 2024-01-01,
        // no log, evaluated on Mon 2024-01-08
        let h = habit(
            "2024-01-01",
            RepeatPattern::Weekly {
                days_of_week: vec![1, 3, 5],
            },
        );
        let today = day("2024-01-08");

        assert_eq!(status_on(&h, day("2024-01-01"), today), DayStatus::Failed);
        assert_eq!(
            status_on(&h, day("2024-01-02"), today),
            DayStatus::NotScheduled
        );
        assert_eq!(status_on(&h, day("2024-01-08"), today), DayStatus::Pending);
        // strictly in the future is pending too
        assert_eq!(status_on(&h, day("2024-01-10"), today), DayStatus::Pending);
    }

    #[test]
    fn status_on_is_idempotent() {
        let mut h = habit("2024-01-01", RepeatPattern::Daily);
        h.log.push(entry("2024-01-02", true, false));
        let today = day("2024-01-05");
        let first = status_on(&h, day("2024-01-02"), today);
        let second = status_on(&h, day("2024-01-02"), today);
        assert_eq!(first, second);
    }

    #[test]
    fn duplicate_dates_latest_entry_wins() {
        let mut h = habit("2024-01-01", RepeatPattern::Daily);
        h.log.push(entry("2024-01-02", false, false));
        h.log.push(entry("2024-01-02", true, false));

        let today = day("2024-01-05");
        assert_eq!(status_on(&h, day("2024-01-02"), today), DayStatus::Complete);
    }

    #[test]
    fn recording_supersedes_stale_duplicates() {
        // stored data may already hold several entries for one day; a
        // fresh record must replace all of them, not just the oldest,
        // or the engine's latest-wins lookup would read a stale entry
        let mut h = habit("2024-01-01", RepeatPattern::Daily);
        h.log.push(entry("2024-01-02", false, false));
        h.log.push(entry("2024-01-02", false, true));

        h.record(entry("2024-01-02", true, false));

        let today = day("2024-01-05");
        assert_eq!(status_on(&h, day("2024-01-02"), today), DayStatus::Complete);
        assert_eq!(
            h.log.iter().filter(|e| e.date == day("2024-01-02")).count(),
            1
        );
    }

    #[test]
    fn streak_counts_trailing_completes() {
        // Day one has no entry (implicitly failed), then two completes:
        // the reset lands before the completes accumulate
        let mut h = habit("2024-01-01", RepeatPattern::Daily);
        h.log.push(entry("2024-01-02", true, false));
        h.log.push(entry("2024-01-03", true, false));

        assert_eq!(current_streak(&h, day("2024-01-03")), 2);
    }

    #[test]
    fn failed_resets_streak() {
        let mut h = habit("2024-01-01", RepeatPattern::Daily);
        h.log.push(entry("2024-01-01", true, false));
        h.log.push(entry("2024-01-02", false, false));
        h.log.push(entry("2024-01-03", true, false));

        assert_eq!(current_streak(&h, day("2024-01-03")), 1);
    }

    #[test]
    fn skips_and_off_days_do_not_break_streak() {
        let mut h = habit(
            "2024-01-01",
            RepeatPattern::Weekly {
                days_of_week: vec![1, 3, 5],
            },
        );
        h.log.push(entry("2024-01-01", true, false)); // Mon complete
        h.log.push(entry("2024-01-03", false, true)); // Wed skipped
        h.log.push(entry("2024-01-05", true, false)); // Fri complete

        // Sat/Sun are off-pattern; as of Sun the streak holds at 2
        assert_eq!(current_streak(&h, day("2024-01-07")), 2);
    }

    #[test]
    fn start_after_today_gives_zero_streak() {
        let h = habit("2024-06-01", RepeatPattern::Daily);
        assert_eq!(current_streak(&h, day("2024-01-01")), 0);
    }

    #[test]
    fn multi_year_range_terminates() {
        let mut h = habit("2014-01-01", RepeatPattern::Daily);
        h.log.push(entry("2023-12-31", true, false));
        h.log.push(entry("2024-01-01", true, false));

        // ~10 years of days; must stay prompt and overflow-free
        assert_eq!(current_streak(&h, day("2024-01-01")), 2);
    }

    #[test]
    fn stats_scan_whole_log_ignoring_schedule() {
        // Monthly pattern, but entries on arbitrary dates still count
        let mut h = habit("2024-01-01", RepeatPattern::Monthly { day_of_month: 15 });
        h.log.push(entry("2024-01-15", true, false));
        h.log.push(entry("2024-01-16", true, false)); // off-schedule
        h.log.push(entry("2024-01-17", false, true));
        h.log.push(entry("2024-01-18", false, false));

        let stats = aggregate_stats(&h, day("2024-02-01"));
        assert_eq!(stats.complete_days, 2);
        assert_eq!(stats.skipped_days, 1);
        assert_eq!(stats.failed_days, 1);
        assert_eq!(stats.total_days, 4);
    }

    #[test]
    fn completed_takes_precedence_over_skipped() {
        let mut h = habit("2024-01-01", RepeatPattern::Daily);
        let mut e = entry("2024-01-01", true, false);
        e.skipped = true; // both flags set
        h.log.push(e);

        let stats = aggregate_stats(&h, day("2024-01-02"));
        assert_eq!(stats.complete_days, 1);
        assert_eq!(stats.skipped_days, 0);
        assert_eq!(stats.total_days, 1);
    }

    #[test]
    fn progress_total_goal() {
        let mut h = habit("2024-01-01", RepeatPattern::Daily);
        h.goal.value = 10.0;
        h.goal.timeframe = GoalTimeframe::Total;
        for d in ["2024-01-01", "2024-01-02", "2024-01-03"] {
            h.log.push(entry(d, true, false));
        }
        assert_eq!(progress_percent(&h), 30.0);
    }

    #[test]
    fn progress_clamps_at_100() {
        let mut h = habit("2024-01-01", RepeatPattern::Daily);
        h.goal.value = 1.0;
        h.goal.timeframe = GoalTimeframe::PerDay;
        for d in 1..=5 {
            let date = NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
            h.log.push(LogEntry {
                date,
                completed: true,
                skipped: false,
                value: 0.0,
            });
        }
        assert_eq!(progress_percent(&h), 100.0);
    }

    #[test]
    fn parse_day_accepts_dates_and_timestamps() {
        assert_eq!(parse_day("2024-03-05").unwrap(), day("2024-03-05"));
        // timestamps collapse to their calendar day
        assert_eq!(
            parse_day("2024-03-05T23:15:00+00:00").unwrap(),
            day("2024-03-05")
        );
        assert!(parse_day("yesterday-ish").is_err());
        assert!(parse_day("2024-13-40").is_err());
    }

    proptest! {
        #[test]
        fn progress_always_within_bounds(
            completes in 0usize..50,
            value in 0.5f64..1000.0,
            timeframe in prop_oneof![
                Just(GoalTimeframe::Total),
                Just(GoalTimeframe::PerDay),
                Just(GoalTimeframe::PerWeek),
                Just(GoalTimeframe::PerMonth),
            ],
        ) {
            let mut h = habit("2024-01-01", RepeatPattern::Daily);
            h.goal.value = value;
            h.goal.timeframe = timeframe;
            for i in 0..completes {
                h.log.push(LogEntry {
                    date: day("2024-01-01") + chrono::Days::new(i as u64),
                    completed: true,
                    skipped: false,
                    value: 0.0,
                });
            }
            let p = progress_percent(&h);
            prop_assert!((0.0..=100.0).contains(&p));
        }

        #[test]
        fn streak_never_exceeds_window_length(len in 0u64..400, seed in any::<u64>()) {
            let mut h = habit("2024-01-01", RepeatPattern::Daily);
            // pseudo-random log derived from the seed, one entry per day
            let mut state = seed;
            for i in 0..len {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                h.log.push(LogEntry {
                    date: day("2024-01-01") + chrono::Days::new(i),
                    completed: state & 1 == 0,
                    skipped: state & 2 == 0,
                    value: 0.0,
                });
            }
            let today = day("2024-01-01") + chrono::Days::new(len.saturating_sub(1));
            let s = current_streak(&h, today) as u64;
            prop_assert!(s <= len.max(1));
        }
    }
}
