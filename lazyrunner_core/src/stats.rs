//! Weekly training statistics.
//!
//! A week runs lundi to dimanche in the caller's time zone. Logged workouts
//! are counted against the sessions the weekly plan asks for, which is what
//! the "this week" card shows.

use crate::{Outcome, SessionRecord, SessionType, TrainingType, Weekday, WeeklyPlan};
use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone};
use std::collections::BTreeSet;

/// Counts for one session type over a week
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TypeStats {
    pub completed: u32,
    pub aborted: u32,
    /// Clock time of every session, aborted ones included
    pub active_seconds: u64,
    /// Days the weekly plan schedules this type
    pub planned: u32,
}

impl TypeStats {
    fn add(&mut self, entry: &SessionRecord) {
        match entry.outcome {
            Outcome::Completed => self.completed += 1,
            Outcome::Aborted => self.aborted += 1,
        }
        self.active_seconds += u64::from(entry.elapsed_seconds);
    }

    /// Planned sessions not yet completed
    pub fn remaining(&self) -> u32 {
        self.planned.saturating_sub(self.completed)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeeklyStats {
    /// The lundi the week starts on
    pub week_start: NaiveDate,
    pub mobility: TypeStats,
    pub strengthening: TypeStats,
    /// Days with at least one completed session
    pub training_days: BTreeSet<Weekday>,
}

impl WeeklyStats {
    pub fn for_type(&self, session_type: SessionType) -> &TypeStats {
        match session_type {
            SessionType::Mobility => &self.mobility,
            SessionType::Strengthening => &self.strengthening,
        }
    }

    pub fn completed_sessions(&self) -> u32 {
        self.mobility.completed + self.strengthening.completed
    }

    pub fn active_minutes(&self) -> u64 {
        (self.mobility.active_seconds + self.strengthening.active_seconds) / 60
    }
}

/// The lundi on or before `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

fn weekday_of(date: NaiveDate) -> Weekday {
    Weekday::ALL[date.weekday().num_days_from_monday() as usize]
}

/// Statistics for the week containing `now`
///
/// Entry dates are read in `now`'s time zone, so a session logged late on
/// dimanche evening stays in that week.
pub fn weekly_stats<Tz: TimeZone>(
    entries: &[SessionRecord],
    plan: &WeeklyPlan,
    now: &DateTime<Tz>,
) -> WeeklyStats {
    let start = week_start(now.date_naive());
    let end = start.checked_add_days(Days::new(7)).unwrap_or(NaiveDate::MAX);

    let mut stats = WeeklyStats {
        week_start: start,
        mobility: TypeStats {
            planned: plan.planned_days(TrainingType::Mobility).len() as u32,
            ..Default::default()
        },
        strengthening: TypeStats {
            planned: plan.planned_days(TrainingType::Strengthening).len() as u32,
            ..Default::default()
        },
        training_days: BTreeSet::new(),
    };

    for entry in entries {
        let day = entry.started_at.with_timezone(&now.timezone()).date_naive();
        if day < start || day >= end {
            continue;
        }
        match entry.session_type {
            SessionType::Mobility => stats.mobility.add(entry),
            SessionType::Strengthening => stats.strengthening.add(entry),
        }
        if entry.outcome == Outcome::Completed {
            stats.training_days.insert(weekday_of(day));
        }
    }

    tracing::debug!(
        "Week of {}: {} completed sessions",
        stats.week_start,
        stats.completed_sessions()
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DayPlan;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        date(y, m, d).and_hms_opt(h, 0, 0).unwrap().and_utc()
    }

    fn entry(
        session_type: SessionType,
        started_at: DateTime<Utc>,
        outcome: Outcome,
    ) -> SessionRecord {
        SessionRecord {
            id: Uuid::new_v4(),
            profile_id: Uuid::nil(),
            session_type,
            started_at,
            finished_at: started_at + Duration::minutes(10),
            elapsed_seconds: 600,
            exercises_total: 5,
            exercises_done: 5,
            outcome,
        }
    }

    #[test]
    fn test_week_starts_on_lundi() {
        // 2024-06-12 is a Wednesday
        assert_eq!(week_start(date(2024, 6, 12)), date(2024, 6, 10));
        assert_eq!(week_start(date(2024, 6, 10)), date(2024, 6, 10));
        assert_eq!(week_start(date(2024, 6, 16)), date(2024, 6, 10));
    }

    #[test]
    fn test_counts_only_current_week() {
        let now = at(2024, 6, 12, 12);
        let entries = vec![
            entry(SessionType::Mobility, at(2024, 6, 10, 7), Outcome::Completed),
            entry(SessionType::Mobility, at(2024, 6, 12, 7), Outcome::Aborted),
            entry(SessionType::Strengthening, at(2024, 6, 11, 18), Outcome::Completed),
            // Previous dimanche
            entry(SessionType::Mobility, at(2024, 6, 9, 20), Outcome::Completed),
        ];

        let stats = weekly_stats(&entries, &WeeklyPlan::default(), &now);

        assert_eq!(stats.week_start, date(2024, 6, 10));
        assert_eq!(stats.mobility.completed, 1);
        assert_eq!(stats.mobility.aborted, 1);
        assert_eq!(stats.strengthening.completed, 1);
        assert_eq!(stats.completed_sessions(), 2);
        assert_eq!(stats.active_minutes(), 30);
        assert_eq!(
            stats.training_days.iter().copied().collect::<Vec<_>>(),
            vec![Weekday::Lundi, Weekday::Mardi]
        );
    }

    #[test]
    fn test_planned_sessions_come_from_plan() {
        let mut plan = WeeklyPlan::default();
        for day in [Weekday::Lundi, Weekday::Jeudi] {
            plan.set_day(
                day,
                DayPlan {
                    mobility: true,
                    ..Default::default()
                },
            );
        }
        plan.set_day(
            Weekday::Samedi,
            DayPlan {
                running: true,
                strengthening: true,
                ..Default::default()
            },
        );

        let now = at(2024, 6, 12, 12);
        let entries = vec![entry(
            SessionType::Mobility,
            at(2024, 6, 10, 7),
            Outcome::Completed,
        )];
        let stats = weekly_stats(&entries, &plan, &now);

        assert_eq!(stats.mobility.planned, 2);
        assert_eq!(stats.mobility.remaining(), 1);
        assert_eq!(stats.strengthening.planned, 1);
        assert_eq!(stats.for_type(SessionType::Strengthening).remaining(), 1);
    }

    #[test]
    fn test_dates_follow_caller_time_zone() {
        use chrono::FixedOffset;

        // Sunday 23:00 UTC is already Monday in UTC+2
        let paris = FixedOffset::east_opt(2 * 3600).unwrap();
        let late = at(2024, 6, 9, 23);
        let now = paris.from_utc_datetime(&at(2024, 6, 10, 12).naive_utc());

        let stats = weekly_stats(
            &[entry(SessionType::Mobility, late, Outcome::Completed)],
            &WeeklyPlan::default(),
            &now,
        );
        assert_eq!(stats.mobility.completed, 1);
        assert!(stats.training_days.contains(&Weekday::Lundi));
    }
}
