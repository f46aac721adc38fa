//! Per-profile workout log.
//!
//! Each finished session becomes one JSON line in `workouts.jsonl`, tagged
//! with the profile that trained. Readers only ever see one profile's
//! entries, so a logout hides the previous runner's workouts from the next
//! one without deleting them.

use crate::{Error, Result, SessionRecord};
use chrono::{DateTime, Duration, Local, Utc};
use fs2::FileExt;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Append-only log of finished sessions shared by every profile
#[derive(Clone, Debug)]
pub struct WorkoutLog {
    path: PathBuf,
}

impl WorkoutLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry; concurrent writers are serialized by an exclusive lock
    pub fn record(&self, entry: &SessionRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.lock_exclusive()?;
        // One write call per line so a reader never sees half an entry
        let written = (&file).write_all(&line);
        file.unlock()?;
        written?;

        tracing::debug!(
            "Logged {} workout {} for profile {}",
            entry.session_type,
            entry.id,
            entry.profile_id
        );
        Ok(())
    }

    /// Entries of one profile in logging order
    ///
    /// Lines that do not parse (a crash mid-append, manual edits) are skipped.
    pub fn entries_for(&self, profile_id: Uuid) -> Result<Vec<SessionRecord>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        file.lock_shared()?;
        let entries = parse_entries(BufReader::new(&file), profile_id);
        file.unlock()?;
        entries
    }

    /// Entries of one profile started within the last `days` days, newest first
    pub fn recent_for(
        &self,
        profile_id: Uuid,
        now: DateTime<Utc>,
        days: i64,
    ) -> Result<Vec<SessionRecord>> {
        let since = window_start(now, days)?;
        let mut recent: Vec<_> = self
            .entries_for(profile_id)?
            .into_iter()
            .filter(|entry| entry.started_at >= since)
            .collect();
        recent.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(recent)
    }
}

fn parse_entries<R: BufRead>(reader: R, profile_id: Uuid) -> Result<Vec<SessionRecord>> {
    let mut entries = Vec::new();
    let mut skipped = 0;

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<SessionRecord>(&line) {
            Ok(entry) if entry.profile_id == profile_id => entries.push(entry),
            Ok(_) => {}
            Err(e) => {
                skipped += 1;
                tracing::debug!("Unreadable workout log line: {}", e);
            }
        }
    }

    if skipped > 0 {
        tracing::warn!("Skipped {} unreadable workout log lines", skipped);
    }
    Ok(entries)
}

/// Earliest start time inside a trailing window of `days` days
///
/// Negative windows are refused, as are windows reaching before the
/// representable calendar.
pub fn window_start(now: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>> {
    if days < 0 {
        return Err(Error::Config(format!(
            "history window must be 0 days or more, got {}",
            days
        )));
    }
    Duration::try_days(days)
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| Error::Config(format!("history window of {} days is too large", days)))
}

#[derive(Serialize)]
struct ExportRow<'a> {
    date: String,
    session_type: &'a str,
    outcome: String,
    duration_seconds: u32,
    exercises_done: u32,
    exercises_total: u32,
}

/// Write entries as CSV with a header row, dates in local time
///
/// Returns the number of rows written.
pub fn export_csv<W: Write>(entries: &[SessionRecord], writer: W) -> Result<usize> {
    let mut csv = csv::Writer::from_writer(writer);
    for entry in entries {
        csv.serialize(ExportRow {
            date: entry
                .started_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
            session_type: entry.session_type.as_str(),
            outcome: entry.outcome.to_string(),
            duration_seconds: entry.elapsed_seconds,
            exercises_done: entry.exercises_done,
            exercises_total: entry.exercises_total,
        })?;
    }
    csv.flush()?;
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Outcome, SessionType};

    fn entry(profile_id: Uuid, session_type: SessionType, days_ago: i64) -> SessionRecord {
        let started_at = Utc::now() - Duration::days(days_ago);
        SessionRecord {
            id: Uuid::new_v4(),
            profile_id,
            session_type,
            started_at,
            finished_at: started_at + Duration::minutes(5),
            elapsed_seconds: 300,
            exercises_total: 5,
            exercises_done: 5,
            outcome: Outcome::Completed,
        }
    }

    #[test]
    fn test_entries_are_scoped_to_profile() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = WorkoutLog::new(temp_dir.path().join("workouts.jsonl"));
        let camille = Uuid::new_v4();
        let other = Uuid::new_v4();

        let mine = entry(camille, SessionType::Mobility, 0);
        log.record(&mine).unwrap();
        log.record(&entry(other, SessionType::Strengthening, 0)).unwrap();

        assert_eq!(log.entries_for(camille).unwrap(), vec![mine]);
        assert_eq!(log.entries_for(other).unwrap().len(), 1);
        assert!(log.entries_for(Uuid::new_v4()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_log_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = WorkoutLog::new(temp_dir.path().join("nested").join("workouts.jsonl"));
        assert!(log.entries_for(Uuid::new_v4()).unwrap().is_empty());
    }

    #[test]
    fn test_unreadable_lines_are_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = WorkoutLog::new(temp_dir.path().join("workouts.jsonl"));
        let profile = Uuid::new_v4();

        log.record(&entry(profile, SessionType::Mobility, 0)).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(log.path()).unwrap();
            writeln!(file, "{{\"id\":\"half").unwrap();
        }
        log.record(&entry(profile, SessionType::Mobility, 0)).unwrap();

        assert_eq!(log.entries_for(profile).unwrap().len(), 2);
    }

    #[test]
    fn test_recent_window_newest_first() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = WorkoutLog::new(temp_dir.path().join("workouts.jsonl"));
        let profile = Uuid::new_v4();

        log.record(&entry(profile, SessionType::Mobility, 3)).unwrap();
        log.record(&entry(profile, SessionType::Strengthening, 20)).unwrap();
        log.record(&entry(profile, SessionType::Strengthening, 1)).unwrap();

        let recent = log.recent_for(profile, Utc::now(), 7).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].session_type, SessionType::Strengthening);
        assert!(recent[0].started_at > recent[1].started_at);
    }

    #[test]
    fn test_huge_window_is_refused_without_panicking() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = WorkoutLog::new(temp_dir.path().join("workouts.jsonl"));

        let result = log.recent_for(Uuid::new_v4(), Utc::now(), 100_000_000);
        assert!(matches!(result, Err(Error::Config(_))));
        assert!(matches!(
            window_start(Utc::now(), i64::MAX),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_negative_window_is_refused() {
        assert!(matches!(
            window_start(Utc::now(), -1),
            Err(Error::Config(_))
        ));
        let now = Utc::now();
        assert_eq!(window_start(now, 0).unwrap(), now);
    }

    #[test]
    fn test_export_csv_has_header_and_rows() {
        let profile = Uuid::new_v4();
        let entries = vec![
            entry(profile, SessionType::Mobility, 0),
            entry(profile, SessionType::Strengthening, 1),
        ];

        let mut out = Vec::new();
        assert_eq!(export_csv(&entries, &mut out).unwrap(), 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "date,session_type,outcome,duration_seconds,exercises_done,exercises_total"
        );
        assert!(lines[1].contains(",mobility,completed,300,5,5"));
        assert!(lines[2].contains(",strengthening,"));
    }
}
