//! Training alert notifications.
//!
//! Every alert gets two notifications: a reminder 30 minutes ahead and a start
//! notification at the alert time. Both ids derive from the alert id, so one
//! `cancel(alert_id)` removes the pair. Scheduling failures are logged and
//! swallowed; the alert itself is kept either way.

use crate::{Result, TrainingAlert, Weekday};
use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Lead time of the reminder notification
pub const REMINDER_LEAD_MINUTES: i64 = 30;

/// Boundary to the device notification API
pub trait NotificationService {
    /// Ask the user for permission; `false` when denied
    fn request_permission(&mut self) -> bool;

    fn schedule_reminder(
        &mut self,
        alert_id: Uuid,
        fire_at: NaiveDateTime,
        title: &str,
        body: &str,
    ) -> Result<()>;

    fn schedule_start(
        &mut self,
        alert_id: Uuid,
        fire_at: NaiveDateTime,
        title: &str,
        body: &str,
    ) -> Result<()>;

    /// Cancel both notifications of an alert
    fn cancel(&mut self, alert_id: Uuid) -> Result<()>;

    fn cancel_all(&mut self) -> Result<()>;
}

pub fn reminder_id(alert_id: Uuid) -> String {
    format!("reminder_{}", alert_id)
}

pub fn start_id(alert_id: Uuid) -> String {
    format!("start_{}", alert_id)
}

/// Next wall-clock instant strictly after `now` falling on `day` at `time`
pub fn next_occurrence(day: Weekday, time: crate::ClockTime, now: NaiveDateTime) -> NaiveDateTime {
    let today = now.weekday().num_days_from_monday();
    let days_ahead = (day.days_from_monday() + 7 - today) % 7;

    let clock = NaiveTime::from_hms_opt(time.hour() as u32, time.minute() as u32, 0)
        .unwrap_or_default();
    let candidate = (now.date() + Duration::days(days_ahead as i64)).and_time(clock);

    if candidate <= now {
        candidate + Duration::days(7)
    } else {
        candidate
    }
}

/// Instants at which an alert's reminder and start notifications fire
pub fn notification_times(alert: &TrainingAlert, now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let start = next_occurrence(alert.day, alert.time, now);
    (start - Duration::minutes(REMINDER_LEAD_MINUTES), start)
}

/// French title and body shown for an alert
pub fn notification_text(alert: &TrainingAlert) -> (String, String) {
    let title = format!("{} {}", alert.training_type.emoji(), alert.label);
    let body = format!(
        "C'est l'heure de votre {} !",
        alert.training_type.label().to_lowercase()
    );
    (title, body)
}

/// Schedule reminder and start notifications for an alert
///
/// Returns whether both were accepted. Failures are logged, never raised.
pub fn schedule_alert<S>(service: &mut S, alert: &TrainingAlert, now: NaiveDateTime) -> bool
where
    S: NotificationService + ?Sized,
{
    let (reminder_at, start_at) = notification_times(alert, now);
    let (title, body) = notification_text(alert);

    let reminder = service.schedule_reminder(alert.id, reminder_at, &title, &body);
    if let Err(ref e) = reminder {
        tracing::warn!("Failed to schedule reminder for alert {}: {}", alert.id, e);
    }

    let start = service.schedule_start(alert.id, start_at, &title, &body);
    if let Err(ref e) = start {
        tracing::warn!("Failed to schedule start for alert {}: {}", alert.id, e);
    }

    let ok = reminder.is_ok() && start.is_ok();
    if ok {
        tracing::info!("Scheduled notifications for alert {} at {}", alert.id, start_at);
    }
    ok
}

/// Cancel an alert's notifications, logging failures
pub fn cancel_alert<S>(service: &mut S, alert_id: Uuid) -> bool
where
    S: NotificationService + ?Sized,
{
    match service.cancel(alert_id) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Failed to cancel notifications for alert {}: {}", alert_id, e);
            false
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Reminder,
    Start,
}

/// A notification waiting to fire
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScheduledNotification {
    pub id: String,
    pub alert_id: Uuid,
    pub kind: NotificationKind,
    pub fire_at: NaiveDateTime,
    pub title: String,
    pub body: String,
}

/// File-backed notification service
///
/// Keeps pending notifications in a JSON file so a separate process (or a
/// later run) can see what is scheduled.
pub struct OutboxNotifier {
    path: PathBuf,
    pending: Vec<ScheduledNotification>,
}

impl OutboxNotifier {
    /// Open the outbox; a missing or unreadable file starts empty
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let pending = crate::state::read_json_or_default::<Vec<ScheduledNotification>>(&path);
        Self { path, pending }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pending notifications, earliest first
    pub fn pending(&self) -> Vec<&ScheduledNotification> {
        let mut pending: Vec<_> = self.pending.iter().collect();
        pending.sort_by_key(|n| n.fire_at);
        pending
    }

    fn push(
        &mut self,
        kind: NotificationKind,
        alert_id: Uuid,
        fire_at: NaiveDateTime,
        title: &str,
        body: &str,
    ) -> Result<()> {
        let id = match kind {
            NotificationKind::Reminder => reminder_id(alert_id),
            NotificationKind::Start => start_id(alert_id),
        };
        // Rescheduling replaces the previous entry with the same id
        self.pending.retain(|n| n.id != id);
        self.pending.push(ScheduledNotification {
            id,
            alert_id,
            kind,
            fire_at,
            title: title.to_string(),
            body: body.to_string(),
        });
        self.flush()
    }

    fn flush(&self) -> Result<()> {
        crate::state::write_json_atomic(&self.path, &self.pending)
    }
}

impl NotificationService for OutboxNotifier {
    fn request_permission(&mut self) -> bool {
        true
    }

    fn schedule_reminder(
        &mut self,
        alert_id: Uuid,
        fire_at: NaiveDateTime,
        title: &str,
        body: &str,
    ) -> Result<()> {
        self.push(NotificationKind::Reminder, alert_id, fire_at, title, body)
    }

    fn schedule_start(
        &mut self,
        alert_id: Uuid,
        fire_at: NaiveDateTime,
        title: &str,
        body: &str,
    ) -> Result<()> {
        self.push(NotificationKind::Start, alert_id, fire_at, title, body)
    }

    fn cancel(&mut self, alert_id: Uuid) -> Result<()> {
        let before = self.pending.len();
        self.pending.retain(|n| n.alert_id != alert_id);
        tracing::debug!(
            "Cancelled {} notifications for alert {}",
            before - self.pending.len(),
            alert_id
        );
        self.flush()
    }

    fn cancel_all(&mut self) -> Result<()> {
        self.pending.clear();
        self.flush()
    }
}
