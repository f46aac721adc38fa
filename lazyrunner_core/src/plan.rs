//! Weekly plan flags and the training alert list.
//!
//! The weekly plan says which training types happen on which day. Alerts are
//! a separate flat list of timed reminders; several alerts may share a day and
//! even a time.

use crate::{ClockTime, DayPlan, Error, Result, TrainingAlert, TrainingType, Weekday, WeeklyPlan};
use uuid::Uuid;

const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

impl WeeklyPlan {
    /// Plan for a day; all flags false when nothing was planned
    pub fn day(&self, day: Weekday) -> DayPlan {
        self.days.get(&day).cloned().unwrap_or_default()
    }

    /// Replace the plan for a day; an empty plan removes the entry
    pub fn set_day(&mut self, day: Weekday, plan: DayPlan) {
        if plan.is_empty() {
            self.days.remove(&day);
        } else {
            self.days.insert(day, plan);
        }
    }

    /// Days where the given training type is planned, Monday first
    pub fn planned_days(&self, training: TrainingType) -> Vec<Weekday> {
        self.days
            .iter()
            .filter(|(_, plan)| plan.includes(training))
            .map(|(day, _)| *day)
            .collect()
    }
}

/// Field changes applied by [`AlertStore::update_alert`]; `None` keeps the value
#[derive(Clone, Debug, Default)]
pub struct AlertUpdate {
    pub day: Option<Weekday>,
    pub time: Option<ClockTime>,
    pub label: Option<String>,
    pub color: Option<String>,
    pub training_type: Option<TrainingType>,
}

/// Ordered collection of training alerts
#[derive(Clone, Debug, Default)]
pub struct AlertStore {
    alerts: Vec<TrainingAlert>,
}

impl AlertStore {
    pub fn new(alerts: Vec<TrainingAlert>) -> Self {
        Self { alerts }
    }

    pub fn alerts(&self) -> &[TrainingAlert] {
        &self.alerts
    }

    pub fn into_alerts(self) -> Vec<TrainingAlert> {
        self.alerts
    }

    pub fn get(&self, id: Uuid) -> Option<&TrainingAlert> {
        self.alerts.iter().find(|a| a.id == id)
    }

    /// Create an alert with a fresh id and append it
    ///
    /// Overlapping alerts on the same day and time are accepted.
    pub fn add_alert(
        &mut self,
        day: Weekday,
        time: ClockTime,
        label: &str,
        color: &str,
        training_type: TrainingType,
    ) -> Result<TrainingAlert> {
        let label = validate_label(label)?;
        validate_color(color)?;

        let alert = TrainingAlert {
            id: Uuid::new_v4(),
            day,
            time,
            label,
            color: color.to_string(),
            training_type,
        };

        tracing::info!(
            "Added {} alert '{}' on {} at {}",
            training_type,
            alert.label,
            day,
            time
        );
        self.alerts.push(alert.clone());
        Ok(alert)
    }

    pub fn update_alert(&mut self, id: Uuid, update: AlertUpdate) -> Result<TrainingAlert> {
        let label = update.label.as_deref().map(validate_label).transpose()?;
        if let Some(ref color) = update.color {
            validate_color(color)?;
        }

        let alert = self
            .alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::AlertNotFound(id.to_string()))?;

        if let Some(day) = update.day {
            alert.day = day;
        }
        if let Some(time) = update.time {
            alert.time = time;
        }
        if let Some(label) = label {
            alert.label = label;
        }
        if let Some(color) = update.color {
            alert.color = color;
        }
        if let Some(training_type) = update.training_type {
            alert.training_type = training_type;
        }

        tracing::debug!("Updated alert {}", id);
        Ok(alert.clone())
    }

    pub fn remove_alert(&mut self, id: Uuid) -> Result<TrainingAlert> {
        let index = self
            .alerts
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| Error::AlertNotFound(id.to_string()))?;

        let removed = self.alerts.remove(index);
        tracing::info!("Removed alert '{}' on {}", removed.label, removed.day);
        Ok(removed)
    }

    /// Alerts of a day in insertion order
    pub fn alerts_for_day(&self, day: Weekday) -> Vec<&TrainingAlert> {
        self.alerts.iter().filter(|a| a.day == day).collect()
    }

    /// Alerts of a day sorted by time; equal times keep insertion order
    pub fn chronological_alerts_for_day(&self, day: Weekday) -> Vec<&TrainingAlert> {
        let mut alerts = self.alerts_for_day(day);
        alerts.sort_by_key(|a| a.time);
        alerts
    }
}

fn validate_label(label: &str) -> Result<String> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidAlert("label must not be empty".into()));
    }
    Ok(trimmed.to_string())
}

fn validate_color(color: &str) -> Result<()> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidAlert(format!(
            "color '{}' is not of the form #RRGGBB",
            color
        )))
    }
}

/// Vertical position of a time on a day bar, in percent
///
/// 00:00 sits at 100 (bottom of the bar) and the value falls toward 0 as the
/// day advances.
pub fn time_to_position(time: ClockTime) -> f64 {
    (1.0 - time.minutes_since_midnight() as f64 / MINUTES_PER_DAY) * 100.0
}

/// Inverse of [`time_to_position`], rounded to the nearest minute
///
/// Positions outside 0..=100 are clamped; 0 maps to 23:59.
pub fn position_to_time(position: f64) -> ClockTime {
    let clamped = if position.is_nan() {
        100.0
    } else {
        position.clamp(0.0, 100.0)
    };
    let minutes = ((1.0 - clamped / 100.0) * MINUTES_PER_DAY).round() as u32;
    let minutes = minutes.min(24 * 60 - 1);
    ClockTime::new((minutes / 60) as u8, (minutes % 60) as u8)
        .unwrap_or_else(|_| unreachable!("minutes clamped below 1440"))
}
