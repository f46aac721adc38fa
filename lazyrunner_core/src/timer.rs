//! Duration primitive shared by session countdowns and duration pickers.
//!
//! One value, three independent modes:
//! - `Display`: renders a duration, never changes
//! - `Setter`: adjusted by the user in 15 second steps, never ticks
//! - `Countdown`: decrements once per tick while running, completes at zero

use serde::{Deserialize, Serialize};

/// Adjustment step of a setter, in seconds
pub const SETTER_STEP_SECONDS: u32 = 15;

/// Event emitted by a timer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    /// A setter changed value
    ValueChanged(u32),
    /// A countdown reached zero
    Complete,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    Display,
    Setter,
    Countdown,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timer {
    seconds: u32,
    mode: TimerMode,
    running: bool,
}

impl Timer {
    pub fn display(seconds: u32) -> Self {
        Self {
            seconds,
            mode: TimerMode::Display,
            running: false,
        }
    }

    pub fn setter(seconds: u32) -> Self {
        Self {
            seconds,
            mode: TimerMode::Setter,
            running: false,
        }
    }

    /// A countdown that starts running immediately
    pub fn countdown(seconds: u32) -> Self {
        Self {
            seconds,
            mode: TimerMode::Countdown,
            running: true,
        }
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Setter only: add one step
    pub fn increment(&mut self) -> Option<TimerEvent> {
        if self.mode != TimerMode::Setter {
            return None;
        }
        self.seconds = self.seconds.saturating_add(SETTER_STEP_SECONDS);
        Some(TimerEvent::ValueChanged(self.seconds))
    }

    /// Setter only: remove one step, never below zero
    pub fn decrement(&mut self) -> Option<TimerEvent> {
        if self.mode != TimerMode::Setter {
            return None;
        }
        self.seconds = self.seconds.saturating_sub(SETTER_STEP_SECONDS);
        Some(TimerEvent::ValueChanged(self.seconds))
    }

    /// Countdown only: pause or resume
    pub fn toggle(&mut self) {
        if self.mode == TimerMode::Countdown && self.seconds > 0 {
            self.running = !self.running;
        }
    }

    /// Advance one second
    ///
    /// A running countdown decrements and emits `Complete` on reaching zero,
    /// then stops. Every other mode ignores ticks.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if self.mode != TimerMode::Countdown || !self.running {
            return None;
        }
        self.seconds = self.seconds.saturating_sub(1);
        if self.seconds == 0 {
            self.running = false;
            return Some(TimerEvent::Complete);
        }
        None
    }

    /// `MM:SS`; minutes keep counting past 59
    pub fn format(&self) -> String {
        format_seconds(self.seconds)
    }
}

pub fn format_seconds(total: u32) -> String {
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_inert() {
        let mut timer = Timer::display(90);
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.increment(), None);
        timer.toggle();
        assert_eq!(timer.seconds(), 90);
        assert_eq!(timer.format(), "01:30");
    }

    #[test]
    fn test_setter_steps_and_floor() {
        let mut timer = Timer::setter(20);
        assert_eq!(timer.increment(), Some(TimerEvent::ValueChanged(35)));
        assert_eq!(timer.decrement(), Some(TimerEvent::ValueChanged(20)));
        assert_eq!(timer.decrement(), Some(TimerEvent::ValueChanged(5)));
        assert_eq!(timer.decrement(), Some(TimerEvent::ValueChanged(0)));
        assert_eq!(timer.decrement(), Some(TimerEvent::ValueChanged(0)));

        // Never auto-decrements
        timer.increment();
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.seconds(), 15);
    }

    #[test]
    fn test_countdown_completes_once() {
        let mut timer = Timer::countdown(3);
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.tick(), Some(TimerEvent::Complete));
        assert!(!timer.is_running());
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.seconds(), 0);
    }

    #[test]
    fn test_countdown_pause_resume() {
        let mut timer = Timer::countdown(10);
        timer.tick();
        timer.toggle();
        assert!(!timer.is_running());
        for _ in 0..5 {
            assert_eq!(timer.tick(), None);
        }
        assert_eq!(timer.seconds(), 9);

        timer.toggle();
        timer.tick();
        assert_eq!(timer.seconds(), 8);
    }

    #[test]
    fn test_format_long_durations() {
        assert_eq!(format_seconds(0), "00:00");
        assert_eq!(format_seconds(59), "00:59");
        assert_eq!(format_seconds(3600), "60:00");
    }
}
