//! Session engine driving one guided workout.
//!
//! A session moves through `Active`, `Resting` (strengthening only) and ends in
//! `Completed` or `Aborted`:
//! - Mobility: each exercise runs a fixed countdown, then the next one starts
//! - Strengthening: the user validates an exercise, a rest countdown runs, then
//!   the next exercise starts
//!
//! The session clock counts every tick until the session ends, rest included.
//! Each phase owns at most one countdown; leaving the phase drops it.

use crate::timer::{Timer, TimerEvent};
use crate::{Config, Error, Exercise, Level, Outcome, Result, SessionRecord, SessionType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Durations used by a session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSettings {
    /// Countdown per mobility exercise
    pub exercise_seconds: u32,
    /// Rest after each validated strengthening exercise
    pub rest_seconds: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            exercise_seconds: 60,
            rest_seconds: 60,
        }
    }
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            exercise_seconds: config.session.mobility_exercise_seconds,
            rest_seconds: config.session.rest_seconds,
        }
    }
}

/// Externally visible state of a session
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Active,
    Resting,
    Completed,
    Aborted,
}

/// What the presentation layer renders after each tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub elapsed_seconds: u32,
    pub phase: Phase,
    pub current_exercise_index: usize,
    /// Seconds left on the exercise or rest countdown, if one is running
    pub countdown_remaining: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// One second elapsed
    Tick(SessionSnapshot),
    /// The exercise at `index` became current
    ExerciseStarted { index: usize },
    /// Rest began after validating the exercise at `after_index`
    RestStarted { after_index: usize, seconds: u32 },
    /// The running countdown was paused (`running: false`) or resumed
    CountdownToggled { running: bool },
    /// Terminal event; nothing follows it
    Finished(Outcome),
}

#[derive(Clone, Debug)]
enum Stage {
    Active { countdown: Option<Timer> },
    Resting { rest: Timer },
    Finished(Outcome),
}

/// Repetition target of an exercise for a level; `None` for timed exercises
pub fn reps_for_level(exercise: &Exercise, level: Level) -> Option<u32> {
    match exercise {
        Exercise::Strengthening(e) => Some(e.reps.for_level(level)),
        Exercise::Mobility(_) => None,
    }
}

/// One guided workout
#[derive(Clone, Debug)]
pub struct Session {
    id: Uuid,
    session_type: SessionType,
    exercises: Vec<Exercise>,
    settings: SessionSettings,
    index: usize,
    elapsed_seconds: u32,
    exercises_done: u32,
    stage: Stage,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Start a session over an already filtered exercise list
    ///
    /// Callers drop `red` exercises first. An empty list is refused with
    /// [`Error::NoExercisesSelected`].
    pub fn start(
        session_type: SessionType,
        exercises: Vec<Exercise>,
        settings: SessionSettings,
    ) -> Result<Self> {
        if exercises.is_empty() {
            tracing::warn!("Refusing to start a {} session without exercises", session_type);
            return Err(Error::NoExercisesSelected);
        }

        if let Some(wrong) = exercises.iter().find(|e| e.session_type() != session_type) {
            return Err(Error::SessionTypeMismatch {
                exercise_id: wrong.id().to_string(),
                session_type: session_type.to_string(),
            });
        }

        let session = Self {
            id: Uuid::new_v4(),
            session_type,
            exercises,
            settings,
            index: 0,
            elapsed_seconds: 0,
            exercises_done: 0,
            stage: Self::active_stage(session_type, settings),
            started_at: Utc::now(),
            finished_at: None,
        };

        tracing::info!(
            "Started {} session {} with {} exercises",
            session_type,
            session.id,
            session.exercises.len()
        );
        Ok(session)
    }

    fn active_stage(session_type: SessionType, settings: SessionSettings) -> Stage {
        let countdown = match session_type {
            SessionType::Mobility => Some(Timer::countdown(settings.exercise_seconds)),
            SessionType::Strengthening => None,
        };
        Stage::Active { countdown }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    pub fn current_exercise_index(&self) -> usize {
        self.index
    }

    /// Always in range: the index never moves past the last exercise
    pub fn current_exercise(&self) -> &Exercise {
        &self.exercises[self.index]
    }

    pub fn phase(&self) -> Phase {
        match self.stage {
            Stage::Active { .. } => Phase::Active,
            Stage::Resting { .. } => Phase::Resting,
            Stage::Finished(Outcome::Completed) => Phase::Completed,
            Stage::Finished(Outcome::Aborted) => Phase::Aborted,
        }
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.stage {
            Stage::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.outcome().is_some()
    }

    pub fn countdown_remaining(&self) -> Option<u32> {
        match &self.stage {
            Stage::Active { countdown } => countdown.as_ref().map(Timer::seconds),
            Stage::Resting { rest } => Some(rest.seconds()),
            Stage::Finished(_) => None,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            elapsed_seconds: self.elapsed_seconds,
            phase: self.phase(),
            current_exercise_index: self.index,
            countdown_remaining: self.countdown_remaining(),
        }
    }

    /// Repetition target of the current exercise for a level
    pub fn current_reps(&self, level: Level) -> Option<u32> {
        reps_for_level(self.current_exercise(), level)
    }

    /// Advance the session by one second
    ///
    /// Returns nothing once the session is finished.
    pub fn tick(&mut self) -> Vec<SessionEvent> {
        if self.is_finished() {
            return Vec::new();
        }

        self.elapsed_seconds += 1;

        let countdown_done = match &mut self.stage {
            Stage::Active {
                countdown: Some(timer),
            } => timer.tick() == Some(TimerEvent::Complete),
            Stage::Active { countdown: None } => false,
            Stage::Resting { rest } => rest.tick() == Some(TimerEvent::Complete),
            Stage::Finished(_) => false,
        };

        let mut events = vec![SessionEvent::Tick(self.snapshot())];
        if countdown_done {
            if matches!(self.stage, Stage::Active { .. }) {
                self.exercises_done += 1;
            }
            events.push(self.advance());
        }
        events
    }

    /// Strengthening only: the user finished the current exercise's reps
    pub fn validate_exercise(&mut self) -> Result<Vec<SessionEvent>> {
        if self.session_type != SessionType::Strengthening {
            return Err(Error::InvalidAction(
                "exercises advance automatically in a mobility session".into(),
            ));
        }
        if !matches!(self.stage, Stage::Active { .. }) {
            return Err(Error::InvalidAction(format!(
                "cannot validate an exercise while {:?}",
                self.phase()
            )));
        }

        self.exercises_done += 1;
        let seconds = self.settings.rest_seconds;
        self.stage = Stage::Resting {
            rest: Timer::countdown(seconds),
        };

        tracing::debug!("Exercise {} validated, resting {}s", self.index, seconds);
        Ok(vec![SessionEvent::RestStarted {
            after_index: self.index,
            seconds,
        }])
    }

    /// Pause or resume the exercise or rest countdown
    ///
    /// The session clock keeps counting either way. Strengthening exercises
    /// have no countdown, so there is nothing to toggle.
    pub fn toggle_countdown(&mut self) -> Result<Vec<SessionEvent>> {
        let phase = self.phase();
        let timer = match &mut self.stage {
            Stage::Active {
                countdown: Some(timer),
            } => timer,
            Stage::Resting { rest } => rest,
            _ => {
                return Err(Error::InvalidAction(format!(
                    "no countdown to pause while {:?}",
                    phase
                )))
            }
        };

        timer.toggle();
        let running = timer.is_running();
        tracing::debug!("Countdown {}", if running { "resumed" } else { "paused" });
        Ok(vec![SessionEvent::CountdownToggled { running }])
    }

    /// End the session now; a no-op once finished
    pub fn stop_session(&mut self) -> Vec<SessionEvent> {
        if self.is_finished() {
            return Vec::new();
        }
        vec![self.finish(Outcome::Aborted)]
    }

    /// Move to the next exercise, or complete after the last one
    fn advance(&mut self) -> SessionEvent {
        if self.index + 1 < self.exercises.len() {
            self.index += 1;
            self.stage = Self::active_stage(self.session_type, self.settings);
            tracing::debug!("Advanced to exercise {}", self.index);
            SessionEvent::ExerciseStarted { index: self.index }
        } else {
            self.finish(Outcome::Completed)
        }
    }

    fn finish(&mut self, outcome: Outcome) -> SessionEvent {
        self.stage = Stage::Finished(outcome);
        self.finished_at = Some(Utc::now());
        tracing::info!(
            "Session {} {} after {}s ({}/{} exercises)",
            self.id,
            outcome,
            self.elapsed_seconds,
            self.exercises_done,
            self.exercises.len()
        );
        SessionEvent::Finished(outcome)
    }

    /// Workout log entry for `profile_id`, available once the session is finished
    pub fn record(&self, profile_id: Uuid) -> Option<SessionRecord> {
        let outcome = self.outcome()?;
        Some(SessionRecord {
            id: self.id,
            profile_id,
            session_type: self.session_type,
            started_at: self.started_at,
            finished_at: self.finished_at.unwrap_or(self.started_at),
            elapsed_seconds: self.elapsed_seconds,
            exercises_total: self.exercises.len() as u32,
            exercises_done: self.exercises_done,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_default_catalog, MobilityExercise, Preference, Profile};

    fn mobility_exercises(n: usize) -> Vec<Exercise> {
        (0..n)
            .map(|i| {
                Exercise::Mobility(MobilityExercise {
                    id: format!("m{}", i),
                    name: format!("Mobility {}", i),
                    description: "stretch".into(),
                    image: crate::PLACEHOLDER_IMAGE.into(),
                })
            })
            .collect()
    }

    fn strengthening_exercises() -> Vec<Exercise> {
        build_default_catalog()
            .by_session_type(SessionType::Strengthening)
            .into_iter()
            .take(2)
            .cloned()
            .collect()
    }

    fn tick_n(session: &mut Session, n: u32) -> Vec<SessionEvent> {
        (0..n).flat_map(|_| session.tick()).collect()
    }

    #[test]
    fn test_empty_list_is_refused() {
        crate::logging::init_test();
        let result = Session::start(SessionType::Mobility, vec![], SessionSettings::default());
        assert!(matches!(result, Err(Error::NoExercisesSelected)));
    }

    #[test]
    fn test_wrong_kind_is_refused() {
        let result = Session::start(
            SessionType::Strengthening,
            mobility_exercises(1),
            SessionSettings::default(),
        );
        assert!(matches!(result, Err(Error::SessionTypeMismatch { .. })));
    }

    #[test]
    fn test_initial_state() {
        let session = Session::start(
            SessionType::Mobility,
            mobility_exercises(2),
            SessionSettings::default(),
        )
        .unwrap();

        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.current_exercise_index(), 0);
        assert_eq!(session.elapsed_seconds(), 0);
        assert_eq!(session.countdown_remaining(), Some(60));
        assert!(session.record(Uuid::nil()).is_none());
    }

    #[test]
    fn test_mobility_two_exercises_scenario() {
        let mut session = Session::start(
            SessionType::Mobility,
            mobility_exercises(2),
            SessionSettings::default(),
        )
        .unwrap();

        let events = tick_n(&mut session, 60);
        assert_eq!(session.current_exercise_index(), 1);
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.countdown_remaining(), Some(60));
        assert_eq!(
            events.last(),
            Some(&SessionEvent::ExerciseStarted { index: 1 })
        );

        let events = tick_n(&mut session, 60);
        assert_eq!(session.outcome(), Some(Outcome::Completed));
        assert_eq!(events.last(), Some(&SessionEvent::Finished(Outcome::Completed)));
        assert_eq!(session.elapsed_seconds(), 120);
    }

    #[test]
    fn test_mobility_completes_after_duration_times_count() {
        let settings = SessionSettings {
            exercise_seconds: 5,
            rest_seconds: 60,
        };
        let mut session =
            Session::start(SessionType::Mobility, mobility_exercises(4), settings).unwrap();

        tick_n(&mut session, 19);
        assert!(!session.is_finished());
        assert_eq!(session.current_exercise_index(), 3);

        tick_n(&mut session, 1);
        assert_eq!(session.phase(), Phase::Completed);

        let record = session.record(Uuid::nil()).unwrap();
        assert_eq!(record.exercises_done, 4);
        assert_eq!(record.elapsed_seconds, 20);
        assert_eq!(record.outcome, Outcome::Completed);
    }

    #[test]
    fn test_every_tick_emits_snapshot() {
        let mut session = Session::start(
            SessionType::Mobility,
            mobility_exercises(1),
            SessionSettings::default(),
        )
        .unwrap();

        let events = session.tick();
        assert_eq!(
            events,
            vec![SessionEvent::Tick(SessionSnapshot {
                elapsed_seconds: 1,
                phase: Phase::Active,
                current_exercise_index: 0,
                countdown_remaining: Some(59),
            })]
        );
    }

    #[test]
    fn test_strengthening_waits_for_validation() {
        let mut session = Session::start(
            SessionType::Strengthening,
            strengthening_exercises(),
            SessionSettings::default(),
        )
        .unwrap();

        tick_n(&mut session, 300);
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.current_exercise_index(), 0);
        assert_eq!(session.countdown_remaining(), None);
        assert_eq!(session.elapsed_seconds(), 300);
    }

    #[test]
    fn test_strengthening_rest_then_next() {
        let mut session = Session::start(
            SessionType::Strengthening,
            strengthening_exercises(),
            SessionSettings {
                exercise_seconds: 60,
                rest_seconds: 30,
            },
        )
        .unwrap();

        let events = session.validate_exercise().unwrap();
        assert_eq!(
            events,
            vec![SessionEvent::RestStarted {
                after_index: 0,
                seconds: 30
            }]
        );
        assert_eq!(session.phase(), Phase::Resting);

        // Validating again while resting is refused
        assert!(matches!(
            session.validate_exercise(),
            Err(Error::InvalidAction(_))
        ));

        tick_n(&mut session, 29);
        assert_eq!(session.phase(), Phase::Resting);
        assert_eq!(session.countdown_remaining(), Some(1));

        let events = session.tick();
        assert_eq!(events.last(), Some(&SessionEvent::ExerciseStarted { index: 1 }));
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.current_exercise_index(), 1);
        assert_eq!(session.elapsed_seconds(), 30);
    }

    #[test]
    fn test_strengthening_last_exercise_completes() {
        let mut session = Session::start(
            SessionType::Strengthening,
            strengthening_exercises(),
            SessionSettings::default(),
        )
        .unwrap();

        session.validate_exercise().unwrap();
        tick_n(&mut session, 60);
        assert_eq!(session.current_exercise_index(), 1);

        session.validate_exercise().unwrap();
        let events = tick_n(&mut session, 60);

        assert_eq!(session.phase(), Phase::Completed);
        assert_eq!(session.current_exercise_index(), 1);
        assert_eq!(events.last(), Some(&SessionEvent::Finished(Outcome::Completed)));
        assert_eq!(session.record(Uuid::nil()).unwrap().exercises_done, 2);
    }

    #[test]
    fn test_validate_is_refused_in_mobility() {
        let mut session = Session::start(
            SessionType::Mobility,
            mobility_exercises(1),
            SessionSettings::default(),
        )
        .unwrap();
        assert!(matches!(
            session.validate_exercise(),
            Err(Error::InvalidAction(_))
        ));
        assert_eq!(session.phase(), Phase::Active);
    }

    #[test]
    fn test_stop_from_active_halts_ticks() {
        let mut session = Session::start(
            SessionType::Mobility,
            mobility_exercises(3),
            SessionSettings::default(),
        )
        .unwrap();
        tick_n(&mut session, 10);

        let events = session.stop_session();
        assert_eq!(events, vec![SessionEvent::Finished(Outcome::Aborted)]);
        assert_eq!(session.phase(), Phase::Aborted);

        assert!(tick_n(&mut session, 100).is_empty());
        assert_eq!(session.elapsed_seconds(), 10);
        assert!(session.stop_session().is_empty());
    }

    #[test]
    fn test_stop_from_resting() {
        let mut session = Session::start(
            SessionType::Strengthening,
            strengthening_exercises(),
            SessionSettings::default(),
        )
        .unwrap();
        session.validate_exercise().unwrap();
        tick_n(&mut session, 5);

        session.stop_session();
        assert_eq!(session.outcome(), Some(Outcome::Aborted));
        assert_eq!(session.countdown_remaining(), None);
        assert!(session.tick().is_empty());

        let record = session.record(Uuid::nil()).unwrap();
        assert_eq!(record.outcome, Outcome::Aborted);
        assert_eq!(record.exercises_done, 1);
        assert_eq!(record.exercises_total, 2);
    }

    #[test]
    fn test_paused_countdown_holds_while_clock_runs() {
        let mut session = Session::start(
            SessionType::Mobility,
            mobility_exercises(1),
            SessionSettings {
                exercise_seconds: 10,
                rest_seconds: 10,
            },
        )
        .unwrap();
        tick_n(&mut session, 3);

        let events = session.toggle_countdown().unwrap();
        assert_eq!(events, vec![SessionEvent::CountdownToggled { running: false }]);
        tick_n(&mut session, 20);
        assert_eq!(session.countdown_remaining(), Some(7));
        assert_eq!(session.elapsed_seconds(), 23);
        assert_eq!(session.phase(), Phase::Active);

        session.toggle_countdown().unwrap();
        tick_n(&mut session, 7);
        assert_eq!(session.outcome(), Some(Outcome::Completed));
    }

    #[test]
    fn test_toggle_needs_a_countdown() {
        let mut session = Session::start(
            SessionType::Strengthening,
            strengthening_exercises(),
            SessionSettings::default(),
        )
        .unwrap();
        assert!(matches!(
            session.toggle_countdown(),
            Err(Error::InvalidAction(_))
        ));

        session.validate_exercise().unwrap();
        let events = session.toggle_countdown().unwrap();
        assert_eq!(events, vec![SessionEvent::CountdownToggled { running: false }]);
        tick_n(&mut session, 5);
        assert_eq!(session.countdown_remaining(), Some(60));
    }

    #[test]
    fn test_session_from_filtered_profile_has_no_red() {
        let catalog = build_default_catalog();
        let mut profile = Profile::default();
        profile.set_preference("ren_1", Preference::Red);
        profile.set_preference("ren_2", Preference::Green);

        let eligible =
            profile.eligible_exercises(catalog.by_session_type(SessionType::Strengthening));
        let session =
            Session::start(SessionType::Strengthening, eligible, SessionSettings::default())
                .unwrap();

        assert!(session
            .exercises()
            .iter()
            .all(|e| profile.preference(e.id()) != Preference::Red));
        assert_eq!(session.current_exercise().id(), "ren_2");
    }

    #[test]
    fn test_reps_for_level() {
        let catalog = build_default_catalog();
        let squat = catalog.get("ren_1").unwrap();
        assert_eq!(reps_for_level(squat, Level::Debutant), Some(10));
        assert_eq!(reps_for_level(squat, Level::Intermediaire), Some(15));
        assert_eq!(reps_for_level(squat, Level::Avance), Some(20));

        let stretch = catalog.get("mob_1").unwrap();
        assert_eq!(reps_for_level(stretch, Level::Avance), None);
    }
}
