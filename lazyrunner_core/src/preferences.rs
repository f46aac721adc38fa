//! Per-exercise preference markers and session admission filtering.
//!
//! Preferences live on the [`Profile`]. An exercise without an entry is
//! neutral (`white`). `red` exercises never reach a session.

use crate::{Error, Exercise, Level, Preference, Profile, Result};

/// An exercise paired with the user's marker for it
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotatedExercise {
    pub exercise: Exercise,
    pub preference: Preference,
}

impl Profile {
    /// Marker for an exercise; `white` when nothing was recorded
    pub fn preference(&self, exercise_id: &str) -> Preference {
        self.exercise_preferences
            .get(exercise_id)
            .copied()
            .unwrap_or_default()
    }

    /// Overwrite the marker for an exercise
    pub fn set_preference(&mut self, exercise_id: &str, preference: Preference) {
        self.exercise_preferences
            .insert(exercise_id.to_string(), preference);
        self.touch();
        tracing::debug!("Preference for {} set to {:?}", exercise_id, preference);
    }

    /// Advance the marker one step (white → green → red → white)
    pub fn cycle_preference(&mut self, exercise_id: &str) -> Preference {
        let next = self.preference(exercise_id).next();
        self.set_preference(exercise_id, next);
        next
    }

    /// Forget every marker
    pub fn reset_preferences(&mut self) {
        let cleared = self.exercise_preferences.len();
        self.exercise_preferences.clear();
        self.touch();
        tracing::info!("Reset {} exercise preferences", cleared);
    }

    pub fn set_level(&mut self, level: Level) {
        self.level = level;
        self.touch();
        tracing::info!("Level set to {}", level);
    }

    pub fn rename(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Other("profile name must not be empty".into()));
        }
        self.name = name.to_string();
        self.touch();
        Ok(())
    }

    /// Pair each exercise with its current marker, keeping the given order
    pub fn annotate<'a, I>(&self, exercises: I) -> Vec<AnnotatedExercise>
    where
        I: IntoIterator<Item = &'a Exercise>,
    {
        exercises
            .into_iter()
            .map(|exercise| AnnotatedExercise {
                preference: self.preference(exercise.id()),
                exercise: exercise.clone(),
            })
            .collect()
    }

    /// Exercises admitted to a session: everything not marked `red`
    ///
    /// Order is preserved. An empty result means no session can start.
    pub fn eligible_exercises<'a, I>(&self, exercises: I) -> Vec<Exercise>
    where
        I: IntoIterator<Item = &'a Exercise>,
    {
        exercises
            .into_iter()
            .filter(|e| !self.preference(e.id()).is_excluded())
            .cloned()
            .collect()
    }
}
