//! Profile and alert persistence with file locking.
//!
//! This module saves and loads the user profile and the training alert list as
//! JSON files, with proper file locking to prevent concurrent access issues.
//! Read failures never reach the caller as hard errors: a missing or corrupt
//! profile becomes a fresh default one.
//!
//! Older installs kept only `preferences.json` (exercise markers and weekly
//! plan, no profile). [`JsonStore::migrate_legacy_preferences`] turns that file
//! into a profile once.

use crate::{Error, Level, Preference, Profile, Result, TrainingAlert, WeeklyPlan};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Persistence boundary for the profile and alerts
pub trait ProfileRepository {
    /// `None` on first run; `ProfileLoad` when the stored profile is unreadable
    fn load_profile(&self) -> Result<Option<Profile>>;

    fn save_profile(&self, profile: &Profile) -> Result<()>;

    /// Empty on first run or when the stored list is unreadable
    fn load_alerts(&self) -> Result<Vec<TrainingAlert>>;

    fn save_alerts(&self, alerts: &[TrainingAlert]) -> Result<()>;

    /// Forget the current profile; the next load starts a fresh one
    ///
    /// Returns whether there was a profile to forget.
    fn logout(&self) -> Result<bool>;

    /// Stored profile, or a fresh one named `default_name`
    fn load_profile_or_default(&self, default_name: &str) -> Profile {
        match self.load_profile() {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                tracing::info!("No profile found, creating '{}'", default_name);
                Profile::new(default_name, Default::default())
            }
            Err(e) => {
                tracing::warn!("{}. Starting from a fresh profile.", e);
                Profile::new(default_name, Default::default())
            }
        }
    }
}

/// JSON files in one data directory
#[derive(Clone, Debug)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn profile_path(&self) -> PathBuf {
        self.dir.join("profile.json")
    }

    pub fn alerts_path(&self) -> PathBuf {
        self.dir.join("alerts.json")
    }

    pub fn notifications_path(&self) -> PathBuf {
        self.dir.join("notifications.json")
    }

    pub fn legacy_preferences_path(&self) -> PathBuf {
        self.dir.join("preferences.json")
    }

    pub fn workouts_path(&self) -> PathBuf {
        self.dir.join("workouts.jsonl")
    }

    /// Build a profile from a legacy `preferences.json`, then delete that file
    ///
    /// Only runs when no profile exists yet. The new profile is named
    /// `default_name` at level débutant. An unreadable legacy file is left in
    /// place and ignored.
    pub fn migrate_legacy_preferences(&self, default_name: &str) -> Result<Option<Profile>> {
        let legacy_path = self.legacy_preferences_path();
        if !legacy_path.exists() || self.profile_path().exists() {
            return Ok(None);
        }

        let contents = read_locked(&legacy_path)?.unwrap_or_default();
        let legacy: LegacyPreferences = match serde_json::from_str(&contents) {
            Ok(legacy) => legacy,
            Err(e) => {
                tracing::warn!("Ignoring unreadable legacy preferences {:?}: {}", legacy_path, e);
                return Ok(None);
            }
        };

        let mut profile = Profile::new(default_name, Level::Debutant);
        profile.exercise_preferences = legacy.exercise_preferences;
        for (day, plan) in legacy.weekly_plan.days {
            profile.weekly_plan.set_day(day, plan);
        }

        self.save_profile(&profile)?;
        std::fs::remove_file(&legacy_path)?;

        tracing::info!(
            "Migrated legacy preferences into profile '{}' ({} exercises marked)",
            profile.name,
            profile.exercise_preferences.len()
        );
        Ok(Some(profile))
    }

    /// Load the profile (or a default), modify it, and save it back
    pub fn update_profile<F, T>(&self, default_name: &str, f: F) -> Result<(Profile, T)>
    where
        F: FnOnce(&mut Profile) -> Result<T>,
    {
        let mut profile = self.load_profile_or_default(default_name);
        let value = f(&mut profile)?;
        self.save_profile(&profile)?;
        Ok((profile, value))
    }
}

impl ProfileRepository for JsonStore {
    fn load_profile(&self) -> Result<Option<Profile>> {
        let path = self.profile_path();
        let contents = match read_locked(&path) {
            Ok(Some(contents)) => contents,
            Ok(None) => return Ok(None),
            Err(e) => {
                return Err(Error::ProfileLoad(format!(
                    "Unable to read profile {:?}: {}",
                    path, e
                )))
            }
        };

        let profile = serde_json::from_str::<Profile>(&contents).map_err(|e| {
            Error::ProfileLoad(format!("Failed to parse profile {:?}: {}", path, e))
        })?;
        tracing::debug!("Loaded profile '{}' from {:?}", profile.name, path);
        Ok(Some(profile))
    }

    fn save_profile(&self, profile: &Profile) -> Result<()> {
        write_json_atomic(&self.profile_path(), profile)
    }

    fn load_alerts(&self) -> Result<Vec<TrainingAlert>> {
        Ok(read_json_or_default(&self.alerts_path()))
    }

    fn save_alerts(&self, alerts: &[TrainingAlert]) -> Result<()> {
        write_json_atomic(&self.alerts_path(), alerts)
    }

    fn logout(&self) -> Result<bool> {
        match std::fs::remove_file(self.profile_path()) {
            Ok(()) => {
                tracing::info!("Logged out; profile removed");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Shape of `preferences.json` written before profiles existed
#[derive(Deserialize)]
struct LegacyPreferences {
    #[serde(rename = "exercisePreferences", default)]
    exercise_preferences: BTreeMap<String, Preference>,
    #[serde(rename = "weeklyPlan", default)]
    weekly_plan: WeeklyPlan,
}

/// Read a whole file under a shared lock; `None` when it does not exist
fn read_locked(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let mut contents = String::new();
    let mut reader = std::io::BufReader::new(&file);
    let read = reader.read_to_string(&mut contents);
    file.unlock()?;
    read?;

    Ok(Some(contents))
}

/// Deserialize a JSON file, falling back to `T::default()` on any failure
pub(crate) fn read_json_or_default<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    let contents = match read_locked(path) {
        Ok(Some(contents)) => contents,
        Ok(None) => return T::default(),
        Err(e) => {
            tracing::warn!("Unable to read {:?}: {}. Using defaults.", path, e);
            return T::default();
        }
    };

    match serde_json::from_str(&contents) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Failed to parse {:?}: {}. Using defaults.", path, e);
            T::default()
        }
    }
}

/// Atomically replace `path` with the JSON form of `value`
///
/// Writes to a temp file in the same directory under an exclusive lock,
/// syncs it, then renames it over the original.
pub(crate) fn write_json_atomic<T>(path: &Path, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::Other, "state path missing parent")
    })?;
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        let contents = serde_json::to_string_pretty(value)?;
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::debug!("Saved {:?}", path);
    Ok(())
}
