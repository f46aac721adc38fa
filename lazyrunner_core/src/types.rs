//! Core domain types for LazyRunner.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises (mobility and strengthening) and skill levels
//! - Preference markers
//! - Weekdays, clock times, the weekly plan and training alerts
//! - The user profile
//! - Finished session records

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Exercise Types
// ============================================================================

/// Image reference used by catalog entries that have no real picture yet
pub const PLACEHOLDER_IMAGE: &str = "placeholder";

/// Skill level selecting the repetition target of strengthening exercises
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Level {
    #[default]
    #[serde(rename = "débutant")]
    Debutant,
    #[serde(rename = "intermédiaire")]
    Intermediaire,
    #[serde(rename = "avancé")]
    Avance,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Debutant, Level::Intermediaire, Level::Avance];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debutant => "débutant",
            Level::Intermediaire => "intermédiaire",
            Level::Avance => "avancé",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "débutant" | "debutant" => Ok(Level::Debutant),
            "intermédiaire" | "intermediaire" => Ok(Level::Intermediaire),
            "avancé" | "avance" => Ok(Level::Avance),
            other => Err(Error::Other(format!(
                "Unknown level '{}': expected débutant, intermédiaire or avancé",
                other
            ))),
        }
    }
}

/// Repetition targets of a strengthening exercise, one per level
///
/// Counts are unsigned; nothing forces a higher level to mean more reps.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepCounts {
    #[serde(rename = "débutant")]
    pub debutant: u32,
    #[serde(rename = "intermédiaire")]
    pub intermediaire: u32,
    #[serde(rename = "avancé")]
    pub avance: u32,
}

impl RepCounts {
    pub fn new(debutant: u32, intermediaire: u32, avance: u32) -> Self {
        Self {
            debutant,
            intermediaire,
            avance,
        }
    }

    pub fn for_level(&self, level: Level) -> u32 {
        match level {
            Level::Debutant => self.debutant,
            Level::Intermediaire => self.intermediaire,
            Level::Avance => self.avance,
        }
    }
}

/// A timed stretching/mobility exercise
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MobilityExercise {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: String,
}

impl MobilityExercise {
    /// False when the image is the catalog placeholder
    pub fn has_real_image(&self) -> bool {
        !self.image.is_empty() && self.image != PLACEHOLDER_IMAGE
    }
}

/// A repetition-based strengthening exercise
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StrengtheningExercise {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image1: String,
    pub image2: String,
    pub reps: RepCounts,
}

/// Which kind of guided session a run is
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Mobility,
    Strengthening,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Mobility => "mobility",
            SessionType::Strengthening => "strengthening",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mobility" | "mobilité" | "mobilite" => Ok(SessionType::Mobility),
            "strengthening" | "renforcement" => Ok(SessionType::Strengthening),
            other => Err(Error::Other(format!(
                "Unknown session type '{}': expected mobility or strengthening",
                other
            ))),
        }
    }
}

/// An exercise of the catalog, discriminated by its `kind` tag
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Exercise {
    Mobility(MobilityExercise),
    Strengthening(StrengtheningExercise),
}

impl Exercise {
    pub fn id(&self) -> &str {
        match self {
            Exercise::Mobility(e) => &e.id,
            Exercise::Strengthening(e) => &e.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Exercise::Mobility(e) => &e.name,
            Exercise::Strengthening(e) => &e.name,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Exercise::Mobility(e) => &e.description,
            Exercise::Strengthening(e) => &e.description,
        }
    }

    /// The session type this exercise can be part of
    pub fn session_type(&self) -> SessionType {
        match self {
            Exercise::Mobility(_) => SessionType::Mobility,
            Exercise::Strengthening(_) => SessionType::Strengthening,
        }
    }
}

// ============================================================================
// Preferences
// ============================================================================

/// Per-exercise marker set by the user
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    /// Liked
    Green,
    /// Disliked; excluded from sessions
    Red,
    /// Neutral; included
    #[default]
    White,
}

impl Preference {
    /// One tap: white → green → red → white
    pub fn next(self) -> Self {
        match self {
            Preference::White => Preference::Green,
            Preference::Green => Preference::Red,
            Preference::Red => Preference::White,
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            Preference::Green => "🟢",
            Preference::Red => "🔴",
            Preference::White => "⚪",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Preference::Green => "green",
            Preference::Red => "red",
            Preference::White => "white",
        }
    }

    pub fn is_excluded(&self) -> bool {
        *self == Preference::Red
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Weekly Plan and Alerts
// ============================================================================

/// Training categories that can be planned on a day
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TrainingType {
    Running,
    Mobility,
    Strengthening,
}

impl TrainingType {
    pub const ALL: [TrainingType; 3] = [
        TrainingType::Running,
        TrainingType::Mobility,
        TrainingType::Strengthening,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingType::Running => "running",
            TrainingType::Mobility => "mobility",
            TrainingType::Strengthening => "strengthening",
        }
    }

    /// User-facing French label
    pub fn label(&self) -> &'static str {
        match self {
            TrainingType::Running => "Course",
            TrainingType::Mobility => "Mobilité",
            TrainingType::Strengthening => "Renforcement",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            TrainingType::Running => "🏃",
            TrainingType::Mobility => "🧘",
            TrainingType::Strengthening => "💪",
        }
    }

    pub fn default_color(&self) -> &'static str {
        match self {
            TrainingType::Running => "#3b82f6",
            TrainingType::Mobility => "#10b981",
            TrainingType::Strengthening => "#f59e0b",
        }
    }
}

impl fmt::Display for TrainingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrainingType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "running" | "course" => Ok(TrainingType::Running),
            "mobility" | "mobilité" | "mobilite" => Ok(TrainingType::Mobility),
            "strengthening" | "renforcement" => Ok(TrainingType::Strengthening),
            other => Err(Error::Other(format!(
                "Unknown training type '{}': expected running, mobility or strengthening",
                other
            ))),
        }
    }
}

/// Day of the week, Monday first
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    #[serde(alias = "Lundi")]
    Lundi,
    #[serde(alias = "Mardi")]
    Mardi,
    #[serde(alias = "Mercredi")]
    Mercredi,
    #[serde(alias = "Jeudi")]
    Jeudi,
    #[serde(alias = "Vendredi")]
    Vendredi,
    #[serde(alias = "Samedi")]
    Samedi,
    #[serde(alias = "Dimanche")]
    Dimanche,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Lundi,
        Weekday::Mardi,
        Weekday::Mercredi,
        Weekday::Jeudi,
        Weekday::Vendredi,
        Weekday::Samedi,
        Weekday::Dimanche,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Lundi => "lundi",
            Weekday::Mardi => "mardi",
            Weekday::Mercredi => "mercredi",
            Weekday::Jeudi => "jeudi",
            Weekday::Vendredi => "vendredi",
            Weekday::Samedi => "samedi",
            Weekday::Dimanche => "dimanche",
        }
    }

    /// 0 for lundi through 6 for dimanche
    pub fn days_from_monday(&self) -> u32 {
        match self {
            Weekday::Lundi => 0,
            Weekday::Mardi => 1,
            Weekday::Mercredi => 2,
            Weekday::Jeudi => 3,
            Weekday::Vendredi => 4,
            Weekday::Samedi => 5,
            Weekday::Dimanche => 6,
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        Weekday::ALL[day.num_days_from_monday() as usize]
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim().to_lowercase();
        Weekday::ALL
            .into_iter()
            .find(|d| d.as_str() == token)
            .ok_or_else(|| Error::InvalidDay(s.to_string()))
    }
}

/// Wall-clock time of day, 24-hour, minute resolution
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self> {
        if hour >= 24 || minute >= 60 {
            return Err(Error::InvalidTime(format!("{:02}:{:02}", hour, minute)));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Minutes since midnight (0..1440)
    pub fn minutes_since_midnight(&self) -> u32 {
        self.hour as u32 * 60 + self.minute as u32
    }

    pub fn from_minutes(minutes: u32) -> Result<Self> {
        if minutes >= 24 * 60 {
            return Err(Error::InvalidTime(format!("{} minutes", minutes)));
        }
        Self::new((minutes / 60) as u8, (minutes % 60) as u8)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidTime(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if h.is_empty() || h.len() > 2 || m.len() != 2 || !digits(h) || !digits(m) {
            return Err(invalid());
        }
        let hour: u8 = h.parse().map_err(|_| invalid())?;
        let minute: u8 = m.parse().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl TryFrom<String> for ClockTime {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<ClockTime> for String {
    fn from(t: ClockTime) -> Self {
        t.to_string()
    }
}

/// Planned training types for one day
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayPlan {
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub mobility: bool,
    #[serde(default)]
    pub strengthening: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl DayPlan {
    pub fn includes(&self, training: TrainingType) -> bool {
        match training {
            TrainingType::Running => self.running,
            TrainingType::Mobility => self.mobility,
            TrainingType::Strengthening => self.strengthening,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.running && !self.mobility && !self.strengthening && self.notes.is_none()
    }
}

/// Per-day boolean plan, independent of alert times
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct WeeklyPlan {
    pub days: BTreeMap<Weekday, DayPlan>,
}

/// A scheduled reminder for a training on a given weekday and time
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrainingAlert {
    pub id: Uuid,
    pub day: Weekday,
    pub time: ClockTime,
    pub label: String,
    pub color: String,
    #[serde(rename = "type")]
    pub training_type: TrainingType,
}

// ============================================================================
// User Profile
// ============================================================================

/// Name given to a profile created without user input
pub const DEFAULT_PROFILE_NAME: &str = "Runner";

/// The single local user: level, preferences and weekly plan
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub level: Level,
    #[serde(default)]
    pub exercise_preferences: BTreeMap<String, Preference>,
    #[serde(default)]
    pub weekly_plan: WeeklyPlan,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl Profile {
    pub fn new(name: impl Into<String>, level: Level) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            level,
            exercise_preferences: BTreeMap::new(),
            weekly_plan: WeeklyPlan::default(),
            created_at: now,
            last_active: now,
        }
    }

    pub(crate) fn touch(&mut self) {
        self.last_active = Utc::now();
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new(DEFAULT_PROFILE_NAME, Level::Debutant)
    }
}

// ============================================================================
// Session Records
// ============================================================================

/// How a session ended
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every exercise was performed
    Completed,
    /// Stopped by the user before the end
    Aborted,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Completed => f.write_str("completed"),
            Outcome::Aborted => f.write_str("aborted"),
        }
    }
}

/// A finished session as kept in the workout log
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub id: Uuid,
    /// Profile that trained; logs are only ever read per profile
    pub profile_id: Uuid,
    pub session_type: SessionType,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_seconds: u32,
    pub exercises_total: u32,
    pub exercises_done: u32,
    pub outcome: Outcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_time_parsing() {
        let t: ClockTime = "07:05".parse().unwrap();
        assert_eq!(t.hour(), 7);
        assert_eq!(t.minute(), 5);
        assert_eq!(t.to_string(), "07:05");

        assert!("7:05".parse::<ClockTime>().is_ok());
        assert!("24:00".parse::<ClockTime>().is_err());
        assert!("12:60".parse::<ClockTime>().is_err());
        assert!("12:5".parse::<ClockTime>().is_err());
        assert!("noon".parse::<ClockTime>().is_err());
        assert!("-1:30".parse::<ClockTime>().is_err());
    }

    #[test]
    fn test_clock_time_rejects_signed_parts() {
        for input in ["+7:00", "7:+5", "+1:+1", " +9:30"] {
            assert!(input.parse::<ClockTime>().is_err(), "accepted {:?}", input);
        }
    }

    #[test]
    fn test_clock_time_serde_as_string() {
        let t = ClockTime::new(23, 59).unwrap();
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"23:59\"");

        let bad: std::result::Result<ClockTime, _> = serde_json::from_str("\"25:00\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_weekday_tokens() {
        assert_eq!("lundi".parse::<Weekday>().unwrap(), Weekday::Lundi);
        assert_eq!("Dimanche".parse::<Weekday>().unwrap(), Weekday::Dimanche);
        assert!(matches!(
            "monday".parse::<Weekday>(),
            Err(Error::InvalidDay(_))
        ));

        // Capitalized tokens written by older data still load
        let day: Weekday = serde_json::from_str("\"Mercredi\"").unwrap();
        assert_eq!(day, Weekday::Mercredi);
        assert_eq!(serde_json::to_string(&day).unwrap(), "\"mercredi\"");
    }

    #[test]
    fn test_preference_rotation() {
        assert_eq!(Preference::default(), Preference::White);
        assert_eq!(Preference::White.next(), Preference::Green);
        assert_eq!(Preference::Green.next(), Preference::Red);
        assert_eq!(Preference::Red.next(), Preference::White);
    }

    #[test]
    fn test_exercise_kind_tag() {
        let exercise = Exercise::Mobility(MobilityExercise {
            id: "mob_x".into(),
            name: "Test".into(),
            description: "Desc".into(),
            image: PLACEHOLDER_IMAGE.into(),
        });

        let json = serde_json::to_value(&exercise).unwrap();
        assert_eq!(json["kind"], "mobility");
        assert_eq!(exercise.session_type(), SessionType::Mobility);

        if let Exercise::Mobility(m) = &exercise {
            assert!(!m.has_real_image());
        }
    }

    #[test]
    fn test_level_keys_are_french() {
        let reps = RepCounts::new(8, 12, 15);
        let json = serde_json::to_value(reps).unwrap();
        assert_eq!(json["intermédiaire"], 12);
        assert_eq!("avance".parse::<Level>().unwrap(), Level::Avance);
    }

    #[test]
    fn test_default_profile() {
        let profile = Profile::default();
        assert_eq!(profile.name, "Runner");
        assert_eq!(profile.level, Level::Debutant);
        assert!(profile.exercise_preferences.is_empty());
        assert!(profile.weekly_plan.days.is_empty());
    }
}
