//! Default catalog of mobility and strengthening exercises.
//!
//! This module provides the built-in exercises shown on the exercise screens.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// The complete, read-only list of exercises in display order
#[derive(Clone, Debug)]
pub struct Catalog {
    exercises: Vec<Exercise>,
}

impl Catalog {
    pub fn new(exercises: Vec<Exercise>) -> Self {
        Self { exercises }
    }

    pub fn all(&self) -> &[Exercise] {
        &self.exercises
    }

    /// Exercises usable in a session of the given type, in catalog order
    pub fn by_session_type(&self, session_type: SessionType) -> Vec<&Exercise> {
        self.exercises
            .iter()
            .filter(|e| e.session_type() == session_type)
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id() == id)
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Validate the catalog for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for exercise in &self.exercises {
            let id = exercise.id();
            if id.is_empty() {
                errors.push("Exercise has empty ID".to_string());
            }
            if !seen.insert(id) {
                errors.push(format!("Duplicate exercise ID '{}'", id));
            }
            if exercise.name().is_empty() {
                errors.push(format!("Exercise '{}' has empty name", id));
            }
            if exercise.description().is_empty() {
                errors.push(format!("Exercise '{}' has empty description", id));
            }
        }

        for session_type in [SessionType::Mobility, SessionType::Strengthening] {
            if self.by_session_type(session_type).is_empty() {
                errors.push(format!("Catalog has no {} exercises", session_type));
            }
        }

        errors
    }
}

fn mobility(id: &str, name: &str, description: &str, image: &str) -> Exercise {
    Exercise::Mobility(MobilityExercise {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        image: image.into(),
    })
}

fn strengthening(
    id: &str,
    name: &str,
    description: &str,
    reps: (u32, u32, u32),
) -> Exercise {
    Exercise::Strengthening(StrengtheningExercise {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        image1: PLACEHOLDER_IMAGE.into(),
        image2: PLACEHOLDER_IMAGE.into(),
        reps: RepCounts::new(reps.0, reps.1, reps.2),
    })
}

/// Builds the default catalog
///
/// **Note**: prefer `get_default_catalog()`, which returns a cached reference.
pub fn build_default_catalog() -> Catalog {
    let exercises = vec![
        // ====================================================================
        // Mobility
        // ====================================================================
        mobility(
            "mob_1",
            "Étirement des ischio-jambiers",
            "Étirez vos muscles arrière de la cuisse pour améliorer la flexibilité.",
            "https://example.com/ischio-jambiers.jpg",
        ),
        mobility(
            "mob_2",
            "Rotation de la colonne vertébrale",
            "Améliorez la mobilité de votre dos avec des rotations douces.",
            "https://example.com/rotation-colonne.jpg",
        ),
        mobility(
            "mob_3",
            "Étirement des quadriceps",
            "Étirez vos muscles avant de la cuisse pour une meilleure récupération.",
            "https://example.com/quadriceps.jpg",
        ),
        mobility(
            "mob_4",
            "Mobilisation des hanches",
            "Libérez la tension dans vos hanches avec des mouvements circulaires.",
            "https://example.com/hanches.jpg",
        ),
        mobility(
            "mob_5",
            "Étirement des mollets",
            "Détendez vos mollets pour éviter les tensions après la course.",
            "https://example.com/mollets.jpg",
        ),
        // ====================================================================
        // Strengthening
        // ====================================================================
        strengthening(
            "ren_1",
            "Squats",
            "Renforcez vos cuisses et vos fessiers, dos droit et genoux alignés.",
            (10, 15, 20),
        ),
        strengthening(
            "ren_2",
            "Fentes alternées",
            "Travaillez l'équilibre et la puissance de chaque jambe.",
            (8, 12, 16),
        ),
        strengthening(
            "ren_3",
            "Pont fessier",
            "Activez la chaîne postérieure pour stabiliser le bassin.",
            (12, 15, 20),
        ),
        strengthening(
            "ren_4",
            "Montées sur pointes",
            "Renforcez vos mollets et vos tendons d'Achille.",
            (15, 20, 30),
        ),
        strengthening(
            "ren_5",
            "Gainage dynamique",
            "Renforcez la sangle abdominale pour une foulée plus stable.",
            (10, 14, 20),
        ),
    ];

    Catalog::new(exercises)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.len(), 10);
        assert_eq!(catalog.by_session_type(SessionType::Mobility).len(), 5);
        assert_eq!(catalog.by_session_type(SessionType::Strengthening).len(), 5);
    }

    #[test]
    fn test_lookup_by_id() {
        let catalog = get_default_catalog();
        let squat = catalog.get("ren_1").unwrap();
        assert_eq!(squat.session_type(), SessionType::Strengthening);
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn test_default_catalog_validates() {
        let catalog = build_default_catalog();
        let errors = catalog.validate();
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_validate_reports_duplicates() {
        let catalog = Catalog::new(vec![
            mobility("dup", "A", "a", PLACEHOLDER_IMAGE),
            mobility("dup", "B", "b", PLACEHOLDER_IMAGE),
        ]);
        let errors = catalog.validate();
        assert!(errors.iter().any(|e| e.contains("Duplicate")));
        assert!(errors.iter().any(|e| e.contains("no strengthening")));
    }
}
