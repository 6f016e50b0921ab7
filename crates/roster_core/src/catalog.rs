//! Course catalog: fixed mapping from course name to canonical course id.
//!
//! # Responsibility
//! - Resolve free-text course names to `CourseId`.
//! - Apply one unknown-course policy uniformly for every lookup.
//!
//! # Invariants
//! - Lookup is exact and case-sensitive.
//! - The catalog is immutable after construction.
//! - Names are unique; several names may share one id (aliases).
//! - No entry may use `UNKNOWN_COURSE_ID`.

use crate::model::enrollment::CourseId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reserved id returned under `UnknownCoursePolicy::ResolveToUnknown`.
pub const UNKNOWN_COURSE_ID: &str = "A999";

const BUILTIN_COURSES: &[(&str, &str)] = &[
    ("Javaフルコース", "A001"),
    ("AWSフルコース", "A002"),
    ("WordPress副業コース", "A003"),
    ("デザインコース", "A004"),
    ("Webマーケティングコース", "A005"),
];

/// What to do when a course name has no catalog entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCoursePolicy {
    /// Fail with `CatalogError::CourseNotFound`.
    #[default]
    Reject,
    /// Resolve to `UNKNOWN_COURSE_ID`.
    ResolveToUnknown,
}

/// One catalog pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub id: CourseId,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: CourseId::new(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// No entry matches the course name (reject policy).
    CourseNotFound(String),
    BlankCourseName,
    DuplicateCourseName(String),
    /// Entry tried to claim the reserved unknown id.
    ReservedCourseId(CourseId),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CourseNotFound(name) => write!(f, "course not found: `{name}`"),
            Self::BlankCourseName => write!(f, "catalog course name must not be blank"),
            Self::DuplicateCourseName(name) => {
                write!(f, "duplicate catalog course name `{name}`")
            }
            Self::ReservedCourseId(id) => {
                write!(f, "catalog course id `{id}` is reserved for unknown courses")
            }
        }
    }
}

impl Error for CatalogError {}

/// Immutable course name -> course id lookup table.
#[derive(Debug, Clone)]
pub struct CourseCatalog {
    entries: Vec<CatalogEntry>,
    ids_by_name: HashMap<String, CourseId>,
    policy: UnknownCoursePolicy,
}

impl CourseCatalog {
    /// Built-in course list with the default (`Reject`) policy.
    pub fn builtin() -> Self {
        let entries: Vec<CatalogEntry> = BUILTIN_COURSES
            .iter()
            .map(|(name, id)| CatalogEntry::new(*name, *id))
            .collect();
        let ids_by_name = entries
            .iter()
            .map(|entry| (entry.name.clone(), entry.id.clone()))
            .collect();
        Self {
            entries,
            ids_by_name,
            policy: UnknownCoursePolicy::default(),
        }
    }

    /// Builds a catalog from configured entries, keeping their order.
    ///
    /// # Errors
    /// - Blank or duplicate names, or use of the reserved unknown id.
    pub fn from_entries(
        entries: Vec<CatalogEntry>,
        policy: UnknownCoursePolicy,
    ) -> Result<Self, CatalogError> {
        let mut ids_by_name = HashMap::with_capacity(entries.len());

        for entry in &entries {
            if entry.name.trim().is_empty() {
                return Err(CatalogError::BlankCourseName);
            }
            if entry.id.as_str() == UNKNOWN_COURSE_ID {
                return Err(CatalogError::ReservedCourseId(entry.id.clone()));
            }
            if ids_by_name
                .insert(entry.name.clone(), entry.id.clone())
                .is_some()
            {
                return Err(CatalogError::DuplicateCourseName(entry.name.clone()));
            }
        }

        Ok(Self {
            entries,
            ids_by_name,
            policy,
        })
    }

    pub fn with_policy(mut self, policy: UnknownCoursePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> UnknownCoursePolicy {
        self.policy
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Resolves a course name to its canonical id.
    pub fn resolve(&self, course_name: &str) -> Result<CourseId, CatalogError> {
        if let Some(id) = self.ids_by_name.get(course_name) {
            return Ok(id.clone());
        }

        match self.policy {
            UnknownCoursePolicy::Reject => {
                Err(CatalogError::CourseNotFound(course_name.to_string()))
            }
            UnknownCoursePolicy::ResolveToUnknown => Ok(CourseId::new(UNKNOWN_COURSE_ID)),
        }
    }
}

impl Default for CourseCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CatalogEntry, CatalogError, CourseCatalog, UnknownCoursePolicy, UNKNOWN_COURSE_ID,
    };

    #[test]
    fn builtin_resolves_known_names() {
        let catalog = CourseCatalog::builtin();
        assert_eq!(catalog.resolve("Javaフルコース").unwrap().as_str(), "A001");
        assert_eq!(
            catalog.resolve("Webマーケティングコース").unwrap().as_str(),
            "A005"
        );
        assert_eq!(catalog.entries().len(), 5);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let catalog = CourseCatalog::builtin();
        let err = catalog.resolve("awsフルコース").unwrap_err();
        assert_eq!(err, CatalogError::CourseNotFound("awsフルコース".to_string()));
    }

    #[test]
    fn resolve_to_unknown_policy_returns_reserved_id() {
        let catalog = CourseCatalog::builtin().with_policy(UnknownCoursePolicy::ResolveToUnknown);
        assert_eq!(
            catalog.resolve("Rustコース").unwrap().as_str(),
            UNKNOWN_COURSE_ID
        );
        // Known names are unaffected by the policy.
        assert_eq!(catalog.resolve("デザインコース").unwrap().as_str(), "A004");
    }

    #[test]
    fn aliases_share_one_course_id() {
        let catalog = CourseCatalog::from_entries(
            vec![
                CatalogEntry::new("Javaフルコース", "A001"),
                CatalogEntry::new("Java Full Course", "A001"),
            ],
            UnknownCoursePolicy::Reject,
        )
        .unwrap();
        assert_eq!(catalog.entries().len(), 2);
        assert_eq!(
            catalog.resolve("Javaフルコース").unwrap(),
            catalog.resolve("Java Full Course").unwrap()
        );
    }

    #[test]
    fn empty_name_is_never_a_match() {
        let catalog = CourseCatalog::builtin();
        assert!(catalog.resolve("").is_err());
    }

    #[test]
    fn from_entries_rejects_duplicate_names_and_reserved_id() {
        let duplicate_name = CourseCatalog::from_entries(
            vec![CatalogEntry::new("A", "B001"), CatalogEntry::new("A", "B002")],
            UnknownCoursePolicy::Reject,
        );
        assert!(matches!(
            duplicate_name,
            Err(CatalogError::DuplicateCourseName(name)) if name == "A"
        ));

        let reserved = CourseCatalog::from_entries(
            vec![CatalogEntry::new("A", UNKNOWN_COURSE_ID)],
            UnknownCoursePolicy::Reject,
        );
        assert!(matches!(reserved, Err(CatalogError::ReservedCourseId(_))));
    }
}
