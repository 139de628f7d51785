//! Exercise catalog - bundled ExerciseDB-style dataset

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Raw dataset bundled at compile time. Refreshed by re-exporting the
/// ExerciseDB data files; never mutated at runtime.
const BUNDLED_DATA: &str = include_str!("../data/exercises.json");

/// One catalog entry. Field names follow the ExerciseDB JSON shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRecord {
    pub exercise_id: String,
    pub name: String,
    #[serde(default)]
    pub body_parts: Vec<String>,
    #[serde(default)]
    pub equipments: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

/// Read-only exercise catalog, loaded once at startup.
pub struct Catalog {
    records: Vec<ExerciseRecord>,
}

impl Catalog {
    /// Load the bundled dataset.
    pub fn load_bundled() -> Result<Self> {
        let records: Vec<ExerciseRecord> =
            serde_json::from_str(BUNDLED_DATA).context("failed to parse bundled exercise data")?;
        Ok(Self { records })
    }

    /// Build a catalog from explicit records (used by tests).
    pub fn from_records(records: Vec<ExerciseRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ExerciseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Find a record by its catalog id.
    pub fn find_by_id(&self, id: &str) -> Option<&ExerciseRecord> {
        self.records.iter().find(|r| r.exercise_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalog_loads() {
        let catalog = Catalog::load_bundled().unwrap();
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let catalog = Catalog::load_bundled().unwrap();
        let mut ids: Vec<&str> = catalog.records().iter().map(|r| r.exercise_id.as_str()).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_find_by_id() {
        let catalog = Catalog::load_bundled().unwrap();
        let first = &catalog.records()[0];
        let found = catalog.find_by_id(&first.exercise_id).unwrap();
        assert_eq!(found.name, first.name);
    }

    #[test]
    fn test_records_have_names_and_instructions() {
        let catalog = Catalog::load_bundled().unwrap();
        for record in catalog.records() {
            assert!(!record.name.is_empty());
            assert!(!record.instructions.is_empty(), "{} has no instructions", record.name);
        }
    }
}
