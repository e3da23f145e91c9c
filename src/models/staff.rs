//! Staff model.
//!
//! Staff members are the entities assigned to roster days. Each carries
//! a unique name and a specialty tag used by coverage rules. Staff are
//! immutable for the duration of one generation run.

use serde::{Deserialize, Serialize};

/// A staff member that can be rostered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Staff {
    /// Unique staff identifier (name or employee ID).
    pub name: String,
    /// Specialty tag (e.g., "Cardiology", "Surgery").
    pub specialty: String,
}

impl Staff {
    /// Creates a staff member with the given specialty.
    pub fn new(name: impl Into<String>, specialty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            specialty: specialty.into(),
        }
    }

    /// Replaces the specialty tag.
    pub fn with_specialty(mut self, specialty: impl Into<String>) -> Self {
        self.specialty = specialty.into();
        self
    }
}

/// Distinct specialties in first-appearance order.
pub fn distinct_specialties(staff: &[Staff]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for s in staff {
        if !seen.contains(&s.specialty.as_str()) {
            seen.push(&s.specialty);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_builder() {
        let s = Staff::new("Alice", "Cardiology").with_specialty("Surgery");
        assert_eq!(s.name, "Alice");
        assert_eq!(s.specialty, "Surgery");
    }

    #[test]
    fn test_distinct_specialties_keeps_order() {
        let staff = vec![
            Staff::new("A", "Surgery"),
            Staff::new("B", "Cardiology"),
            Staff::new("C", "Surgery"),
        ];
        assert_eq!(distinct_specialties(&staff), vec!["Surgery", "Cardiology"]);
    }

    #[test]
    fn test_staff_serde_shape() {
        let s: Staff = serde_json::from_str(r#"{"name":"A","specialty":"ER"}"#).unwrap();
        assert_eq!(s, Staff::new("A", "ER"));
    }
}
