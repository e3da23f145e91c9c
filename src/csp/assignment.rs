//! Assignment matrix.
//!
//! One cell per (staff, day) variable. A cell is `None` while unassigned,
//! `Some(true)` when the staff member works that day and `Some(false)`
//! when they do not. Cells are the only mutable state during solving.

use serde::{Deserialize, Serialize};

/// A (staff, day) decision variable, by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Var {
    /// Staff index.
    pub staff: usize,
    /// Day index.
    pub day: usize,
}

impl Var {
    /// Creates a variable reference.
    #[inline]
    pub fn new(staff: usize, day: usize) -> Self {
        Self { staff, day }
    }
}

/// Partial or complete assignment of every (staff, day) variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    staff_count: usize,
    day_count: usize,
    cells: Vec<Option<bool>>,
}

impl Assignment {
    /// Creates an assignment with every variable unassigned.
    pub fn new(staff_count: usize, day_count: usize) -> Self {
        Self {
            staff_count,
            day_count,
            cells: vec![None; staff_count * day_count],
        }
    }

    /// Creates a complete assignment with every variable set to 0.
    pub fn all_off(staff_count: usize, day_count: usize) -> Self {
        Self {
            staff_count,
            day_count,
            cells: vec![Some(false); staff_count * day_count],
        }
    }

    /// Builds a complete assignment from rows of booleans (one row per staff).
    ///
    /// Returns `None` if the rows are ragged.
    pub fn from_rows(rows: &[Vec<bool>]) -> Option<Self> {
        let day_count = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != day_count) {
            return None;
        }
        Some(Self {
            staff_count: rows.len(),
            day_count,
            cells: rows.iter().flatten().map(|&v| Some(v)).collect(),
        })
    }

    #[inline]
    fn index(&self, var: Var) -> usize {
        var.staff * self.day_count + var.day
    }

    /// Number of staff rows.
    #[inline]
    pub fn staff_count(&self) -> usize {
        self.staff_count
    }

    /// Number of day columns.
    #[inline]
    pub fn day_count(&self) -> usize {
        self.day_count
    }

    /// Value of a variable.
    #[inline]
    pub fn get(&self, var: Var) -> Option<bool> {
        self.cells[self.index(var)]
    }

    /// Assigns a variable.
    #[inline]
    pub fn set(&mut self, var: Var, value: bool) {
        let i = self.index(var);
        self.cells[i] = Some(value);
    }

    /// Clears a variable.
    #[inline]
    pub fn unset(&mut self, var: Var) {
        let i = self.index(var);
        self.cells[i] = None;
    }

    /// Whether staff works on day (`Some(true)`).
    #[inline]
    pub fn works(&self, staff: usize, day: usize) -> bool {
        self.get(Var::new(staff, day)) == Some(true)
    }

    /// Whether every variable has a value.
    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Number of unassigned variables.
    pub fn unassigned_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    /// Number of `Some(true)` cells.
    pub fn assigned_slots(&self) -> usize {
        self.cells.iter().filter(|c| **c == Some(true)).count()
    }

    /// Days worked by a staff member.
    pub fn workload(&self, staff: usize) -> usize {
        (0..self.day_count).filter(|&d| self.works(staff, d)).count()
    }

    /// Workloads of every staff member.
    pub fn workloads(&self) -> Vec<usize> {
        (0..self.staff_count).map(|s| self.workload(s)).collect()
    }

    /// Staff working on a day.
    pub fn coverage(&self, day: usize) -> usize {
        (0..self.staff_count).filter(|&s| self.works(s, day)).count()
    }

    /// Staff indices working on a day, in index order.
    pub fn working_staff(&self, day: usize) -> Vec<usize> {
        (0..self.staff_count).filter(|&s| self.works(s, day)).collect()
    }

    /// Staff row as options.
    pub fn row(&self, staff: usize) -> &[Option<bool>] {
        let start = staff * self.day_count;
        &self.cells[start..start + self.day_count]
    }

    /// Every variable, staff-major.
    pub fn vars(&self) -> impl Iterator<Item = Var> + '_ {
        (0..self.staff_count).flat_map(move |s| (0..self.day_count).map(move |d| Var::new(s, d)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_unassigned() {
        let a = Assignment::new(2, 3);
        assert_eq!(a.unassigned_count(), 6);
        assert!(!a.is_complete());
        assert_eq!(a.get(Var::new(1, 2)), None);
    }

    #[test]
    fn test_set_and_unset() {
        let mut a = Assignment::new(2, 3);
        a.set(Var::new(1, 2), true);
        assert!(a.works(1, 2));
        assert_eq!(a.assigned_slots(), 1);
        a.unset(Var::new(1, 2));
        assert!(!a.works(1, 2));
        assert_eq!(a.unassigned_count(), 6);
    }

    #[test]
    fn test_from_rows() {
        let a = Assignment::from_rows(&[vec![true, false, true], vec![false, false, true]]).unwrap();
        assert!(a.is_complete());
        assert_eq!(a.workloads(), vec![2, 1]);
        assert_eq!(a.coverage(2), 2);
        assert_eq!(a.working_staff(0), vec![0]);
        assert_eq!(a.row(1), &[Some(false), Some(false), Some(true)]);
    }

    #[test]
    fn test_from_rows_ragged() {
        assert!(Assignment::from_rows(&[vec![true], vec![true, false]]).is_none());
    }

    #[test]
    fn test_vars_staff_major() {
        let a = Assignment::all_off(2, 2);
        let vars: Vec<Var> = a.vars().collect();
        assert_eq!(vars, vec![Var::new(0, 0), Var::new(0, 1), Var::new(1, 0), Var::new(1, 1)]);
        assert!(a.is_complete());
    }
}
