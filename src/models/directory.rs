//! Upstream provider of employee compensation records.
//!
//! The engine never fetches employees itself. Callers hand it records
//! directly, or through an [`EmployeeDirectory`] backed by whatever store
//! they use.

use std::collections::HashMap;

use super::EmployeeCompensationInput;

/// A source of [`EmployeeCompensationInput`] records.
pub trait EmployeeDirectory: Send + Sync {
    /// Looks up a single employee by id.
    fn find(&self, employee_id: &str) -> Option<EmployeeCompensationInput>;
}

/// A directory held in memory, keyed by employee id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    employees: HashMap<String, EmployeeCompensationInput>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an employee.
    pub fn insert(&mut self, employee: EmployeeCompensationInput) {
        self.employees.insert(employee.employee_id.clone(), employee);
    }

    /// Returns the number of employees in the directory.
    pub fn len(&self) -> usize {
        self.employees.len()
    }

    /// Returns true if the directory holds no employees.
    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }
}

impl FromIterator<EmployeeCompensationInput> for InMemoryDirectory {
    fn from_iter<I: IntoIterator<Item = EmployeeCompensationInput>>(iter: I) -> Self {
        let mut directory = Self::new();
        for employee in iter {
            directory.insert(employee);
        }
        directory
    }
}

impl EmployeeDirectory for InMemoryDirectory {
    fn find(&self, employee_id: &str) -> Option<EmployeeCompensationInput> {
        self.employees.get(employee_id).cloned()
    }
}
