use std::cmp::Ordering;
use serde::{Serialize, Deserialize};
use crate::core::types::Artifact;
use crate::time::timespec::cmp_lower;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    Title,
    Donor,
    Medium,
    ObjectDate,
    SubmissionDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Forward,   // A-Z, oldest first
    Reverse,   // Z-A, newest first
}

/// Orders artifacts by one field.
///
/// Text compares without case, dates by their start (an open start comes
/// first). Only the selected field is compared; records that tie on it are
/// ordered by accession number, ascending in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactSorter {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for ArtifactSorter {
    fn default() -> Self {
        ArtifactSorter {
            field: SortField::Title,
            direction: SortDirection::Forward,
        }
    }
}

impl ArtifactSorter {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        ArtifactSorter { field, direction }
    }

    pub fn set_field(&mut self, field: SortField) {
        self.field = field;
    }

    pub fn set_direction(&mut self, direction: SortDirection) {
        self.direction = direction;
    }

    pub fn compare(&self, a: &Artifact, b: &Artifact) -> Ordering {
        let by_field = match self.field {
            SortField::Title => cmp_ignore_case(&a.title, &b.title),
            SortField::Donor => cmp_ignore_case(&a.donor, &b.donor),
            SortField::Medium => cmp_ignore_case(&a.medium, &b.medium),
            SortField::ObjectDate => cmp_lower(a.object_date.start(), b.object_date.start()),
            SortField::SubmissionDate => cmp_lower(a.submission_date.start(), b.submission_date.start()),
        };

        let by_field = match self.direction {
            SortDirection::Forward => by_field,
            SortDirection::Reverse => by_field.reverse(),
        };

        by_field.then_with(|| a.accession_number.cmp(&b.accession_number))
    }

    pub fn sort(&self, records: &mut [Artifact]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}
