pub mod sorter;

pub use sorter::{ArtifactSorter, SortDirection, SortField};
