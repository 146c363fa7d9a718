pub mod archive;
pub mod container;
pub mod layout;

pub use archive::{ArchiveEntry, LocalBackup};
pub use layout::StoreLayout;
