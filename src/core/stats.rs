use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

/// Summary of the in-memory store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub record_count: usize,
    pub three_d_count: usize,     // Records shown in the V3D viewer
    pub resource_count: usize,    // Image names referenced by all records
    pub last_sync: Option<DateTime<Utc>>,
    pub last_editor: Option<String>,
}

impl StoreStats {
    pub fn is_synced(&self) -> bool {
        self.last_sync.is_some()
    }

    /// Editor for display, "unknown" when none was recorded
    pub fn editor_label(&self) -> &str {
        self.last_editor.as_deref().unwrap_or("unknown")
    }
}
