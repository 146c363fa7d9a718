use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;
use crate::transport::join;

/// Name of the live store file inside the store directory
pub const DATABASE_FILE: &str = "database.store";
/// Suffix every container entry name must carry
pub const ENTRY_SUFFIX: &str = ".database";
pub const ARCHIVE_SEPARATOR: &str = "_";
pub const LOCAL_SUFFIX: &str = ".store";
const TEMP_SUFFIX: &str = ".tmpstore.partial";

/// Where the store, its archives and its temporary uploads live on a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    pub store_dir: String,    // Canonical store file
    pub archive_dir: String,  // One timestamped copy per sync
}

impl StoreLayout {
    pub fn new(store_dir: &str, archive_dir: &str) -> Self {
        StoreLayout {
            store_dir: store_dir.to_string(),
            archive_dir: archive_dir.to_string(),
        }
    }

    pub fn canonical_path(&self) -> String {
        join(&self.store_dir, DATABASE_FILE)
    }

    /// Unique upload target next to the canonical file
    pub fn temp_path(&self, millis: i64) -> String {
        join(&self.store_dir, &format!("{}-{}{}", millis, Uuid::new_v4(), TEMP_SUFFIX))
    }

    pub fn archive_path(&self, millis: i64) -> String {
        join(&self.archive_dir, &archive_name(millis))
    }
}

/// `<millis>_database.store`
pub fn archive_name(millis: i64) -> String {
    format!("{}{}{}", millis, ARCHIVE_SEPARATOR, DATABASE_FILE)
}

/// `<millis>.store`
pub fn local_backup_name(millis: i64) -> String {
    format!("{}{}", millis, LOCAL_SUFFIX)
}

/// `<millis>.database`
pub fn entry_name(millis: i64) -> String {
    format!("{}{}", millis, ENTRY_SUFFIX)
}

pub fn is_temp_name(name: &str) -> bool {
    name.ends_with(TEMP_SUFFIX)
}

pub fn parse_archive_name(name: &str) -> Option<i64> {
    let millis = name.strip_suffix(DATABASE_FILE)?.strip_suffix(ARCHIVE_SEPARATOR)?;
    parse_millis(millis)
}

pub fn parse_local_backup_name(name: &str) -> Option<i64> {
    parse_millis(name.strip_suffix(LOCAL_SUFFIX)?)
}

pub fn millis_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

fn parse_millis(text: &str) -> Option<i64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_names_round_trip_their_timestamp() {
        assert_eq!(archive_name(1700000000123), "1700000000123_database.store");
        assert_eq!(parse_archive_name("1700000000123_database.store"), Some(1700000000123));
        assert_eq!(parse_archive_name("database.store"), None);
        assert_eq!(parse_archive_name("abc_database.store"), None);
        assert_eq!(parse_local_backup_name("42.store"), Some(42));
        assert_eq!(parse_local_backup_name("42_database.store"), None);
    }

    #[test]
    fn temp_names_are_unique_and_recognisable() {
        let layout = StoreLayout::new("database", "database/archives");
        let a = layout.temp_path(5);
        let b = layout.temp_path(5);
        assert_ne!(a, b);
        assert!(a.starts_with("database/5-"));
        assert!(is_temp_name(&a));
        assert_eq!(layout.canonical_path(), "database/database.store");
        assert_eq!(layout.archive_path(5), "database/archives/5_database.store");
    }
}
