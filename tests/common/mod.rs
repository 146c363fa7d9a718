#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use mhs_collections::core::types::Artifact;
use mhs_collections::storage::StoreLayout;
use mhs_collections::time::TimeSpec;
use mhs_collections::StoreOptions;

pub fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

pub fn artifact(accession_number: &str, title: &str) -> Artifact {
    Artifact::new(
        accession_number,
        title,
        TimeSpec::instant(day(1921, 1, 5)),
        TimeSpec::instant(day(2019, 3, 1)),
    )
}

pub fn dated(accession_number: &str, object_date: TimeSpec) -> Artifact {
    Artifact::new(accession_number, "", object_date, TimeSpec::instant(day(2019, 3, 1)))
}

pub fn layout() -> StoreLayout {
    StoreLayout::new("database", "database/archives")
}

/// Small chunks so transfers take several rounds
pub fn options() -> StoreOptions {
    StoreOptions {
        chunk_size: 64,
        ..StoreOptions::default()
    }
}

pub fn accessions(records: &[Artifact]) -> Vec<&str> {
    records.iter().map(|a| a.accession_number.as_str()).collect()
}
