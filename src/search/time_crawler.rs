use crate::core::types::{Artifact, TimeField};
use crate::search::crawler::Crawler;
use crate::time::TimeSpec;

/// Matches dates against a structured date or range.
///
/// A candidate is relevant when it contains the query or lies inside it.
/// Candidates sharing more endpoints with the query score higher.
pub struct TimeCrawler {
    field: TimeField,
    query: TimeSpec,
}

impl TimeCrawler {
    pub fn new(field: TimeField, query: TimeSpec) -> Self {
        TimeCrawler { field, query }
    }

    /// Number of endpoints (start, end) that differ from the query
    pub fn mismatches(&self, candidate: &TimeSpec) -> i64 {
        let start = candidate.start() != self.query.start();
        let end = candidate.end() != self.query.end();
        start as i64 + end as i64
    }

    pub fn matches(&self, candidate: &TimeSpec) -> bool {
        candidate.contains(&self.query) || self.query.contains(candidate)
    }
}

impl Crawler for TimeCrawler {
    fn score(&self, artifact: &Artifact) -> i64 {
        2 - self.mismatches(artifact.time_field(self.field))
    }

    fn is_relevant(&self, artifact: &Artifact) -> bool {
        self.matches(artifact.time_field(self.field))
    }

    fn name(&self) -> &str {
        "time"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn day(y: i32, m: u32, d: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn ranges_and_points_match_both_ways() {
        let year = TimeSpec::frame(Some(day(2020, 1, 1)), Some(day(2020, 12, 31))).unwrap();
        let crawler = TimeCrawler::new(TimeField::ObjectDate, year.clone());
        assert!(crawler.matches(&TimeSpec::instant(day(2020, 6, 15))));
        assert!(!crawler.matches(&TimeSpec::instant(day(2021, 1, 1))));

        let point = TimeCrawler::new(TimeField::ObjectDate, TimeSpec::instant(day(2020, 6, 15)));
        assert!(point.matches(&year));
    }

    #[test]
    fn exact_matches_have_no_mismatches() {
        let q = TimeSpec::instant(day(1921, 1, 5));
        let crawler = TimeCrawler::new(TimeField::SubmissionDate, q.clone());
        assert_eq!(crawler.mismatches(&q), 0);
        let open = TimeSpec::frame(Some(day(1921, 1, 5)), None).unwrap();
        assert_eq!(crawler.mismatches(&open), 1);
    }
}
