use std::cmp::Ordering;
use rayon::prelude::*;
use tracing::debug;
use crate::core::types::Artifact;
use crate::search::crawler::Crawler;

/// Artifact with relevance score
#[derive(Debug, Clone)]
pub struct ScoredArtifact {
    pub artifact: Artifact,
    pub score: i64,
}

// Most relevant first; equal scores fall back to accession number
impl PartialEq for ScoredArtifact {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScoredArtifact {}

impl PartialOrd for ScoredArtifact {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredArtifact {
    fn cmp(&self, other: &Self) -> Ordering {
        other.score
            .cmp(&self.score)
            .then_with(|| self.artifact.accession_number.cmp(&other.artifact.accession_number))
    }
}

/// Score every record, drop the irrelevant ones and order the rest
pub fn rank<C: Crawler + ?Sized>(records: &[Artifact], crawler: &C) -> Vec<ScoredArtifact> {
    let mut hits: Vec<ScoredArtifact> = records
        .par_iter()
        .filter_map(|artifact| {
            crawler.assess(artifact).map(|score| ScoredArtifact {
                artifact: artifact.clone(),
                score,
            })
        })
        .collect();

    hits.sort();
    debug!(crawler = crawler.name(), candidates = records.len(), hits = hits.len(), "ranked search");
    hits
}

pub fn into_artifacts(hits: Vec<ScoredArtifact>) -> Vec<Artifact> {
    hits.into_iter().map(|hit| hit.artifact).collect()
}
