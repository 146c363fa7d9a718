use crate::core::types::Artifact;

/// Relevance test for one query against the collection.
///
/// `score` only orders candidates relative to each other (larger is closer to
/// the query); `is_relevant` decides whether a candidate is returned at all.
pub trait Crawler: Send + Sync {
    fn score(&self, artifact: &Artifact) -> i64;

    fn is_relevant(&self, artifact: &Artifact) -> bool;

    /// Score of a relevant candidate, `None` for one that should be dropped
    fn assess(&self, artifact: &Artifact) -> Option<i64> {
        if self.is_relevant(artifact) {
            Some(self.score(artifact))
        } else {
            None
        }
    }

    fn name(&self) -> &str;
}
