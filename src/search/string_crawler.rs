use std::borrow::Cow;
use crate::analysis::analyzer::Analyzer;
use crate::analysis::tokenizer::normalize;
use crate::core::types::{Artifact, StringField, TimeField};
use crate::search::crawler::Crawler;

/// Where a string crawler reads candidate text from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    Field(StringField),
    /// The rendered form of a date, for hybrid searches
    RenderedTime(TimeField),
}

impl TextSource {
    fn text<'a>(&self, artifact: &'a Artifact) -> Cow<'a, str> {
        match self {
            TextSource::Field(field) => Cow::Borrowed(artifact.string_field(*field)),
            TextSource::RenderedTime(field) => Cow::Owned(artifact.time_field(*field).to_string()),
        }
    }
}

/// Scores text by how often the query words occur in it.
///
/// Each non stop-word of the query counts once per (possibly overlapping)
/// occurrence; a candidate is relevant with a total of at least one.
pub struct StringCrawler {
    source: TextSource,
    terms: Vec<String>,
}

impl StringCrawler {
    pub fn new(source: TextSource, query: &str) -> Self {
        let terms = Analyzer::catalog_query()
            .analyze(&normalize(query))
            .into_iter()
            .map(|token| token.text)
            .collect();

        StringCrawler { source, terms }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn score_text(&self, text: &str) -> i64 {
        let text = normalize(text);
        self.terms
            .iter()
            .map(|term| count_overlapping(&text, term) as i64)
            .sum()
    }
}

impl Crawler for StringCrawler {
    fn score(&self, artifact: &Artifact) -> i64 {
        self.score_text(&self.source.text(artifact))
    }

    fn is_relevant(&self, artifact: &Artifact) -> bool {
        self.score(artifact) >= 1
    }

    fn assess(&self, artifact: &Artifact) -> Option<i64> {
        let score = self.score(artifact);
        (score >= 1).then_some(score)
    }

    fn name(&self) -> &str {
        "string"
    }
}

fn count_overlapping(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }

    let mut count = 0;
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(needle) {
        count += 1;
        let at = from + pos;
        // Step one character so overlapping matches are counted
        from = at + haystack[at..].chars().next().map_or(1, char::len_utf8);
    }
    count
}
