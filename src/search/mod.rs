pub mod crawler;
pub mod string_crawler;
pub mod time_crawler;
pub mod results;

pub use crawler::Crawler;
pub use results::{rank, ScoredArtifact};
pub use string_crawler::{StringCrawler, TextSource};
pub use time_crawler::TimeCrawler;
