use std::cmp::Ordering;
use std::fmt;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use crate::core::error::{Error, ErrorKind, Result};

/// Medium-length date, e.g. "Jan 05, 1921"
pub const DEFAULT_DATE_FORMAT: &str = "%b %d, %Y";

/// A point in time or a closed interval with optionally open ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeValue {
    Instant(DateTime<Utc>),
    Frame {
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    },
}

/// Date or date range attached to an artifact.
///
/// `forced_value` replaces the rendered text when present (raw user text that
/// could not be parsed is kept this way). `syntax_string` holds the original
/// editor input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpec {
    pub value: TimeValue,
    pub format: String,
    pub forced_value: Option<String>,
    pub syntax_string: Option<String>,
}

impl TimeSpec {
    pub fn instant(at: DateTime<Utc>) -> Self {
        TimeSpec {
            value: TimeValue::Instant(at),
            format: DEFAULT_DATE_FORMAT.to_string(),
            forced_value: None,
            syntax_string: None,
        }
    }

    /// Build an interval. The end must strictly follow the start when both exist.
    pub fn frame(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Result<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if e <= s {
                return Err(Error::new(
                    ErrorKind::InvalidArgument,
                    format!("time frame end {} does not follow start {}", e, s),
                ));
            }
        }

        Ok(TimeSpec {
            value: TimeValue::Frame { start, end },
            format: DEFAULT_DATE_FORMAT.to_string(),
            forced_value: None,
            syntax_string: None,
        })
    }

    pub fn now() -> Self {
        TimeSpec::instant(Utc::now())
    }

    /// Placeholder whose only content is the literal text; used as the query of a
    /// hybrid search.
    pub fn literal(text: &str) -> Self {
        TimeSpec::now().with_forced_value(text)
    }

    pub fn with_format(mut self, format: &str) -> Result<Self> {
        if !is_valid_format(format) {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("invalid date format '{}'", format),
            ));
        }
        self.format = format.to_string();
        Ok(self)
    }

    pub fn with_forced_value(mut self, text: &str) -> Self {
        self.forced_value = Some(text.to_string());
        self
    }

    pub fn with_syntax(mut self, input: &str) -> Self {
        self.syntax_string = Some(input.to_string());
        self
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        match self.value {
            TimeValue::Instant(at) => Some(at),
            TimeValue::Frame { start, .. } => start,
        }
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        match self.value {
            TimeValue::Instant(at) => Some(at),
            TimeValue::Frame { end, .. } => end,
        }
    }

    pub fn is_frame(&self) -> bool {
        matches!(self.value, TimeValue::Frame { .. })
    }

    pub fn has_open_start(&self) -> bool {
        self.start().is_none()
    }

    pub fn has_open_end(&self) -> bool {
        self.end().is_none()
    }

    pub fn contains_instant(&self, at: DateTime<Utc>) -> bool {
        cmp_lower(self.start(), Some(at)) != Ordering::Greater
            && cmp_upper(self.end(), Some(at)) != Ordering::Less
    }

    /// True if `other` lies entirely within this spec (bounds inclusive)
    pub fn contains(&self, other: &TimeSpec) -> bool {
        cmp_lower(self.start(), other.start()) != Ordering::Greater
            && cmp_upper(self.end(), other.end()) != Ordering::Less
    }

    /// Text without the forced value applied
    pub fn formatted(&self) -> String {
        match self.value {
            TimeValue::Instant(at) => render(at, &self.format),
            TimeValue::Frame { start, end } => {
                let s = start.map(|d| render(d, &self.format)).unwrap_or_default();
                let e = end.map(|d| render(d, &self.format)).unwrap_or_default();
                format!("{}-{}", s, e)
            }
        }
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.forced_value {
            Some(text) => f.write_str(text),
            None => f.write_str(&self.formatted()),
        }
    }
}

/// Order two lower bounds; `None` is negative infinity
pub fn cmp_lower(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.cmp(&b),
    }
}

/// Order two upper bounds; `None` is positive infinity
pub fn cmp_upper(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a.cmp(&b),
    }
}

pub fn is_valid_format(format: &str) -> bool {
    !format.is_empty() && !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

fn render(at: DateTime<Utc>, format: &str) -> String {
    let format = if is_valid_format(format) { format } else { DEFAULT_DATE_FORMAT };
    at.format(format).to_string()
}
