use chrono::format::{self, Parsed, StrftimeItems};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use crate::core::error::{Error, ErrorKind, Result};
use crate::time::timespec::{is_valid_format, TimeSpec, DEFAULT_DATE_FORMAT};

/// Date layouts accepted by the search box, most specific first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSearchFormat {
    MonthDayYear,   // 06/15/2020
    LongDate,       // Jun 15, 2020
    MonthYear,      // 06/2020
    MonthNameYear,  // June 2020
    Year,           // 2020
}

impl TimeSearchFormat {
    pub const ALL: [TimeSearchFormat; 5] = [
        TimeSearchFormat::MonthDayYear,
        TimeSearchFormat::LongDate,
        TimeSearchFormat::MonthYear,
        TimeSearchFormat::MonthNameYear,
        TimeSearchFormat::Year,
    ];

    pub fn display_format(&self) -> &'static str {
        match self {
            TimeSearchFormat::MonthDayYear => "%m/%d/%Y",
            TimeSearchFormat::LongDate => DEFAULT_DATE_FORMAT,
            TimeSearchFormat::MonthYear => "%m/%Y",
            TimeSearchFormat::MonthNameYear => "%B %Y",
            TimeSearchFormat::Year => "%Y",
        }
    }

    /// First day covered by `text` in this layout
    pub fn parse_start(&self, text: &str) -> Option<NaiveDate> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        match self {
            TimeSearchFormat::MonthDayYear => NaiveDate::parse_from_str(text, "%m/%d/%Y").ok(),
            TimeSearchFormat::LongDate => NaiveDate::parse_from_str(text, "%b %d, %Y").ok(),
            TimeSearchFormat::MonthYear => {
                NaiveDate::parse_from_str(&format!("01/{}", text), "%d/%m/%Y").ok()
            }
            TimeSearchFormat::MonthNameYear => {
                NaiveDate::parse_from_str(&format!("1 {}", text), "%d %B %Y").ok()
            }
            TimeSearchFormat::Year => {
                if text.len() != 4 || !text.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                let year: i32 = text.parse().ok()?;
                NaiveDate::from_ymd_opt(year, 1, 1)
            }
        }
    }

    /// Last day covered by `text`; coarse layouts expand to the end of their period
    pub fn parse_end(&self, text: &str) -> Option<NaiveDate> {
        let start = self.parse_start(text)?;
        match self {
            TimeSearchFormat::MonthDayYear | TimeSearchFormat::LongDate => Some(start),
            TimeSearchFormat::MonthYear | TimeSearchFormat::MonthNameYear => last_day_of_month(start),
            TimeSearchFormat::Year => NaiveDate::from_ymd_opt(start.year(), 12, 31),
        }
    }
}

fn last_day_of_month(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()
}

pub fn midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

/// Parse search-box text into a structured time.
///
/// One `-` separated segment gives a point in time, two give a range (or the
/// first point when the end does not follow the start). Anything else, or text
/// no layout understands, returns `None` so the caller can fall back to a
/// hybrid string search.
pub fn parse_search_string(text: &str) -> Option<TimeSpec> {
    let parts: Vec<&str> = text.split('-').map(str::trim).collect();

    for layout in TimeSearchFormat::ALL {
        let Some(first) = layout.parse_start(parts[0]) else {
            continue;
        };
        let start = midnight(first)?;

        let time = match parts.len() {
            1 => TimeSpec::instant(start),
            2 => {
                let end = midnight(layout.parse_end(parts[1])?)?;
                if end <= start {
                    TimeSpec::instant(start)
                } else {
                    TimeSpec::frame(Some(start), Some(end)).ok()?
                }
            }
            _ => return None,
        };

        return time.with_format(layout.display_format()).ok();
    }

    None
}

/// Parse editor input of the form `[format|]value[=literal]`.
///
/// `format` is a strftime pattern (medium date by default), `value` a date or
/// a `start-end` range, and `literal` becomes the forced display value. The
/// whole input is kept as the syntax string.
pub fn parse_syntax(input: &str) -> Result<TimeSpec> {
    let sections: Vec<&str> = input.split('=').collect();
    let (text_part, literal) = match sections.as_slice() {
        [time] => (*time, None),
        [time, literal] => (*time, Some(*literal)),
        _ => return Err(parse_error(input, "more than one '='")),
    };

    let (format, value) = match text_part.split_once('|') {
        Some((format, value)) => (format.trim(), value),
        None => (DEFAULT_DATE_FORMAT, text_part),
    };
    if !is_valid_format(format) {
        return Err(parse_error(input, "invalid date format"));
    }

    let pieces: Vec<&str> = value.split('-').collect();
    let time = match pieces.as_slice() {
        [single] => TimeSpec::instant(parse_with(format, single, input)?),
        [start, end] => {
            let start = parse_with(format, start, input)?;
            let end = parse_with(format, end, input)?;
            TimeSpec::frame(Some(start), Some(end))?
        }
        _ => return Err(parse_error(input, "too many '-' separators")),
    };

    let mut time = time.with_format(format)?.with_syntax(input);
    if let Some(literal) = literal {
        time = time.with_forced_value(literal);
    }
    Ok(time)
}

fn parse_with(format: &str, text: &str, input: &str) -> Result<DateTime<Utc>> {
    let mut parsed = Parsed::new();
    format::parse(&mut parsed, text.trim(), StrftimeItems::new(format))
        .map_err(|e| parse_error(input, &e.to_string()))?;

    // Coarse layouts such as "%Y" leave month and day unset; a set value is kept
    let _ = parsed.set_month(1);
    let _ = parsed.set_day(1);

    let date = parsed
        .to_naive_date()
        .map_err(|e| parse_error(input, &e.to_string()))?;
    let time = parsed.to_naive_time().unwrap_or(NaiveTime::MIN);
    Ok(date.and_time(time).and_utc())
}

fn parse_error(input: &str, reason: &str) -> Error {
    Error::new(ErrorKind::Parse, format!("cannot parse time '{}': {}", input, reason))
}
