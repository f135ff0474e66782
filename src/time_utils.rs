use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Seconds in one calendar day
pub const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// Errors raised by month/year arguments of store queries
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("Malformed calendar month '{0}', expected YYYY-MM")]
    MalformedMonth(String),

    #[error("Malformed year '{0}', expected YYYY")]
    MalformedYear(String),

    #[error("Month {month} is outside the dataset span {span}")]
    OutOfSpan { month: CalendarMonth, span: MonthSpan },

    #[error("Year {year} is outside the dataset span {span}")]
    YearOutOfSpan { year: i32, span: MonthSpan },

    #[error("Range start {from} is after range end {to}")]
    ReversedRange {
        from: CalendarMonth,
        to: CalendarMonth,
    },
}

/// Check if a year is a leap year
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Days in a month whose number is already known to be in 1..=12
fn month_length(year: i32, month: u8) -> u8 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 31,
    }
}

/// Calculate the number of days in a given month; `None` if `month` is not in 1..=12
pub fn days_in_month(year: i32, month: u8) -> Option<u8> {
    CalendarMonth::new(year, month).map(|m| m.days())
}

/// Number of seconds in a calendar month, using its true length in days
pub fn seconds_in_month(year: i32, month: u8) -> Option<u32> {
    CalendarMonth::new(year, month).map(|m| m.seconds())
}

/// A calendar-month identifier (`YYYY-MM`), standing for the first day of the month.
///
/// Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarMonth {
    year: i32,
    month: u8,
}

impl CalendarMonth {
    /// Create a month, returning `None` when `month` is not in 1..=12
    pub fn new(year: i32, month: u8) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    /// First day of the month
    pub fn first_day(&self) -> NaiveDate {
        // month is always 1..=12 and day 1 exists for every month
        NaiveDate::from_ymd_opt(self.year, self.month as u32, 1)
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn days(&self) -> u8 {
        month_length(self.year, self.month)
    }

    pub fn seconds(&self) -> u32 {
        self.days() as u32 * SECONDS_PER_DAY
    }

    /// The following month
    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Signed number of months from `origin` to `self`
    pub fn offset_from(&self, origin: &CalendarMonth) -> i64 {
        (self.year as i64 - origin.year as i64) * 12 + (self.month as i64 - origin.month as i64)
    }

    /// Month `n` months after `self`
    pub fn plus_months(&self, n: usize) -> Self {
        let zero_based = self.year as i64 * 12 + (self.month as i64 - 1) + n as i64;
        Self {
            year: zero_based.div_euclid(12) as i32,
            month: (zero_based.rem_euclid(12) + 1) as u8,
        }
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for CalendarMonth {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let malformed = || RangeError::MalformedMonth(s.to_string());

        let (year_part, month_part) = trimmed.split_once('-').ok_or_else(malformed)?;
        if year_part.len() != 4 || month_part.len() != 2 {
            return Err(malformed());
        }

        // Let chrono validate the pair
        let date = NaiveDate::parse_from_str(&format!("{}-01", trimmed), "%Y-%m-%d")
            .map_err(|_| malformed())?;

        CalendarMonth::new(date.year(), date.month() as u8).ok_or_else(malformed)
    }
}

/// Parse a `YYYY` year token
pub fn parse_year(s: &str) -> Result<i32, RangeError> {
    let trimmed = s.trim();
    if trimmed.len() != 4 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RangeError::MalformedYear(s.to_string()));
    }
    trimmed
        .parse()
        .map_err(|_| RangeError::MalformedYear(s.to_string()))
}

/// Inclusive span of consecutive calendar months
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthSpan {
    first: CalendarMonth,
    last: CalendarMonth,
}

impl MonthSpan {
    /// Create a span; `None` if `first` is after `last`
    pub fn new(first: CalendarMonth, last: CalendarMonth) -> Option<Self> {
        (first <= last).then_some(Self { first, last })
    }

    pub fn first(&self) -> CalendarMonth {
        self.first
    }

    pub fn last(&self) -> CalendarMonth {
        self.last
    }

    /// Number of months in the span, both ends included
    pub fn len(&self) -> usize {
        self.last.offset_from(&self.first) as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, month: &CalendarMonth) -> bool {
        *month >= self.first && *month <= self.last
    }

    /// Offset of `month` along the time axis
    pub fn index_of(&self, month: &CalendarMonth) -> Option<usize> {
        self.contains(month)
            .then(|| month.offset_from(&self.first) as usize)
    }

    /// Month at offset `index`
    pub fn month_at(&self, index: usize) -> Option<CalendarMonth> {
        (index < self.len()).then(|| self.first.plus_months(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = CalendarMonth> + '_ {
        (0..self.len()).map(move |i| self.first.plus_months(i))
    }

    /// Validate a closed query range against this span
    pub fn check_range(
        &self,
        from: CalendarMonth,
        to: CalendarMonth,
    ) -> Result<MonthSpan, RangeError> {
        for month in [from, to] {
            if !self.contains(&month) {
                return Err(RangeError::OutOfSpan { month, span: *self });
            }
        }
        MonthSpan::new(from, to).ok_or(RangeError::ReversedRange { from, to })
    }

    /// The months of `year` that lie in this span
    pub fn year_overlap(&self, year: i32) -> Result<MonthSpan, RangeError> {
        let january = CalendarMonth { year, month: 1 };
        let december = CalendarMonth { year, month: 12 };
        let first = january.max(self.first);
        let last = december.min(self.last);
        MonthSpan::new(first, last).ok_or(RangeError::YearOutOfSpan { year, span: *self })
    }
}

impl fmt::Display for MonthSpan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}, {}]", self.first, self.last)
    }
}

/// 1751-01 through 2007-12, the span of the CMIP5 Andres monthly dataset
pub const CMIP5_ANDRES_SPAN: MonthSpan = MonthSpan {
    first: CalendarMonth {
        year: 1751,
        month: 1,
    },
    last: CalendarMonth {
        year: 2007,
        month: 12,
    },
};

/// Count of months in the closed range `[from, to]`, zero when reversed
pub fn months_in_range(from: &CalendarMonth, to: &CalendarMonth) -> usize {
    let offset = to.offset_from(from);
    if offset < 0 {
        0
    } else {
        offset as usize + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(s: &str) -> CalendarMonth {
        s.parse().unwrap()
    }

    #[test]
    fn test_leap_year() {
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
        assert!(is_leap_year(2004));
        assert!(!is_leap_year(2001));
    }

    #[test]
    fn test_seconds_in_february() {
        assert_eq!(seconds_in_month(2000, 2), Some(29 * 86400));
        assert_eq!(seconds_in_month(1999, 2), Some(28 * 86400));
        assert_eq!(month("1800-02").seconds(), 28 * 86400);
    }

    #[test]
    fn test_invalid_month_number_has_no_length() {
        assert_eq!(days_in_month(2000, 0), None);
        assert_eq!(days_in_month(2000, 13), None);
        assert_eq!(seconds_in_month(1999, 13), None);
        assert_eq!(days_in_month(2000, 12), Some(31));
    }

    #[test]
    fn test_parse_and_display() {
        let m = month("1999-04");
        assert_eq!((m.year(), m.month()), (1999, 4));
        assert_eq!(m.to_string(), "1999-04");
        assert_eq!(m.first_day(), NaiveDate::from_ymd_opt(1999, 4, 1).unwrap());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["1999-13", "1999-00", "1999-4", "99-04", "1999/04", "", "abcd-ef", "1999-04-01"] {
            assert!(
                matches!(bad.parse::<CalendarMonth>(), Err(RangeError::MalformedMonth(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_succ_and_plus_months() {
        assert_eq!(month("2001-12").succ(), month("2002-01"));
        assert_eq!(month("1751-01").plus_months(3083), month("2007-12"));
        assert_eq!(month("2002-06").offset_from(&month("2001-06")), 12);
    }

    #[test]
    fn test_span_len_and_index() {
        let span = MonthSpan::new(month("1751-01"), month("2007-12")).unwrap();
        assert_eq!(span.len(), 3084);
        assert_eq!(span.index_of(&month("1751-01")), Some(0));
        assert_eq!(span.index_of(&month("1752-01")), Some(12));
        assert_eq!(span.index_of(&month("2008-01")), None);
        assert_eq!(span.month_at(3083), Some(month("2007-12")));
        assert_eq!(span.iter().count(), 3084);
    }

    #[test]
    fn test_check_range() {
        let span = MonthSpan::new(month("1751-01"), month("2007-12")).unwrap();
        assert_eq!(span.check_range(month("2001-06"), month("2002-06")).unwrap().len(), 13);
        assert!(matches!(
            span.check_range(month("2002-01"), month("2001-01")),
            Err(RangeError::ReversedRange { .. })
        ));
        assert!(matches!(
            span.check_range(month("1750-12"), month("1751-02")),
            Err(RangeError::OutOfSpan { .. })
        ));
    }

    #[test]
    fn test_year_overlap() {
        let span = MonthSpan::new(month("2000-11"), month("2001-02")).unwrap();
        let overlap = span.year_overlap(2000).unwrap();
        assert_eq!((overlap.first(), overlap.last()), (month("2000-11"), month("2000-12")));
        assert!(matches!(span.year_overlap(1999), Err(RangeError::YearOutOfSpan { .. })));
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("2005"), Ok(2005));
        assert!(parse_year("205").is_err());
        assert!(parse_year("2005-01").is_err());
    }
}
