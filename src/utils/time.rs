use chrono::{Datelike, Days, NaiveDate};

/// Range of calendar days. Both `start` and `end` belong to the range, so a range from a date to
/// the same date contains exactly that day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn day(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    /// `days` calendar days ending with `end`. Last 7 days of the 10th are the 4th..=10th.
    pub fn ending_at(end: NaiveDate, days: u64) -> Self {
        let start = end
            .checked_sub_days(Days::new(days.saturating_sub(1)))
            .unwrap_or(NaiveDate::MIN);
        Self::new(start, end)
    }

    /// Monday to Sunday week containing `date`.
    pub fn iso_week(date: NaiveDate) -> Self {
        let from_monday = date.weekday().num_days_from_monday() as u64;
        let start = date
            .checked_sub_days(Days::new(from_monday))
            .unwrap_or(NaiveDate::MIN);
        let end = start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
        Self::new(start, end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
