use std::fmt;

use time::{macros::format_description, Date, Month};

use crate::error::StoreError;

/// A billing period: one calendar month, represented by its first day.
///
/// The external text form is `YYYY-MM`; inside the store a period is
/// kept as a `YYYY-MM-DD` date whose day is always 01.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(Date);

impl Period {
    pub fn new(year: i32, month: u8) -> Result<Self, StoreError> {
        let month = Month::try_from(month)
            .map_err(|e| StoreError::Validation(format!("invalid month: {e}")))?;
        let date = Date::from_calendar_date(year, month, 1)
            .map_err(|e| StoreError::Validation(format!("invalid period: {e}")))?;
        Ok(Self(date))
    }

    /// Parses the external `YYYY-MM` form.
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        let invalid = || StoreError::Validation(format!("invalid period '{s}', expected YYYY-MM"));
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u8 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }

    /// Parses the stored `YYYY-MM-DD` form; anything not on the first
    /// of a month is rejected.
    pub(crate) fn from_stored(s: &str) -> Result<Self, StoreError> {
        let format = format_description!("[year]-[month]-[day]");
        let date = Date::parse(s, &format)
            .map_err(|e| StoreError::Validation(format!("malformed stored date '{s}': {e}")))?;
        if date.day() != 1 {
            return Err(StoreError::Validation(format!(
                "stored period '{s}' is not the first day of a month"
            )));
        }
        Ok(Self(date))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u8 {
        self.0.month() as u8
    }

    /// The first day of the month, for binding into queries.
    pub fn date(&self) -> Date {
        self.0
    }

    /// The following month.
    pub fn next(&self) -> Self {
        let year = match self.0.month() {
            Month::December => self.0.year() + 1,
            _ => self.0.year(),
        };
        // day 1 of any month always exists
        Self(Date::from_calendar_date(year, self.0.month().next(), 1).unwrap())
    }

    /// The preceding month.
    pub fn prev(&self) -> Self {
        let year = match self.0.month() {
            Month::January => self.0.year() - 1,
            _ => self.0.year(),
        };
        Self(Date::from_calendar_date(year, self.0.month().previous(), 1).unwrap())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}
