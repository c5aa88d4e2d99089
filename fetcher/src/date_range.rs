use anyhow::{ensure, Result};
use chrono::NaiveDate;

/// An inclusive range of calendar days, walked one day at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        ensure!(
            start <= end,
            "Start date {} is after end date {}",
            start,
            end
        );
        Ok(DateRange { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days in the range, both ends included.
    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |date| *date <= end)
    }
}

impl IntoIterator for DateRange {
    type Item = NaiveDate;
    type IntoIter = Box<dyn Iterator<Item = NaiveDate>>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
