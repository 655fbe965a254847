use std::iter::successors;
use thiserror::Error;
use time::{error::ComponentRange, Date, Month, Weekday};

pub(crate) const DAYS_IN_WEEK: usize = 7;

pub(crate) trait WeekdayExt {
    fn index0(&self) -> usize;
}

impl WeekdayExt for Weekday {
    fn index0(&self) -> usize {
        usize::from(self.number_days_from_sunday())
    }
}

/// One Sunday-first calendar row of day numbers, 0 marking a cell outside the
/// month.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Week([u8; DAYS_IN_WEEK]);

impl Week {
    pub(crate) fn days(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }
}

/// The Sunday-first layout of a single month, fixed at construction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct MonthGrid {
    year: i32,
    month: Month,
    // Invariant: every day of the month appears in exactly one cell, in
    // reading order.
    weeks: Vec<Week>,
}

impl MonthGrid {
    pub(crate) fn new(year: i32, month: Month) -> Result<MonthGrid, ComponentRange> {
        let first = Date::from_calendar_date(year, month, 1)?;
        let mut weeks: Vec<Week> = Vec::new();
        for date in iter_days_from(first).take_while(|d| d.month() == month) {
            let i = date.weekday().index0();
            if i == 0 || weeks.is_empty() {
                weeks.push(Week([0; DAYS_IN_WEEK]));
            }
            if let Some(week) = weeks.last_mut() {
                week.0[i] = date.day();
            }
        }
        Ok(MonthGrid { year, month, weeks })
    }

    pub(crate) fn year(&self) -> i32 {
        self.year
    }

    pub(crate) fn month(&self) -> Month {
        self.month
    }

    pub(crate) fn week_count(&self) -> usize {
        self.weeks.len()
    }

    pub(crate) fn weeks(&self) -> impl Iterator<Item = &Week> {
        self.weeks.iter()
    }

    /// The (week, weekday) cell holding the given day of the month.
    pub(crate) fn position(&self, day: u8) -> Result<(usize, usize), InvalidDay> {
        for (w, week) in self.weeks.iter().enumerate() {
            if let Some(i) = week.0.iter().position(|&d| d != 0 && d == day) {
                return Ok((w, i));
            }
        }
        Err(InvalidDay::NotInMonth {
            year: self.year,
            month: self.month,
            day,
        })
    }
}

/// A day number that no operation on the calendar can accept.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum InvalidDay {
    /// The day number does not occur in the calendar's month.
    #[error("no day {day} in {month} {year}")]
    NotInMonth { year: i32, month: Month, day: u8 },
}

fn iter_days_from(date: Date) -> impl Iterator<Item = Date> {
    successors(Some(date), |&d| d.next_day())
}
