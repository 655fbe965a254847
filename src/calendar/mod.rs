pub(crate) mod grid;
pub use self::grid::InvalidDay;
use self::grid::{MonthGrid, DAYS_IN_WEEK};
use crate::color::Color;
use crate::render::{self, RenderError, RenderOptions};
use std::path::Path;
use time::{error::ComponentRange, Month};

/// A single month's calendar, annotated day by day, rendered on demand.
///
/// The year/month pair is fixed at construction; events and day colors
/// accumulate afterwards.  Every render reads the current annotation state
/// from scratch.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MonthCalendar {
    grid: MonthGrid,
    // Same shape as the grid, week by week.  Cells outside the month stay
    // empty/unset forever because no day number resolves to them.
    events: Vec<[Vec<String>; DAYS_IN_WEEK]>,
    colors: Vec<[Option<Color>; DAYS_IN_WEEK]>,
}

impl MonthCalendar {
    /// Lay out the given month, Sunday-first.
    ///
    /// # Errors
    ///
    /// Out-of-range year/month values are rejected by the underlying calendar
    /// arithmetic.
    pub fn new(year: i32, month: u8) -> Result<MonthCalendar, ComponentRange> {
        let month = Month::try_from(month)?;
        let grid = MonthGrid::new(year, month)?;
        let events = (0..grid.week_count())
            .map(|_| std::array::from_fn(|_| Vec::new()))
            .collect();
        let colors = vec![[None; DAYS_IN_WEEK]; grid.week_count()];
        Ok(MonthCalendar {
            grid,
            events,
            colors,
        })
    }

    pub fn year(&self) -> i32 {
        self.grid.year()
    }

    pub fn month(&self) -> Month {
        self.grid.month()
    }

    /// Append an event line to the given day's cell.  Multiple events on one
    /// day keep their insertion order.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidDay`] if the day does not occur in this month;
    /// nothing is recorded in that case.
    pub fn add_event<S: Into<String>>(&mut self, day: u8, text: S) -> Result<(), InvalidDay> {
        let (week, weekday) = self.grid.position(day)?;
        self.events[week][weekday].push(text.into());
        Ok(())
    }

    /// Set the background color of the given day's cell, replacing any color
    /// set earlier.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidDay`] if the day does not occur in this month.
    pub fn color_day(&mut self, day: u8, color: Color) -> Result<(), InvalidDay> {
        let (week, weekday) = self.grid.position(day)?;
        self.colors[week][weekday] = Some(color);
        Ok(())
    }

    /// The events recorded for the given day, in insertion order.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidDay`] if the day does not occur in this month.
    pub fn events(&self, day: u8) -> Result<&[String], InvalidDay> {
        let (week, weekday) = self.grid.position(day)?;
        Ok(&self.events[week][weekday])
    }

    /// The background color recorded for the given day, if any.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidDay`] if the day does not occur in this month.
    pub fn color(&self, day: u8) -> Result<Option<Color>, InvalidDay> {
        let (week, weekday) = self.grid.position(day)?;
        Ok(self.colors[week][weekday])
    }

    /// Render the calendar and open the result in the platform image viewer.
    ///
    /// What "viewing" means is environment-dependent; on a headless system
    /// the viewer launch fails and the error surfaces here.
    ///
    /// # Errors
    ///
    /// Any failure from the renderer, the image encoder, or the viewer
    /// launch.
    pub fn display(&self, options: &RenderOptions) -> Result<(), RenderError> {
        render::display(self, options)
    }

    /// Render the calendar and write it to `path`, with the image format
    /// chosen from the file extension.
    ///
    /// # Errors
    ///
    /// Any failure from the renderer or the image encoder, including
    /// unwritable destinations and unsupported extensions.
    pub fn save<P: AsRef<Path>>(
        &self,
        path: P,
        options: &RenderOptions,
    ) -> Result<(), RenderError> {
        render::save(self, path.as_ref(), options)
    }

    pub(crate) fn grid(&self) -> &MonthGrid {
        &self.grid
    }

    pub(crate) fn cell_events(&self, week: usize, weekday: usize) -> &[String] {
        &self.events[week][weekday]
    }

    pub(crate) fn cell_color(&self, week: usize, weekday: usize) -> Option<Color> {
        self.colors[week][weekday]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_event_accumulates_in_order() {
        let mut cal = MonthCalendar::new(2023, 2).unwrap();
        cal.add_event(14, "Valentine's").unwrap();
        cal.add_event(14, "Dinner").unwrap();
        assert_eq!(cal.events(14).unwrap(), ["Valentine's", "Dinner"]);
        assert!(cal.events(13).unwrap().is_empty());
    }

    #[test]
    fn test_color_day_overwrites() {
        let mut cal = MonthCalendar::new(2023, 2).unwrap();
        cal.color_day(14, Color::rgb(255, 0, 0)).unwrap();
        cal.color_day(14, Color::rgb(0, 0, 255)).unwrap();
        assert_eq!(cal.color(14).unwrap(), Some(Color::rgb(0, 0, 255)));
        assert_eq!(cal.color(15).unwrap(), None);
    }

    #[test]
    fn test_invalid_day_leaves_state_untouched() {
        let mut cal = MonthCalendar::new(2023, 2).unwrap();
        assert!(cal.add_event(29, "nope").is_err());
        assert!(cal.color_day(0, Color::rgb(1, 2, 3)).is_err());
        for day in 1..=28 {
            assert!(cal.events(day).unwrap().is_empty());
            assert_eq!(cal.color(day).unwrap(), None);
        }
    }

    #[test]
    fn test_annotations_match_grid_shape() {
        for (year, month, weeks) in [(2015, 2, 4), (2023, 2, 5), (2023, 7, 6)] {
            let cal = MonthCalendar::new(year, month).unwrap();
            assert_eq!(cal.grid.week_count(), weeks, "{year}-{month:02}");
            assert_eq!(cal.events.len(), weeks, "{year}-{month:02}");
            assert_eq!(cal.colors.len(), weeks, "{year}-{month:02}");
        }
    }

    #[test]
    fn test_new_rejects_bad_months() {
        assert!(MonthCalendar::new(2023, 0).is_err());
        assert!(MonthCalendar::new(2023, 13).is_err());
        assert!(MonthCalendar::new(2023, 12).is_ok());
    }

    #[test]
    fn test_month_accessors() {
        let cal = MonthCalendar::new(2023, 2).unwrap();
        assert_eq!(cal.year(), 2023);
        assert_eq!(cal.month(), Month::February);
    }
}
