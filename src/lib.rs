//! Render one month of the civil calendar, with per-day event notes and
//! highlighted day squares, to an image file.
//!
//! The layout is Sunday-first.  Day annotations accumulate on a
//! [`MonthCalendar`] and every `save`/`display` call renders them afresh.
//!
//! ```no_run
//! use calprint::{MonthCalendar, RenderOptions};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut cal = MonthCalendar::new(2023, 2)?;
//!     cal.color_day(14, "pink".parse()?)?;
//!     cal.add_event(14, "Valentine's")?;
//!     cal.add_event(14, "Dinner at 8")?;
//!     cal.save("february.png", &RenderOptions::default())?;
//!     Ok(())
//! }
//! ```

mod calendar;
mod color;
mod render;
mod theme;

pub use crate::calendar::{InvalidDay, MonthCalendar};
pub use crate::color::{Color, ParseColorError};
pub use crate::render::{RenderError, RenderOptions};
