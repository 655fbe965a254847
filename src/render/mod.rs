// Layout math moves between float and pixel space; see canvas.rs.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

mod canvas;
use self::canvas::{Canvas, Rect, Weight};
use crate::calendar::grid::DAYS_IN_WEEK;
use crate::calendar::MonthCalendar;
use crate::color::Color;
use crate::theme;
use ab_glyph::InvalidFont;
use image::{Rgb, RgbImage};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

static WEEKDAY_NAMES: [&str; DAYS_IN_WEEK] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Page margin, in points.
const MARGIN_PT: f32 = 12.0;

/// Option keys applied by the renderer; everything else is ignored with a
/// warning.
const RECOGNIZED_OPTIONS: [&str; 1] = ["background"];

/// Figure geometry plus renderer-specific extras, merged over the defaults
/// (11 in × 8.5 in at 80 dpi).
#[derive(Clone, Debug)]
pub struct RenderOptions {
    width: f64,
    height: f64,
    dpi: u16,
    extra: BTreeMap<String, String>,
}

impl Default for RenderOptions {
    fn default() -> RenderOptions {
        RenderOptions {
            width: 11.0,
            height: 8.5,
            dpi: 80,
            extra: BTreeMap::new(),
        }
    }
}

impl RenderOptions {
    pub fn new() -> RenderOptions {
        RenderOptions::default()
    }

    /// Figure width in inches.
    pub fn width(mut self, inches: f64) -> RenderOptions {
        self.width = inches;
        self
    }

    /// Figure height in inches.
    pub fn height(mut self, inches: f64) -> RenderOptions {
        self.height = inches;
        self
    }

    /// Output resolution in dots per inch.  Text scales along with it.
    pub fn dpi(mut self, dpi: u16) -> RenderOptions {
        self.dpi = dpi;
        self
    }

    /// Set a renderer-specific option by name, e.g. `"background"` with a
    /// color string.  Unrecognized keys are ignored at render time.
    pub fn set<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> RenderOptions {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub(crate) fn pixel_width(&self) -> u32 {
        (self.width * f64::from(self.dpi)).round() as u32
    }

    pub(crate) fn pixel_height(&self) -> u32 {
        (self.height * f64::from(self.dpi)).round() as u32
    }

    pub(crate) fn pt_to_px(&self, pt: f32) -> f32 {
        pt * f32::from(self.dpi) / 72.0
    }

    pub(crate) fn background(&self) -> Rgb<u8> {
        let Some(value) = self.extra.get("background") else {
            return theme::BACKGROUND;
        };
        match value.parse::<Color>() {
            Ok(color) => color.into(),
            Err(e) => {
                warn!("{e}; using the default background");
                theme::BACKGROUND
            }
        }
    }

    fn warn_unrecognized(&self) {
        for key in self.extra.keys() {
            if !RECOGNIZED_OPTIONS.contains(&key.as_str()) {
                warn!("ignoring unrecognized render option {key:?}");
            }
        }
    }
}

/// A failure while materializing or delivering the image.  Everything here
/// wraps a collaborator's error unchanged.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to load embedded font")]
    Font(#[from] InvalidFont),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Pixel positions of the title band, the weekday header, and the week × 7
/// cell grid for one render.
#[derive(Clone, Copy, Debug)]
struct Layout {
    margin: f32,
    grid_x: f32,
    grid_y: f32,
    cell_w: f32,
    cell_h: f32,
    title_px: f32,
    header_px: f32,
    day_px: f32,
    event_px: f32,
}

impl Layout {
    fn compute(week_count: usize, options: &RenderOptions) -> Layout {
        let width = options.pixel_width() as f32;
        let height = options.pixel_height() as f32;
        let margin = options.pt_to_px(MARGIN_PT);
        let title_px = options.pt_to_px(theme::TITLE_PT);
        let header_px = options.pt_to_px(theme::HEADER_PT);
        let grid_x = margin;
        let grid_y = margin + title_px * 2.0 + header_px * 1.5;
        Layout {
            margin,
            grid_x,
            grid_y,
            cell_w: (width - 2.0 * margin) / DAYS_IN_WEEK as f32,
            cell_h: (height - grid_y - margin).max(0.0) / week_count.max(1) as f32,
            title_px,
            header_px,
            day_px: options.pt_to_px(theme::DAY_PT),
            event_px: options.pt_to_px(theme::EVENT_PT),
        }
    }

    // Cell edges are rounded per boundary so adjacent cells share their
    // border pixels.
    fn cell(&self, week: usize, weekday: usize) -> Rect {
        let x0 = self.grid_x + self.cell_w * weekday as f32;
        let x1 = self.grid_x + self.cell_w * (weekday + 1) as f32;
        let y0 = self.grid_y + self.cell_h * week as f32;
        let y1 = self.grid_y + self.cell_h * (week + 1) as f32;
        Rect::from_corners(
            x0.round() as u32,
            y0.round() as u32,
            x1.round() as u32,
            y1.round() as u32,
        )
    }

    fn title_y(&self) -> f32 {
        self.margin
    }

    fn header_y(&self) -> f32 {
        self.grid_y - self.header_px * 1.45
    }
}

pub(crate) fn render(
    cal: &MonthCalendar,
    options: &RenderOptions,
) -> Result<RgbImage, RenderError> {
    options.warn_unrecognized();
    let width = options.pixel_width();
    let height = options.pixel_height();
    debug!(
        "rendering {} {} at {width}x{height} px",
        cal.month(),
        cal.year()
    );
    let mut canvas = Canvas::new(width, height, options.background())?;
    let layout = Layout::compute(cal.grid().week_count(), options);
    let full = Rect {
        x: 0,
        y: 0,
        width,
        height,
    };

    let title = format!("{} {}", cal.month(), cal.year());
    let title_w = canvas.text_width(&title, layout.title_px, Weight::Bold);
    canvas.draw_text(
        &title,
        (canvas.width() as f32 - title_w) / 2.0,
        layout.title_y(),
        layout.title_px,
        Weight::Bold,
        theme::TEXT,
        full,
    );

    // Weekday names label the columns once, above the first row.
    for (i, name) in WEEKDAY_NAMES.iter().enumerate() {
        let label_w = canvas.text_width(name, layout.header_px, Weight::Bold);
        canvas.draw_text(
            name,
            layout.grid_x + layout.cell_w * (i as f32 + 0.5) - label_w / 2.0,
            layout.header_y(),
            layout.header_px,
            Weight::Bold,
            theme::TEXT,
            full,
        );
    }

    for (week, row) in cal.grid().weeks().enumerate() {
        for (weekday, day) in row.days().enumerate() {
            let cell = layout.cell(week, weekday);
            if let Some(color) = cal.cell_color(week, weekday) {
                canvas.fill_rect(cell, color.into());
            }
            canvas.stroke_rect(cell, theme::GRID_LINE);
            if day == 0 {
                continue;
            }
            let clip = cell.inset(2);
            let text_x = cell.x as f32 + layout.day_px * 0.35;
            let mut text_y = cell.y as f32 + layout.day_px * 0.3;
            canvas.draw_text(
                &day.to_string(),
                text_x,
                text_y,
                layout.day_px,
                Weight::Regular,
                theme::TEXT,
                clip,
            );
            text_y += layout.day_px * 1.35;
            for event in cal.cell_events(week, weekday) {
                canvas.draw_text(
                    event,
                    text_x,
                    text_y,
                    layout.event_px,
                    Weight::Regular,
                    theme::TEXT,
                    clip,
                );
                text_y += layout.event_px * 1.25;
            }
        }
    }
    Ok(canvas.into_image())
}

pub(crate) fn save(
    cal: &MonthCalendar,
    path: &Path,
    options: &RenderOptions,
) -> Result<(), RenderError> {
    let img = render(cal, options)?;
    img.save(path)?;
    info!(
        "saved {} {} calendar to {}",
        cal.month(),
        cal.year(),
        path.display()
    );
    Ok(())
}

pub(crate) fn display(cal: &MonthCalendar, options: &RenderOptions) -> Result<(), RenderError> {
    let img = render(cal, options)?;
    let name = format!(
        "{}-{}-{:02}.png",
        env!("CARGO_PKG_NAME"),
        cal.year(),
        u8::from(cal.month())
    );
    let path = std::env::temp_dir().join(name);
    img.save(&path)?;
    debug!("opening {} in the system image viewer", path.display());
    open::that(&path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_pixel_dimensions() {
        let options = RenderOptions::default();
        assert_eq!(options.pixel_width(), 880);
        assert_eq!(options.pixel_height(), 680);
    }

    #[test]
    fn test_render_dimensions_follow_options() {
        let cal = MonthCalendar::new(2023, 2).unwrap();
        let options = RenderOptions::new().width(4.0).height(3.0).dpi(50);
        let img = render(&cal, &options).unwrap();
        assert_eq!(img.dimensions(), (200, 150));
    }

    #[test]
    fn test_render_fills_colored_cell() {
        let mut cal = MonthCalendar::new(2023, 2).unwrap();
        cal.color_day(1, Color::rgb(255, 0, 0)).unwrap();
        let options = RenderOptions::default();
        let img = render(&cal, &options).unwrap();
        let layout = Layout::compute(5, &options);
        // February 1st, 2023 falls on a Wednesday: week 0, column 3.
        let cell = layout.cell(0, 3);
        let center = (cell.x + cell.width / 2, cell.y + cell.height / 2);
        assert_eq!(*img.get_pixel(center.0, center.1), Rgb([255, 0, 0]));
        let plain = layout.cell(1, 0);
        assert_eq!(
            *img.get_pixel(plain.x + plain.width / 2, plain.y + plain.height / 2),
            theme::BACKGROUND
        );
    }

    #[test]
    fn test_title_band_has_ink() {
        let cal = MonthCalendar::new(2023, 2).unwrap();
        let options = RenderOptions::default();
        let img = render(&cal, &options).unwrap();
        let layout = Layout::compute(5, &options);
        let band_bottom = layout.grid_y.round() as u32;
        let inked = img
            .enumerate_pixels()
            .filter(|&(_, y, &p)| y < band_bottom && p != theme::BACKGROUND)
            .count();
        assert!(inked > 0, "title and header bands are blank");
    }

    #[test]
    fn test_background_option() {
        let cal = MonthCalendar::new(2023, 2).unwrap();
        let options = RenderOptions::default().set("background", "#000");
        let img = render(&cal, &options).unwrap();
        assert_eq!(*img.get_pixel(0, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_bad_background_falls_back() {
        let options = RenderOptions::default().set("background", "mauve-ish");
        assert_eq!(options.background(), theme::BACKGROUND);
    }

    #[test]
    fn test_unrecognized_option_is_ignored() {
        let cal = MonthCalendar::new(2023, 2).unwrap();
        let options = RenderOptions::default().set("frobnicate", "yes");
        assert!(render(&cal, &options).is_ok());
    }

    #[test]
    fn test_save_writes_decodable_file() {
        let mut cal = MonthCalendar::new(2023, 2).unwrap();
        cal.add_event(14, "Valentine's").unwrap();
        cal.add_event(14, "Dinner").unwrap();
        let path = std::env::temp_dir().join("calprint-test-save.png");
        save(&cal, &path, &RenderOptions::default()).unwrap();
        assert!(fs::metadata(&path).unwrap().len() > 0);
        assert_eq!(image::image_dimensions(&path).unwrap(), (880, 680));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_save_rejects_unknown_extension() {
        let cal = MonthCalendar::new(2023, 2).unwrap();
        let path = std::env::temp_dir().join("calprint-test-save.not-an-image");
        assert!(save(&cal, &path, &RenderOptions::default()).is_err());
    }
}
