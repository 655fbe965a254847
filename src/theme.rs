use image::Rgb;

pub(crate) const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

pub(crate) const GRID_LINE: Rgb<u8> = Rgb([68, 68, 68]);

pub(crate) const TEXT: Rgb<u8> = Rgb([17, 17, 17]);

/// Point sizes, converted to pixels at the configured resolution.
pub(crate) const TITLE_PT: f32 = 20.0;

pub(crate) const HEADER_PT: f32 = 12.0;

pub(crate) const DAY_PT: f32 = 10.0;

pub(crate) const EVENT_PT: f32 = 9.0;
