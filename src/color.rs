use image::Rgb;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An RGB day-square color, stored untouched until rendering.
///
/// Parses from `#rgb` / `#rrggbb` hex strings or a handful of CSS-style
/// names.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
}

static NAMED: [(&str, Color); 19] = [
    ("black", Color::rgb(0, 0, 0)),
    ("blue", Color::rgb(0, 0, 255)),
    ("brown", Color::rgb(165, 42, 42)),
    ("cyan", Color::rgb(0, 255, 255)),
    ("gray", Color::rgb(128, 128, 128)),
    ("green", Color::rgb(0, 128, 0)),
    ("grey", Color::rgb(128, 128, 128)),
    ("lightblue", Color::rgb(173, 216, 230)),
    ("lightgray", Color::rgb(211, 211, 211)),
    ("lightgreen", Color::rgb(144, 238, 144)),
    ("lightgrey", Color::rgb(211, 211, 211)),
    ("lightyellow", Color::rgb(255, 255, 224)),
    ("magenta", Color::rgb(255, 0, 255)),
    ("orange", Color::rgb(255, 165, 0)),
    ("pink", Color::rgb(255, 192, 203)),
    ("purple", Color::rgb(128, 0, 128)),
    ("red", Color::rgb(255, 0, 0)),
    ("white", Color::rgb(255, 255, 255)),
    ("yellow", Color::rgb(255, 255, 0)),
];

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b }
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Color {
        Color::rgb(r, g, b)
    }
}

impl From<Color> for Rgb<u8> {
    fn from(color: Color) -> Rgb<u8> {
        Rgb([color.r, color.g, color.b])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Color, ParseColorError> {
        let lower = s.trim().to_ascii_lowercase();
        if let Some(hex) = lower.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ParseColorError(s.into()));
        }
        NAMED
            .iter()
            .find(|&&(name, _)| name == lower)
            .map(|&(_, color)| color)
            .ok_or_else(|| ParseColorError(s.into()))
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let nibble = |i: usize| {
                u8::from_str_radix(&hex[i..=i], 16)
                    .ok()
                    .map(|n| n * 0x11)
            };
            Some(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?))
        }
        6 => {
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?))
        }
        _ => None,
    }
}

/// The string is neither a recognized color name nor a hex triple.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("unrecognized color {0:?}")]
pub struct ParseColorError(String);
